use rand::{seq::index::sample, Rng};
use smallvec::SmallVec;

use crate::{config::ConfigError, TokenId};

/// The selected positions of a sequence.
pub type Selection = SmallVec<[usize; 8]>;

/// Selects random items of a sequence for masking.
///
/// Items whose token id is unselectable are never chosen. The number of selected items is the
/// selection rate applied to the number of eligible items, rounded half to even and capped by the
/// maximum number of selections.
#[derive(Clone, Debug)]
pub struct RandomItemSelector {
    max_selections: usize,
    selection_rate: f64,
    /// Sorted for binary search.
    unselectable_ids: Vec<TokenId>,
}

impl RandomItemSelector {
    /// Creates a selector.
    ///
    /// # Errors
    /// Fails if `max_selections` is zero or if `selection_rate` is not in the range `(0, 1]`.
    pub fn new(
        max_selections: usize,
        selection_rate: f64,
        unselectable_ids: impl IntoIterator<Item = TokenId>,
    ) -> Result<Self, ConfigError> {
        if max_selections == 0 {
            return Err(ConfigError::MaxSelections);
        }
        if !(selection_rate > 0. && selection_rate <= 1.) {
            return Err(ConfigError::SelectionRate(selection_rate));
        }

        let mut unselectable_ids = unselectable_ids.into_iter().collect::<Vec<_>>();
        unselectable_ids.sort_unstable();
        unselectable_ids.dedup();

        Ok(Self {
            max_selections,
            selection_rate,
            unselectable_ids,
        })
    }

    /// Checks whether the token may be selected.
    pub fn is_selectable(&self, id: TokenId) -> bool {
        self.unselectable_ids.binary_search(&id).is_err()
    }

    /// Gets the positions of all selectable tokens in ascending order.
    pub fn eligible(&self, ids: &[TokenId]) -> Vec<usize> {
        ids.iter()
            .enumerate()
            .filter_map(|(position, &id)| self.is_selectable(id).then(|| position))
            .collect()
    }

    /// Computes the number of items to select from a number of eligible items.
    pub fn selection_count(&self, eligible: usize) -> usize {
        let count = round_half_to_even(eligible as f64 * self.selection_rate) as usize;
        count.min(self.max_selections).min(eligible)
    }

    /// Selects random positions without replacement.
    ///
    /// The positions refer to the given sequence and are sorted in ascending order.
    pub fn select<R>(&self, ids: &[TokenId], rng: &mut R) -> Selection
    where
        R: Rng + ?Sized,
    {
        let eligible = self.eligible(ids);
        let count = self.selection_count(eligible.len());
        if count == 0 {
            return Selection::new();
        }

        let mut selection = sample(rng, eligible.len(), count)
            .into_iter()
            .map(|idx| eligible[idx])
            .collect::<Selection>();
        selection.sort_unstable();
        selection
    }
}

/// Rounds to the nearest integer and ties to the even one.
fn round_half_to_even(value: f64) -> f64 {
    let rounded = value.round();
    if (value - value.trunc()).abs() == 0.5 && rounded % 2. != 0. {
        rounded - value.signum()
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use rstest::rstest;

    use super::*;

    const CLS: TokenId = 2;
    const SEP: TokenId = 3;

    fn selector(max_selections: usize, selection_rate: f64) -> RandomItemSelector {
        RandomItemSelector::new(max_selections, selection_rate, vec![0, 1, CLS, SEP]).unwrap()
    }

    #[rstest(
        value,
        expected,
        case(0.4, 0.),
        case(0.5, 0.),
        case(1.5, 2.),
        case(2.5, 2.),
        case(2.6, 3.),
        case(3.5, 4.),
        case(1., 1.)
    )]
    fn test_round_half_to_even(value: f64, expected: f64) {
        assert_eq!(round_half_to_even(value), expected);
    }

    #[rstest(
        max_selections,
        selection_rate,
        case(0, 0.2),
        case(1, 0.),
        case(1, 1.5),
        case(1, f64::NAN)
    )]
    fn test_new_invalid(max_selections: usize, selection_rate: f64) {
        assert!(RandomItemSelector::new(max_selections, selection_rate, vec![0]).is_err());
    }

    #[test]
    fn test_eligible() {
        let ids = [CLS, 5, 0, 7, 1, SEP];
        assert_eq!(selector(1, 0.2).eligible(&ids), [1, 3]);
    }

    #[test]
    fn test_selection_count() {
        let selector = selector(3, 0.2);
        assert_eq!(selector.selection_count(0), 0);
        assert_eq!(selector.selection_count(2), 0);
        assert_eq!(selector.selection_count(5), 1);
        assert_eq!(selector.selection_count(13), 3);
        assert_eq!(selector.selection_count(100), 3);
    }

    #[test]
    fn test_selection_count_never_exceeds_eligible() {
        assert_eq!(selector(10, 1.).selection_count(4), 4);
    }

    #[test]
    fn test_select_scenario() {
        let ids = [CLS, 5, 6, 7, 8, 9, SEP];
        let selector = selector(1, 0.2);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let selection = selector.select(&ids, &mut rng);
            assert_eq!(selection.len(), 1);
            assert!((1..=5).contains(&selection[0]));
        }
    }

    #[test]
    fn test_select_is_sorted_and_unique() {
        let ids = (0..64).collect::<Vec<TokenId>>();
        let selector = selector(32, 0.5);
        let mut rng = StdRng::seed_from_u64(7);
        let selection = selector.select(&ids, &mut rng);
        assert_eq!(selection.len(), 30);
        assert!(selection.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(selection.iter().all(|&position| ids[position] > SEP));
    }

    #[test]
    fn test_select_unselectable_only() {
        let ids = [CLS, 0, 1, 0, SEP];
        let mut rng = StdRng::seed_from_u64(0);
        assert!(selector(1, 1.).select(&ids, &mut rng).is_empty());
    }

    #[test]
    fn test_select_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(selector(1, 1.).select(&[], &mut rng).is_empty());
    }

    #[test]
    fn test_select_is_deterministic() {
        let ids = (0..20).collect::<Vec<TokenId>>();
        let selector = selector(5, 0.3);
        let first = selector.select(&ids, &mut StdRng::seed_from_u64(3));
        let second = selector.select(&ids, &mut StdRng::seed_from_u64(3));
        assert_eq!(first, second);
    }
}
