use rand::{rngs::StdRng, Rng, SeedableRng};
#[cfg(feature = "multithreaded")]
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use smallvec::SmallVec;

use crate::{
    chooser::MaskValuesChooser,
    selector::{RandomItemSelector, Selection},
    TokenId,
};

/// A sequence with masked tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskedSequence {
    /// The corrupted token ids.
    pub ids: Vec<TokenId>,
    /// The ascending positions of the selected tokens in the original sequence.
    pub positions: Selection,
    /// The original token ids at the selected positions.
    pub values: SmallVec<[TokenId; 8]>,
}

impl MaskedSequence {
    /// Restores the original sequence by writing back the original values.
    pub fn restore(&self) -> Vec<TokenId> {
        let mut ids = self.ids.clone();
        for (&position, &value) in self.positions.iter().zip(self.values.iter()) {
            ids[position] = value;
        }
        ids
    }
}

/// Masks a single sequence.
pub fn mask_sequence<R>(
    ids: &[TokenId],
    selector: &RandomItemSelector,
    chooser: &MaskValuesChooser,
    rng: &mut R,
) -> MaskedSequence
where
    R: Rng + ?Sized,
{
    let positions = selector.select(ids, rng);
    let mut masked = ids.to_vec();
    let values = positions
        .iter()
        .map(|&position| {
            let original = ids[position];
            masked[position] = chooser.choose(original, rng);
            original
        })
        .collect();

    MaskedSequence {
        ids: masked,
        positions,
        values,
    }
}

/// Masks a batch of sequences.
///
/// Each sequence gets its own generator seeded from `rng` in batch order, hence the result only
/// depends on the state of `rng` and not on how the sequences are scheduled.
pub fn mask_language_model<S, R>(
    batch: &[S],
    selector: &RandomItemSelector,
    chooser: &MaskValuesChooser,
    rng: &mut R,
) -> Vec<MaskedSequence>
where
    S: AsRef<[TokenId]> + Sync,
    R: Rng + ?Sized,
{
    let seeds = batch.iter().map(|_| rng.gen()).collect::<Vec<u64>>();

    #[cfg(not(feature = "multithreaded"))]
    let seeds = seeds.into_iter();
    #[cfg(feature = "multithreaded")]
    let seeds = seeds.into_par_iter();

    seeds
        .enumerate()
        .map(|(idx, seed)| {
            let mut rng = StdRng::seed_from_u64(seed);
            mask_sequence(batch[idx].as_ref(), selector, chooser, &mut rng)
        })
        .collect()
}
