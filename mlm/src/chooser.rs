use rand::{
    distributions::{Distribution, Uniform, WeightedIndex},
    Rng,
};

use crate::{config::ConfigError, TokenId};

/// The outcome of the substitution policy for a selected token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Substitution {
    /// Replace the token by the mask token.
    Mask,
    /// Replace the token by a random drawable token.
    Random,
    /// Keep the original token.
    Keep,
}

impl Substitution {
    const OUTCOMES: [Substitution; 3] = [Self::Mask, Self::Random, Self::Keep];
}

/// Chooses the values of the selected tokens.
///
/// The substitution is a weighted categorical draw over mask, random and keep. Random tokens are
/// drawn uniformly from the vocabulary without the excluded ids.
#[derive(Clone, Debug)]
pub struct MaskValuesChooser {
    mask_token: TokenId,
    substitutions: WeightedIndex<f32>,
    tokens: Uniform<TokenId>,
    /// Sorted and restricted to the vocabulary.
    excluded_ids: Vec<TokenId>,
}

impl MaskValuesChooser {
    /// Creates a chooser.
    ///
    /// # Errors
    /// Fails if a rate is not in `[0, 1]`, if the rates sum up to more than one or if every token
    /// of the vocabulary is excluded.
    pub fn new(
        vocab_size: usize,
        mask_token: TokenId,
        mask_token_rate: f32,
        random_token_rate: f32,
        excluded_ids: impl IntoIterator<Item = TokenId>,
    ) -> Result<Self, ConfigError> {
        let unit = 0.0..=1.0;
        if !unit.contains(&mask_token_rate)
            || !unit.contains(&random_token_rate)
            || mask_token_rate + random_token_rate > 1.
        {
            return Err(ConfigError::SubstitutionRates);
        }
        let keep_rate = (1. - mask_token_rate - random_token_rate).max(0.);
        let substitutions = WeightedIndex::new([mask_token_rate, random_token_rate, keep_rate])
            .map_err(|_| ConfigError::SubstitutionRates)?;

        let mut excluded_ids = excluded_ids
            .into_iter()
            .filter(|&id| (id as usize) < vocab_size)
            .collect::<Vec<_>>();
        excluded_ids.sort_unstable();
        excluded_ids.dedup();
        let drawable = vocab_size - excluded_ids.len();
        if drawable == 0 {
            return Err(ConfigError::VocabSize {
                vocab_size,
                reserved: excluded_ids.len(),
            });
        }
        let tokens = Uniform::new(0, drawable as TokenId);

        Ok(Self {
            mask_token,
            substitutions,
            tokens,
            excluded_ids,
        })
    }

    /// Draws the substitution for a selected token.
    pub fn substitution<R>(&self, rng: &mut R) -> Substitution
    where
        R: Rng + ?Sized,
    {
        Substitution::OUTCOMES[self.substitutions.sample(rng)]
    }

    /// Draws a random token which is not excluded.
    pub fn random_token<R>(&self, rng: &mut R) -> TokenId
    where
        R: Rng + ?Sized,
    {
        // shift the draw over the excluded ids, which keeps it uniform
        self.excluded_ids
            .iter()
            .fold(self.tokens.sample(rng), |token, &excluded| {
                if token >= excluded {
                    token + 1
                } else {
                    token
                }
            })
    }

    /// Chooses the value of a selected token.
    pub fn choose<R>(&self, original: TokenId, rng: &mut R) -> TokenId
    where
        R: Rng + ?Sized,
    {
        match self.substitution(rng) {
            Substitution::Mask => self.mask_token,
            Substitution::Random => self.random_token(rng),
            Substitution::Keep => original,
        }
    }
}
