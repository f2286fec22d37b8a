use displaydoc::Display;
use thiserror::Error;

use crate::{segments::ADDED_TOKENS, TokenId};

/// The ids of the reserved tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpecialTokenIds {
    pub pad: TokenId,
    pub unk: TokenId,
    pub bos: TokenId,
    pub eos: TokenId,
    pub mask: TokenId,
}

impl Default for SpecialTokenIds {
    fn default() -> Self {
        Self {
            pad: 0,
            unk: 1,
            bos: 2,
            eos: 3,
            mask: 4,
        }
    }
}

impl SpecialTokenIds {
    /// The ids which must never be selected for masking.
    pub fn unselectable(&self) -> Vec<TokenId> {
        sorted_dedup(vec![self.pad, self.unk, self.bos, self.eos])
    }
}

/// The potential errors of the [`MlmConfig`] [`Builder`].
#[derive(Debug, Display, Error, PartialEq)]
pub enum ConfigError {
    /// The maximum sequence length must be greater than zero
    SequenceMaxLen,
    /// The selection rate must be in the range (0, 1], got {0}
    SelectionRate(f64),
    /// The maximum number of selections per sequence must be greater than zero
    MaxSelections,
    /// The mask and random token rates must be in [0, 1] and sum up to at most 1
    SubstitutionRates,
    /// The vocabulary size {vocab_size} leaves no token to draw besides the {reserved} reserved ids
    VocabSize { vocab_size: usize, reserved: usize },
}

/// The configuration of the masked language model example construction.
///
/// Immutable once built, see [`MlmConfig::builder()`].
#[derive(Clone, Debug, PartialEq)]
pub struct MlmConfig {
    vocab_size: usize,
    special_token_ids: SpecialTokenIds,
    unselectable_ids: Vec<TokenId>,
    sequence_max_len: usize,
    selection_rate: f64,
    max_selections: usize,
    mask_token_rate: f32,
    random_token_rate: f32,
}

impl Default for MlmConfig {
    fn default() -> Self {
        // the defaults are valid by construction
        Builder::default().build().unwrap()
    }
}

impl MlmConfig {
    /// Creates a configuration builder with the default settings.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Gets the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Gets the ids of the reserved tokens.
    pub fn special_token_ids(&self) -> SpecialTokenIds {
        self.special_token_ids
    }

    /// Gets the sorted ids which are never selected for masking.
    pub fn unselectable_ids(&self) -> &[TokenId] {
        &self.unselectable_ids
    }

    /// Gets the maximum number of tokens per sequence without the wrapping tokens.
    pub fn sequence_max_len(&self) -> usize {
        self.sequence_max_len
    }

    /// Gets the width of the padded token sequences, which includes the wrapping tokens.
    pub fn padded_len(&self) -> usize {
        self.sequence_max_len + ADDED_TOKENS
    }

    /// Gets the rate of selected tokens per sequence.
    pub fn selection_rate(&self) -> f64 {
        self.selection_rate
    }

    /// Gets the maximum number of selected tokens per sequence.
    pub fn max_selections(&self) -> usize {
        self.max_selections
    }

    /// Gets the rate of selected tokens which are replaced by the mask token.
    pub fn mask_token_rate(&self) -> f32 {
        self.mask_token_rate
    }

    /// Gets the rate of selected tokens which are replaced by a random token.
    pub fn random_token_rate(&self) -> f32 {
        self.random_token_rate
    }
}

/// A builder to create a [`MlmConfig`].
#[derive(Clone, Debug)]
pub struct Builder {
    vocab_size: usize,
    special_token_ids: SpecialTokenIds,
    unselectable_ids: Option<Vec<TokenId>>,
    sequence_max_len: usize,
    selection_rate: f64,
    max_selections: Option<usize>,
    mask_token_rate: f32,
    random_token_rate: f32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            vocab_size: 25_000,
            special_token_ids: SpecialTokenIds::default(),
            unselectable_ids: None,
            sequence_max_len: 5,
            selection_rate: 0.2,
            max_selections: None,
            mask_token_rate: 0.8,
            random_token_rate: 0.1,
        }
    }
}

impl Builder {
    /// Sets the vocabulary size.
    ///
    /// Defaults to `25000`. Validated against the reserved ids in [`build()`].
    ///
    /// [`build()`]: Self::build
    pub fn with_vocab_size(mut self, size: usize) -> Self {
        self.vocab_size = size;
        self
    }

    /// Sets the ids of the reserved tokens.
    ///
    /// Defaults to `[PAD]=0`, `[UNK]=1`, `[CLS]=2`, `[SEP]=3` and `[MASK]=4`.
    pub fn with_special_token_ids(mut self, ids: SpecialTokenIds) -> Self {
        self.special_token_ids = ids;
        self
    }

    /// Sets the ids which are never selected for masking.
    ///
    /// Defaults to the padding, unknown, start and end token ids.
    pub fn with_unselectable_ids(mut self, ids: impl IntoIterator<Item = TokenId>) -> Self {
        self.unselectable_ids = Some(sorted_dedup(ids.into_iter().collect()));
        self
    }

    /// Sets the maximum number of tokens per sequence without the wrapping tokens.
    ///
    /// Defaults to `5`.
    ///
    /// # Errors
    /// Fails if `len` is zero.
    pub fn with_sequence_max_len(mut self, len: usize) -> Result<Self, ConfigError> {
        if len == 0 {
            Err(ConfigError::SequenceMaxLen)
        } else {
            self.sequence_max_len = len;
            Ok(self)
        }
    }

    /// Sets the rate of selected tokens per sequence.
    ///
    /// Defaults to `0.2`.
    ///
    /// # Errors
    /// Fails if `rate` is not in the range `(0, 1]`.
    pub fn with_selection_rate(mut self, rate: f64) -> Result<Self, ConfigError> {
        if rate > 0. && rate <= 1. {
            self.selection_rate = rate;
            Ok(self)
        } else {
            Err(ConfigError::SelectionRate(rate))
        }
    }

    /// Sets the maximum number of selected tokens per sequence.
    ///
    /// Defaults to `⌊sequence_max_len * selection_rate⌋`.
    ///
    /// # Errors
    /// Fails if `count` is zero.
    pub fn with_max_selections(mut self, count: usize) -> Result<Self, ConfigError> {
        if count == 0 {
            Err(ConfigError::MaxSelections)
        } else {
            self.max_selections = Some(count);
            Ok(self)
        }
    }

    /// Sets the rates of the mask token and random token substitutions.
    ///
    /// Defaults to `0.8` and `0.1`. The remaining probability mass keeps the original token.
    ///
    /// # Errors
    /// Fails if a rate is not in `[0, 1]` or if the rates sum up to more than one.
    pub fn with_substitution_rates(mut self, mask: f32, random: f32) -> Result<Self, ConfigError> {
        let unit = 0.0..=1.0;
        if unit.contains(&mask) && unit.contains(&random) && mask + random <= 1. {
            self.mask_token_rate = mask;
            self.random_token_rate = random;
            Ok(self)
        } else {
            Err(ConfigError::SubstitutionRates)
        }
    }

    /// Builds the configuration.
    ///
    /// # Errors
    /// Fails if the derived maximum number of selections is zero or if the vocabulary consists
    /// of reserved ids only.
    pub fn build(self) -> Result<MlmConfig, ConfigError> {
        let max_selections = match self.max_selections {
            Some(count) => count,
            None => (self.sequence_max_len as f64 * self.selection_rate).floor() as usize,
        };
        if max_selections == 0 {
            return Err(ConfigError::MaxSelections);
        }

        let (vocab_size, special_token_ids) = (self.vocab_size, self.special_token_ids);
        let unselectable_ids = self
            .unselectable_ids
            .unwrap_or_else(|| special_token_ids.unselectable());
        let reserved = unselectable_ids
            .iter()
            .filter(|&&id| (id as usize) < vocab_size)
            .count();
        if vocab_size <= reserved {
            return Err(ConfigError::VocabSize {
                vocab_size,
                reserved,
            });
        }

        Ok(MlmConfig {
            vocab_size,
            special_token_ids,
            unselectable_ids,
            sequence_max_len: self.sequence_max_len,
            selection_rate: self.selection_rate,
            max_selections,
            mask_token_rate: self.mask_token_rate,
            random_token_rate: self.random_token_rate,
        })
    }
}

fn sorted_dedup(mut ids: Vec<TokenId>) -> Vec<TokenId> {
    ids.sort_unstable();
    ids.dedup();
    ids
}
