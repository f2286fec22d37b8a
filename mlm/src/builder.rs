use derive_more::{Deref, From};
use log::debug;
use ndarray::{Array2, Axis};
use rand::{thread_rng, Rng};
use serde::Serialize;

use crate::{
    chooser::MaskValuesChooser,
    config::{ConfigError, MlmConfig},
    masking::{mask_language_model, MaskedSequence},
    padding::pad_model_inputs,
    selector::RandomItemSelector,
    Position,
    TokenId,
};

/// The corrupted token ids of the masked sequences.
#[derive(Clone, Debug, Deref, From, PartialEq)]
pub struct InputIds(pub Array2<TokenId>);

/// The validity masks of the masked sequences, `1` for real tokens and `0` for padding.
#[derive(Clone, Debug, Deref, From, PartialEq)]
pub struct TokenTypes(pub Array2<TokenId>);

/// The positions of the selected tokens within their wrapped sequences.
#[derive(Clone, Debug, Deref, From, PartialEq)]
pub struct MaskedPositions(pub Array2<Position>);

/// The original token ids at the selected positions.
#[derive(Clone, Debug, Deref, From, PartialEq)]
pub struct MaskedValues(pub Array2<TokenId>);

/// A batch of masked language model examples.
///
/// All arrays have one row per sequence. The token arrays have `sequence_max_len + 2` columns
/// and the selection arrays have `max_selections` columns, all of them padded with the padding
/// token id.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskedBatch {
    pub input_ids: InputIds,
    pub token_types: TokenTypes,
    pub masked_positions: MaskedPositions,
    pub masked_values: MaskedValues,
}

/// A single masked language model example.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MaskedRecord {
    pub input_ids: Vec<TokenId>,
    pub token_types: Vec<TokenId>,
    pub masked_positions: Vec<Position>,
    pub masked_values: Vec<TokenId>,
}

impl MaskedBatch {
    /// Gets the number of sequences.
    pub fn len(&self) -> usize {
        self.input_ids.nrows()
    }

    /// Checks if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the examples of the batch.
    pub fn rows(&self) -> impl Iterator<Item = MaskedRecord> + '_ {
        self.input_ids
            .axis_iter(Axis(0))
            .zip(self.token_types.axis_iter(Axis(0)))
            .zip(self.masked_positions.axis_iter(Axis(0)))
            .zip(self.masked_values.axis_iter(Axis(0)))
            .map(
                |(((input_ids, token_types), masked_positions), masked_values)| MaskedRecord {
                    input_ids: input_ids.to_vec(),
                    token_types: token_types.to_vec(),
                    masked_positions: masked_positions.to_vec(),
                    masked_values: masked_values.to_vec(),
                },
            )
    }
}

/// Builds masked language model examples from tokenized and wrapped sequences.
#[derive(Clone, Debug)]
pub struct MlmExampleBuilder {
    selector: RandomItemSelector,
    chooser: MaskValuesChooser,
    padded_len: usize,
    max_selections: usize,
    pad_id: TokenId,
}

impl MlmExampleBuilder {
    /// Creates an example builder from the configuration.
    ///
    /// # Errors
    /// Fails if the selection or substitution settings are invalid, which can't happen for a
    /// built [`MlmConfig`].
    pub fn new(config: &MlmConfig) -> Result<Self, ConfigError> {
        let unselectable_ids = config.unselectable_ids();
        let selector = RandomItemSelector::new(
            config.max_selections(),
            config.selection_rate(),
            unselectable_ids.iter().copied(),
        )?;
        let chooser = MaskValuesChooser::new(
            config.vocab_size(),
            config.special_token_ids().mask,
            config.mask_token_rate(),
            config.random_token_rate(),
            unselectable_ids.iter().copied(),
        )?;

        Ok(Self {
            selector,
            chooser,
            padded_len: config.padded_len(),
            max_selections: config.max_selections(),
            pad_id: config.special_token_ids().pad,
        })
    }

    /// Builds the masked examples for a batch of wrapped sequences.
    ///
    /// Sequences longer than `sequence_max_len + 2` are truncated before the selection. The
    /// result is deterministic for a seeded generator.
    pub fn build<S, R>(&self, batch: &[S], rng: &mut R) -> MaskedBatch
    where
        S: AsRef<[TokenId]> + Sync,
        R: Rng + ?Sized,
    {
        let truncated = batch
            .iter()
            .map(|ids| {
                let ids = ids.as_ref();
                &ids[..ids.len().min(self.padded_len)]
            })
            .collect::<Vec<_>>();
        let masked = mask_language_model(&truncated, &self.selector, &self.chooser, rng);
        debug!(
            "Masked {} of {} tokens in {} sequences",
            masked.iter().map(|sequence| sequence.positions.len()).sum::<usize>(),
            truncated.iter().map(|ids| ids.len()).sum::<usize>(),
            masked.len(),
        );

        self.pad(&masked)
    }

    /// Builds the masked examples for a batch of wrapped sequences with the thread local generator.
    pub fn build_with_thread_rng<S>(&self, batch: &[S]) -> MaskedBatch
    where
        S: AsRef<[TokenId]> + Sync,
    {
        self.build(batch, &mut thread_rng())
    }

    fn pad(&self, masked: &[MaskedSequence]) -> MaskedBatch {
        let ids = masked
            .iter()
            .map(|sequence| sequence.ids.as_slice())
            .collect::<Vec<_>>();
        let (input_ids, token_types) = pad_model_inputs(&ids, self.padded_len, self.pad_id);

        let positions = masked
            .iter()
            .map(|sequence| {
                sequence
                    .positions
                    .iter()
                    .map(|&position| position as Position)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let (masked_positions, _) = pad_model_inputs(&positions, self.max_selections, self.pad_id);

        let values = masked
            .iter()
            .map(|sequence| sequence.values.as_slice())
            .collect::<Vec<_>>();
        let (masked_values, _) = pad_model_inputs(&values, self.max_selections, self.pad_id);

        MaskedBatch {
            input_ids: input_ids.into(),
            token_types: token_types.into(),
            masked_positions: masked_positions.into(),
            masked_values: masked_values.into(),
        }
    }
}
