use std::path::{Path, PathBuf};

use displaydoc::Display;
use log::info;
use thiserror::Error;
use tokenizers::{
    models::{
        bpe::{BpeTrainerBuilder, BPE},
        TrainerWrapper,
    },
    pre_tokenizers::{
        digits::Digits,
        sequence::Sequence,
        whitespace::WhitespaceSplit,
        PreTokenizerWrapper,
    },
    Tokenizer,
};

use crate::tokenizer::{check_extension, SpecialTokens, TextTokenizer, TokenizerError};

/// The potential errors of the tokenizer training.
#[derive(Debug, Display, Error)]
pub enum TrainerError {
    /// The vocabulary size must be greater than the number of special tokens
    VocabSize,
    /// The corpus path is not valid unicode: {0}
    Corpus(String),
    /// Failed to create the subword model: {0}
    Model(String),
    /// Failed to train the tokenizer: {0}
    Training(String),
    /// Failed to save or load the trained tokenizer: {0}
    Tokenizer(#[from] TokenizerError),
}

/// The configuration of the subword tokenizer training.
#[derive(Clone, Debug)]
pub struct TrainerConfig {
    input: PathBuf,
    output: PathBuf,
    vocab_size: usize,
    min_frequency: u64,
    special_tokens: SpecialTokens,
    split_by_number: bool,
}

impl TrainerConfig {
    /// Creates a configuration to train on the corpus file and to save the tokenizer to output.
    ///
    /// The defaults are a vocabulary size of `25000`, no minimum frequency, the default
    /// [`SpecialTokens`] and splitting by numbers.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().into(),
            output: output.as_ref().into(),
            vocab_size: 25_000,
            min_frequency: 0,
            special_tokens: SpecialTokens::default(),
            split_by_number: true,
        }
    }

    /// Sets the vocabulary size.
    ///
    /// # Errors
    /// Fails if the size doesn't exceed the number of special tokens.
    pub fn with_vocab_size(mut self, size: usize) -> Result<Self, TrainerError> {
        if size <= self.special_tokens.pieces().len() {
            Err(TrainerError::VocabSize)
        } else {
            self.vocab_size = size;
            Ok(self)
        }
    }

    /// Sets the minimum frequency of merged pairs.
    pub fn with_min_frequency(mut self, frequency: u64) -> Self {
        self.min_frequency = frequency;
        self
    }

    /// Sets the special tokens, which get the ids `0..=4` in the order pad, unk, bos, eos, mask.
    pub fn with_special_tokens(mut self, special_tokens: SpecialTokens) -> Self {
        self.special_tokens = special_tokens;
        self
    }

    /// Toggles splitting digits from other characters before the merges.
    pub fn with_split_by_number(mut self, toggle: bool) -> Self {
        self.split_by_number = toggle;
        self
    }

    /// Gets the path of the trained tokenizer.
    pub fn output(&self) -> &Path {
        &self.output
    }

    fn pre_tokenizer(&self) -> PreTokenizerWrapper {
        if self.split_by_number {
            Sequence::new(vec![WhitespaceSplit.into(), Digits::new(false).into()]).into()
        } else {
            WhitespaceSplit.into()
        }
    }
}

/// Trains a byte-pair-encoding tokenizer on the corpus and saves it.
///
/// The special tokens are registered first, hence their ids are `0..=4`.
pub fn train_tokenizer(config: &TrainerConfig) -> Result<TextTokenizer, TrainerError> {
    check_extension(&config.output)?;
    let input = config
        .input
        .to_str()
        .ok_or_else(|| TrainerError::Corpus(config.input.display().to_string()))?
        .to_string();

    let model = BPE::builder()
        .unk_token(config.special_tokens.unk.clone())
        .build()
        .map_err(|error| TrainerError::Model(error.to_string()))?;
    let mut tokenizer = Tokenizer::new(model);
    tokenizer.with_pre_tokenizer(Some(config.pre_tokenizer()));

    let mut trainer = TrainerWrapper::from(
        BpeTrainerBuilder::new()
            .show_progress(false)
            .vocab_size(config.vocab_size)
            .min_frequency(config.min_frequency)
            .special_tokens(config.special_tokens.added_tokens())
            .build(),
    );

    info!(
        "Training tokenizer on {} with vocabulary size {}",
        input, config.vocab_size,
    );
    tokenizer
        .train_from_files(&mut trainer, vec![input])
        .map_err(|error| TrainerError::Training(error.to_string()))?;
    tokenizer
        .save(&config.output, false)
        .map_err(|error| TokenizerError::Save(error.to_string()))?;
    info!(
        "Saved tokenizer with {} tokens to {}",
        tokenizer.get_vocab_size(true),
        config.output.display(),
    );

    TextTokenizer::new(tokenizer, &config.special_tokens).map_err(Into::into)
}
