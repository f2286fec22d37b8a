#![cfg_attr(doc, forbid(broken_intra_doc_links, private_intra_doc_links))]
//! Masked language model examples from raw texts.
//!
//! The texts are normalized and split into subword tokens by a trained byte-pair-encoding
//! tokenizer. The token sequences are trimmed and wrapped by the start and end tokens, then a
//! random subset of their tokens is selected and substituted:
//! - The selection never contains the padding, unknown, start or end tokens.
//! - A selected token is replaced by the mask token, by a random token or kept as it is.
//! - The positions and original values of the selected tokens are the prediction targets.
//!
//! The examples are padded into rectangular arrays of fixed widths.
//!
//! ```no_run
//! use mlm::{MlmConfig, MlmPipeline, TextTokenizer};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tokenizer = TextTokenizer::from_file("tokenizer.json")?;
//!     let config = MlmConfig::builder()
//!         .with_vocab_size(tokenizer.vocab_size())
//!         .with_sequence_max_len(128)?
//!         .with_selection_rate(0.15)?
//!         .build()?;
//!     let pipeline = MlmPipeline::new(tokenizer, &config)?;
//!
//!     let batch = pipeline.run(
//!         &["This movie was great!", "And this one was boring."],
//!         &mut StdRng::seed_from_u64(42),
//!     )?;
//!
//!     Ok(())
//! }
//! ```

mod builder;
mod chooser;
mod config;
mod masking;
mod normalizer;
mod padding;
mod pipeline;
mod segments;
mod selector;
mod tokenizer;
mod trainer;
mod trimmer;

pub use crate::{
    builder::{
        InputIds,
        MaskedBatch,
        MaskedPositions,
        MaskedRecord,
        MaskedValues,
        MlmExampleBuilder,
        TokenTypes,
    },
    chooser::{MaskValuesChooser, Substitution},
    config::{Builder as MlmConfigBuilder, ConfigError, MlmConfig, SpecialTokenIds},
    masking::{mask_language_model, mask_sequence, MaskedSequence},
    normalizer::Normalizer,
    padding::pad_model_inputs,
    pipeline::{MlmPipeline, PipelineError},
    segments::{combine_segments, PostProcessor, ADDED_TOKENS},
    selector::{RandomItemSelector, Selection},
    tokenizer::{SpecialTokens, TextTokenizer, TokenizerError, TOKENIZER_EXTENSION},
    trainer::{train_tokenizer, TrainerConfig, TrainerError},
    trimmer::WaterfallTrimmer,
};

/// The id of a token in the vocabulary.
pub type TokenId = u32;

/// The index of a token within its wrapped sequence.
pub type Position = u32;
