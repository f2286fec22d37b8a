use displaydoc::Display;
use log::debug;
use rand::Rng;
use thiserror::Error;

use crate::{
    builder::{MaskedBatch, MlmExampleBuilder},
    config::{ConfigError, MlmConfig, SpecialTokenIds},
    segments::PostProcessor,
    tokenizer::{TextTokenizer, TokenizerError},
    TokenId,
};

/// The potential errors of the pipeline.
#[derive(Debug, Display, Error)]
pub enum PipelineError {
    /// The special token ids of the tokenizer {tokenizer:?} differ from the configured ones {config:?}
    SpecialTokenIds {
        tokenizer: SpecialTokenIds,
        config: SpecialTokenIds,
    },
    /// The tokenizer vocabulary size {tokenizer} exceeds the configured one {config}
    VocabSize { tokenizer: usize, config: usize },
    /// Failed to tokenize the texts: {0}
    Tokenizer(#[from] TokenizerError),
    /// Invalid masking configuration: {0}
    Config(#[from] ConfigError),
}

/// The end-to-end pipeline from raw texts to masked language model examples.
pub struct MlmPipeline {
    tokenizer: TextTokenizer,
    post_processor: PostProcessor,
    builder: MlmExampleBuilder,
}

impl MlmPipeline {
    /// Creates a pipeline.
    ///
    /// # Errors
    /// Fails if the special token ids of the tokenizer don't match the configuration or if the
    /// tokenizer can produce ids outside of the configured vocabulary.
    pub fn new(tokenizer: TextTokenizer, config: &MlmConfig) -> Result<Self, PipelineError> {
        if tokenizer.special_token_ids() != config.special_token_ids() {
            return Err(PipelineError::SpecialTokenIds {
                tokenizer: tokenizer.special_token_ids(),
                config: config.special_token_ids(),
            });
        }
        if tokenizer.vocab_size() > config.vocab_size() {
            return Err(PipelineError::VocabSize {
                tokenizer: tokenizer.vocab_size(),
                config: config.vocab_size(),
            });
        }

        let ids = config.special_token_ids();
        let post_processor = PostProcessor::new(config.sequence_max_len(), ids.bos, ids.eos);
        let builder = MlmExampleBuilder::new(config)?;

        Ok(Self {
            tokenizer,
            post_processor,
            builder,
        })
    }

    /// Gets the tokenizer.
    pub fn tokenizer(&self) -> &TextTokenizer {
        &self.tokenizer
    }

    /// Encodes the texts into trimmed sequences wrapped by the start and end tokens.
    pub fn encode_batch<S>(&self, texts: &[S]) -> Result<Vec<Vec<TokenId>>, PipelineError>
    where
        S: AsRef<str>,
    {
        let sequences = self
            .tokenizer
            .tokenize_batch(texts)?
            .iter()
            .map(|tokens| self.post_processor.process(tokens))
            .collect::<Vec<_>>();
        debug!("Encoded {} texts", sequences.len());

        Ok(sequences)
    }

    /// Encodes the texts and builds their masked language model examples.
    pub fn run<S, R>(&self, texts: &[S], rng: &mut R) -> Result<MaskedBatch, PipelineError>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let sequences = self.encode_batch(texts)?;
        Ok(self.builder.build(&sequences, rng))
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::tests::trained_tokenizer;

    fn config(sequence_max_len: usize) -> MlmConfig {
        MlmConfig::builder()
            .with_vocab_size(100)
            .with_sequence_max_len(sequence_max_len)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_encode_batch() {
        let (_dir, tokenizer) = trained_tokenizer();
        let pipeline = MlmPipeline::new(tokenizer, &config(5)).unwrap();
        let sequences = pipeline
            .encode_batch(&["the movie was great", "", "a boring film"])
            .unwrap();
        assert_eq!(sequences.len(), 3);
        assert_eq!(sequences[1], [2, 3]);
        for sequence in sequences {
            assert!(sequence.len() >= 2 && sequence.len() <= 7);
            assert_eq!(sequence.first(), Some(&2));
            assert_eq!(sequence.last(), Some(&3));
        }
    }

    #[test]
    fn test_encode_batch_trims() {
        let (_dir, tokenizer) = trained_tokenizer();
        let text = "the movie was great and the film was not boring at all";
        let untrimmed = tokenizer.tokenize(text).unwrap();
        assert!(untrimmed.len() > 5);

        let pipeline = MlmPipeline::new(tokenizer, &config(5)).unwrap();
        let sequences = pipeline.encode_batch(&[text]).unwrap();
        assert_eq!(sequences[0].len(), 7);
        assert_eq!(sequences[0][1..6], untrimmed[..5]);
    }

    #[test]
    fn test_run() {
        let (_dir, tokenizer) = trained_tokenizer();
        let pipeline = MlmPipeline::new(tokenizer, &config(8)).unwrap();
        let texts = ["the movie was great", "a boring film", "!!!"];
        let masked = pipeline.run(&texts, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(masked.input_ids.shape(), [3, 10]);
        assert_eq!(masked.masked_positions.shape(), [3, 1]);
        assert_eq!(masked.token_types.row(2).sum(), 2);
        assert!(masked.input_ids.iter().all(|&id| id < 100));

        let again = pipeline.run(&texts, &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(masked, again);
    }

    #[test]
    fn test_special_token_mismatch() {
        let (_dir, tokenizer) = trained_tokenizer();
        let config = MlmConfig::builder()
            .with_vocab_size(100)
            .with_special_token_ids(SpecialTokenIds {
                mask: 103,
                ..SpecialTokenIds::default()
            })
            .build()
            .unwrap();
        assert!(matches!(
            MlmPipeline::new(tokenizer, &config),
            Err(PipelineError::SpecialTokenIds { .. }),
        ));
    }

    #[test]
    fn test_vocab_size_mismatch() {
        let (_dir, tokenizer) = trained_tokenizer();
        let config = MlmConfig::builder().with_vocab_size(6).build().unwrap();
        assert!(matches!(
            MlmPipeline::new(tokenizer, &config),
            Err(PipelineError::VocabSize { .. }),
        ));
    }
}
