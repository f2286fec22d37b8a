use std::path::Path;

use displaydoc::Display;
use log::debug;
use thiserror::Error;
use tokenizers::{AddedToken, Tokenizer};

use crate::{config::SpecialTokenIds, normalizer::Normalizer, TokenId};

/// The file extension of serialized tokenizers.
pub const TOKENIZER_EXTENSION: &str = "json";

/// The potential errors of the tokenizer.
#[derive(Debug, Display, Error)]
pub enum TokenizerError {
    /// The tokenizer path must be a file path with a '.json' suffix, got {0}
    Extension(String),
    /// Failed to load the tokenizer: {0}
    Load(String),
    /// Failed to save the tokenizer: {0}
    Save(String),
    /// The special token {0} doesn't exist in the vocabulary
    SpecialToken(String),
    /// Failed to encode the text: {0}
    Encode(String),
}

/// The reserved pieces of the vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecialTokens {
    pub pad: String,
    pub unk: String,
    pub bos: String,
    pub eos: String,
    pub mask: String,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        Self {
            pad: "[PAD]".into(),
            unk: "[UNK]".into(),
            bos: "[CLS]".into(),
            eos: "[SEP]".into(),
            mask: "[MASK]".into(),
        }
    }
}

impl SpecialTokens {
    /// Gets the pieces in the order of their ids.
    pub fn pieces(&self) -> [&str; 5] {
        [&self.pad, &self.unk, &self.bos, &self.eos, &self.mask]
    }

    pub(crate) fn added_tokens(&self) -> Vec<AddedToken> {
        self.pieces()
            .iter()
            .map(|&piece| AddedToken::from(piece.to_string(), true))
            .collect()
    }
}

/// Checks that the path has the tokenizer file extension.
pub(crate) fn check_extension(path: &Path) -> Result<(), TokenizerError> {
    if path.extension().and_then(|extension| extension.to_str()) == Some(TOKENIZER_EXTENSION) {
        Ok(())
    } else {
        Err(TokenizerError::Extension(path.display().to_string()))
    }
}

/// A subword tokenizer for raw text.
///
/// Normalizes the text and splits it into subword token ids without wrapping tokens.
pub struct TextTokenizer {
    tokenizer: Tokenizer,
    normalizer: Normalizer,
    special_token_ids: SpecialTokenIds,
}

impl TextTokenizer {
    /// Loads a trained tokenizer with the default special tokens.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TokenizerError> {
        Self::from_file_with_special_tokens(path, &SpecialTokens::default())
    }

    /// Loads a trained tokenizer.
    ///
    /// # Errors
    /// Fails if the path doesn't end with `.json`, if the file can't be deserialized or if one of
    /// the special tokens is missing.
    pub fn from_file_with_special_tokens(
        path: impl AsRef<Path>,
        special_tokens: &SpecialTokens,
    ) -> Result<Self, TokenizerError> {
        let path = path.as_ref();
        check_extension(path)?;
        let tokenizer =
            Tokenizer::from_file(path).map_err(|error| TokenizerError::Load(error.to_string()))?;
        debug!("Loaded tokenizer from {}", path.display());

        Self::new(tokenizer, special_tokens)
    }

    pub(crate) fn new(
        tokenizer: Tokenizer,
        special_tokens: &SpecialTokens,
    ) -> Result<Self, TokenizerError> {
        let id = |token: &str| {
            tokenizer
                .token_to_id(token)
                .ok_or_else(|| TokenizerError::SpecialToken(token.into()))
        };
        let special_token_ids = SpecialTokenIds {
            pad: id(&special_tokens.pad)?,
            unk: id(&special_tokens.unk)?,
            bos: id(&special_tokens.bos)?,
            eos: id(&special_tokens.eos)?,
            mask: id(&special_tokens.mask)?,
        };

        Ok(Self {
            tokenizer,
            normalizer: Normalizer::default(),
            special_token_ids,
        })
    }

    /// Gets the ids of the special tokens.
    pub fn special_token_ids(&self) -> SpecialTokenIds {
        self.special_token_ids
    }

    /// Gets the id of the mask token.
    pub fn mask_token_id(&self) -> TokenId {
        self.special_token_ids.mask
    }

    /// Gets the vocabulary size including the special tokens.
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    /// Gets the id of a token.
    pub fn token_to_id(&self, token: &str) -> Option<TokenId> {
        self.tokenizer.token_to_id(token)
    }

    /// Gets the token of an id.
    pub fn id_to_token(&self, id: TokenId) -> Option<String> {
        self.tokenizer.id_to_token(id)
    }

    /// Tokenizes the normalized text.
    pub fn tokenize(&self, text: &str) -> Result<Vec<TokenId>, TokenizerError> {
        let normalized = self.normalizer.normalize(text);
        self.tokenizer
            .encode(normalized.as_str(), false)
            .map(|encoding| encoding.get_ids().to_vec())
            .map_err(|error| TokenizerError::Encode(error.to_string()))
    }

    /// Tokenizes the normalized texts.
    pub fn tokenize_batch<S>(&self, texts: &[S]) -> Result<Vec<Vec<TokenId>>, TokenizerError>
    where
        S: AsRef<str>,
    {
        let normalized = texts
            .iter()
            .map(|text| self.normalizer.normalize(text.as_ref()))
            .collect::<Vec<_>>();
        self.tokenizer
            .encode_batch(normalized, false)
            .map(|encodings| {
                encodings
                    .iter()
                    .map(|encoding| encoding.get_ids().to_vec())
                    .collect()
            })
            .map_err(|error| TokenizerError::Encode(error.to_string()))
    }

    /// Saves the tokenizer.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TokenizerError> {
        let path = path.as_ref();
        check_extension(path)?;
        self.tokenizer
            .save(path, false)
            .map_err(|error| TokenizerError::Save(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::trained_tokenizer;

    #[test]
    fn test_extension() {
        assert!(check_extension(Path::new("/tmp/tokenizer.json")).is_ok());
        assert!(matches!(
            check_extension(Path::new("/tmp/tokenizer.model")),
            Err(TokenizerError::Extension(_)),
        ));
        assert!(matches!(
            TextTokenizer::from_file("tokenizer"),
            Err(TokenizerError::Extension(_)),
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            TextTokenizer::from_file("/this/does/not/exist.json"),
            Err(TokenizerError::Load(_)),
        ));
    }

    #[test]
    fn test_special_token_ids() {
        let (_dir, tokenizer) = trained_tokenizer();
        assert_eq!(tokenizer.special_token_ids(), SpecialTokenIds::default());
        assert_eq!(tokenizer.id_to_token(4).as_deref(), Some("[MASK]"));
    }

    #[test]
    fn test_missing_special_token() {
        let (dir, _) = trained_tokenizer();
        let special_tokens = SpecialTokens {
            mask: "<mask>".into(),
            ..SpecialTokens::default()
        };
        assert!(matches!(
            TextTokenizer::from_file_with_special_tokens(
                dir.path().join("tokenizer.json"),
                &special_tokens,
            ),
            Err(TokenizerError::SpecialToken(token)) if token == "<mask>",
        ));
    }

    #[test]
    fn test_tokenize() {
        let (_dir, tokenizer) = trained_tokenizer();
        let ids = tokenizer.tokenize("The movie was great").unwrap();
        assert!(!ids.is_empty());
        assert!(ids.iter().all(|&id| id > 4));
        assert_eq!(ids, tokenizer.tokenize("THE MOVIE, WAS GREAT!").unwrap());
    }

    #[test]
    fn test_tokenize_empty() {
        let (_dir, tokenizer) = trained_tokenizer();
        assert!(tokenizer.tokenize("").unwrap().is_empty());
        assert!(tokenizer.tokenize("!?<>").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_batch() {
        let (_dir, tokenizer) = trained_tokenizer();
        let texts = ["the movie", "a great film", ""];
        let batch = tokenizer.tokenize_batch(&texts).unwrap();
        assert_eq!(batch.len(), 3);
        for (ids, text) in batch.iter().zip(texts.iter()) {
            assert_eq!(ids, &tokenizer.tokenize(text).unwrap());
        }
    }

    #[test]
    fn test_save_and_reload() {
        let (dir, tokenizer) = trained_tokenizer();
        let path = dir.path().join("copy.json");
        tokenizer.save(&path).unwrap();
        let reloaded = TextTokenizer::from_file(&path).unwrap();
        assert_eq!(reloaded.vocab_size(), tokenizer.vocab_size());
        assert_eq!(
            reloaded.tokenize("a boring film").unwrap(),
            tokenizer.tokenize("a boring film").unwrap(),
        );
    }
}
