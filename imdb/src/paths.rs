use std::path::{Path, PathBuf};

/// The directory of the unpacked dataset.
pub const IMDB_DIR_NAME: &str = "aclImdb";
/// The file of the shuffled train reviews.
pub const TRAIN_FILE_NAME: &str = "train.csv";
/// The file of the shuffled test reviews.
pub const TEST_FILE_NAME: &str = "test.csv";
/// The file of the normalized train reviews.
pub const CORPUS_FILE_NAME: &str = "corpus.txt";
/// The file of the trained tokenizer.
pub const TOKENIZER_FILE_NAME: &str = "tokenizer.json";

/// The file layout of the prepared dataset in a local directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    local_dir: PathBuf,
    archive_name: String,
}

impl Paths {
    /// Creates the layout in the local directory with the archive file name.
    pub fn new(local_dir: impl AsRef<Path>, archive_name: impl Into<String>) -> Self {
        Self {
            local_dir: local_dir.as_ref().into(),
            archive_name: archive_name.into(),
        }
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn archive(&self) -> PathBuf {
        self.local_dir.join(&self.archive_name)
    }

    pub fn imdb_dir(&self) -> PathBuf {
        self.local_dir.join(IMDB_DIR_NAME)
    }

    pub fn train(&self) -> PathBuf {
        self.local_dir.join(TRAIN_FILE_NAME)
    }

    pub fn test(&self) -> PathBuf {
        self.local_dir.join(TEST_FILE_NAME)
    }

    pub fn corpus(&self) -> PathBuf {
        self.local_dir.join(CORPUS_FILE_NAME)
    }

    pub fn tokenizer(&self) -> PathBuf {
        self.local_dir.join(TOKENIZER_FILE_NAME)
    }
}
