#![cfg_attr(doc, forbid(broken_intra_doc_links, private_intra_doc_links))]
//! Preparation of the IMDb sentiment analysis dataset.
//!
//! The dataset archive is downloaded and unpacked, the reviews of the train and test splits are
//! extracted and saved as shuffled csv files and the normalized train reviews are saved as the
//! corpus for the tokenizer training.
//!
//! ```no_run
//! use imdb::{download_and_unpack, extract_corpus, extract_reviews, split_and_save, Paths};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let paths = Paths::new(imdb::LOCAL_DIR, imdb::ARCHIVE_NAME);
//!     let imdb_dir =
//!         download_and_unpack(imdb::SOURCE_URL, paths.local_dir(), imdb::ARCHIVE_NAME)?;
//!     let reviews = extract_reviews(imdb_dir)?;
//!     split_and_save(reviews, paths.local_dir(), &mut rand::thread_rng())?;
//!     let corpus = extract_corpus(paths.local_dir())?;
//!
//!     Ok(())
//! }
//! ```

mod dataset;
mod download;
mod paths;
mod reviews;

pub use crate::{
    dataset::{
        extract_corpus,
        read_records,
        split_and_save,
        write_records,
        DatasetError,
        ReviewRecord,
    },
    download::{download, download_and_unpack, unpack, DownloadError},
    paths::{
        Paths,
        CORPUS_FILE_NAME,
        IMDB_DIR_NAME,
        TEST_FILE_NAME,
        TOKENIZER_FILE_NAME,
        TRAIN_FILE_NAME,
    },
    reviews::{
        extract_reviews,
        parse_rating,
        read_review,
        Review,
        ReviewError,
        Split,
        POSITIVE_RATING,
    },
};

/// The url of the dataset archive.
pub const SOURCE_URL: &str = "https://ai.stanford.edu/~amaas/data/sentiment/aclImdb_v1.tar.gz";

/// The file name of the downloaded dataset archive.
pub const ARCHIVE_NAME: &str = "imdb.tar.gz";

/// The default local directory of the prepared dataset.
pub const LOCAL_DIR: &str = "/tmp/mlmPattern";
