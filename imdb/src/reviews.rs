use std::{
    ffi::OsStr,
    fmt,
    fs,
    io::Error as IoError,
    path::{Path, PathBuf},
};

use displaydoc::Display;
use log::{debug, info};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use thiserror::Error;

/// The potential errors of the review extraction.
#[derive(Debug, Display, Error)]
pub enum ReviewError {
    /// Failed to read the review {path}: {source}
    Read { path: String, source: IoError },
    /// The review file name {0} doesn't have the format `<id>_<rating>.txt`
    FileName(String),
}

/// The rating threshold of positive reviews.
pub const POSITIVE_RATING: u8 = 5;

/// The split of the dataset which a review belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Test];

    /// Gets the directory name of the split.
    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A single movie review.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Review {
    pub review: String,
    pub rating: u8,
    pub is_positive: bool,
    pub split: Split,
}

impl Review {
    /// Creates a review, which is positive if the rating is at least [`POSITIVE_RATING`].
    pub fn new(review: impl Into<String>, rating: u8, split: Split) -> Self {
        Self {
            review: review.into(),
            rating,
            is_positive: rating >= POSITIVE_RATING,
            split,
        }
    }
}

/// Parses the rating from a review file name of the format `<id>_<rating>.txt`.
pub fn parse_rating(path: impl AsRef<Path>) -> Result<u8, ReviewError> {
    let path = path.as_ref();
    let file_name_error = || ReviewError::FileName(path.display().to_string());

    if path.extension() != Some(OsStr::new("txt")) {
        return Err(file_name_error());
    }
    path.file_stem()
        .and_then(OsStr::to_str)
        .and_then(|stem| stem.split_once('_'))
        .and_then(|(id, rating)| (!id.is_empty()).then(|| rating))
        .and_then(|rating| rating.parse().ok())
        .ok_or_else(file_name_error)
}

/// Reads a single review file.
pub fn read_review(path: impl AsRef<Path>, split: Split) -> Result<Review, ReviewError> {
    let path = path.as_ref();
    let rating = parse_rating(path)?;
    let review = fs::read_to_string(path).map_err(|source| ReviewError::Read {
        path: path.display().to_string(),
        source,
    })?;

    Ok(Review::new(review, rating, split))
}

/// Lists the sorted review files of a split, positive reviews first.
fn list_reviews(imdb_dir: &Path, split: Split) -> Result<Vec<PathBuf>, ReviewError> {
    let mut paths = Vec::new();
    for sentiment in &["pos", "neg"] {
        let dir = imdb_dir.join(split.dir_name()).join(sentiment);
        let read_error = |source: IoError| ReviewError::Read {
            path: dir.display().to_string(),
            source,
        };

        let mut files = fs::read_dir(&dir)
            .map_err(read_error)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)?;
        files.retain(|path| path.is_file() && path.extension() == Some(OsStr::new("txt")));
        files.sort();
        debug!("Found {} reviews in {}", files.len(), dir.display());
        paths.extend(files);
    }

    Ok(paths)
}

/// Extracts the train and test reviews from the unpacked dataset directory.
///
/// The reviews are read from `{train,test}/{pos,neg}/*.txt`.
pub fn extract_reviews(imdb_dir: impl AsRef<Path>) -> Result<Vec<Review>, ReviewError> {
    let imdb_dir = imdb_dir.as_ref();
    let mut reviews = Vec::new();
    for split in Split::ALL {
        let paths = list_reviews(imdb_dir, split)?;
        let split_reviews = paths
            .into_par_iter()
            .map(|path| read_review(path, split))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Extracted {} {} reviews", split_reviews.len(), split);
        reviews.extend(split_reviews);
    }

    Ok(reviews)
}
