use std::{
    fs::File,
    io::{BufWriter, Error as IoError, Write},
    path::{Path, PathBuf},
};

use displaydoc::Display;
use log::info;
use mlm::Normalizer;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    paths::{CORPUS_FILE_NAME, TEST_FILE_NAME, TRAIN_FILE_NAME},
    reviews::{Review, Split},
};

/// The potential errors of the dataset files.
#[derive(Debug, Display, Error)]
pub enum DatasetError {
    /// Failed to read or write a csv file: {0}
    Csv(#[from] csv::Error),
    /// Failed to write the corpus: {0}
    Io(#[from] IoError),
}

/// A row of the train and test csv files.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub review: String,
    pub rating: u8,
    /// `1` if the review is positive, `0` otherwise.
    pub is_positive: u8,
}

impl From<Review> for ReviewRecord {
    fn from(review: Review) -> Self {
        Self {
            review: review.review,
            rating: review.rating,
            is_positive: review.is_positive as u8,
        }
    }
}

/// Shuffles the reviews of each split and saves them as `train.csv` and `test.csv` in the
/// directory.
///
/// The csv files have the header `review,rating,is_positive`. Returns the paths of the train and
/// test files.
pub fn split_and_save<R>(
    reviews: Vec<Review>,
    dir: impl AsRef<Path>,
    rng: &mut R,
) -> Result<(PathBuf, PathBuf), DatasetError>
where
    R: Rng + ?Sized,
{
    let dir = dir.as_ref();
    let (train, test) = reviews
        .into_iter()
        .partition::<Vec<_>, _>(|review| review.split == Split::Train);

    let train_path = dir.join(TRAIN_FILE_NAME);
    save_shuffled(train, &train_path, rng)?;
    let test_path = dir.join(TEST_FILE_NAME);
    save_shuffled(test, &test_path, rng)?;

    Ok((train_path, test_path))
}

fn save_shuffled<R>(mut reviews: Vec<Review>, path: &Path, rng: &mut R) -> Result<(), DatasetError>
where
    R: Rng + ?Sized,
{
    reviews.shuffle(rng);
    let count = reviews.len();
    write_records(reviews.into_iter().map(ReviewRecord::from), path)?;
    info!("Saved {} reviews to {}", count, path.display());

    Ok(())
}

/// Writes the records as csv file with a header.
pub fn write_records(
    records: impl IntoIterator<Item = ReviewRecord>,
    path: impl AsRef<Path>,
) -> Result<(), DatasetError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Reads the records of a csv file with a header.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<ReviewRecord>, DatasetError> {
    csv::Reader::from_path(path)?
        .deserialize()
        .collect::<Result<_, _>>()
        .map_err(Into::into)
}

/// Extracts the corpus from the train reviews in the directory and saves it as `corpus.txt`.
///
/// The corpus consists of the normalized reviews separated by newlines. Returns the path of the
/// corpus file.
pub fn extract_corpus(dir: impl AsRef<Path>) -> Result<PathBuf, DatasetError> {
    let dir = dir.as_ref();
    let records = read_records(dir.join(TRAIN_FILE_NAME))?;
    let normalizer = Normalizer::default();

    let path = dir.join(CORPUS_FILE_NAME);
    let mut corpus = BufWriter::new(File::create(&path)?);
    for (idx, record) in records.iter().enumerate() {
        if idx > 0 {
            corpus.write_all(b"\n")?;
        }
        corpus.write_all(normalizer.normalize(&record.review).as_bytes())?;
    }
    corpus.flush()?;
    info!(
        "Extracted corpus of {} reviews to {}",
        records.len(),
        path.display(),
    );

    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::tempdir;

    use super::*;
    use crate::reviews::{extract_reviews, tests::imdb_dir};

    fn reviews() -> Vec<Review> {
        extract_reviews(imdb_dir().path()).unwrap()
    }

    #[test]
    fn test_split_and_save() {
        let dir = tempdir().unwrap();
        let (train, test) =
            split_and_save(reviews(), dir.path(), &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(train, dir.path().join("train.csv"));
        assert_eq!(test, dir.path().join("test.csv"));

        let header = fs::read_to_string(&train).unwrap();
        assert!(header.starts_with("review,rating,is_positive\n"));

        let mut train = read_records(train).unwrap();
        train.sort_by_key(|record| record.rating);
        assert_eq!(
            train,
            [
                ReviewRecord {
                    review: "BORING.".into(),
                    rating: 1,
                    is_positive: 0,
                },
                ReviewRecord {
                    review: "Not my film".into(),
                    rating: 4,
                    is_positive: 0,
                },
                ReviewRecord {
                    review: "Quite <br />good.".into(),
                    rating: 7,
                    is_positive: 1,
                },
                ReviewRecord {
                    review: "A great movie!".into(),
                    rating: 9,
                    is_positive: 1,
                },
            ],
        );

        let test = read_records(test).unwrap();
        assert_eq!(test.len(), 2);
        assert!(test.iter().any(|record| record.rating == 10));
        assert!(test.iter().any(|record| record.rating == 2));
    }

    #[test]
    fn test_split_and_save_is_deterministic() {
        let (first, second) = (tempdir().unwrap(), tempdir().unwrap());
        split_and_save(reviews(), first.path(), &mut StdRng::seed_from_u64(3)).unwrap();
        split_and_save(reviews(), second.path(), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(
            fs::read_to_string(first.path().join("train.csv")).unwrap(),
            fs::read_to_string(second.path().join("train.csv")).unwrap(),
        );
    }

    #[test]
    fn test_records_with_separators() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("train.csv");
        let records = vec![ReviewRecord {
            review: "One, \"two\"\nand three".into(),
            rating: 8,
            is_positive: 1,
        }];
        write_records(records.clone(), &path).unwrap();
        assert_eq!(read_records(&path).unwrap(), records);
    }

    #[test]
    fn test_extract_corpus() {
        let dir = tempdir().unwrap();
        let records = vec![
            ReviewRecord {
                review: "A great movie!".into(),
                rating: 9,
                is_positive: 1,
            },
            ReviewRecord {
                review: "Quite <br />GOOD, 8/10".into(),
                rating: 8,
                is_positive: 1,
            },
        ];
        write_records(records, dir.path().join("train.csv")).unwrap();

        let corpus = extract_corpus(dir.path()).unwrap();
        assert_eq!(corpus, dir.path().join("corpus.txt"));
        assert_eq!(
            fs::read_to_string(corpus).unwrap(),
            "a great movie \nquite  br   good  8 10",
        );
    }

    #[test]
    fn test_extract_corpus_missing_train() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            extract_corpus(dir.path()),
            Err(DatasetError::Csv(_)),
        ));
    }
}
