use std::path::PathBuf;

use anyhow::{Context, Error};
use imdb::{download_and_unpack, extract_corpus, extract_reviews, split_and_save, Paths};
use rand::{rngs::StdRng, SeedableRng};
use structopt::StructOpt;

use crate::{exit_code::NO_ERROR, utils::progress_spin_until_done};

/// Downloads and unpacks the IMDb dataset.
#[derive(StructOpt, Debug)]
pub struct DownloadCmd {
    /// The directory to store the archive and the unpacked dataset in.
    #[structopt(short, long, default_value = "/tmp/mlmPattern")]
    pub local_dir: PathBuf,

    /// The url of the dataset archive.
    #[structopt(
        long,
        default_value = "https://ai.stanford.edu/~amaas/data/sentiment/aclImdb_v1.tar.gz"
    )]
    pub source_url: String,

    /// The file name of the downloaded archive.
    #[structopt(long, default_value = "imdb.tar.gz")]
    pub archive_name: String,
}

impl DownloadCmd {
    pub fn run(self) -> Result<i32, Error> {
        let DownloadCmd {
            local_dir,
            source_url,
            archive_name,
        } = self;

        let imdb_dir = progress_spin_until_done("Downloading dataset", || {
            download_and_unpack(&source_url, &local_dir, &archive_name)
        })
        .context("Downloading the dataset failed.")?;
        println!("{}", imdb_dir.display());

        Ok(NO_ERROR)
    }
}

/// Splits the unpacked dataset into shuffled csv files and extracts the tokenizer corpus.
#[derive(StructOpt, Debug)]
pub struct PrepareCmd {
    /// The directory which contains the unpacked dataset.
    #[structopt(short, long, default_value = "/tmp/mlmPattern")]
    pub local_dir: PathBuf,

    /// Seeds the shuffling of the reviews.
    #[structopt(long)]
    pub seed: Option<u64>,
}

impl PrepareCmd {
    pub fn run(self) -> Result<i32, Error> {
        prepare(&Paths::new(&self.local_dir, imdb::ARCHIVE_NAME), self.seed)?;
        Ok(NO_ERROR)
    }
}

/// Extracts, splits and saves the reviews and extracts the corpus.
///
/// Returns the path of the corpus.
pub(crate) fn prepare(paths: &Paths, seed: Option<u64>) -> Result<PathBuf, Error> {
    let reviews = progress_spin_until_done("Extracting reviews", || {
        extract_reviews(paths.imdb_dir())
    })
    .context("Extracting the reviews failed.")?;

    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    progress_spin_until_done("Saving reviews", || {
        split_and_save(reviews, paths.local_dir(), &mut rng)
    })
    .context("Saving the train and test reviews failed.")?;

    progress_spin_until_done("Extracting corpus", || extract_corpus(paths.local_dir()))
        .context("Extracting the corpus failed.")
}
