use std::path::PathBuf;

use anyhow::{Context, Error};
use imdb::{download_and_unpack, Paths};
use log::info;
use structopt::StructOpt;

use crate::{
    dataset::prepare,
    exit_code::NO_ERROR,
    mask::{mask, MlmArgs},
    tokenizer::{train, TrainerArgs},
    utils::progress_spin_until_done,
};

/// Runs the whole flow from the dataset download to the masked train examples.
#[derive(StructOpt, Debug)]
pub struct RunAllCmd {
    /// The directory to store all files in.
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

    /// Uses the already unpacked dataset in the local directory.
    #[structopt(long)]
    pub skip_download: bool,

    #[structopt(flatten)]
    pub trainer: TrainerArgs,

    #[structopt(flatten)]
    pub mlm: MlmArgs,
}

impl RunAllCmd {
    pub fn run(self) -> Result<i32, Error> {
        let RunAllCmd {
            local_dir,
            source_url,
            archive_name,
            skip_download,
            trainer,
            mlm,
        } = self;
        let paths = Paths::new(&local_dir, archive_name.as_str());

        if skip_download {
            info!("Skipping the download of {}", source_url);
        } else {
            progress_spin_until_done("Downloading dataset", || {
                download_and_unpack(&source_url, paths.local_dir(), &archive_name)
            })
            .context("Downloading the dataset failed.")?;
        }

        let corpus = prepare(&paths, mlm.seed)?;
        let tokenizer = train(&corpus, &paths.tokenizer(), &trainer)?;

        let output = local_dir.join("train.jsonl");
        let count = mask(tokenizer, &paths.train(), &output, &mlm)?;
        println!("Wrote {} examples: {}", count, output.display());

        Ok(NO_ERROR)
    }
}
