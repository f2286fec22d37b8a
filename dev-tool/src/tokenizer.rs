use std::path::{Path, PathBuf};

use anyhow::{Context, Error};
use mlm::{train_tokenizer, TextTokenizer, TrainerConfig};
use structopt::StructOpt;

use crate::{exit_code::NO_ERROR, utils::progress_spin_until_done};

/// Trains a byte-pair-encoding tokenizer on a corpus.
#[derive(StructOpt, Debug)]
pub struct TrainTokenizerCmd {
    /// The corpus with one normalized text per line.
    #[structopt(long, default_value = "/tmp/mlmPattern/corpus.txt")]
    pub corpus: PathBuf,

    /// The file to save the tokenizer to, must end with `.json`.
    #[structopt(short, long, default_value = "/tmp/mlmPattern/tokenizer.json")]
    pub output: PathBuf,

    #[structopt(flatten)]
    pub args: TrainerArgs,
}

/// Options of the tokenizer training.
#[derive(StructOpt, Debug)]
pub struct TrainerArgs {
    /// The size of the vocabulary including the special tokens.
    #[structopt(long, default_value = "25000")]
    pub vocab_size: usize,

    /// The minimum frequency of merged pairs.
    #[structopt(long, default_value = "0")]
    pub min_frequency: u64,

    /// Doesn't split digits from other characters.
    #[structopt(long)]
    pub no_split_by_number: bool,
}

impl TrainTokenizerCmd {
    pub fn run(self) -> Result<i32, Error> {
        let TrainTokenizerCmd {
            corpus,
            output,
            args,
        } = self;

        let tokenizer = train(&corpus, &output, &args)?;
        println!(
            "Trained tokenizer with {} tokens: {}",
            tokenizer.vocab_size(),
            output.display(),
        );

        Ok(NO_ERROR)
    }
}

pub(crate) fn train(
    corpus: &Path,
    output: &Path,
    args: &TrainerArgs,
) -> Result<TextTokenizer, Error> {
    let config = TrainerConfig::new(corpus, output)
        .with_vocab_size(args.vocab_size)?
        .with_min_frequency(args.min_frequency)
        .with_split_by_number(!args.no_split_by_number);

    progress_spin_until_done("Training tokenizer", || train_tokenizer(&config))
        .context("Training the tokenizer failed.")
}
