use std::process::exit;

use anyhow::Error;
use structopt::StructOpt;

use crate::exit_code::FATAL_ERROR;

mod dataset;
mod exit_code;
mod mask;
mod run_all;
mod tokenizer;
mod utils;

/// Tooling to prepare masked language model examples from the IMDb dataset.
#[derive(StructOpt, Debug)]
enum CommandArgs {
    Download(dataset::DownloadCmd),
    Prepare(dataset::PrepareCmd),
    TrainTokenizer(tokenizer::TrainTokenizerCmd),
    Mask(mask::MaskCmd),
    RunAll(run_all::RunAllCmd),
}

impl CommandArgs {
    fn run(self) -> Result<i32, Error> {
        use CommandArgs::*;
        match self {
            Download(cmd) => cmd.run(),
            Prepare(cmd) => cmd.run(),
            TrainTokenizer(cmd) => cmd.run(),
            Mask(cmd) => cmd.run(),
            RunAll(cmd) => cmd.run(),
        }
    }
}

fn main() {
    env_logger::init();

    let exit_code = match CommandArgs::from_args().run() {
        Ok(exit_code) => exit_code,
        Err(error) => {
            eprintln!("{:?}", error);
            FATAL_ERROR
        }
    };

    exit(exit_code);
}
