use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Error};
use imdb::{read_records, ReviewRecord};
use log::debug;
use mlm::{MaskedRecord, MlmConfig, MlmPipeline, TextTokenizer};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use structopt::StructOpt;

use crate::{exit_code::NO_ERROR, utils::progress_bar};

/// Builds masked language model examples from a csv file of reviews.
///
/// Writes one json object per line with the masked example and the labels of the review.
#[derive(StructOpt, Debug)]
pub struct MaskCmd {
    /// The trained tokenizer.
    #[structopt(long, default_value = "/tmp/mlmPattern/tokenizer.json")]
    pub tokenizer: PathBuf,

    /// The csv file with the reviews.
    #[structopt(short, long, default_value = "/tmp/mlmPattern/train.csv")]
    pub input: PathBuf,

    /// The json lines file to write the examples to.
    #[structopt(short, long, default_value = "/tmp/mlmPattern/train.jsonl")]
    pub output: PathBuf,

    #[structopt(flatten)]
    pub args: MlmArgs,
}

/// Options of the masked language model examples.
#[derive(StructOpt, Debug)]
pub struct MlmArgs {
    /// The maximum number of tokens per sequence without the start and end tokens.
    #[structopt(long, default_value = "5")]
    pub sequence_max_len: usize,

    /// The rate of selected tokens per sequence.
    #[structopt(long, default_value = "0.2")]
    pub selection_rate: f64,

    /// The maximum number of selected tokens per sequence.
    ///
    /// Defaults to the sequence length times the selection rate, rounded down.
    #[structopt(long)]
    pub max_selections: Option<usize>,

    /// The rate of selected tokens which are replaced by the mask token.
    #[structopt(long, default_value = "0.8")]
    pub mask_token_rate: f32,

    /// The rate of selected tokens which are replaced by a random token.
    #[structopt(long, default_value = "0.1")]
    pub random_token_rate: f32,

    /// The number of reviews which are masked together.
    #[structopt(long, default_value = "32")]
    pub batch_size: usize,

    /// Seeds the selection and substitution of the tokens.
    #[structopt(long)]
    pub seed: Option<u64>,
}

impl MlmArgs {
    fn config(&self, tokenizer: &TextTokenizer) -> Result<MlmConfig, Error> {
        let mut builder = MlmConfig::builder()
            .with_vocab_size(tokenizer.vocab_size())
            .with_special_token_ids(tokenizer.special_token_ids())
            .with_sequence_max_len(self.sequence_max_len)?
            .with_selection_rate(self.selection_rate)?
            .with_substitution_rates(self.mask_token_rate, self.random_token_rate)?;
        if let Some(max_selections) = self.max_selections {
            builder = builder.with_max_selections(max_selections)?;
        }

        builder.build().map_err(Into::into)
    }
}

impl MaskCmd {
    pub fn run(self) -> Result<i32, Error> {
        let MaskCmd {
            tokenizer,
            input,
            output,
            args,
        } = self;

        let tokenizer = TextTokenizer::from_file(&tokenizer).context("Loading tokenizer failed.")?;
        let count = mask(tokenizer, &input, &output, &args)?;
        println!("Wrote {} examples: {}", count, output.display());

        Ok(NO_ERROR)
    }
}

/// A masked example together with the labels of its review.
#[derive(Serialize)]
struct LabeledExample {
    rating: u8,
    is_positive: u8,
    #[serde(flatten)]
    example: MaskedRecord,
}

/// Masks the reviews of the csv input file and writes the examples as json lines.
///
/// Returns the number of written examples.
pub(crate) fn mask(
    tokenizer: TextTokenizer,
    input: &Path,
    output: &Path,
    args: &MlmArgs,
) -> Result<usize, Error> {
    if args.batch_size == 0 {
        bail!("The batch size must be greater than zero.");
    }
    let config = args.config(&tokenizer)?;
    let pipeline = MlmPipeline::new(tokenizer, &config)?;
    let mut rng = args
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    let records = read_records(input)
        .with_context(|| format!("Reading reviews from {} failed.", input.display()))?;
    let mut writer = BufWriter::new(
        File::create(output)
            .with_context(|| format!("Creating output file {} failed.", output.display()))?,
    );

    let bar = progress_bar("Masking reviews", records.len());
    for batch in records.chunks(args.batch_size) {
        write_batch(&pipeline, batch, &mut rng, &mut writer)?;
        bar.inc(batch.len() as u64);
    }
    bar.finish();
    writer.flush()?;

    Ok(records.len())
}

fn write_batch(
    pipeline: &MlmPipeline,
    records: &[ReviewRecord],
    rng: &mut impl Rng,
    mut writer: impl Write,
) -> Result<(), Error> {
    let texts = records
        .iter()
        .map(|record| record.review.as_str())
        .collect::<Vec<_>>();
    let masked = pipeline.run(&texts, rng)?;
    debug!("Masked a batch of {} reviews", masked.len());

    for (record, example) in records.iter().zip(masked.rows()) {
        let example = LabeledExample {
            rating: record.rating,
            is_positive: record.is_positive,
            example,
        };
        serde_json::to_writer(&mut writer, &example)?;
        writer.write_all(b"\n")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use imdb::write_records;
    use mlm::train_tokenizer;
    use serde_json::Value;
    use tempfile::tempdir;

    use super::*;

    fn args(seed: u64) -> MlmArgs {
        MlmArgs {
            sequence_max_len: 5,
            selection_rate: 0.2,
            max_selections: None,
            mask_token_rate: 0.8,
            random_token_rate: 0.1,
            batch_size: 2,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_mask() {
        let dir = tempdir().unwrap();
        let corpus = dir.path().join("corpus.txt");
        fs::write(
            &corpus,
            "a great movie with great actors\nthe worst movie of all time\na boring film",
        )
        .unwrap();
        let tokenizer_path = dir.path().join("tokenizer.json");
        let tokenizer = train_tokenizer(
            &mlm::TrainerConfig::new(&corpus, &tokenizer_path)
                .with_vocab_size(60)
                .unwrap(),
        )
        .unwrap();

        let input = dir.path().join("train.csv");
        let records = ["A great movie!", "The worst movie.", "Boring film..."]
            .iter()
            .zip([9, 1, 3].iter())
            .map(|(review, &rating)| ReviewRecord {
                review: review.to_string(),
                rating,
                is_positive: (rating >= 5) as u8,
            })
            .collect::<Vec<_>>();
        write_records(records, &input).unwrap();

        let output = dir.path().join("train.jsonl");
        assert_eq!(mask(tokenizer, &input, &output, &args(7)).unwrap(), 3);

        let lines = fs::read_to_string(&output).unwrap();
        let examples = lines
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap())
            .collect::<Vec<_>>();
        assert_eq!(examples.len(), 3);
        assert_eq!(examples[0]["rating"], 9);
        assert_eq!(examples[1]["is_positive"], 0);
        for example in examples {
            assert_eq!(example["input_ids"].as_array().unwrap().len(), 7);
            assert_eq!(example["token_types"].as_array().unwrap().len(), 7);
            assert_eq!(example["masked_positions"].as_array().unwrap().len(), 1);
            assert_eq!(example["masked_values"].as_array().unwrap().len(), 1);
        }

        let again = dir.path().join("again.jsonl");
        let tokenizer = TextTokenizer::from_file(&tokenizer_path).unwrap();
        mask(tokenizer, &input, &again, &args(7)).unwrap();
        assert_eq!(lines, fs::read_to_string(again).unwrap());
    }

    #[test]
    fn test_config_derives_max_selections() {
        let dir = tempdir().unwrap();
        let corpus = dir.path().join("corpus.txt");
        fs::write(&corpus, "a movie").unwrap();
        let tokenizer = train_tokenizer(
            &mlm::TrainerConfig::new(&corpus, dir.path().join("tokenizer.json"))
                .with_vocab_size(20)
                .unwrap(),
        )
        .unwrap();
        let args = MlmArgs {
            sequence_max_len: 100,
            selection_rate: 0.59,
            ..args(0)
        };
        assert_eq!(args.config(&tokenizer).unwrap().max_selections(), 59);
    }

    #[test]
    fn test_mask_zero_batch_size() {
        let dir = tempdir().unwrap();
        let corpus = dir.path().join("corpus.txt");
        fs::write(&corpus, "a movie").unwrap();
        let tokenizer = train_tokenizer(
            &mlm::TrainerConfig::new(&corpus, dir.path().join("tokenizer.json"))
                .with_vocab_size(20)
                .unwrap(),
        )
        .unwrap();
        let args = MlmArgs {
            batch_size: 0,
            ..args(0)
        };
        assert!(mask(
            tokenizer,
            &dir.path().join("train.csv"),
            &dir.path().join("train.jsonl"),
            &args,
        )
        .is_err());
    }
}
