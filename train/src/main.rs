use std::fs::{self, File};
use std::io::{prelude::*, stderr, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use textcat::{Dataset, ModelConfig, NgramMethod, NgramRange, NgramToken, Trainer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    about = "A program to train models of Textcat.",
    group = ArgGroup::new("dataset").required(true),
)]
struct Args {
    /// A training corpus containing one document per line
    #[arg(long, group = "dataset", requires = "train_labels")]
    train_data: Option<PathBuf>,

    /// Labels of the training corpus, one per line
    #[arg(long, requires = "train_data")]
    train_labels: Option<PathBuf>,

    /// A training corpus in CSV format with `text` and `label` columns
    #[arg(long, group = "dataset")]
    train_csv: Option<PathBuf>,

    /// The n-gram length
    #[arg(long, default_value = "2")]
    ngrams: usize,

    /// The minimum n-gram length. Overrides --ngrams together with --ngrams-end
    #[arg(long, requires = "ngrams_end")]
    ngrams_start: Option<usize>,

    /// The maximum n-gram length. Overrides --ngrams together with --ngrams-start
    #[arg(long, requires = "ngrams_start")]
    ngrams_end: Option<usize>,

    /// The number of most frequent n-grams kept in each category profile
    #[arg(long, default_value = "300")]
    ngram_cutoff: usize,

    /// The segmentation method: {normal, sentence}
    #[arg(long, default_value = "normal")]
    ngram_method: NgramMethod,

    /// The n-gram unit: {word, char, char_wb}
    #[arg(long, default_value = "char")]
    ngram_token: NgramToken,

    /// The file to write the trained model to
    #[arg(long)]
    model: Option<PathBuf>,

    /// The directory to write the trained model to when --model is not given
    #[arg(long, default_value = "./models")]
    models_directory: PathBuf,

    /// Compress the model with zstd. Implied when the model file name ends with `.zst`
    #[arg(long)]
    compress: bool,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,

    /// The log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn is_zstd(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "zst")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&args.log_level)?,
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(stderr))
        .with(filter)
        .init();

    let ngrams = match (args.ngrams_start, args.ngrams_end) {
        (Some(start), Some(end)) => NgramRange::new(start, end)?,
        _ => NgramRange::single(args.ngrams)?,
    };
    let config = ModelConfig::new(
        ngrams,
        args.ngram_cutoff,
        args.ngram_method,
        args.ngram_token,
    )?;

    eprintln!("Loading dataset...");
    let dataset = if let Some(path) = args.train_csv {
        eprintln!("Loading {path:?} ...");
        Dataset::from_csv(BufReader::new(File::open(path)?))?
    } else if let (Some(data), Some(labels)) = (args.train_data, args.train_labels) {
        eprintln!("Loading {data:?} and {labels:?} ...");
        Dataset::from_lines(
            BufReader::new(File::open(data)?),
            BufReader::new(File::open(labels)?),
        )?
    } else {
        unreachable!("clap requires a dataset");
    };
    eprintln!("# of documents: {}", dataset.len());

    eprintln!("Extracting n-grams...");
    let mut trainer = Trainer::new(config);
    for (i, (document, label)) in dataset.iter().enumerate() {
        if i % 10000 == 0 {
            eprint!("# of documents: {i}\r");
            stderr().flush()?;
        }
        trainer.add_example(document, label);
    }
    eprintln!("# of categories: {}", trainer.n_categories());

    eprintln!("Start training...");
    let model = trainer.train()?;
    eprintln!("Finish training.");

    let path = match args.model {
        Some(path) => path,
        None => {
            fs::create_dir_all(&args.models_directory)?;
            let mut name = model.file_name();
            if args.compress {
                name.push_str(".zst");
            }
            args.models_directory.join(name)
        }
    };

    eprintln!("Saving model file...");
    if args.compress || is_zstd(&path) {
        let mut f = zstd::Encoder::new(File::create(&path)?, 19)?;
        f.multithread(args.zstd_workers)?;
        model.write(&mut f)?;
        f.finish()?;
    } else {
        let mut f = BufWriter::new(File::create(&path)?);
        model.write(&mut f)?;
    }
    tracing::info!(path = %path.display(), n_categories = model.n_categories(), "model saved");

    Ok(())
}
