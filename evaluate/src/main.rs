use std::fs::{self, File};
use std::io::{prelude::*, stderr, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{ArgGroup, Parser};
use textcat::{ClassificationReport, Classifier, Dataset, Metric, Model, ModelConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    about = "A program to evaluate the accuracy of Textcat.",
    group = ArgGroup::new("dataset").required(true),
)]
struct Args {
    /// The model file to use when categorizing text
    #[arg(long)]
    model: PathBuf,

    /// A test corpus containing one document per line
    #[arg(long, group = "dataset", requires = "test_labels")]
    test_data: Option<PathBuf>,

    /// Labels of the test corpus, one per line
    #[arg(long, requires = "test_data")]
    test_labels: Option<PathBuf>,

    /// A test corpus in CSV format with `text` and `label` columns
    #[arg(long, group = "dataset")]
    test_csv: Option<PathBuf>,

    /// The metric used to compare documents with category profiles: {euclidean, cosine, rank}
    #[arg(long, default_value = "euclidean")]
    metric: Metric,

    /// Write the classification report to this file in JSON format instead of the
    /// `reports` directory under --models-directory
    #[arg(long)]
    report: Option<PathBuf>,

    /// The directory whose `reports` subdirectory receives the JSON report by default
    #[arg(long, default_value = "./models")]
    models_directory: PathBuf,

    /// The log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn read_model(path: &Path) -> Result<Model, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let model = if path.extension().map_or(false, |ext| ext == "zst") {
        Model::read(&mut zstd::Decoder::new(f)?)?
    } else {
        Model::read(&mut BufReader::new(f))?
    };
    Ok(model)
}

/// Returns `{models_directory}/reports/classification_report_{ngrams}_{cutoff}_{method}_{token}.json`.
fn default_report_path(models_directory: &Path, config: &ModelConfig) -> PathBuf {
    models_directory
        .join("reports")
        .join(format!("classification_report_{}.json", config.file_stem()))
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

    eprintln!("Loading model file...");
    let model = read_model(&args.model)?;
    let classifier = Classifier::new(model, args.metric);

    eprintln!("Loading dataset...");
    let dataset = if let Some(path) = args.test_csv {
        Dataset::from_csv(BufReader::new(File::open(path)?))?
    } else if let (Some(data), Some(labels)) = (args.test_data, args.test_labels) {
        Dataset::from_lines(
            BufReader::new(File::open(data)?),
            BufReader::new(File::open(labels)?),
        )?
    } else {
        unreachable!("clap requires a dataset");
    };

    eprintln!("Start categorization");
    let start = Instant::now();
    let mut predictions = Vec::with_capacity(dataset.len());
    for (i, document) in dataset.documents().iter().enumerate() {
        if i % 10000 == 0 {
            eprint!("# of documents: {i}\r");
            stderr().flush()?;
        }
        predictions.push(classifier.classify(document).as_str());
    }
    let duration = start.elapsed();
    eprintln!("# of documents: {}", dataset.len());
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());

    let report = ClassificationReport::new(dataset.labels(), &predictions)?;
    tracing::info!(
        metric = %args.metric,
        accuracy = report.accuracy(),
        "evaluation finished"
    );
    print!("{report}");

    let path = match args.report {
        Some(path) => path,
        None => default_report_path(&args.models_directory, classifier.model().config()),
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    eprintln!("Saving report file to {path:?} ...");
    let mut f = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut f, &report)?;
    f.flush()?;

    Ok(())
}
