use std::fs::File;
use std::io::{stderr, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Serialize;
use textcat::Model;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(about = "A program to manipulate trained models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output path of the model file. Compressed with zstd when it ends with `.zst`
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Output category profiles contained in the model in CSV format.
    #[arg(long)]
    dump_profiles: Option<PathBuf>,

    /// Truncate every profile to this number of n-grams.
    #[arg(long)]
    cutoff: Option<usize>,

    /// The log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct ProfileRecord<'a> {
    category: &'a str,
    rank: usize,
    ngram: &'a str,
    probability: f64,
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

    eprintln!("Loading model file...");
    let f = File::open(&args.model_in)?;
    let mut model = if is_zstd(&args.model_in) {
        Model::read(&mut zstd::Decoder::new(f)?)?
    } else {
        Model::read(&mut BufReader::new(f))?
    };

    if let Some(cutoff) = args.cutoff {
        eprintln!("Truncating profiles...");
        model = model.with_cutoff(cutoff)?;
    }

    if let Some(path) = args.dump_profiles {
        eprintln!("Saving profile file...");
        let mut wtr = csv::Writer::from_writer(File::create(path)?);
        for (category, profile) in model.profiles() {
            for (rank, (ngram, probability)) in profile.iter().enumerate() {
                wtr.serialize(ProfileRecord {
                    category,
                    rank,
                    ngram,
                    probability,
                })?;
            }
        }
        wtr.flush()?;
    }

    if let Some(path) = args.model_out {
        eprintln!("Saving model file...");
        if is_zstd(&path) {
            let mut f = zstd::Encoder::new(File::create(path)?, 19)?;
            model.write(&mut f)?;
            f.finish()?;
        } else {
            let mut f = BufWriter::new(File::create(path)?);
            model.write(&mut f)?;
        }
    }

    Ok(())
}
