use std::fs::File;
use std::io::{prelude::*, stderr, stdin, stdout, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use textcat::{Classifier, Metric, Model};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(about = "A program to categorize documents read from stdin.")]
struct Args {
    /// The model file to use when categorizing text
    #[arg(long)]
    model: PathBuf,

    /// The metric used to compare documents with category profiles: {euclidean, cosine, rank}
    #[arg(long, default_value = "euclidean")]
    metric: Metric,

    /// Read the whole input as one document and print a single label.
    /// By default, every line is a separate document.
    #[arg(long)]
    whole: bool,

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

/// Classifies the documents of `rdr` and writes one result line per document.
///
/// Returns the number of documents and the number of `Unknown` results.
fn categorize<R, W>(
    classifier: &Classifier,
    mut rdr: R,
    wtr: &mut W,
    whole: bool,
    flush_lines: bool,
) -> std::io::Result<(usize, usize)>
where
    R: BufRead,
    W: Write,
{
    if whole {
        let mut document = String::new();
        rdr.read_to_string(&mut document)?;
        let prediction = classifier.classify(&document);
        writeln!(wtr, "{prediction}")?;
        return Ok((1, usize::from(prediction.category().is_none())));
    }

    let mut n_documents = 0;
    let mut n_unknown = 0;
    for line in rdr.lines() {
        let line = line?;
        let prediction = classifier.classify(&line);
        if prediction.category().is_none() {
            n_unknown += 1;
        }
        writeln!(wtr, "{prediction}\t{line}")?;
        if flush_lines {
            wtr.flush()?;
        }
        n_documents += 1;
    }
    Ok((n_documents, n_unknown))
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

    let interactive = atty::is(atty::Stream::Stdin);
    if interactive {
        if args.whole {
            eprintln!("Reading one document from stdin. Press Ctrl-D to finish.");
        } else {
            eprintln!("Reading documents from stdin. Press Ctrl-D to finish.");
        }
    }

    eprintln!("Start categorization");
    let mut out = BufWriter::new(stdout().lock());
    let start = Instant::now();
    let (n_documents, n_unknown) = categorize(
        &classifier,
        stdin().lock(),
        &mut out,
        args.whole,
        interactive,
    )?;
    out.flush()?;
    let duration = start.elapsed();
    eprintln!("# of documents: {n_documents} ({n_unknown} unknown)");
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [documents/sec]",
        n_documents as f64 / duration.as_secs_f64()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAT_DOG: &str = r#"{"config":{"ngrams":1,"ngram_cutoff":2,"ngram_method":"sentence","ngram_token":"word"},"profiles":{"cat":{"the":0.5,"cat":0.5},"dog":{"the":0.5,"dog":0.5}}}"#;

    fn classifier() -> Classifier {
        Classifier::new(Model::read(&mut CAT_DOG.as_bytes()).unwrap(), Metric::Euclidean)
    }

    #[test]
    fn test_categorize_lines() {
        let mut out = vec![];
        let counts = categorize(
            &classifier(),
            "the cat sat.\nthe dog ran.\nquack\n".as_bytes(),
            &mut out,
            false,
            false,
        )
        .unwrap();

        assert_eq!((3, 1), counts);
        assert_eq!(
            "cat\tthe cat sat.\ndog\tthe dog ran.\nUnknown\tquack\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn test_categorize_whole() {
        let mut out = vec![];
        let counts = categorize(
            &classifier(),
            "the dog sat.\nthe dog ran.\n".as_bytes(),
            &mut out,
            true,
            false,
        )
        .unwrap();

        assert_eq!((1, 0), counts);
        assert_eq!("dog\n", String::from_utf8(out).unwrap());
    }

    #[test]
    fn test_categorize_whole_unknown() {
        let mut out = vec![];
        let counts = categorize(&classifier(), "".as_bytes(), &mut out, true, false).unwrap();

        assert_eq!((1, 1), counts);
        assert_eq!("Unknown\n", String::from_utf8(out).unwrap());
    }
}
