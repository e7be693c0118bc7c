#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Textcat
//!
//! Textcat categorizes documents, typically by language, by comparing their character or word
//! n-gram profile with per-category profiles learned from labelled text.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{prelude::*, stdin, BufReader};
//!
//! use textcat::{Classifier, Metric, Model};
//!
//! let mut f = BufReader::new(File::open("model_3_300_normal_char.json").unwrap());
//! let model = Model::read(&mut f).unwrap();
//! let classifier = Classifier::new(model, Metric::Euclidean);
//!
//! for line in stdin().lock().lines() {
//!     let line = line.unwrap();
//!     println!("{}", classifier.classify(&line));
//! }
//! ```
//!
//! Training requires **crate feature** `train`. For more details, see [`Trainer`].

mod classifier;
mod config;
mod dataset;
mod distance;
mod extractor;
mod frequency;
mod model;
mod profile;
mod report;
mod utils;

#[cfg(feature = "train")]
mod trainer;

pub mod errors;

pub use classifier::{Classifier, Prediction};
pub use config::{ModelConfig, NgramMethod, NgramRange, NgramToken};
pub use dataset::Dataset;
pub use distance::{Cosine, Euclidean, Metric, OutOfPlace, ScoreOrder, Scorer};
pub use errors::{Result, TextcatError};
pub use extractor::{clean_text, split_sentences, NgramExtractor};
pub use frequency::NgramCounts;
pub use model::Model;
pub use profile::CategoryProfile;
pub use report::{ClassificationReport, Scores};

#[cfg(feature = "train")]
pub use trainer::Trainer;
