use std::fmt;

use crate::distance::{Metric, Scorer};
use crate::extractor::NgramExtractor;
use crate::frequency::NgramCounts;
use crate::model::Model;

/// Result of a classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prediction<'a> {
    /// The best matching category.
    Category(&'a str),

    /// No category shares an n-gram with the document.
    Unknown,
}

impl<'a> Prediction<'a> {
    pub const UNKNOWN_LABEL: &'static str = "Unknown";

    pub const fn category(&self) -> Option<&'a str> {
        match *self {
            Self::Category(name) => Some(name),
            Self::Unknown => None,
        }
    }

    /// Returns the category name, or `"Unknown"`.
    pub const fn as_str(&self) -> &'a str {
        match *self {
            Self::Category(name) => name,
            Self::Unknown => Self::UNKNOWN_LABEL,
        }
    }
}

impl fmt::Display for Prediction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier.
///
/// Holds a read-only model. Classification never mutates it, so one classifier can serve any
/// number of documents.
///
/// # Examples
///
/// ```
/// use textcat::{Classifier, Metric, Model, Prediction};
///
/// let json = r#"{
///     "config": {"ngrams": 1, "ngram_cutoff": 2, "ngram_method": "normal", "ngram_token": "word"},
///     "profiles": {
///         "cat": {"the": 0.5, "cat": 0.5},
///         "dog": {"the": 0.5, "dog": 0.5}
///     }
/// }"#;
/// let model = Model::read(&mut json.as_bytes()).unwrap();
/// let classifier = Classifier::new(model, Metric::Euclidean);
///
/// assert_eq!(Prediction::Category("cat"), classifier.classify("The cat sat."));
/// assert_eq!(Prediction::Unknown, classifier.classify("Quack!"));
/// ```
pub struct Classifier<S = Metric> {
    model: Model,
    extractor: NgramExtractor,
    scorer: S,
}

impl<S> Classifier<S>
where
    S: Scorer,
{
    /// Creates a new classifier.
    ///
    /// # Arguments
    ///
    /// * `model` - A model.
    /// * `scorer` - The metric used to compare documents with profiles.
    ///
    /// # Returns
    ///
    /// A new classifier.
    pub fn new(model: Model, scorer: S) -> Self {
        Self {
            extractor: NgramExtractor::from_config(model.config()),
            model,
            scorer,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Scores a document against every category.
    ///
    /// # Returns
    ///
    /// `(category, score)` pairs in model order. Categories sharing no n-gram with the document
    /// are left out.
    pub fn scores(&self, document: &str) -> Vec<(&str, f64)> {
        self.scores_counts(&self.extractor.extract(document))
    }

    /// Same as [`Classifier::scores`] for already extracted counts.
    pub fn scores_counts(&self, counts: &NgramCounts) -> Vec<(&str, f64)> {
        self.model
            .profiles()
            .filter_map(|(name, profile)| Some((name, self.scorer.score(counts, profile)?)))
            .collect()
    }

    /// Classifies a document.
    ///
    /// # Arguments
    ///
    /// * `document` - A raw document.
    ///
    /// # Returns
    ///
    /// The best scored category. Ties go to the category that comes first in the model.
    pub fn classify(&self, document: &str) -> Prediction<'_> {
        self.classify_counts(&self.extractor.extract(document))
    }

    /// Same as [`Classifier::classify`] for already extracted counts.
    pub fn classify_counts(&self, counts: &NgramCounts) -> Prediction<'_> {
        let order = self.scorer.order();
        let mut best: Option<(&str, f64)> = None;
        for (name, score) in self.scores_counts(counts) {
            match best {
                Some((_, best_score)) if !order.is_better(score, best_score) => {}
                _ => best = Some((name, score)),
            }
        }
        best.map_or(Prediction::Unknown, |(name, _)| Prediction::Category(name))
    }
}
