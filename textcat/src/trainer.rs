use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::config::ModelConfig;
use crate::dataset::Dataset;
use crate::errors::Result;
use crate::extractor::NgramExtractor;
use crate::frequency::NgramCounts;
use crate::model::Model;
use crate::profile::CategoryProfile;

/// Trainer.
///
/// Accumulates n-gram counts per category and turns them into a [`Model`].
///
/// # Examples
///
/// ```
/// use textcat::{Metric, Classifier, ModelConfig, NgramMethod, NgramRange, NgramToken, Trainer};
///
/// let config = ModelConfig::new(
///     NgramRange::single(1).unwrap(),
///     300,
///     NgramMethod::Normal,
///     NgramToken::Word,
/// ).unwrap();
/// let mut trainer = Trainer::new(config);
/// trainer.add_example("the cat purrs", "cat");
/// trainer.add_example("the dog barks", "dog");
/// let model = trainer.train().unwrap();
///
/// let classifier = Classifier::new(model, Metric::Euclidean);
/// assert_eq!("dog", classifier.classify("a dog barks").to_string());
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub struct Trainer {
    config: ModelConfig,
    extractor: NgramExtractor,
    counts: BTreeMap<String, NgramCounts>,
    n_documents: usize,
}

impl Trainer {
    /// Creates a new trainer.
    ///
    /// # Arguments
    ///
    /// * `config` - Extraction parameters and cutoff of the model to build.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            extractor: NgramExtractor::from_config(&config),
            config,
            counts: BTreeMap::new(),
            n_documents: 0,
        }
    }

    /// Adds one labelled document.
    pub fn add_example(&mut self, document: &str, label: &str) {
        let counts = self.counts.entry(label.to_string()).or_default();
        self.extractor.extract_into(document, counts);
        self.n_documents += 1;
    }

    /// Adds every document of a dataset, label by label.
    ///
    /// Documents of one label are added in dataset order.
    pub fn add_dataset(&mut self, dataset: &Dataset) {
        let documents = dataset.documents();
        for (label, indices) in dataset.indices_by_label() {
            for i in indices {
                self.add_example(&documents[i], label);
            }
        }
    }

    /// Returns the number of documents added so far.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Returns the number of distinct labels seen so far.
    pub fn n_categories(&self) -> usize {
        self.counts.len()
    }

    /// Builds the model.
    ///
    /// Categories appear in sorted label order. A category without any n-gram is left out.
    ///
    /// # Errors
    ///
    /// If a built profile breaks the model invariants, an error variant will be returned.
    pub fn train(self) -> Result<Model> {
        let span = tracing::info_span!("train", n_documents = self.n_documents);
        let _enter = span.enter();

        let mut profiles = IndexMap::with_capacity(self.counts.len());
        for (label, counts) in self.counts {
            match CategoryProfile::from_counts(&counts, self.config.ngram_cutoff()) {
                Some(profile) => {
                    tracing::debug!(
                        category = %label,
                        n_distinct = counts.len(),
                        n_kept = profile.len(),
                        "profile built"
                    );
                    profiles.insert(label, profile);
                }
                None => {
                    tracing::debug!(category = %label, "no n-gram, category skipped");
                }
            }
        }
        tracing::info!(n_categories = profiles.len(), "training finished");
        Model::new(self.config, profiles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::{NgramMethod, NgramRange, NgramToken};

    fn config(n: usize, cutoff: usize, token: NgramToken) -> ModelConfig {
        ModelConfig::new(
            NgramRange::single(n).unwrap(),
            cutoff,
            NgramMethod::Normal,
            token,
        )
        .unwrap()
    }

    #[test]
    fn test_train_sorted_categories() {
        let mut trainer = Trainer::new(config(2, 300, NgramToken::Char));
        trainer.add_example("zwei drei", "de");
        trainer.add_example("deux trois", "fr");
        trainer.add_example("two three", "en");
        let model = trainer.train().unwrap();

        assert_eq!(vec!["de", "en", "fr"], model.categories().collect::<Vec<_>>());
    }

    #[test]
    fn test_train_profiles_normalized_and_truncated() {
        let mut trainer = Trainer::new(config(2, 5, NgramToken::Char));
        trainer.add_example("the quick brown fox jumps over the lazy dog", "en");
        trainer.add_example("der schnelle braune fuchs springt", "de");
        trainer.add_example("über den faulen hund", "de");
        assert_eq!(3, trainer.n_documents());
        assert_eq!(2, trainer.n_categories());
        let model = trainer.train().unwrap();

        for (_, profile) in model.profiles() {
            assert!(profile.len() <= 5);
            assert!((profile.total() - 1.).abs() < 1e-9);
        }
    }

    #[test]
    fn test_train_merges_documents() {
        let mut trainer = Trainer::new(config(1, 2, NgramToken::Word));
        trainer.add_example("a a a a a a a a a a", "x");
        trainer.add_example("b b b b b c", "x");
        let model = trainer.train().unwrap();
        let profile = model.profile("x").unwrap();

        assert_eq!(vec!["a", "b"], profile.ngrams().collect::<Vec<_>>());
        assert_eq!(Some(10. / 15.), profile.get("a"));
        assert_eq!(Some(5. / 15.), profile.get("b"));
    }

    #[test]
    fn test_train_skips_empty_category() {
        let mut trainer = Trainer::new(config(3, 300, NgramToken::Char));
        trainer.add_example("abcd", "long");
        trainer.add_example("ab 12 !!", "short");
        let model = trainer.train().unwrap();

        assert_eq!(vec!["long"], model.categories().collect::<Vec<_>>());
        assert!(model.profile("short").is_none());
    }

    #[test]
    fn test_add_dataset() {
        let dataset = Dataset::new(
            vec!["hello world".into(), "bonjour monde".into()],
            vec!["en".into(), "fr".into()],
        )
        .unwrap();
        let mut trainer = Trainer::new(config(2, 300, NgramToken::CharWb));
        trainer.add_dataset(&dataset);

        assert_eq!(2, trainer.n_documents());
        let model = trainer.train().unwrap();
        assert_eq!(Some(0), model.profile("en").unwrap().rank(" h"));
    }

    #[test]
    fn test_add_dataset_matches_examples() {
        let documents = ["cab bac", "dog god", "abc cba", "odd do"];
        let labels = ["x", "y", "x", "y"];
        let dataset = Dataset::new(
            documents.iter().map(|d| d.to_string()).collect(),
            labels.iter().map(|l| l.to_string()).collect(),
        )
        .unwrap();

        let mut grouped = Trainer::new(config(2, 3, NgramToken::Char));
        grouped.add_dataset(&dataset);
        let mut sequential = Trainer::new(config(2, 3, NgramToken::Char));
        for (document, label) in documents.iter().zip(labels) {
            sequential.add_example(document, label);
        }

        assert_eq!(4, grouped.n_documents());
        assert_eq!(sequential.train().unwrap(), grouped.train().unwrap());
    }

    #[test]
    fn test_train_idempotent() {
        let build = || {
            let mut trainer = Trainer::new(config(2, 10, NgramToken::Char));
            trainer.add_example("abab baba abba", "x");
            trainer.add_example("cdcd abcd", "x");
            let mut buf = vec![];
            trainer.train().unwrap().write(&mut buf).unwrap();
            buf
        };

        assert_eq!(build(), build());
    }
}
