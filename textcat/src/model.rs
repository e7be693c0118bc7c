use std::io::{Read, Write};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::errors::{Result, TextcatError};
use crate::profile::CategoryProfile;

const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Model data.
///
/// A model is created once and only read afterwards. Category order is preserved and breaks
/// ties between equally scored categories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    config: ModelConfig,
    #[serde(deserialize_with = "crate::utils::deserialize_unique_map")]
    profiles: IndexMap<String, CategoryProfile>,
}

impl Model {
    /// Creates a model from profiles.
    ///
    /// # Arguments
    ///
    /// * `config` - Extraction parameters the profiles were built with.
    /// * `profiles` - Category profiles in the order they are compared.
    ///
    /// # Errors
    ///
    /// If a profile is empty, longer than the cutoff, or not a probability distribution, an error
    /// variant will be returned.
    pub fn new(config: ModelConfig, profiles: IndexMap<String, CategoryProfile>) -> Result<Self> {
        let model = Self { config, profiles };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        for (category, profile) in &self.profiles {
            if profile.is_empty() {
                return Err(TextcatError::invalid_model(format!(
                    "profile `{category}` is empty"
                )));
            }
            if profile.len() > self.config.ngram_cutoff() {
                return Err(TextcatError::invalid_model(format!(
                    "profile `{category}` has {} n-grams, more than the cutoff {}",
                    profile.len(),
                    self.config.ngram_cutoff(),
                )));
            }
            if let Some((ngram, p)) = profile
                .iter()
                .find(|&(_, p)| !p.is_finite() || !(0. ..=1.).contains(&p))
            {
                return Err(TextcatError::invalid_model(format!(
                    "profile `{category}` has an invalid probability {p} for `{ngram}`"
                )));
            }
            let total = profile.total();
            if (total - 1.).abs() > PROBABILITY_SUM_TOLERANCE {
                return Err(TextcatError::invalid_model(format!(
                    "probabilities of profile `{category}` sum to {total}"
                )));
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Returns category names in model order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Iterates over categories and their profiles in model order.
    pub fn profiles(&self) -> impl Iterator<Item = (&str, &CategoryProfile)> {
        self.profiles.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn profile(&self, category: &str) -> Option<&CategoryProfile> {
        self.profiles.get(category)
    }

    pub fn n_categories(&self) -> usize {
        self.profiles.len()
    }

    /// Returns a model with every profile truncated to `cutoff` n-grams and renormalized.
    ///
    /// # Errors
    ///
    /// If `cutoff` is zero or larger than the current cutoff, an error variant will be returned.
    pub fn with_cutoff(&self, cutoff: usize) -> Result<Self> {
        if cutoff == 0 || cutoff > self.config.ngram_cutoff() {
            return Err(TextcatError::invalid_argument(
                "cutoff",
                format!(
                    "must be between 1 and the model's cutoff {}",
                    self.config.ngram_cutoff()
                ),
            ));
        }
        let profiles = self
            .profiles
            .iter()
            .filter_map(|(name, p)| Some((name.clone(), p.truncated(cutoff)?)))
            .collect();
        Self::new(self.config.with_cutoff(cutoff), profiles)
    }

    /// Returns the conventional file name of the model.
    ///
    /// # Examples
    ///
    /// ```
    /// use indexmap::IndexMap;
    /// use textcat::{Model, ModelConfig, NgramMethod, NgramRange, NgramToken};
    ///
    /// let config = ModelConfig::new(
    ///     NgramRange::single(3).unwrap(),
    ///     300,
    ///     NgramMethod::Normal,
    ///     NgramToken::Char,
    /// ).unwrap();
    /// let model = Model::new(config, IndexMap::new()).unwrap();
    /// assert_eq!("model_3_300_normal_char.json", model.file_name());
    /// ```
    pub fn file_name(&self) -> String {
        format!("model_{}.json", self.config.file_stem())
    }

    /// Exports the model data as JSON.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        serde_json::to_writer(&mut *wtr, self)?;
        wtr.flush()?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is. A missing `config` or
    /// `profiles`, or profiles that break the model invariants, are reported as errors before
    /// the model can be used.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let model: Self = serde_json::from_reader(rdr).map_err(|e| {
            if e.is_io() {
                TextcatError::JsonError(e)
            } else {
                TextcatError::invalid_model(e.to_string())
            }
        })?;
        model.validate()?;
        tracing::debug!(
            n_categories = model.n_categories(),
            ngrams = %model.config.ngrams(),
            cutoff = model.config.ngram_cutoff(),
            "model loaded"
        );
        Ok(model)
    }
}
