use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TextcatError};

/// How a document is segmented before n-grams are taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NgramMethod {
    /// The whole document is one token stream.
    #[default]
    Normal,

    /// The document is split into sentences first. No n-gram spans two sentences.
    Sentence,
}

impl NgramMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Sentence => "sentence",
        }
    }
}

impl FromStr for NgramMethod {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "sentence" => Ok(Self::Sentence),
            _ => Err("Could not parse an n-gram method: {normal, sentence}"),
        }
    }
}

impl fmt::Display for NgramMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit an n-gram is made of.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NgramToken {
    /// `n` consecutive words joined by a single space.
    Word,

    /// `n` consecutive characters inside one word.
    #[default]
    Char,

    /// `n` consecutive characters inside one word padded with a space on both sides.
    CharWb,
}

impl NgramToken {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Word => "word",
            Self::Char => "char",
            Self::CharWb => "char_wb",
        }
    }
}

impl FromStr for NgramToken {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "word" => Ok(Self::Word),
            "char" => Ok(Self::Char),
            "char_wb" => Ok(Self::CharWb),
            _ => Err("Could not parse an n-gram token: {word, char, char_wb}"),
        }
    }
}

impl fmt::Display for NgramToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of n-gram sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NgramRange {
    start: usize,
    end: usize,
}

impl NgramRange {
    fn check(start: usize, end: usize) -> Result<(), &'static str> {
        if start == 0 {
            return Err("n-gram size must be at least 1");
        }
        if start > end {
            return Err("the first n-gram size must not exceed the last one");
        }
        Ok(())
    }

    /// Creates a range of n-gram sizes.
    ///
    /// # Arguments
    ///
    /// * `start` - The smallest n-gram size.
    /// * `end` - The largest n-gram size (inclusive).
    ///
    /// # Errors
    ///
    /// If `start` is zero or greater than `end`, an error variant will be returned.
    pub fn new(start: usize, end: usize) -> Result<Self> {
        Self::check(start, end).map_err(|msg| TextcatError::invalid_argument("ngrams", msg))?;
        Ok(Self { start, end })
    }

    /// Creates a range holding the single size `n`.
    pub fn single(n: usize) -> Result<Self> {
        Self::new(n, n)
    }

    pub const fn start(&self) -> usize {
        self.start
    }

    pub const fn end(&self) -> usize {
        self.end
    }

    pub const fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn iter(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}

impl fmt::Display for NgramRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Extraction parameters recorded in a model.
///
/// The same parameters are applied to documents at classification time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawModelConfig", into = "RawModelConfig")]
pub struct ModelConfig {
    pub(crate) ngrams: NgramRange,
    pub(crate) ngram_cutoff: usize,
    pub(crate) ngram_method: NgramMethod,
    pub(crate) ngram_token: NgramToken,
}

impl ModelConfig {
    /// Creates a new configuration.
    ///
    /// # Arguments
    ///
    /// * `ngrams` - The n-gram sizes to count.
    /// * `ngram_cutoff` - The maximum number of n-grams kept per category.
    /// * `ngram_method` - The segmentation method.
    /// * `ngram_token` - The n-gram unit.
    ///
    /// # Errors
    ///
    /// If `ngram_cutoff` is zero, an error variant will be returned.
    pub fn new(
        ngrams: NgramRange,
        ngram_cutoff: usize,
        ngram_method: NgramMethod,
        ngram_token: NgramToken,
    ) -> Result<Self> {
        if ngram_cutoff == 0 {
            return Err(TextcatError::invalid_argument(
                "ngram_cutoff",
                "must be at least 1",
            ));
        }
        Ok(Self {
            ngrams,
            ngram_cutoff,
            ngram_method,
            ngram_token,
        })
    }

    pub const fn ngrams(&self) -> NgramRange {
        self.ngrams
    }

    pub const fn ngram_cutoff(&self) -> usize {
        self.ngram_cutoff
    }

    pub const fn ngram_method(&self) -> NgramMethod {
        self.ngram_method
    }

    pub const fn ngram_token(&self) -> NgramToken {
        self.ngram_token
    }

    /// Returns the parameters joined as `{ngrams}_{cutoff}_{method}_{token}`.
    ///
    /// Model and report file names are built from it.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.ngrams, self.ngram_cutoff, self.ngram_method, self.ngram_token,
        )
    }

    pub(crate) fn with_cutoff(mut self, ngram_cutoff: usize) -> Self {
        self.ngram_cutoff = ngram_cutoff;
        self
    }
}

/// On-disk shape of [`ModelConfig`].
#[derive(Serialize, Deserialize)]
struct RawModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ngrams: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ngrams_start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ngrams_end: Option<usize>,
    ngram_cutoff: usize,
    #[serde(default)]
    ngram_method: NgramMethod,
    #[serde(default)]
    ngram_token: NgramToken,
}

impl TryFrom<RawModelConfig> for ModelConfig {
    type Error = TextcatError;

    fn try_from(raw: RawModelConfig) -> Result<Self> {
        let (start, end) = match (raw.ngrams, raw.ngrams_start, raw.ngrams_end) {
            (Some(n), None, None) => (n, n),
            (None, Some(start), Some(end)) => (start, end),
            (None, None, None) => {
                return Err(TextcatError::invalid_model(
                    "`config` needs either `ngrams` or `ngrams_start` and `ngrams_end`",
                ))
            }
            (Some(_), _, _) => {
                return Err(TextcatError::invalid_model(
                    "`ngrams` cannot be mixed with `ngrams_start`/`ngrams_end`",
                ))
            }
            _ => {
                return Err(TextcatError::invalid_model(
                    "`ngrams_start` and `ngrams_end` must be given together",
                ))
            }
        };
        NgramRange::check(start, end).map_err(TextcatError::invalid_model)?;
        if raw.ngram_cutoff == 0 {
            return Err(TextcatError::invalid_model("`ngram_cutoff` must be at least 1"));
        }
        Ok(Self {
            ngrams: NgramRange { start, end },
            ngram_cutoff: raw.ngram_cutoff,
            ngram_method: raw.ngram_method,
            ngram_token: raw.ngram_token,
        })
    }
}

impl From<ModelConfig> for RawModelConfig {
    fn from(config: ModelConfig) -> Self {
        let (ngrams, ngrams_start, ngrams_end) = if config.ngrams.is_single() {
            (Some(config.ngrams.start), None, None)
        } else {
            (None, Some(config.ngrams.start), Some(config.ngrams.end))
        };
        Self {
            ngrams,
            ngrams_start,
            ngrams_end,
            ngram_cutoff: config.ngram_cutoff,
            ngram_method: config.ngram_method,
            ngram_token: config.ngram_token,
        }
    }
}
