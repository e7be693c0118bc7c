//! Scores between a document and a category profile.

use std::fmt;
use std::str::FromStr;

use crate::frequency::NgramCounts;
use crate::profile::CategoryProfile;

/// Which end of the score range wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreOrder {
    /// Distances: the smallest score is the best match.
    LowerIsBetter,

    /// Similarities: the largest score is the best match.
    HigherIsBetter,
}

impl ScoreOrder {
    /// Returns `true` if `candidate` is strictly better than `best`.
    pub fn is_better(self, candidate: f64, best: f64) -> bool {
        match self {
            Self::LowerIsBetter => candidate < best,
            Self::HigherIsBetter => candidate > best,
        }
    }
}

/// Computes a scalar score between a document's n-gram counts and a category profile.
pub trait Scorer {
    /// Tells how scores are ranked.
    fn order(&self) -> ScoreOrder;

    /// Scores a document against a profile.
    ///
    /// # Arguments
    ///
    /// * `doc` - N-gram counts of the document.
    /// * `profile` - A category profile.
    ///
    /// # Returns
    ///
    /// The score, or `None` if the document shares no n-gram with the profile.
    fn score(&self, doc: &NgramCounts, profile: &CategoryProfile) -> Option<f64>;
}

/// Aligns the document with the profile's vocabulary.
///
/// Returns `(doc, cat)` pairs in the profile's rank order, where `doc` is the document's count
/// normalized over the profile's vocabulary. N-grams missing from the profile are ignored.
/// Returns `None` when the document has none of the profile's n-grams.
fn aligned_vectors(doc: &NgramCounts, profile: &CategoryProfile) -> Option<Vec<(f64, f64)>> {
    let doc_vector: Vec<f64> = profile.ngrams().map(|ngram| doc.get(ngram) as f64).collect();
    let doc_sum: f64 = doc_vector.iter().sum();
    if doc_sum == 0. {
        return None;
    }
    Some(
        doc_vector
            .into_iter()
            .zip(profile.probabilities())
            .map(|(d, c)| (d / doc_sum, c))
            .collect(),
    )
}

/// Euclidean distance between the normalized vectors.
#[derive(Clone, Copy, Debug, Default)]
pub struct Euclidean;

impl Scorer for Euclidean {
    fn order(&self) -> ScoreOrder {
        ScoreOrder::LowerIsBetter
    }

    fn score(&self, doc: &NgramCounts, profile: &CategoryProfile) -> Option<f64> {
        let pairs = aligned_vectors(doc, profile)?;
        Some(pairs.iter().map(|(d, c)| (d - c) * (d - c)).sum::<f64>().sqrt())
    }
}

/// Cosine similarity between the normalized vectors.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cosine;

impl Scorer for Cosine {
    fn order(&self) -> ScoreOrder {
        ScoreOrder::HigherIsBetter
    }

    fn score(&self, doc: &NgramCounts, profile: &CategoryProfile) -> Option<f64> {
        let pairs = aligned_vectors(doc, profile)?;
        let mut dot = 0.;
        let mut doc_norm = 0.;
        let mut cat_norm = 0.;
        for (d, c) in pairs {
            dot += d * c;
            doc_norm += d * d;
            cat_norm += c * c;
        }
        let denom = doc_norm.sqrt() * cat_norm.sqrt();
        if denom == 0. {
            return None;
        }
        Some(dot / denom)
    }
}

/// Out-of-place rank distance.
///
/// For every n-gram of the document, adds the absolute difference between its rank in the
/// document (descending count) and its rank in the profile. N-grams missing from the profile
/// get the rank one past the profile's last entry. Only ranks matter, not magnitudes.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutOfPlace;

impl Scorer for OutOfPlace {
    fn order(&self) -> ScoreOrder {
        ScoreOrder::LowerIsBetter
    }

    fn score(&self, doc: &NgramCounts, profile: &CategoryProfile) -> Option<f64> {
        let missing = profile.len();
        let mut overlap = false;
        let mut score = 0;
        for (doc_rank, (ngram, _)) in doc.most_common(None).into_iter().enumerate() {
            let cat_rank = profile.rank(ngram).unwrap_or(missing);
            overlap |= cat_rank != missing;
            score += doc_rank.abs_diff(cat_rank);
        }
        if !overlap {
            return None;
        }
        Some(score as f64)
    }
}

/// Metric selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Metric {
    /// See [`Euclidean`].
    #[default]
    Euclidean,

    /// See [`Cosine`].
    Cosine,

    /// See [`OutOfPlace`].
    OutOfPlace,
}

impl Metric {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Euclidean => "euclidean",
            Self::Cosine => "cosine",
            Self::OutOfPlace => "rank",
        }
    }
}

impl Scorer for Metric {
    fn order(&self) -> ScoreOrder {
        match self {
            Self::Euclidean => Euclidean.order(),
            Self::Cosine => Cosine.order(),
            Self::OutOfPlace => OutOfPlace.order(),
        }
    }

    fn score(&self, doc: &NgramCounts, profile: &CategoryProfile) -> Option<f64> {
        match self {
            Self::Euclidean => Euclidean.score(doc, profile),
            Self::Cosine => Cosine.score(doc, profile),
            Self::OutOfPlace => OutOfPlace.score(doc, profile),
        }
    }
}

impl FromStr for Metric {
    type Err = &'static str;

    fn from_str(metric: &str) -> Result<Self, Self::Err> {
        match metric {
            "euclidean" => Ok(Self::Euclidean),
            "cosine" => Ok(Self::Cosine),
            "rank" | "out-of-place" => Ok(Self::OutOfPlace),
            _ => Err("Could not parse a metric value: {euclidean, cosine, rank}"),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(json: &str) -> CategoryProfile {
        serde_json::from_str(json).unwrap()
    }

    fn counts(ngrams: &[&str]) -> NgramCounts {
        ngrams.iter().collect()
    }

    #[test]
    fn test_euclidean_exact_match() {
        let p = profile(r#"{"ab": 1.0}"#);
        let doc = counts(&["ab", "ab"]);

        assert_eq!(Some(0.), Euclidean.score(&doc, &p));
    }

    #[test]
    fn test_euclidean_ignores_unknown_ngrams() {
        let cat = profile(r#"{"the": 0.5, "cat": 0.5}"#);
        let dog = profile(r#"{"the": 0.5, "dog": 0.5}"#);
        let doc = counts(&["the", "cat", "sat"]);

        assert_eq!(Some(0.), Euclidean.score(&doc, &cat));
        let d = Euclidean.score(&doc, &dog).unwrap();
        assert!((d - 0.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_no_overlap() {
        let p = profile(r#"{"xy": 0.6, "yz": 0.4}"#);
        let doc = counts(&["ab", "bc"]);

        assert_eq!(None, Euclidean.score(&doc, &p));
        assert_eq!(None, Cosine.score(&doc, &p));
        assert_eq!(None, OutOfPlace.score(&doc, &p));
        assert_eq!(None, Metric::Euclidean.score(&NgramCounts::new(), &p));
        assert_eq!(None, Metric::OutOfPlace.score(&NgramCounts::new(), &p));
    }

    #[test]
    fn test_cosine() {
        let p = profile(r#"{"a": 0.5, "b": 0.5}"#);

        let same = Cosine.score(&counts(&["a", "b"]), &p).unwrap();
        assert!((same - 1.).abs() < 1e-12);

        let half = Cosine.score(&counts(&["a", "c"]), &p).unwrap();
        assert!((half - 0.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_place_identical() {
        let doc = counts(&["c", "a", "c", "b", "a", "c"]);
        let p = CategoryProfile::from_counts(&doc, 10).unwrap();

        assert_eq!(Some(0.), OutOfPlace.score(&doc, &p));
    }

    #[test]
    fn test_out_of_place() {
        let p = profile(r#"{"a": 0.5, "b": 0.3, "c": 0.2}"#);
        // document ranks: b=0, a=1, z=2
        let doc = counts(&["b", "b", "b", "a", "a", "z"]);

        // |0 - 1| + |1 - 0| + |2 - 3|
        assert_eq!(Some(3.), OutOfPlace.score(&doc, &p));
    }

    #[test]
    fn test_order() {
        assert_eq!(ScoreOrder::LowerIsBetter, Metric::Euclidean.order());
        assert_eq!(ScoreOrder::HigherIsBetter, Metric::Cosine.order());
        assert_eq!(ScoreOrder::LowerIsBetter, Metric::OutOfPlace.order());
        assert!(ScoreOrder::LowerIsBetter.is_better(1., 2.));
        assert!(!ScoreOrder::LowerIsBetter.is_better(2., 2.));
        assert!(ScoreOrder::HigherIsBetter.is_better(2., 1.));
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(Ok(Metric::OutOfPlace), "rank".parse::<Metric>());
        assert_eq!(Ok(Metric::Cosine), "cosine".parse::<Metric>());
        assert!("manhattan".parse::<Metric>().is_err());
        assert_eq!("euclidean", Metric::Euclidean.to_string());
    }
}
