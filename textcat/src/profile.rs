use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::frequency::NgramCounts;
use crate::utils::deserialize_unique_map;

/// Normalized n-gram distribution of one category.
///
/// Entries are stored in descending order of their original counts. The position of an n-gram
/// is its rank.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryProfile {
    probs: IndexMap<String, f64>,
}

impl CategoryProfile {
    /// Builds a profile from raw counts.
    ///
    /// The `cutoff` most frequent n-grams are kept (equal counts keep their first-seen order) and
    /// their counts are divided by the sum of the kept counts.
    ///
    /// # Arguments
    ///
    /// * `counts` - Aggregated counts of one category.
    /// * `cutoff` - The maximum number of n-grams to keep.
    ///
    /// # Returns
    ///
    /// A new profile, or `None` if nothing with a positive count is left.
    ///
    /// # Examples
    ///
    /// ```
    /// use textcat::{CategoryProfile, NgramCounts};
    ///
    /// let mut counts = NgramCounts::new();
    /// counts.add_count("a", 10);
    /// counts.add_count("b", 5);
    /// counts.add_count("c", 1);
    ///
    /// let profile = CategoryProfile::from_counts(&counts, 2).unwrap();
    /// assert_eq!(vec!["a", "b"], profile.ngrams().collect::<Vec<_>>());
    /// assert_eq!(Some(10. / 15.), profile.get("a"));
    /// ```
    pub fn from_counts(counts: &NgramCounts, cutoff: usize) -> Option<Self> {
        let kept = counts.most_common(Some(cutoff));
        let total: u64 = kept.iter().map(|&(_, count)| count).sum();
        if total == 0 {
            return None;
        }
        let total = total as f64;
        let probs = kept
            .into_iter()
            .map(|(ngram, count)| (ngram.to_string(), count as f64 / total))
            .collect();
        Some(Self { probs })
    }

    pub(crate) fn from_entries(probs: IndexMap<String, f64>) -> Self {
        Self { probs }
    }

    /// Returns a profile holding the first `cutoff` entries renormalized to sum to one.
    ///
    /// Since probabilities are proportional to counts, this equals rebuilding the profile from
    /// the original counts with the smaller cutoff.
    pub fn truncated(&self, cutoff: usize) -> Option<Self> {
        let total: f64 = self.probs.values().take(cutoff).sum();
        if total <= 0. {
            return None;
        }
        let probs = self
            .probs
            .iter()
            .take(cutoff)
            .map(|(ngram, &p)| (ngram.clone(), p / total))
            .collect();
        Some(Self { probs })
    }

    pub fn len(&self) -> usize {
        self.probs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// Returns the probability of `ngram`.
    pub fn get(&self, ngram: &str) -> Option<f64> {
        self.probs.get(ngram).copied()
    }

    /// Returns the 0-based rank of `ngram`.
    pub fn rank(&self, ngram: &str) -> Option<usize> {
        self.probs.get_index_of(ngram)
    }

    /// Iterates over n-grams and probabilities in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.probs.iter().map(|(ngram, &p)| (ngram.as_str(), p))
    }

    pub fn ngrams(&self) -> impl Iterator<Item = &str> {
        self.probs.keys().map(String::as_str)
    }

    pub fn probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        self.probs.values().copied()
    }

    /// Returns the sum of all probabilities.
    pub fn total(&self) -> f64 {
        self.probs.values().sum()
    }
}

impl Serialize for CategoryProfile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.probs.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CategoryProfile {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Self::from_entries(deserialize_unique_map(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, u64)]) -> NgramCounts {
        let mut counts = NgramCounts::new();
        for &(ngram, count) in entries {
            counts.add_count(ngram, count);
        }
        counts
    }

    #[test]
    fn test_from_counts_truncation() {
        let profile = CategoryProfile::from_counts(&counts(&[("a", 10), ("b", 5), ("c", 1)]), 2)
            .unwrap();

        assert_eq!(
            vec![("a", 10. / 15.), ("b", 5. / 15.)],
            profile.iter().collect::<Vec<_>>()
        );
        assert_eq!(None, profile.get("c"));
    }

    #[test]
    fn test_from_counts_sorts_by_count() {
        let profile =
            CategoryProfile::from_counts(&counts(&[("x", 1), ("y", 3), ("z", 1), ("w", 3)]), 10)
                .unwrap();

        assert_eq!(vec!["y", "w", "x", "z"], profile.ngrams().collect::<Vec<_>>());
        assert_eq!(Some(0), profile.rank("y"));
        assert_eq!(Some(3), profile.rank("z"));
        assert_eq!(None, profile.rank("v"));
    }

    #[test]
    fn test_from_counts_normalized() {
        let raw = counts(&[("a", 7), ("b", 3), ("c", 3), ("d", 2), ("e", 1), ("f", 1)]);
        for cutoff in 1..8 {
            let profile = CategoryProfile::from_counts(&raw, cutoff).unwrap();
            assert!(profile.len() <= cutoff);
            assert!((profile.total() - 1.).abs() < 1e-9);
        }
    }

    #[test]
    fn test_from_counts_empty() {
        assert_eq!(None, CategoryProfile::from_counts(&NgramCounts::new(), 300));
        assert_eq!(None, CategoryProfile::from_counts(&counts(&[("a", 1)]), 0));
    }

    #[test]
    fn test_from_counts_idempotent() {
        let raw = counts(&[("b", 2), ("a", 2), ("c", 4), ("d", 1)]);
        let p1 = CategoryProfile::from_counts(&raw, 3).unwrap();
        let p2 = CategoryProfile::from_counts(&raw, 3).unwrap();

        assert_eq!(p1, p2);
        assert_eq!(
            serde_json::to_string(&p1).unwrap(),
            serde_json::to_string(&p2).unwrap()
        );
    }

    #[test]
    fn test_truncated() {
        let raw = counts(&[("a", 6), ("b", 3), ("c", 1)]);
        let profile = CategoryProfile::from_counts(&raw, 3).unwrap();
        let truncated = profile.truncated(2).unwrap();
        let rebuilt = CategoryProfile::from_counts(&raw, 2).unwrap();

        assert_eq!(vec!["a", "b"], truncated.ngrams().collect::<Vec<_>>());
        for ((_, p1), (_, p2)) in truncated.iter().zip(rebuilt.iter()) {
            assert!((p1 - p2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_serde_keeps_order() {
        let profile: CategoryProfile =
            serde_json::from_str(r#"{"zz": 0.5, "aa": 0.3, "mm": 0.2}"#).unwrap();

        assert_eq!(vec!["zz", "aa", "mm"], profile.ngrams().collect::<Vec<_>>());
        assert_eq!(
            r#"{"zz":0.5,"aa":0.3,"mm":0.2}"#,
            serde_json::to_string(&profile).unwrap()
        );
    }

    #[test]
    fn test_deserialize_duplicate_ngram() {
        let profile = serde_json::from_str::<CategoryProfile>(r#"{"aa": 0.5, "aa": 0.5}"#);

        assert!(profile.is_err());
    }
}
