use indexmap::IndexMap;

/// Occurrence counts of n-grams.
///
/// N-grams are kept in the order they were first seen. That order breaks ties between equal
/// counts whenever the map is ranked, so that ranking never depends on hashing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NgramCounts {
    counts: IndexMap<String, u64>,
}

impl NgramCounts {
    /// Creates an empty counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `ngram`.
    pub fn add(&mut self, ngram: &str) {
        self.add_count(ngram, 1);
    }

    /// Adds `count` occurrences of `ngram`.
    ///
    /// A zero count still registers the n-gram's first-seen position.
    pub fn add_count(&mut self, ngram: &str, count: u64) {
        if let Some(c) = self.counts.get_mut(ngram) {
            *c += count;
        } else {
            self.counts.insert(ngram.to_string(), count);
        }
    }

    /// Merges another counter into this one.
    ///
    /// Counts are summed. N-grams unknown to `self` are appended in the order of `other`.
    pub fn merge(&mut self, other: &Self) {
        for (ngram, &count) in &other.counts {
            self.add_count(ngram, count);
        }
    }

    /// Returns the count of `ngram`, or 0.
    pub fn get(&self, ngram: &str) -> u64 {
        self.counts.get(ngram).copied().unwrap_or(0)
    }

    /// Returns the number of distinct n-grams.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Returns the sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Iterates over n-grams and counts in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(ngram, &count)| (ngram.as_str(), count))
    }

    /// Returns n-grams in descending order of count.
    ///
    /// Equal counts keep their first-seen order.
    ///
    /// # Arguments
    ///
    /// * `limit` - The maximum number of entries to return. `None` returns all of them.
    ///
    /// # Returns
    ///
    /// A list of `(ngram, count)` pairs.
    pub fn most_common(&self, limit: Option<usize>) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        // sort_by is stable
        entries.sort_by(|(_, a), (_, b)| b.cmp(a));
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        entries
    }
}

impl<S> Extend<S> for NgramCounts
where
    S: AsRef<str>,
{
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for ngram in iter {
            self.add(ngram.as_ref());
        }
    }
}

impl<S> FromIterator<S> for NgramCounts
where
    S: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut counts = Self::new();
        counts.extend(iter);
        counts
    }
}
