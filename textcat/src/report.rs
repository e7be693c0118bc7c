//! Accuracy report over predicted labels.

use std::fmt;

use hashbrown::HashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::{Result, TextcatError};

/// Precision, recall, F1 and support of one label or one average.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
pub struct Scores {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

#[derive(Clone, Copy, Default)]
struct Tally {
    true_positive: usize,
    predicted: usize,
    support: usize,
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.
    } else {
        num as f64 / denom as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0. {
        0.
    } else {
        2. * precision * recall / (precision + recall)
    }
}

/// Per-label and averaged classification scores.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationReport {
    labels: Vec<(String, Scores)>,
    accuracy: f64,
    macro_avg: Scores,
    weighted_avg: Scores,
}

impl ClassificationReport {
    /// Compares predictions with reference labels.
    ///
    /// Labels are the sorted union of reference and predicted labels. Divisions by zero yield 0.
    ///
    /// # Arguments
    ///
    /// * `references` - Gold labels.
    /// * `predictions` - Predicted labels, in the same order.
    ///
    /// # Errors
    ///
    /// If the inputs are empty or differ in length, an error variant will be returned.
    pub fn new<R, P>(references: &[R], predictions: &[P]) -> Result<Self>
    where
        R: AsRef<str>,
        P: AsRef<str>,
    {
        if references.len() != predictions.len() {
            return Err(TextcatError::invalid_argument(
                "predictions",
                format!(
                    "{} references but {} predictions",
                    references.len(),
                    predictions.len()
                ),
            ));
        }
        if references.is_empty() {
            return Err(TextcatError::invalid_argument("references", "is empty"));
        }

        let mut tallies: HashMap<&str, Tally> = HashMap::new();
        let mut n_correct = 0;
        for (r, p) in references.iter().zip(predictions) {
            let (r, p) = (r.as_ref(), p.as_ref());
            tallies.entry(r).or_default().support += 1;
            tallies.entry(p).or_default().predicted += 1;
            if r == p {
                tallies.entry(r).or_default().true_positive += 1;
                n_correct += 1;
            }
        }
        let mut tallies: Vec<_> = tallies.into_iter().collect();
        tallies.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

        let total = references.len();
        let labels: Vec<(String, Scores)> = tallies
            .into_iter()
            .map(|(label, t)| {
                let precision = ratio(t.true_positive, t.predicted);
                let recall = ratio(t.true_positive, t.support);
                let scores = Scores {
                    precision,
                    recall,
                    f1_score: f1(precision, recall),
                    support: t.support,
                };
                (label.to_string(), scores)
            })
            .collect();

        let n_labels = labels.len() as f64;
        let mut macro_avg = Scores {
            support: total,
            ..Scores::default()
        };
        let mut weighted_avg = macro_avg;
        for (_, s) in &labels {
            let w = s.support as f64 / total as f64;
            macro_avg.precision += s.precision / n_labels;
            macro_avg.recall += s.recall / n_labels;
            macro_avg.f1_score += s.f1_score / n_labels;
            weighted_avg.precision += s.precision * w;
            weighted_avg.recall += s.recall * w;
            weighted_avg.f1_score += s.f1_score * w;
        }

        Ok(Self {
            labels,
            accuracy: ratio(n_correct, total),
            macro_avg,
            weighted_avg,
        })
    }

    /// Iterates over labels in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &Scores)> {
        self.labels.iter().map(|(label, s)| (label.as_str(), s))
    }

    pub fn label(&self, label: &str) -> Option<&Scores> {
        self.labels
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, s)| s)
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn macro_avg(&self) -> &Scores {
        &self.macro_avg
    }

    pub fn weighted_avg(&self) -> &Scores {
        &self.weighted_avg
    }
}

impl Serialize for ClassificationReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.labels.len() + 3))?;
        for (label, scores) in &self.labels {
            map.serialize_entry(label, scores)?;
        }
        map.serialize_entry("accuracy", &self.accuracy)?;
        map.serialize_entry("macro avg", &self.macro_avg)?;
        map.serialize_entry("weighted avg", &self.weighted_avg)?;
        map.end()
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let width = self
            .labels
            .iter()
            .map(|(label, _)| label.chars().count())
            .chain(Some("weighted avg".len()))
            .max()
            .unwrap_or(0);
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, s) in &self.labels {
            writeln!(
                f,
                "{:>width$} {:>9.4} {:>9.4} {:>9.4} {:>9}",
                label, s.precision, s.recall, s.f1_score, s.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9.4} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, s) in [
            ("macro avg", &self.macro_avg),
            ("weighted avg", &self.weighted_avg),
        ] {
            writeln!(
                f,
                "{:>width$} {:>9.4} {:>9.4} {:>9.4} {:>9}",
                name, s.precision, s.recall, s.f1_score, s.support
            )?;
        }
        Ok(())
    }
}
