use std::collections::BTreeMap;
use std::io::{BufRead, Read};

use serde::Deserialize;

use crate::errors::{Result, TextcatError};

/// Labelled documents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    documents: Vec<String>,
    labels: Vec<String>,
}

#[derive(Deserialize)]
struct CsvRecord {
    text: String,
    label: String,
}

impl Dataset {
    /// Creates a dataset.
    ///
    /// # Errors
    ///
    /// If `documents` and `labels` differ in length, an error variant will be returned.
    pub fn new(documents: Vec<String>, labels: Vec<String>) -> Result<Self> {
        if documents.len() != labels.len() {
            return Err(TextcatError::invalid_argument(
                "labels",
                format!(
                    "{} documents but {} labels",
                    documents.len(),
                    labels.len()
                ),
            ));
        }
        Ok(Self { documents, labels })
    }

    /// Reads documents and labels from two line-delimited sources.
    ///
    /// Line `i` of `labels` is the label of line `i` of `data`. Lines are trimmed.
    ///
    /// # Arguments
    ///
    /// * `data` - One document per line.
    /// * `labels` - One label per line.
    ///
    /// # Errors
    ///
    /// When a reader generates an error, it will be returned as is. If the line counts differ, an
    /// error variant will be returned.
    pub fn from_lines<D, L>(data: D, labels: L) -> Result<Self>
    where
        D: BufRead,
        L: BufRead,
    {
        let documents = data
            .lines()
            .map(|line| line.map(|line| line.trim().to_string()))
            .collect::<std::io::Result<Vec<_>>>()?;
        let labels = labels
            .lines()
            .map(|line| line.map(|line| line.trim().to_string()))
            .collect::<std::io::Result<Vec<_>>>()?;
        Self::new(documents, labels)
    }

    /// Reads a CSV source with a header row containing `text` and `label` columns.
    ///
    /// Other columns are ignored.
    pub fn from_csv<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut rdr = csv::Reader::from_reader(rdr);
        let mut documents = vec![];
        let mut labels = vec![];
        for record in rdr.deserialize() {
            let record: CsvRecord = record?;
            documents.push(record.text);
            labels.push(record.label.trim().to_string());
        }
        Self::new(documents, labels)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Iterates over `(document, label)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents
            .iter()
            .zip(&self.labels)
            .map(|(d, l)| (d.as_str(), l.as_str()))
    }

    /// Groups document indices by label.
    ///
    /// # Returns
    ///
    /// Labels in sorted order, each with the ascending indices of its documents.
    pub fn indices_by_label(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, label) in self.labels.iter().enumerate() {
            groups.entry(label.as_str()).or_default().push(i);
        }
        groups
    }
}
