//! Label normalization and normalized label sets

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Punctuation trimmed from both ends of a label (ASCII and full-width forms)
const TRIM_PUNCTUATION: &[char] = &['.', ',', '，', '。', ';', '；', '、', ':', '：', '!', '！', '?', '？'];

/// Normalize a label: trim surrounding whitespace and punctuation, then case-fold
pub fn normalize(label: &str) -> String {
    label
        .trim_matches(|c: char| c.is_whitespace() || TRIM_PUNCTUATION.contains(&c))
        .to_lowercase()
}

/// Set of normalized, non-empty labels
///
/// Every insertion goes through [`normalize`], so two sets built from
/// differently formatted spellings of the same diagnoses compare equal.
/// Deserialized sets are normalized the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSet(BTreeSet<String>);

impl LabelSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Build a set from raw labels, dropping anything empty after normalization
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for label in labels {
            set.insert(label.as_ref());
        }
        set
    }

    /// Insert a raw label; returns false if it was empty or already present
    pub fn insert(&mut self, label: &str) -> bool {
        let normalized = normalize(label);
        if normalized.is_empty() {
            return false;
        }
        self.0.insert(normalized)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(&normalize(label))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn intersection(&self, other: &LabelSet) -> LabelSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn union(&self, other: &LabelSet) -> LabelSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &LabelSet) -> LabelSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    /// Merge another set into this one
    pub fn extend_from(&mut self, other: &LabelSet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(String::as_str).collect();
        write!(f, "{}", joined.join(", "))
    }
}

impl From<Vec<String>> for LabelSet {
    fn from(labels: Vec<String>) -> Self {
        Self::from_labels(labels)
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(set: LabelSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for LabelSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_labels(iter)
    }
}
