//! Column labels with standardization and uniqueness enforcement.
//!
//! Spreadsheet headers arrive with stray punctuation, inconsistent spacing and
//! duplicates. A [`Header`] keeps the labels exactly as they were received and
//! a standardized form that is safe to use as a column key.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GeniusError, Result};

// =============================================================================
// Standardization Patterns
// =============================================================================

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r##"[!"#$%&'()*+,\-./:;<=>?@\[\\\]^`{|}~]"##).unwrap());

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Standardize a single label.
///
/// Punctuation other than `_` is removed, the result is trimmed, inner runs of
/// whitespace become a single `_` and everything is lowercased.
pub fn standardize_label(label: &str) -> String {
    let stripped = PUNCTUATION.replace_all(label, "");
    WHITESPACE_RUN
        .replace_all(stripped.trim(), "_")
        .to_lowercase()
}

/// Append `_1`, `_2`, ... to repeated labels so every label is unique.
fn enforce_uniques(labels: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(labels.len());
    for label in labels {
        if !seen.contains(&label) {
            seen.push(label);
            continue;
        }
        let mut n = 1;
        let mut candidate = format!("{}_{}", label, n);
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{}_{}", label, n);
        }
        seen.push(candidate);
    }
    seen
}

/// An ordered set of column labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Labels as originally received.
    original: Vec<String>,
    /// Standardized, unique labels.
    labels: Vec<String>,
}

impl Header {
    /// Build a header from raw labels.
    pub fn new<S: AsRef<str>>(labels: impl IntoIterator<Item = S>) -> Self {
        let original: Vec<String> = labels.into_iter().map(|s| s.as_ref().to_string()).collect();
        let labels = Self::standardize(&original);
        Self { original, labels }
    }

    /// A placeholder header of positional labels `"0".."n-1"`.
    pub fn generated(n: usize) -> Self {
        Self::new((0..n).map(|i| i.to_string()))
    }

    fn standardize(original: &[String]) -> Vec<String> {
        enforce_uniques(original.iter().map(|l| standardize_label(l)).collect())
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Standardized labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Labels as they were received.
    pub fn original_form(&self) -> &[String] {
        &self.original
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    /// Position of a label, matched against the standardized form first and
    /// the original form second.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels
            .iter()
            .position(|l| l == label)
            .or_else(|| self.original.iter().position(|l| l == label))
    }

    /// Add a label to the end of the header.
    pub fn append(&mut self, label: impl Into<String>) {
        self.original.push(label.into());
        self.labels = Self::standardize(&self.original);
    }

    /// Remove the label at `index`, returning its original form.
    pub fn pop(&mut self, index: usize) -> Result<String> {
        if index >= self.original.len() {
            return Err(GeniusError::IndexOutOfRange {
                index,
                len: self.original.len(),
            });
        }
        let removed = self.original.remove(index);
        self.labels = Self::standardize(&self.original);
        Ok(removed)
    }

    /// Remove a label by its standardized or original form, returning the
    /// position it occupied.
    pub fn remove(&mut self, label: &str) -> Result<usize> {
        let index = self
            .index_of(label)
            .ok_or_else(|| GeniusError::LabelNotFound(label.to_string()))?;
        self.pop(index)?;
        Ok(index)
    }

    /// Replace the label at `index`.
    pub fn set(&mut self, index: usize, label: impl Into<String>) -> Result<()> {
        let len = self.original.len();
        let slot = self
            .original
            .get_mut(index)
            .ok_or(GeniusError::IndexOutOfRange { index, len })?;
        *slot = label.into();
        self.labels = Self::standardize(&self.original);
        Ok(())
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.labels.join(", "))
    }
}

impl<S: AsRef<str>> PartialEq<[S]> for Header {
    fn eq(&self, other: &[S]) -> bool {
        self.labels.len() == other.len()
            && self.labels.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<S: AsRef<str>> PartialEq<Vec<S>> for Header {
    fn eq(&self, other: &Vec<S>) -> bool {
        self == other.as_slice()
    }
}
