//! Raw record parsing.
//!
//! A raw record is a single comma-separated line. The first field is the label
//! token and every remaining field is a feature value whose index is its
//! 0-based position after the label has been removed.
//!
//! Parsing borrows from the input: a [`ParsedRecord`] holds `&str` slices into
//! the raw record and never copies tokens.
//!
//! # Example
//!
//! ```
//! use ctrhash_core::record::parse_record;
//!
//! let record = parse_record("1.0,a,,c").unwrap();
//! assert_eq!(record.label(), "1.0");
//! assert_eq!(record.features(), &["a", "", "c"]);
//! ```

use crate::error::{HashingError, Result};
use crate::hasher::feature_key;

/// Field separator for raw records. Escaping and quoting are not supported.
pub const FIELD_DELIMITER: char = ',';

/// A (feature index, value) pair derived from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeaturePair<'a> {
    /// 0-based position of the value after label removal.
    pub index: usize,
    /// The raw token, untrimmed. May be empty.
    pub value: &'a str,
}

impl<'a> FeaturePair<'a> {
    /// Creates a new feature pair.
    pub fn new(index: usize, value: &'a str) -> Self {
        Self { index, value }
    }

    /// Returns the feature key (`value` followed by the decimal `index`).
    pub fn key(&self) -> String {
        feature_key(self.index, self.value)
    }
}

/// A raw record split into its label token and ordered feature values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord<'a> {
    label: &'a str,
    features: Vec<&'a str>,
}

impl<'a> ParsedRecord<'a> {
    /// Returns the unparsed label token.
    #[inline]
    pub fn label(&self) -> &'a str {
        self.label
    }

    /// Returns the feature values in record order.
    #[inline]
    pub fn features(&self) -> &[&'a str] {
        &self.features
    }

    /// Returns the number of feature tokens.
    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// Iterates over the (index, value) pairs in record order.
    pub fn pairs(&self) -> impl Iterator<Item = FeaturePair<'a>> + '_ {
        self.features
            .iter()
            .enumerate()
            .map(|(index, &value)| FeaturePair::new(index, value))
    }
}

/// Splits a raw record into a label token and feature values.
///
/// Empty tokens are kept as empty strings and nothing is trimmed. No check is
/// made on the number, type or content of the fields.
///
/// # Errors
///
/// Returns `HashingError::FormatError` if the record yields no fields at all.
pub fn parse_record(raw: &str) -> Result<ParsedRecord<'_>> {
    let mut fields = raw.split(FIELD_DELIMITER);
    let label = fields
        .next()
        .ok_or_else(|| HashingError::format("record has no label field"))?;

    Ok(ParsedRecord {
        label,
        features: fields.collect(),
    })
}
