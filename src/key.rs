//! Grouping-key derivation.
//!
//! A [`KeySpec`] turns a [`Record`] into the string key records are grouped
//! under. Two variants exist: a subset key built from a fixed ordered list of
//! field indices, and a full-row key over every field. Both join fields with
//! a configurable delimiter that is not expected to occur in field values
//! (default U+001F), so distinct field vectors cannot collide.
//!
//! Extraction is a pure function of the record: the same record always yields
//! an equal key. Rows too short for a subset key are rejected with
//! [`JobError::MalformedRecord`] rather than truncated.

use crate::error::JobError;
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Default field separator inside derived keys: the ASCII unit separator.
pub const DEFAULT_KEY_DELIMITER: &str = "\u{1f}";

/// A derived grouping key.
pub type GroupKey = String;

/// How to derive the grouping key from a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeySpec {
    /// Concatenate the fields at these indices, in this order.
    Subset {
        fields: Vec<usize>,
        delimiter: String,
    },
    /// Use the whole row, all fields joined.
    FullRow { delimiter: String },
}

impl KeySpec {
    /// Subset key over `fields` with the default delimiter.
    #[must_use]
    pub fn subset(fields: Vec<usize>) -> Self {
        KeySpec::Subset {
            fields,
            delimiter: DEFAULT_KEY_DELIMITER.to_string(),
        }
    }

    /// Full-row key with the default delimiter.
    #[must_use]
    pub fn full_row() -> Self {
        KeySpec::FullRow {
            delimiter: DEFAULT_KEY_DELIMITER.to_string(),
        }
    }

    /// The minimum field count a record must have for extraction to succeed.
    #[must_use]
    pub fn min_fields(&self) -> usize {
        match self {
            KeySpec::Subset { fields, .. } => fields.iter().map(|i| i + 1).max().unwrap_or(0),
            KeySpec::FullRow { .. } => 0,
        }
    }

    /// Derive the grouping key for `record`, read at 1-based `line`.
    ///
    /// # Errors
    /// [`JobError::MalformedRecord`] if the record has fewer fields than the
    /// highest configured index requires. The record must then be kept out of
    /// every aggregate.
    pub fn extract(&self, line: u64, record: &Record) -> Result<GroupKey, JobError> {
        match self {
            KeySpec::Subset { fields, delimiter } => {
                let needed = self.min_fields();
                if record.len() < needed {
                    return Err(JobError::MalformedRecord {
                        line,
                        expected: needed,
                        found: record.len(),
                    });
                }
                let mut out = String::new();
                for (n, &idx) in fields.iter().enumerate() {
                    if n > 0 {
                        out.push_str(delimiter);
                    }
                    // bounds checked above
                    out.push_str(&record.fields()[idx]);
                }
                Ok(out)
            }
            KeySpec::FullRow { delimiter } => Ok(record.fields().join(delimiter)),
        }
    }
}
