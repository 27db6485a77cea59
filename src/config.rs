//! Job configuration.

use crate::error::JobError;
use crate::filter::{Comparison, ThresholdPolicy};
use crate::key::{DEFAULT_KEY_DELIMITER, KeySpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What to do with row 0 of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderMode {
    /// Treat row 0 as an ordinary data row.
    Passthrough,
    /// Row 0 is a header whose labels get rewritten (transform stage only).
    Relabel,
    /// Row 0 is a header: exclude it from aggregation, re-emit it unchanged
    /// in row-shaped outputs.
    Skip,
}

/// Configuration for the keyed aggregation jobs.
///
/// An empty `key_fields` selects the full-row key. `threshold` and
/// `comparison` drive the emission decision; `fail_fast` turns the first
/// per-record error into a run abort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    pub key_fields: Vec<usize>,
    pub key_delimiter: String,
    pub threshold: u64,
    pub comparison: Comparison,
    pub header_mode: HeaderMode,
    pub fail_fast: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            key_fields: Vec::new(),
            key_delimiter: DEFAULT_KEY_DELIMITER.to_string(),
            threshold: 2,
            comparison: Comparison::AtLeast,
            header_mode: HeaderMode::Passthrough,
            fail_fast: false,
        }
    }
}

impl JobConfig {
    /// Check the configuration invariants.
    ///
    /// # Errors
    /// [`JobError::Configuration`] (always fatal) on a zero threshold, an
    /// empty key delimiter, or repeated key field indices.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.threshold == 0 {
            return Err(JobError::configuration("threshold must be at least 1"));
        }
        if self.key_delimiter.is_empty() {
            return Err(JobError::configuration("key delimiter must not be empty"));
        }
        let mut seen = HashSet::new();
        for &idx in &self.key_fields {
            if !seen.insert(idx) {
                return Err(JobError::configuration(format!(
                    "key field {idx} listed more than once"
                )));
            }
        }
        Ok(())
    }

    /// The key derivation this configuration selects.
    #[must_use]
    pub fn key_spec(&self) -> KeySpec {
        if self.key_fields.is_empty() {
            KeySpec::FullRow {
                delimiter: self.key_delimiter.clone(),
            }
        } else {
            KeySpec::Subset {
                fields: self.key_fields.clone(),
                delimiter: self.key_delimiter.clone(),
            }
        }
    }

    /// The emission policy this configuration selects.
    #[must_use]
    pub fn policy(&self) -> ThresholdPolicy {
        ThresholdPolicy {
            threshold: self.threshold,
            comparison: self.comparison,
        }
    }
}
