//! Job error taxonomy.
//!
//! Every per-record failure a job can produce is one of the variants below.
//! Recoverable errors (a bad row, a non-numeric cell) are skipped and counted
//! in the [`RunSummary`](crate::summary::RunSummary) unless the job runs with
//! `fail_fast`, in which case the first one aborts the run. Fatal errors
//! ([`JobError::MergeConflict`], [`JobError::Configuration`]) always abort:
//! they mean an invariant was violated and any output would be silently wrong.
//!
//! I/O and CSV-syntax failures at the file boundary are reported through
//! `anyhow` with context, not through this enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A failure produced while running a batch job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JobError {
    /// A row had fewer fields than the key extractor (or a conversion)
    /// expected. The row contributes to no aggregate.
    MalformedRecord {
        /// 1-based line number within the concatenated input.
        line: u64,
        /// Minimum field count the operation required.
        expected: usize,
        /// Field count actually present.
        found: usize,
    },
    /// A unit/currency conversion was applied to a cell that does not parse
    /// as a number.
    Conversion {
        line: u64,
        column: usize,
        value: String,
    },
    /// Two entries that should have been grouped under one key reached the
    /// output separately. Unreachable when key derivation is sound; always
    /// fatal.
    MergeConflict { key: String },
    /// The job configuration is invalid (zero threshold, duplicate key
    /// fields, ...). Always fatal.
    Configuration { message: String },
}

impl JobError {
    /// Shorthand for a configuration failure.
    pub fn configuration(message: impl Into<String>) -> Self {
        JobError::Configuration {
            message: message.into(),
        }
    }

    /// Fatal errors abort the run even without `fail_fast`.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            JobError::MergeConflict { .. } | JobError::Configuration { .. }
        )
    }
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::MalformedRecord {
                line,
                expected,
                found,
            } => write!(
                f,
                "malformed record at line {line}: expected at least {expected} fields, found {found}"
            ),
            JobError::Conversion {
                line,
                column,
                value,
            } => write!(
                f,
                "conversion failed at line {line}, column {column}: {value:?} is not numeric"
            ),
            JobError::MergeConflict { key } => {
                write!(f, "merge conflict: key {key:?} reached the output more than once")
            }
            JobError::Configuration { message } => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for JobError {}
