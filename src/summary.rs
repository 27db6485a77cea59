//! Run accounting and reporting.
//!
//! Every job returns a [`RunSummary`] alongside its output: how many records
//! were seen, how many were skipped and why, and how the key space came out.
//! Summaries print to stdout in a fixed block format and export as JSON.

use crate::error::JobError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Counters describing one job run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Records read from the input, including skipped ones.
    pub records_seen: u64,
    /// Records that failed per-record processing and were kept out of every
    /// aggregate.
    pub records_skipped: u64,
    /// Distinct keys in the sealed aggregate.
    pub distinct_keys: u64,
    /// Keys (or rows) that passed the emission policy.
    pub groups_emitted: u64,
    /// The per-record errors behind `records_skipped`.
    pub errors: Vec<JobError>,
}

impl RunSummary {
    /// Record a skipped record and the error that caused it.
    pub fn note_skip(&mut self, err: JobError) {
        self.records_skipped += 1;
        self.errors.push(err);
    }

    /// Print the summary block to stdout.
    pub fn print(&self) {
        println!("========== Run Summary ==========");
        println!("records seen:    {}", self.records_seen);
        println!("records skipped: {}", self.records_skipped);
        println!("distinct keys:   {}", self.distinct_keys);
        println!("groups emitted:  {}", self.groups_emitted);
        for err in &self.errors {
            println!("  skipped: {err}");
        }
        println!("=================================");
    }

    /// Serialize the summary to pretty JSON.
    ///
    /// # Errors
    /// Propagates serialization failures.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("serialize run summary")
    }

    /// Write the summary as JSON next to a job's output.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created or written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
        f.write_all(self.to_json()?.as_bytes())?;
        Ok(())
    }
}
