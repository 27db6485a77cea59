//! The `Record` type: one parsed row of delimited text.
//!
//! A record is an ordered sequence of string fields, immutable once parsed.
//! Parsing honors RFC 4180 quoting, so a field may contain the delimiter
//! (`a,"b,c",d` is three fields). Records compare and hash by field content.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One parsed row: an ordered list of field values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Wrap pre-split fields into a record.
    #[must_use]
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Build a record from anything stringly, mostly useful in tests.
    pub fn from_fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// All fields, in order.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Field at `index`, if the row is wide enough.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// Number of fields in this row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_fields(self) -> Vec<String> {
        self.fields
    }
}

/// Parse a single comma-delimited line into a [`Record`], honoring quotes.
///
/// # Errors
/// Returns an error if the line is not valid quoted CSV (e.g. an unterminated
/// quote).
pub fn parse_line(line: &str) -> Result<Record> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut rows = rdr.records();
    let rec = rows
        .next()
        .context("empty line")?
        .with_context(|| format!("parse line {line:?}"))?;
    Ok(Record::new(rec.iter().map(str::to_string).collect()))
}
