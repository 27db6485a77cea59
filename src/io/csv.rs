//! Row-file I/O.
//!
//! This module provides:
//! - **Row reading**: [`read_rows`] parses a whole delimited file into
//!   [`Record`]s with RFC 4180 quoting, keeping ragged rows (the extractor
//!   decides whether a short row is an error, not the parser).
//! - **Row writing**: [`write_rows`] serializes records back out with
//!   quoting applied where needed.
//! - **Keyed-count text I/O**: [`write_keyed_counts`] / [`read_keyed_counts`]
//!   for the `key<TAB>count` shape the flagging job emits and the replica
//!   counter consumes.
//!
//! Errors are annotated with paths and row numbers for easier debugging.

use crate::record::Record;
use anyhow::{Context, Result, bail};
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Read a delimited file into records, one per row.
///
/// All rows come back, header included; header interpretation belongs to the
/// caller. Rows with differing field counts are allowed through so malformed
/// rows can be rejected (and counted) by the key extractor instead of
/// aborting the parse.
///
/// # Errors
/// Returns an error if the file cannot be opened or a row is not valid
/// quoted CSV.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(f);
    let mut out = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("parse {} row #{}", path.display(), i + 1))?;
        out.push(Record::new(rec.iter().map(str::to_string).collect()));
    }
    Ok(out)
}

/// Read several files in order, concatenating their rows.
///
/// # Errors
/// See [`read_rows`].
pub fn read_rows_many(paths: &[impl AsRef<Path>]) -> Result<Vec<Record>> {
    let mut out = Vec::new();
    for path in paths {
        out.extend(read_rows(path)?);
    }
    Ok(out)
}

/// Write records to a delimited file, creating parent directories.
///
/// # Returns
/// The number of rows written.
///
/// # Errors
/// Returns an error if the file or directories cannot be created or a row
/// fails to serialize.
pub fn write_rows(path: impl AsRef<Path>, rows: &[Record]) -> Result<usize> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(f);
    for (i, row) in rows.iter().enumerate() {
        wtr.write_record(row.fields())
            .with_context(|| format!("write {} row #{}", path.display(), i + 1))?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// Write `(key, count)` pairs as `key<TAB>count` lines.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_keyed_counts(path: impl AsRef<Path>, entries: &[(String, u64)]) -> Result<usize> {
    let path = path.as_ref();
    ensure_parent(path)?;
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for (key, count) in entries {
        writeln!(w, "{key}\t{count}")?;
    }
    w.flush()?;
    Ok(entries.len())
}

/// Parse `key<TAB>count` lines back into pairs.
///
/// # Errors
/// Returns an error if the file cannot be opened or a line has no tab
/// separator or a non-numeric count.
pub fn read_keyed_counts(path: impl AsRef<Path>) -> Result<Vec<(String, u64)>> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut out = Vec::new();
    for (i, line) in BufReader::new(f).lines().enumerate() {
        let line = line.with_context(|| format!("read {} line #{}", path.display(), i + 1))?;
        if line.is_empty() {
            continue;
        }
        let Some((key, count)) = line.rsplit_once('\t') else {
            bail!("{} line #{}: expected key<TAB>count", path.display(), i + 1);
        };
        let count: u64 = count
            .parse()
            .with_context(|| format!("{} line #{}: bad count {count:?}", path.display(), i + 1))?;
        out.push((key.to_string(), count));
    }
    Ok(out)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent).with_context(|| format!("mkdir -p {}", parent.display()))?;
    }
    Ok(())
}
