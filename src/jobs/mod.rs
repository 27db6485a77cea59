//! The batch job stages built on the engine.
//!
//! - [`duplicates`] -- flag duplicate groups, count replicas, remove
//!   duplicated rows.
//! - [`features`] -- per-record unit conversion, header relabeling, and the
//!   empty-cell audit.
//! - [`regression`] -- the terminal least-squares fit over the cleaned data.

pub mod duplicates;
pub mod features;
pub mod regression;

use crate::config::HeaderMode;
use crate::record::Record;

/// Split off the header row per `mode` and number the data rows with their
/// 1-based physical line numbers.
pub(crate) fn split_header(
    mode: HeaderMode,
    rows: Vec<Record>,
) -> (Option<Record>, Vec<(u64, Record)>) {
    let mut iter = rows.into_iter();
    let header = match mode {
        HeaderMode::Skip => iter.next(),
        HeaderMode::Passthrough | HeaderMode::Relabel => None,
    };
    let offset = if header.is_some() { 2 } else { 1 };
    let numbered = iter
        .enumerate()
        .map(|(i, rec)| (i as u64 + offset, rec))
        .collect();
    (header, numbered)
}
