//! # Rowmill
//!
//! A **batch record-processing toolkit** for delimited tabular data: group
//! rows by a derived key, count occurrences, and decide what to emit against
//! a threshold -- the machinery behind duplicate flagging, replica counting,
//! and duplicate removal -- plus the surrounding cleanup stages (unit
//! conversion, empty-cell auditing) and a terminal least-squares fit.
//!
//! ## Key Features
//!
//! - **Deterministic grouping** - records sharing a derived key always land
//!   in one group, independent of input order or shard boundaries
//! - **Combiner-style pre-aggregation** - per-shard partial aggregates bound
//!   memory and shrink the merge volume without changing results
//! - **Sealed aggregates** - emission decisions are only representable after
//!   every input has been consumed; the type system forbids peeking early
//! - **Threshold policies** - flag groups seen >= T times, keep rows seen
//!   < T times, or reduce everything to one scalar
//! - **Parallel execution** - shards aggregate on Rayon workers with no
//!   shared mutable state; the commutative merge is the only barrier
//! - **Quoting-correct CSV** - RFC 4180 parsing, so `a,"b,c",d` is three
//!   fields
//!
//! ## Quick Start
//!
//! ```ignore
//! use rowmill::jobs::duplicates::{flag_duplicates, remove_duplicates};
//! use rowmill::{JobConfig, io};
//! # use anyhow::Result;
//!
//! # fn main() -> Result<()> {
//! let rows = io::csv::read_rows("listings.csv")?;
//!
//! // Which rows occur more than once?
//! let flags = flag_duplicates(rows.clone(), &JobConfig::default())?;
//! for (key, count) in &flags.groups {
//!     println!("{key}\t{count}");
//! }
//!
//! // Keep only the rows that occur exactly once.
//! let deduped = remove_duplicates(rows, &JobConfig::default())?;
//! io::csv::write_rows("listings.unique.csv", &deduped.rows)?;
//! deduped.summary.print();
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Records and keys
//!
//! A [`Record`] is one parsed row: an ordered list of string fields,
//! immutable once parsed. A [`KeySpec`] derives the grouping key from it --
//! either a configured subset of fields or the whole row -- joined with a
//! delimiter that cannot occur in field values. Extraction is pure: equal
//! records always produce equal keys. Rows too short for the configured key
//! are rejected (and counted), never truncated.
//!
//! ### The aggregation engine
//!
//! Aggregation is a two-phase reduce. Each shard folds its records into a
//! [`LocalAggregator`](engine::LocalAggregator) and flushes one
//! [`PartialAggregate`](engine::PartialAggregate); the
//! [`MergeEngine`](engine::MergeEngine) absorbs partials in any order --
//! merging is commutative and associative -- and
//! [`seal`](engine::MergeEngine::seal) finalizes the totals. Sealing
//! consumes the engine, so "decide before all input arrived" is not a state
//! a caller can reach. [`run_sharded`](engine::run_sharded) wires the phases
//! onto Rayon.
//!
//! ### Policies
//!
//! A [`ThresholdPolicy`] maps a key's sealed count to an emit/drop decision:
//! count >= 2 flags duplicate groups, count < 2 keeps unique rows. The
//! replica total is the same machinery pointed at one constant key. The
//! [`jobs`] module packages the three stages, the feature transforms, and
//! the regression fit.
//!
//! ## Error Handling
//!
//! Per-record failures ([`JobError`]) are skipped and reported in the
//! [`RunSummary`] unless `fail_fast` is configured; configuration and
//! merge-conflict errors are always fatal. File-level failures surface as
//! `anyhow` errors with path context.
//!
//! ## Module Overview
//!
//! - [`record`] / [`key`] - rows and grouping-key derivation
//! - [`aggregate`] - combiner functions (count, sum, count-with-witness)
//! - [`engine`] - local aggregation, merge, sealing, sharded execution
//! - [`filter`] - threshold policies and emitters
//! - [`jobs`] - the batch stages (duplicates, features, regression)
//! - [`io`] - CSV row files, keyed-count text files, glob expansion
//! - [`summary`] - run accounting and reporting
//! - [`config`] / [`error`] - job configuration and the error taxonomy
//! - [`testing`] - builders and assertions for tests

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod io;
pub mod jobs;
pub mod key;
pub mod record;
pub mod summary;
pub mod testing;

// General re-exports
pub use aggregate::{AggregateFn, CountWithWitness, Occurrences, TotalOf, WitnessAcc};
pub use config::{HeaderMode, JobConfig};
pub use engine::{
    AggregateOutcome, LocalAggregator, MergeEngine, PartialAggregate, SealedAggregate,
    default_shards, run_sharded,
};
pub use error::JobError;
pub use filter::{Comparison, ThresholdPolicy, emit_counts, emit_witnesses};
pub use key::{DEFAULT_KEY_DELIMITER, GroupKey, KeySpec};
pub use record::{Record, parse_line};
pub use summary::RunSummary;
