//! Sharded parallel execution of an aggregation.
//!
//! The input is split into contiguous shards, each shard is reduced to a
//! [`PartialAggregate`] on a rayon worker (no shared mutable state), and the
//! partials are merged into one sealed global aggregate. The merge is the
//! sole synchronization point; because it is commutative, the outcome does
//! not depend on worker interleaving.
//!
//! Per-record failures are collected into the run summary, unless the run is
//! fail-fast (or the error is fatal), in which case the parallel phase
//! short-circuits and nothing downstream sees a partial result.

use crate::aggregate::AggregateFn;
use crate::engine::local::LocalAggregator;
use crate::engine::merge::{MergeEngine, PartialAggregate, SealedAggregate};
use crate::error::JobError;
use crate::summary::RunSummary;
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::hash::Hash;

/// Sealed totals plus the run accounting that produced them.
pub struct AggregateOutcome<K, O> {
    pub sealed: SealedAggregate<K, O>,
    pub summary: RunSummary,
}

/// Default shard count: twice the logical CPUs, at least 2.
#[must_use]
pub fn default_shards() -> usize {
    2 * num_cpus::get().max(1)
}

struct ShardYield<K, A> {
    partial: PartialAggregate<K, A>,
    errors: Vec<JobError>,
    seen: u64,
}

/// Aggregate `items` under `agg`, grouping by the key `extract` derives.
///
/// `extract` maps each item to a `(key, value)` increment or a per-record
/// [`JobError`]. With `fail_fast` unset, failed items are skipped and
/// reported in the summary; with it set (or on a fatal error) the first
/// failure aborts the whole run before any output exists.
///
/// # Errors
/// The aborting error in fail-fast mode, annotated with context.
pub fn run_sharded<I, K, V, F, X>(
    items: Vec<I>,
    shards: usize,
    fail_fast: bool,
    agg: F,
    extract: X,
) -> Result<AggregateOutcome<K, F::Out>>
where
    I: Send,
    K: Eq + Hash + Clone + Send,
    V: Send,
    F: AggregateFn<V> + Clone + Sync,
    X: Fn(&I) -> Result<(K, V), JobError> + Send + Sync,
{
    let chunks = split_shards(items, shards.max(1));

    let yields: std::result::Result<Vec<ShardYield<K, F::Acc>>, JobError> = chunks
        .into_par_iter()
        .map(|chunk| {
            let mut local = LocalAggregator::new(agg.clone());
            let mut errors = Vec::new();
            let mut seen = 0u64;
            for item in &chunk {
                seen += 1;
                match extract(item) {
                    Ok((key, value)) => local.observe(key, value),
                    Err(err) if fail_fast || err.is_fatal() => return Err(err),
                    Err(err) => errors.push(err),
                }
            }
            Ok(ShardYield {
                partial: local.flush(),
                errors,
                seen,
            })
        })
        .collect();
    let yields = yields.context("aggregation aborted before sealing")?;

    let mut engine = MergeEngine::new(agg);
    let mut summary = RunSummary::default();
    for y in yields {
        summary.records_seen += y.seen;
        for err in y.errors {
            summary.note_skip(err);
        }
        engine.absorb(y.partial);
    }

    let sealed = engine.seal();
    summary.distinct_keys = sealed.len() as u64;
    Ok(AggregateOutcome { sealed, summary })
}

/// Split into at most `n` contiguous chunks of near-equal size.
fn split_shards<I>(items: Vec<I>, n: usize) -> Vec<Vec<I>> {
    let len = items.len();
    if n <= 1 || len <= 1 {
        return vec![items];
    }
    let chunk = len.div_ceil(n);
    let mut out = Vec::with_capacity(n);
    let mut rest = items;
    while rest.len() > chunk {
        let tail = rest.split_off(chunk);
        out.push(rest);
        rest = tail;
    }
    out.push(rest);
    out
}
