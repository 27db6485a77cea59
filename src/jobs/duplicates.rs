//! The duplicate-handling jobs.
//!
//! Three stages share the engine, differing only in aggregate shape and
//! emission policy:
//! - [`flag_duplicates`] groups rows by the configured key and emits
//!   `(key, count)` for every group the policy admits (by default: seen at
//!   least twice).
//! - [`count_replicas`] consumes the flagged output and reduces it to one
//!   scalar: the number of redundant rows across all duplicate groups.
//! - [`remove_duplicates`] keeps exactly the rows whose key occurs once,
//!   re-emitting them in their original shape.
//!
//! Every stage accumulates fully and decides only against the sealed
//! aggregate; no decision is ever made per record in isolation.

use crate::aggregate::{CountWithWitness, Occurrences, TotalOf};
use crate::config::JobConfig;
use crate::engine::{default_shards, run_sharded};
use crate::error::JobError;
use crate::filter::{Comparison, ThresholdPolicy, emit_counts, emit_witnesses};
use crate::key::GroupKey;
use crate::record::Record;
use crate::summary::RunSummary;
use anyhow::Result;
use std::collections::HashSet;

/// Label under which the replica total is reported, matching the classic
/// text-output shape of the counting stage.
pub const REPLICA_LABEL: &str = "Number of replicas is:";

/// Output of [`flag_duplicates`].
pub struct DuplicateFlags {
    /// Admitted `(key, total count)` groups, sorted by key.
    pub groups: Vec<(GroupKey, u64)>,
    pub summary: RunSummary,
}

/// Group rows by the configured key and emit the groups the policy admits.
///
/// Honors `cfg.header_mode` (with [`HeaderMode::Skip`](crate::config::HeaderMode::Skip)
/// the first row never enters a group), `cfg.threshold` / `cfg.comparison`,
/// and `cfg.fail_fast`.
///
/// # Errors
/// Fatal configuration errors, or the first malformed record when
/// `fail_fast` is set.
pub fn flag_duplicates(rows: Vec<Record>, cfg: &JobConfig) -> Result<DuplicateFlags> {
    cfg.validate()?;
    let spec = cfg.key_spec();
    let (_, numbered) = super::split_header(cfg.header_mode, rows);

    let outcome = run_sharded(
        numbered,
        default_shards(),
        cfg.fail_fast,
        Occurrences,
        move |(line, rec): &(u64, Record)| spec.extract(*line, rec).map(|key| (key, ())),
    )?;

    let groups = emit_counts(&outcome.sealed, cfg.policy());
    let mut summary = outcome.summary;
    summary.groups_emitted = groups.len() as u64;
    Ok(DuplicateFlags { groups, summary })
}

/// Output of [`count_replicas`].
#[derive(Debug)]
pub struct ReplicaCount {
    /// Total redundant rows: for each flagged group, its count minus one.
    pub replicas: i64,
    pub summary: RunSummary,
}

/// Reduce flagged duplicate groups to a single replica total.
///
/// Every entry maps to one constant key, so the scalar is an ordinary
/// constant-key aggregation rather than a special-cased fold. A key
/// appearing twice in the flagged input means the upstream grouping stage
/// violated its contract and is reported as a fatal merge conflict.
///
/// # Errors
/// [`JobError::MergeConflict`] on a repeated key.
pub fn count_replicas(flagged: &[(GroupKey, u64)]) -> Result<ReplicaCount> {
    let mut keys = HashSet::new();
    for (key, _) in flagged {
        if !keys.insert(key.as_str()) {
            return Err(JobError::MergeConflict { key: key.clone() }.into());
        }
    }

    let outcome = run_sharded(
        flagged.to_vec(),
        default_shards(),
        true,
        TotalOf,
        |(_, count): &(GroupKey, u64)| Ok((REPLICA_LABEL.to_string(), *count as i64 - 1)),
    )?;

    let replicas = outcome
        .sealed
        .get(&REPLICA_LABEL.to_string())
        .copied()
        .unwrap_or(0);
    let mut summary = outcome.summary;
    summary.groups_emitted = 1;
    Ok(ReplicaCount { replicas, summary })
}

/// Output of [`remove_duplicates`].
pub struct Deduplicated {
    /// Surviving rows (header first when one was split off), sorted by key.
    pub rows: Vec<Record>,
    pub summary: RunSummary,
}

/// Keep only the rows whose key occurs fewer than `cfg.threshold` times.
///
/// The aggregate carries `(count, witness record)` per key so the emitted
/// value has the original row shape. This job is inherently "unique only":
/// it always filters with [`Comparison::Below`], whatever `cfg.comparison`
/// says, since emitting the witnesses of large groups would silently drop
/// data.
///
/// # Errors
/// Fatal configuration errors, or the first malformed record when
/// `fail_fast` is set.
pub fn remove_duplicates(rows: Vec<Record>, cfg: &JobConfig) -> Result<Deduplicated> {
    cfg.validate()?;
    let spec = cfg.key_spec();
    let (header, numbered) = super::split_header(cfg.header_mode, rows);

    let outcome = run_sharded(
        numbered,
        default_shards(),
        cfg.fail_fast,
        CountWithWitness,
        move |(line, rec): &(u64, Record)| {
            spec.extract(*line, rec).map(|key| (key, rec.clone()))
        },
    )?;

    let policy = ThresholdPolicy {
        threshold: cfg.threshold,
        comparison: Comparison::Below,
    };
    let unique = emit_witnesses(outcome.sealed, policy);

    let mut out = Vec::with_capacity(unique.len() + 1);
    out.extend(header);
    out.extend(unique);

    let mut summary = outcome.summary;
    summary.groups_emitted = out.len() as u64;
    Ok(Deduplicated { rows: out, summary })
}
