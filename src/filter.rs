//! Threshold filtering over sealed aggregates.
//!
//! Once the merge engine seals, every key has its final count. A
//! [`ThresholdPolicy`] maps that count to an emit/drop decision; the
//! emitters below apply it over a whole [`SealedAggregate`] and produce
//! deterministic (key-sorted) output.

use crate::engine::SealedAggregate;
use crate::key::GroupKey;
use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Which side of the threshold is admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// Admit counts `>= threshold` ("gte").
    AtLeast,
    /// Admit counts `< threshold` ("lt").
    Below,
}

/// The emission decision rule: a count threshold and a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub threshold: u64,
    pub comparison: Comparison,
}

impl ThresholdPolicy {
    /// Admit groups seen at least twice: the duplicate-flagging rule.
    #[must_use]
    pub fn duplicates() -> Self {
        Self {
            threshold: 2,
            comparison: Comparison::AtLeast,
        }
    }

    /// Admit groups seen exactly once: the duplicate-removal rule.
    #[must_use]
    pub fn uniques() -> Self {
        Self {
            threshold: 2,
            comparison: Comparison::Below,
        }
    }

    /// Whether a key with `count` total occurrences is emitted.
    #[must_use]
    pub fn admits(&self, count: u64) -> bool {
        match self.comparison {
            Comparison::AtLeast => count >= self.threshold,
            Comparison::Below => count < self.threshold,
        }
    }
}

/// Emit `(key, count)` pairs admitted by `policy`, sorted by key.
#[must_use]
pub fn emit_counts(
    sealed: &SealedAggregate<GroupKey, u64>,
    policy: ThresholdPolicy,
) -> Vec<(GroupKey, u64)> {
    let mut out: Vec<(GroupKey, u64)> = sealed
        .iter()
        .filter(|&(_, &count)| policy.admits(count))
        .map(|(k, &count)| (k.clone(), count))
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

/// Emit the witness records of admitted keys, sorted by key.
///
/// Used by duplicate removal with [`ThresholdPolicy::uniques`]: a key is only
/// admitted at count 1, where the witness is the unique record itself, so the
/// output cannot depend on merge order.
#[must_use]
pub fn emit_witnesses(
    sealed: SealedAggregate<GroupKey, (u64, Record)>,
    policy: ThresholdPolicy,
) -> Vec<Record> {
    let mut admitted: Vec<(GroupKey, Record)> = sealed
        .into_entries()
        .into_iter()
        .filter(|(_, (count, _))| policy.admits(*count))
        .map(|(k, (_, witness))| (k, witness))
        .collect();
    admitted.sort_by(|a, b| a.0.cmp(&b.0));
    admitted.into_iter().map(|(_, rec)| rec).collect()
}
