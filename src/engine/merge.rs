//! Merging partial aggregates into the sealed global aggregate.
//!
//! The merge engine is the single point where shard results meet. Merging is
//! commutative and associative (delegated to [`AggregateFn::merge`]), so the
//! global totals are independent of the order partials arrive in.
//!
//! The per-key lifecycle is `Unseen -> Accumulating -> Sealed`, and the type
//! system enforces it: [`MergeEngine::seal`] consumes the engine, so no
//! further input can arrive, and [`SealedAggregate`] is the only readable
//! view. No emission decision can be computed against an unsealed engine.

use crate::aggregate::AggregateFn;
use std::collections::HashMap;
use std::collections::hash_map;
use std::hash::Hash;
use std::marker::PhantomData;

/// One batch's worth of per-key accumulators, produced by a
/// [`LocalAggregator`](crate::engine::LocalAggregator) flush and destroyed
/// when absorbed.
pub struct PartialAggregate<K, A> {
    entries: HashMap<K, A>,
    observed: u64,
}

impl<K, A> PartialAggregate<K, A> {
    pub(crate) fn new(entries: HashMap<K, A>, observed: u64) -> Self {
        Self { entries, observed }
    }

    /// Distinct keys in this batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Increments observed by the batch (not distinct keys).
    #[must_use]
    pub fn observed(&self) -> u64 {
        self.observed
    }
}

/// Accumulates partial aggregates into the global per-key totals.
pub struct MergeEngine<K, V, F: AggregateFn<V>> {
    agg: F,
    totals: HashMap<K, F::Acc>,
    observed: u64,
    _marker: PhantomData<V>,
}

impl<K, V, F> MergeEngine<K, V, F>
where
    K: Eq + Hash,
    F: AggregateFn<V>,
{
    pub fn new(agg: F) -> Self {
        Self {
            agg,
            totals: HashMap::new(),
            observed: 0,
            _marker: PhantomData,
        }
    }

    /// Merge one partial aggregate into the global totals.
    pub fn absorb(&mut self, partial: PartialAggregate<K, F::Acc>) {
        self.observed += partial.observed;
        for (key, acc) in partial.entries {
            match self.totals.entry(key) {
                hash_map::Entry::Occupied(mut e) => self.agg.merge(e.get_mut(), acc),
                hash_map::Entry::Vacant(e) => {
                    e.insert(acc);
                }
            }
        }
    }

    /// Fold a single increment directly, bypassing local pre-aggregation.
    ///
    /// Equivalent to absorbing a one-entry partial; exists so the combiner
    /// stays optional.
    pub fn observe(&mut self, key: K, value: V) {
        self.observed += 1;
        let acc = self
            .totals
            .entry(key)
            .or_insert_with(|| self.agg.create());
        self.agg.add_input(acc, value);
    }

    /// Declare end-of-stream: finish every accumulator and return the only
    /// readable view. Consuming `self` is what makes "no decision before all
    /// input is consumed" unrepresentable.
    pub fn seal(self) -> SealedAggregate<K, F::Out> {
        let agg = self.agg;
        let entries = self
            .totals
            .into_iter()
            .map(|(k, acc)| (k, agg.finish(acc)))
            .collect();
        SealedAggregate {
            entries,
            observed: self.observed,
        }
    }
}

/// The final, read-only per-key totals. There is no way back to an
/// accumulating state.
pub struct SealedAggregate<K, O> {
    entries: HashMap<K, O>,
    observed: u64,
}

impl<K, O> SealedAggregate<K, O>
where
    K: Eq + Hash,
{
    /// Total increments that contributed, across every batch.
    #[must_use]
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Final output value for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&O> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &O)> {
        self.entries.iter()
    }

    /// Consume into the raw `(key, output)` pairs, unordered.
    #[must_use]
    pub fn into_entries(self) -> Vec<(K, O)> {
        self.entries.into_iter().collect()
    }
}
