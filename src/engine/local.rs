//! Shard-local pre-aggregation (the combiner).

use crate::aggregate::AggregateFn;
use crate::engine::merge::PartialAggregate;
use std::collections::HashMap;
use std::hash::Hash;
use std::marker::PhantomData;
use std::mem::take;

/// Accumulates `(key, value)` increments for one batch.
///
/// Owned exclusively by one worker; never shared. Emits nothing until
/// [`flush`](LocalAggregator::flush), which yields the complete partial
/// aggregate for the batch and resets the aggregator for the next one.
/// Pre-aggregating here is purely a volume optimization: feeding increments
/// straight to the merge engine yields identical final results.
pub struct LocalAggregator<K, V, F: AggregateFn<V>> {
    agg: F,
    entries: HashMap<K, F::Acc>,
    observed: u64,
    _marker: PhantomData<V>,
}

impl<K, V, F> LocalAggregator<K, V, F>
where
    K: Eq + Hash,
    F: AggregateFn<V>,
{
    pub fn new(agg: F) -> Self {
        Self {
            agg,
            entries: HashMap::new(),
            observed: 0,
            _marker: PhantomData,
        }
    }

    /// Fold one increment into the batch.
    pub fn observe(&mut self, key: K, value: V) {
        self.observed += 1;
        let acc = self
            .entries
            .entry(key)
            .or_insert_with(|| self.agg.create());
        self.agg.add_input(acc, value);
    }

    /// Distinct keys seen in the current batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End the batch: yield its complete partial aggregate and reset.
    pub fn flush(&mut self) -> PartialAggregate<K, F::Acc> {
        let entries = take(&mut self.entries);
        let observed = self.observed;
        self.observed = 0;
        PartialAggregate::new(entries, observed)
    }
}
