//! Per-key aggregation functions.
//!
//! An [`AggregateFn`] describes how per-key values fold into an accumulator
//! and how accumulators from different shards merge. `merge` must be
//! associative and commutative with `create()` as identity; the engine relies
//! on this to make results independent of shard boundaries and merge order.
//!
//! Three implementations cover the job variants:
//! - [`Occurrences`] -- count how many times each key was seen.
//! - [`TotalOf`] -- sum a derived numeric value per key.
//! - [`CountWithWitness`] -- count occurrences and retain one representative
//!   record, so unique rows can be re-emitted in their original shape.

use crate::record::Record;

/// A combiner: fold values into an accumulator, merge accumulators, finish.
pub trait AggregateFn<V>: Send + Sync {
    /// Partial state, owned by one shard until merged.
    type Acc: Send;
    /// Final per-key output produced at seal time.
    type Out;

    /// A fresh accumulator (the merge identity).
    fn create(&self) -> Self::Acc;

    /// Fold one value into an accumulator.
    fn add_input(&self, acc: &mut Self::Acc, value: V);

    /// Merge another shard's accumulator into this one.
    fn merge(&self, acc: &mut Self::Acc, other: Self::Acc);

    /// Turn the final accumulator into the output value.
    fn finish(&self, acc: Self::Acc) -> Self::Out;
}

/// Counts occurrences per key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Occurrences;

impl<V> AggregateFn<V> for Occurrences {
    type Acc = u64;
    type Out = u64;

    fn create(&self) -> u64 {
        0
    }

    fn add_input(&self, acc: &mut u64, _value: V) {
        *acc += 1;
    }

    fn merge(&self, acc: &mut u64, other: u64) {
        *acc += other;
    }

    fn finish(&self, acc: u64) -> u64 {
        acc
    }
}

/// Sums a derived numeric value per key.
#[derive(Clone, Copy, Debug, Default)]
pub struct TotalOf;

impl AggregateFn<i64> for TotalOf {
    type Acc = i64;
    type Out = i64;

    fn create(&self) -> i64 {
        0
    }

    fn add_input(&self, acc: &mut i64, value: i64) {
        *acc += value;
    }

    fn merge(&self, acc: &mut i64, other: i64) {
        *acc += other;
    }

    fn finish(&self, acc: i64) -> i64 {
        acc
    }
}

/// Accumulator for [`CountWithWitness`]: occurrence count plus the first
/// record observed for the key.
#[derive(Debug, Clone)]
pub struct WitnessAcc {
    pub count: u64,
    witness: Option<Record>,
}

/// Counts occurrences and keeps one representative record per key.
///
/// On merge the already-held witness wins. Emission only ever happens at
/// count 1 (see [`emit_witnesses`](crate::filter::emit_witnesses)), where the
/// witness is the sole record, so which witness survives a merge is
/// unobservable in the output.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountWithWitness;

impl AggregateFn<Record> for CountWithWitness {
    type Acc = WitnessAcc;
    type Out = (u64, Record);

    fn create(&self) -> WitnessAcc {
        WitnessAcc {
            count: 0,
            witness: None,
        }
    }

    fn add_input(&self, acc: &mut WitnessAcc, value: Record) {
        acc.count += 1;
        acc.witness.get_or_insert(value);
    }

    fn merge(&self, acc: &mut WitnessAcc, other: WitnessAcc) {
        acc.count += other.count;
        if acc.witness.is_none() {
            acc.witness = other.witness;
        }
    }

    fn finish(&self, acc: WitnessAcc) -> (u64, Record) {
        let witness = acc
            .witness
            .expect("witness present once a key has been observed");
        (acc.count, witness)
    }
}
