//! Testing utilities.
//!
//! Small builders and assertions used across the integration suite.

use crate::record::{Record, parse_line};
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

/// Parse one CSV line per entry into records; panics on bad test input.
#[must_use]
pub fn rows(lines: &[&str]) -> Vec<Record> {
    lines
        .iter()
        .map(|line| parse_line(line).expect("test row must parse"))
        .collect()
}

/// Assert that two collections contain the same elements, ignoring order.
///
/// # Panics
///
/// Panics with the missing/extra elements if the collections differ.
pub fn assert_unordered_equal<T: Debug + Eq + Hash>(actual: &[T], expected: &[T]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "length mismatch:\n  expected: {expected:?}\n  actual:   {actual:?}"
    );
    let actual_set: HashSet<_> = actual.iter().collect();
    let expected_set: HashSet<_> = expected.iter().collect();
    if actual_set != expected_set {
        let missing: Vec<_> = expected_set.difference(&actual_set).collect();
        let extra: Vec<_> = actual_set.difference(&expected_set).collect();
        panic!("content mismatch:\n  missing: {missing:?}\n  extra: {extra:?}");
    }
}

/// Assert keyed counts match, comparing sorted by key.
///
/// # Panics
///
/// Panics if the pair lists differ after sorting.
pub fn assert_keyed_counts(actual: &[(String, u64)], expected: &[(&str, u64)]) {
    let mut actual: Vec<(&str, u64)> = actual.iter().map(|(k, c)| (k.as_str(), *c)).collect();
    let mut expected = expected.to_vec();
    actual.sort();
    expected.sort();
    assert_eq!(actual, expected);
}
