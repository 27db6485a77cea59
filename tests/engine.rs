use rowmill::{LocalAggregator, MergeEngine, Occurrences, run_sharded};
use std::collections::BTreeMap;

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn sealed_map(sealed: rowmill::SealedAggregate<String, u64>) -> BTreeMap<String, u64> {
    sealed.into_entries().into_iter().collect()
}

#[test]
fn local_aggregator_flush_resets() {
    let mut local = LocalAggregator::new(Occurrences);
    local.observe("a".to_string(), ());
    local.observe("a".to_string(), ());
    local.observe("b".to_string(), ());
    assert_eq!(local.len(), 2);

    let first = local.flush();
    assert_eq!(first.len(), 2);
    assert_eq!(first.observed(), 3);
    assert!(local.is_empty());

    // A fresh batch starts from zero.
    local.observe("a".to_string(), ());
    let second = local.flush();
    assert_eq!(second.len(), 1);
    assert_eq!(second.observed(), 1);
}

#[test]
fn combiner_is_optional() {
    // Feeding increments straight into the merge engine must equal the
    // local-aggregate-then-absorb path.
    let input = keys(&["x", "y", "x", "x", "z", "y"]);

    let mut direct = MergeEngine::new(Occurrences);
    for k in &input {
        direct.observe(k.clone(), ());
    }

    let mut local = LocalAggregator::new(Occurrences);
    let mut combined: MergeEngine<_, (), _> = MergeEngine::new(Occurrences);
    for (i, k) in input.iter().enumerate() {
        local.observe(k.clone(), ());
        if i % 2 == 1 {
            combined.absorb(local.flush());
        }
    }
    combined.absorb(local.flush());

    assert_eq!(sealed_map(direct.seal()), sealed_map(combined.seal()));
}

#[test]
fn merge_order_does_not_matter() {
    let batches = [
        keys(&["a", "b", "a"]),
        keys(&["b", "c"]),
        keys(&["a", "c", "c", "c"]),
    ];

    let partials = |order: &[usize]| {
        let mut engine: MergeEngine<_, (), _> = MergeEngine::new(Occurrences);
        for &i in order {
            let mut local = LocalAggregator::new(Occurrences);
            for k in &batches[i] {
                local.observe(k.clone(), ());
            }
            engine.absorb(local.flush());
        }
        sealed_map(engine.seal())
    };

    let forward = partials(&[0, 1, 2]);
    let reversed = partials(&[2, 1, 0]);
    let rotated = partials(&[1, 2, 0]);
    assert_eq!(forward, reversed);
    assert_eq!(forward, rotated);
    assert_eq!(forward.get("a"), Some(&3));
    assert_eq!(forward.get("b"), Some(&2));
    assert_eq!(forward.get("c"), Some(&4));
}

#[test]
fn counts_are_conserved() {
    let input = keys(&["p", "q", "p", "r", "p", "q"]);
    let mut naive: BTreeMap<String, u64> = BTreeMap::new();
    for k in &input {
        *naive.entry(k.clone()).or_insert(0) += 1;
    }

    let outcome = run_sharded(input, 3, false, Occurrences, |k: &String| {
        Ok((k.clone(), ()))
    })
    .unwrap();
    assert_eq!(sealed_map(outcome.sealed), naive);
    assert_eq!(outcome.summary.records_seen, 6);
    assert_eq!(outcome.summary.records_skipped, 0);
}

#[test]
fn shard_count_does_not_change_totals() -> anyhow::Result<()> {
    let input: Vec<String> = (0..200).map(|i| format!("k{}", i % 17)).collect();

    let single = run_sharded(input.clone(), 1, false, Occurrences, |k: &String| {
        Ok((k.clone(), ()))
    })?;
    let many = run_sharded(input, 13, false, Occurrences, |k: &String| {
        Ok((k.clone(), ()))
    })?;

    assert_eq!(sealed_map(single.sealed), sealed_map(many.sealed));
    Ok(())
}

#[test]
fn sealed_aggregate_reports_observed_total() -> anyhow::Result<()> {
    let input = keys(&["a", "a", "b"]);
    let outcome = run_sharded(input, 2, false, Occurrences, |k: &String| {
        Ok((k.clone(), ()))
    })?;
    assert_eq!(outcome.sealed.observed(), 3);
    assert_eq!(outcome.sealed.len(), 2);
    assert_eq!(outcome.sealed.get(&"a".to_string()), Some(&2));
    assert_eq!(outcome.sealed.get(&"missing".to_string()), None);
    Ok(())
}

#[test]
fn empty_input_seals_empty() -> anyhow::Result<()> {
    let outcome = run_sharded(Vec::<String>::new(), 4, false, Occurrences, |k: &String| {
        Ok((k.clone(), ()))
    })?;
    assert!(outcome.sealed.is_empty());
    assert_eq!(outcome.summary.records_seen, 0);
    Ok(())
}

#[test]
fn fail_fast_aborts_without_output() {
    let input = keys(&["good", "bad", "good"]);
    let result = run_sharded(input, 1, true, Occurrences, |k: &String| {
        if k == "bad" {
            Err(rowmill::JobError::MalformedRecord {
                line: 2,
                expected: 3,
                found: 1,
            })
        } else {
            Ok((k.clone(), ()))
        }
    });
    assert!(result.is_err());
}

#[test]
fn skipped_records_are_counted_not_aggregated() -> anyhow::Result<()> {
    let input = keys(&["good", "bad", "good", "bad"]);
    let outcome = run_sharded(input, 2, false, Occurrences, |k: &String| {
        if k == "bad" {
            Err(rowmill::JobError::MalformedRecord {
                line: 0,
                expected: 3,
                found: 1,
            })
        } else {
            Ok((k.clone(), ()))
        }
    })?;
    assert_eq!(outcome.summary.records_seen, 4);
    assert_eq!(outcome.summary.records_skipped, 2);
    assert_eq!(outcome.sealed.len(), 1);
    assert_eq!(outcome.sealed.get(&"good".to_string()), Some(&2));
    Ok(())
}
