use rowmill::jobs::duplicates::{count_replicas, flag_duplicates, remove_duplicates};
use rowmill::testing::rows;
use rowmill::{Comparison, HeaderMode, JobConfig, Record};

#[test]
fn end_to_end_flag_count_remove() -> anyhow::Result<()> {
    let input = rows(&["x,1,2", "x,1,2", "y,9,9"]);

    // Flag: only the duplicated row's group comes out, with its multiplicity.
    let flags = flag_duplicates(input.clone(), &JobConfig::default())?;
    assert_eq!(flags.groups.len(), 1);
    assert_eq!(flags.groups[0].0, "x\u{1f}1\u{1f}2");
    assert_eq!(flags.groups[0].1, 2);
    assert_eq!(flags.summary.records_seen, 3);
    assert_eq!(flags.summary.distinct_keys, 2);
    assert_eq!(flags.summary.groups_emitted, 1);

    // Count: one scalar, the redundant-row total.
    let counted = count_replicas(&flags.groups)?;
    assert_eq!(counted.replicas, 1);

    // Remove: only the unique row survives, in its original shape.
    let deduped = remove_duplicates(input, &JobConfig::default())?;
    assert_eq!(deduped.rows, vec![Record::from_fields(["y", "9", "9"])]);
    Ok(())
}

#[test]
fn flagged_and_unique_keys_partition_the_key_space() -> anyhow::Result<()> {
    let input = rows(&["a,1", "b,2", "a,1", "c,3", "a,1", "b,2"]);

    let flags = flag_duplicates(input.clone(), &JobConfig::default())?;
    let deduped = remove_duplicates(input, &JobConfig::default())?;

    // 3 distinct keys total; duplicated ones flagged, the rest kept.
    assert_eq!(flags.groups.len() + deduped.rows.len(), 3);
    assert_eq!(flags.groups.len(), 2);
    assert_eq!(deduped.rows, vec![Record::from_fields(["c", "3"])]);
    Ok(())
}

#[test]
fn subset_key_groups_by_selected_fields() -> anyhow::Result<()> {
    let cfg = JobConfig {
        key_fields: vec![0],
        ..JobConfig::default()
    };
    let input = rows(&["a,1", "a,2", "b,3"]);

    let flags = flag_duplicates(input.clone(), &cfg)?;
    assert_eq!(flags.groups, vec![("a".to_string(), 2)]);

    let deduped = remove_duplicates(input, &cfg)?;
    assert_eq!(deduped.rows, vec![Record::from_fields(["b", "3"])]);
    Ok(())
}

#[test]
fn malformed_row_is_skipped_and_reported() -> anyhow::Result<()> {
    // A 12-field subset key against a 2-field row.
    let cfg = JobConfig {
        key_fields: (0..12).collect(),
        ..JobConfig::default()
    };
    let input = rows(&["a,b"]);

    let flags = flag_duplicates(input, &cfg)?;
    assert!(flags.groups.is_empty());
    assert_eq!(flags.summary.records_seen, 1);
    assert_eq!(flags.summary.records_skipped, 1);
    assert_eq!(flags.summary.distinct_keys, 0);
    assert_eq!(
        flags.summary.errors,
        vec![rowmill::JobError::MalformedRecord {
            line: 1,
            expected: 12,
            found: 2,
        }]
    );
    Ok(())
}

#[test]
fn malformed_row_aborts_under_fail_fast() {
    let cfg = JobConfig {
        key_fields: (0..12).collect(),
        fail_fast: true,
        ..JobConfig::default()
    };
    let input = rows(&["a,b", "c,d"]);
    assert!(flag_duplicates(input, &cfg).is_err());
}

#[test]
fn skip_header_keeps_row_zero_out_of_groups() -> anyhow::Result<()> {
    let cfg = JobConfig {
        header_mode: HeaderMode::Skip,
        ..JobConfig::default()
    };
    // The header equals a data row on purpose; skipping must not count it.
    let input = rows(&["a,b", "a,b", "c,d"]);

    let flags = flag_duplicates(input.clone(), &cfg)?;
    assert!(flags.groups.is_empty());

    let deduped = remove_duplicates(input, &cfg)?;
    assert_eq!(
        deduped.rows,
        vec![
            Record::from_fields(["a", "b"]),
            Record::from_fields(["a", "b"]),
            Record::from_fields(["c", "d"]),
        ]
    );
    Ok(())
}

#[test]
fn custom_threshold_and_comparison() -> anyhow::Result<()> {
    let cfg = JobConfig {
        threshold: 3,
        comparison: Comparison::AtLeast,
        ..JobConfig::default()
    };
    let input = rows(&["t,1", "t,1", "t,1", "u,2", "u,2"]);
    let flags = flag_duplicates(input, &cfg)?;
    assert_eq!(flags.groups, vec![("t\u{1f}1".to_string(), 3)]);
    Ok(())
}

#[test]
fn zero_threshold_is_a_configuration_error() {
    let cfg = JobConfig {
        threshold: 0,
        ..JobConfig::default()
    };
    assert!(flag_duplicates(rows(&["a,b"]), &cfg).is_err());
}

#[test]
fn duplicate_key_field_is_a_configuration_error() {
    let cfg = JobConfig {
        key_fields: vec![1, 1],
        ..JobConfig::default()
    };
    assert!(flag_duplicates(rows(&["a,b"]), &cfg).is_err());
}

#[test]
fn replica_counter_rejects_repeated_keys() {
    let flagged = vec![("k".to_string(), 2), ("k".to_string(), 3)];
    let err = count_replicas(&flagged).unwrap_err();
    assert!(err.to_string().contains("merge conflict"));
}

#[test]
fn replica_counter_sums_count_minus_one() -> anyhow::Result<()> {
    let flagged = vec![("a".to_string(), 2), ("b".to_string(), 5), ("c".to_string(), 3)];
    let counted = count_replicas(&flagged)?;
    assert_eq!(counted.replicas, 1 + 4 + 2);
    Ok(())
}

#[test]
fn empty_input_produces_empty_outputs() -> anyhow::Result<()> {
    let flags = flag_duplicates(Vec::new(), &JobConfig::default())?;
    assert!(flags.groups.is_empty());
    let deduped = remove_duplicates(Vec::new(), &JobConfig::default())?;
    assert!(deduped.rows.is_empty());
    let counted = count_replicas(&[])?;
    assert_eq!(counted.replicas, 0);
    Ok(())
}
