use rowmill::HeaderMode;
use rowmill::jobs::features::{
    ColumnConversion, EmptyCell, TransformSpec, audit_empty, convert_units,
};
use rowmill::testing::rows;

const HEADER: &str =
    "POSTED_BY,UNDER_CONSTRUCTION,RERA,BHK_NO.,BHK_OR_RK,SQUARE_FT,READY_TO_MOVE,RESALE,ADDRESS,LONGITUDE,LATITUDE,TARGET(PRICE_IN_LACS)";

#[test]
fn house_preset_converts_and_drops() -> anyhow::Result<()> {
    let input = rows(&[
        HEADER,
        "Owner,0,0,2,BHK,1076.39104,1,1,\"Ksfc Layout,Bangalore\",12.96991,77.59796,94.94",
    ]);

    let out = convert_units(input, &TransformSpec::house_prices())?;
    assert_eq!(out.rows.len(), 2);

    // Header: relabeled columns, BHK_OR_RK gone.
    let header = &out.rows[0];
    assert_eq!(header.len(), 11);
    assert_eq!(header.get(4), Some("SQUARE_M"));
    assert_eq!(header.get(10), Some("TARGET(PRICE_IN_GBP)"));
    assert!(!header.fields().contains(&"BHK_OR_RK".to_string()));

    // Data row: same width, converted values.
    let row = &out.rows[1];
    assert_eq!(row.len(), 11);
    let square_m: f64 = row.get(4).unwrap().parse()?;
    assert!((square_m - 100.0).abs() < 1e-9);
    let price_gbp: f64 = row.get(10).unwrap().parse()?;
    assert!((price_gbp - 100_000.0).abs() < 1e-6);
    // Quoted address survives untouched.
    assert_eq!(row.get(7), Some("Ksfc Layout,Bangalore"));
    Ok(())
}

#[test]
fn non_numeric_cell_is_skipped_and_reported() -> anyhow::Result<()> {
    let input = rows(&[
        HEADER,
        "Owner,0,0,2,BHK,not-a-number,1,1,addr,12.9,77.5,94.94",
        "Dealer,0,0,3,BHK,2152.78208,1,1,addr,12.9,77.5,189.88",
    ]);

    let out = convert_units(input, &TransformSpec::house_prices())?;
    // Header plus the one good row.
    assert_eq!(out.rows.len(), 2);
    assert_eq!(out.summary.records_seen, 3);
    assert_eq!(out.summary.records_skipped, 1);
    assert!(matches!(
        out.summary.errors[0],
        rowmill::JobError::Conversion { line: 2, column: 5, .. }
    ));
    Ok(())
}

#[test]
fn non_numeric_cell_aborts_under_fail_fast() {
    let input = rows(&[HEADER, "Owner,0,0,2,BHK,oops,1,1,addr,12.9,77.5,94.94"]);
    let mut spec = TransformSpec::house_prices();
    spec.fail_fast = true;
    assert!(convert_units(input, &spec).is_err());
}

#[test]
fn short_row_is_malformed() -> anyhow::Result<()> {
    let input = rows(&[HEADER, "Owner,0,0"]);
    let out = convert_units(input, &TransformSpec::house_prices())?;
    assert_eq!(out.rows.len(), 1);
    assert!(matches!(
        out.summary.errors[0],
        rowmill::JobError::MalformedRecord { line: 2, expected: 12, found: 3 }
    ));
    Ok(())
}

#[test]
fn passthrough_mode_converts_every_row() -> anyhow::Result<()> {
    let spec = TransformSpec {
        conversions: vec![ColumnConversion {
            column: 1,
            divisor: 2.0,
            multiplier: 1.0,
            relabel: "HALVED".to_string(),
        }],
        drop_columns: vec![],
        header_mode: HeaderMode::Passthrough,
        fail_fast: true,
    };
    let out = convert_units(rows(&["a,10", "b,3"]), &spec)?;
    assert_eq!(out.rows[0].get(1), Some("5"));
    assert_eq!(out.rows[1].get(1), Some("1.5"));
    Ok(())
}

#[test]
fn zero_divisor_is_a_configuration_error() {
    let spec = TransformSpec {
        conversions: vec![ColumnConversion {
            column: 0,
            divisor: 0.0,
            multiplier: 1.0,
            relabel: String::new(),
        }],
        drop_columns: vec![],
        header_mode: HeaderMode::Passthrough,
        fail_fast: false,
    };
    assert!(convert_units(rows(&["1"]), &spec).is_err());
}

#[test]
fn audit_reports_empty_cells_by_position() {
    let input = rows(&["a,,c", "d,e,f", " ,g"]);
    let cells = audit_empty(&input);
    assert_eq!(
        cells,
        vec![
            EmptyCell { line: 1, column: 1 },
            EmptyCell { line: 3, column: 0 },
        ]
    );
}

#[test]
fn audit_of_clean_rows_is_empty() {
    assert!(audit_empty(&rows(&["a,b", "c,d"])).is_empty());
}
