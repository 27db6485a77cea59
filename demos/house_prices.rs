//! End-to-end cleanup of a small housing dataset.
//!
//! Mirrors the full job chain:
//! 1. **Audit**: find empty cells
//! 2. **Flag**: which rows are duplicated, and how many times?
//! 3. **Count**: how many redundant rows overall?
//! 4. **Remove**: keep only rows that occur once
//! 5. **Convert**: square feet to square meters, lac-rupees to pounds
//! 6. **Fit**: least squares over a numeric view of the cleaned data
//!
//! Run with: cargo run --example house_prices

use anyhow::Result;
use rowmill::jobs::duplicates::{
    REPLICA_LABEL, count_replicas, flag_duplicates, remove_duplicates,
};
use rowmill::jobs::features::{TransformSpec, audit_empty, convert_units};
use rowmill::jobs::regression::fit_ols;
use rowmill::{HeaderMode, JobConfig, parse_line};

fn main() -> Result<()> {
    println!("Housing dataset cleanup\n");

    let raw = [
        "POSTED_BY,UNDER_CONSTRUCTION,RERA,BHK_NO.,BHK_OR_RK,SQUARE_FT,READY_TO_MOVE,RESALE,ADDRESS,LONGITUDE,LATITUDE,TARGET(PRICE_IN_LACS)",
        "Owner,0,0,2,BHK,1300.24,1,1,\"Ksfc Layout,Bangalore\",12.96991,77.59796,55.0",
        "Dealer,0,0,3,BHK,1850.0,1,1,\"Vishweshwara Nagar,Mysore\",12.27435,76.64454,100.5",
        "Owner,0,0,2,BHK,1300.24,1,1,\"Ksfc Layout,Bangalore\",12.96991,77.59796,55.0",
        "Owner,1,1,2,BHK,933.16,0,1,\"Sector-1 Vaishali,Ghaziabad\",28.64247,77.34137,62.0",
        "Builder,0,1,1,RK,545.0,1,0,,19.07283,72.88261,29.0",
    ];
    let rows: Vec<_> = raw
        .iter()
        .map(|line| parse_line(line))
        .collect::<Result<_>>()?;

    // =========================================================================
    // 1. Audit empty cells
    // =========================================================================
    println!("[audit] empty cells:");
    for cell in audit_empty(&rows) {
        println!("  line {}, column {}", cell.line, cell.column);
    }

    // =========================================================================
    // 2. Flag duplicated rows
    // =========================================================================
    let cfg = JobConfig {
        header_mode: HeaderMode::Skip,
        ..JobConfig::default()
    };
    let flags = flag_duplicates(rows.clone(), &cfg)?;
    println!("\n[flag] {} duplicated group(s):", flags.groups.len());
    for (key, count) in &flags.groups {
        println!("  {} -> {count}", key.replace('\u{1f}', ","));
    }

    // =========================================================================
    // 3. Count redundant rows
    // =========================================================================
    let counted = count_replicas(&flags.groups)?;
    println!("\n[count] {REPLICA_LABEL} {}", counted.replicas);

    // =========================================================================
    // 4. Remove duplicated rows
    // =========================================================================
    let deduped = remove_duplicates(rows, &cfg)?;
    println!("\n[remove] {} row(s) kept", deduped.rows.len() - 1);
    deduped.summary.print();

    // =========================================================================
    // 5. Convert units
    // =========================================================================
    let converted = convert_units(deduped.rows, &TransformSpec::house_prices())?;
    println!("[convert] first data row: {:?}", converted.rows[1].fields());

    // =========================================================================
    // 6. Fit a model over a numeric view (built-up area vs price)
    // =========================================================================
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for row in &converted.rows[1..] {
        let sqm: f64 = row.get(4).expect("SQUARE_M column").parse()?;
        let price: f64 = row.get(10).expect("price column").parse()?;
        xs.push(vec![sqm]);
        ys.push(price);
    }
    let report = fit_ols(&xs, &ys)?;
    println!(
        "\n[fit] price ~ {:.2} + {:.2} * square_m  (R2 = {:.4}, adjusted = {:.4})",
        report.coefficients[0], report.coefficients[1], report.r_squared, report.adj_r_squared
    );

    Ok(())
}
