//! Stateless per-record feature transforms.
//!
//! [`convert_units`] rewrites designated numeric columns by a fixed formula,
//! drops columns, and relabels the header row; [`audit_empty`] reports the
//! position of every empty cell. Both are plain per-record maps feeding (or
//! reading) the grouping engine's dataset; neither holds cross-record state.

use crate::config::HeaderMode;
use crate::error::JobError;
use crate::record::Record;
use crate::summary::RunSummary;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Square feet per square meter.
pub const SQFT_PER_SQUARE_METER: f64 = 10.7639104;
/// Price-conversion divisor: Indian rupees (in lacs) per British pound.
pub const INR_LACS_PER_GBP: f64 = 94.94;
/// One lac, to rescale lac-denominated prices to whole currency units.
pub const LACS_SCALE: f64 = 100_000.0;

/// Rewrite one column: `value / divisor * multiplier`, with a replacement
/// header label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConversion {
    pub column: usize,
    pub divisor: f64,
    pub multiplier: f64,
    pub relabel: String,
}

/// Full description of a transform stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformSpec {
    pub conversions: Vec<ColumnConversion>,
    /// Columns removed from the output, as indices into the *original* row
    /// layout. Conversions are applied first, drops after.
    pub drop_columns: Vec<usize>,
    pub header_mode: HeaderMode,
    pub fail_fast: bool,
}

impl TransformSpec {
    /// The housing-dataset preset: square feet to square meters, lac-rupee
    /// prices to pounds, and the BHK_OR_RK column dropped.
    #[must_use]
    pub fn house_prices() -> Self {
        Self {
            conversions: vec![
                ColumnConversion {
                    column: 5,
                    divisor: SQFT_PER_SQUARE_METER,
                    multiplier: 1.0,
                    relabel: "SQUARE_M".to_string(),
                },
                ColumnConversion {
                    column: 11,
                    divisor: INR_LACS_PER_GBP,
                    multiplier: LACS_SCALE,
                    relabel: "TARGET(PRICE_IN_GBP)".to_string(),
                },
            ],
            drop_columns: vec![4],
            header_mode: HeaderMode::Relabel,
            fail_fast: false,
        }
    }

    fn validate(&self) -> Result<(), JobError> {
        for conv in &self.conversions {
            if conv.divisor == 0.0 {
                return Err(JobError::configuration(format!(
                    "conversion for column {} has a zero divisor",
                    conv.column
                )));
            }
        }
        Ok(())
    }

    /// The minimum width a data row needs for every conversion to apply.
    fn min_fields(&self) -> usize {
        self.conversions
            .iter()
            .map(|c| c.column + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Output of [`convert_units`].
pub struct Transformed {
    pub rows: Vec<Record>,
    pub summary: RunSummary,
}

/// Apply a [`TransformSpec`] to every row.
///
/// With [`HeaderMode::Relabel`] the first row gets the conversions' labels
/// instead of numeric rewriting; with [`HeaderMode::Skip`] it passes through
/// with only the column drops applied; with [`HeaderMode::Passthrough`]
/// there is no header and every row converts. Rows that are too short or
/// hold non-numeric cells in a conversion column are skipped and counted,
/// or abort the run under `fail_fast`.
///
/// # Errors
/// Fatal configuration errors, or the first bad row when `fail_fast` is set.
pub fn convert_units(rows: Vec<Record>, spec: &TransformSpec) -> Result<Transformed> {
    spec.validate()?;
    let mut summary = RunSummary::default();
    let mut out = Vec::with_capacity(rows.len());

    for (i, rec) in rows.into_iter().enumerate() {
        let line = i as u64 + 1;
        summary.records_seen += 1;

        let is_header = i == 0 && spec.header_mode != HeaderMode::Passthrough;
        let converted = if is_header {
            Ok(transform_header(rec, spec))
        } else {
            transform_row(line, rec, spec)
        };
        match converted {
            Ok(rec) => out.push(rec),
            Err(err) if spec.fail_fast => return Err(err.into()),
            Err(err) => summary.note_skip(err),
        }
    }

    summary.groups_emitted = out.len() as u64;
    Ok(Transformed { rows: out, summary })
}

fn transform_header(rec: Record, spec: &TransformSpec) -> Record {
    let mut fields = rec.into_fields();
    if spec.header_mode == HeaderMode::Relabel {
        for conv in &spec.conversions {
            if let Some(label) = fields.get_mut(conv.column) {
                *label = conv.relabel.clone();
            }
        }
    }
    drop_columns(&mut fields, &spec.drop_columns);
    Record::new(fields)
}

fn transform_row(line: u64, rec: Record, spec: &TransformSpec) -> Result<Record, JobError> {
    let needed = spec.min_fields();
    if rec.len() < needed {
        return Err(JobError::MalformedRecord {
            line,
            expected: needed,
            found: rec.len(),
        });
    }
    let mut fields = rec.into_fields();
    for conv in &spec.conversions {
        let cell = &fields[conv.column];
        let value: f64 = cell.trim().parse().map_err(|_| JobError::Conversion {
            line,
            column: conv.column,
            value: cell.clone(),
        })?;
        fields[conv.column] = format!("{}", value / conv.divisor * conv.multiplier);
    }
    drop_columns(&mut fields, &spec.drop_columns);
    Ok(Record::new(fields))
}

fn drop_columns(fields: &mut Vec<String>, drops: &[usize]) {
    let mut drops: Vec<usize> = drops.iter().copied().filter(|&c| c < fields.len()).collect();
    drops.sort_unstable();
    drops.dedup();
    for &col in drops.iter().rev() {
        fields.remove(col);
    }
}

/// One empty cell found by [`audit_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyCell {
    /// 1-based line number.
    pub line: u64,
    /// 0-based column index.
    pub column: usize,
}

/// Report every cell that is empty after trimming, in row order.
#[must_use]
pub fn audit_empty(rows: &[Record]) -> Vec<EmptyCell> {
    let mut out = Vec::new();
    for (i, rec) in rows.iter().enumerate() {
        for (column, field) in rec.fields().iter().enumerate() {
            if field.trim().is_empty() {
                out.push(EmptyCell {
                    line: i as u64 + 1,
                    column,
                });
            }
        }
    }
    out
}
