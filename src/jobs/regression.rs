//! Ordinary least squares over the cleaned dataset.
//!
//! The terminal stage: fit `y = b0 + b1*x1 + ... + bp*xp` over a numeric
//! design matrix and report the coefficients, R², and adjusted R². The
//! system is solved through the normal equations with Gaussian elimination;
//! the matrices involved are `(p+1) x (p+1)` for a handful of features, so
//! no external solver is warranted.

use crate::error::JobError;
use crate::record::Record;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// A fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Intercept first, then one coefficient per feature column.
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub observations: usize,
}

/// Parse rows into a numeric matrix (last column is the target) and fit.
///
/// # Errors
/// [`JobError::Conversion`] for any non-numeric cell — the fit needs every
/// observation, so this is not skippable — plus the shape errors of
/// [`fit_ols`].
pub fn fit_rows(rows: &[Record], has_header: bool) -> Result<FitReport> {
    let data = if has_header { rows.get(1..).unwrap_or(&[]) } else { rows };
    let offset = if has_header { 2 } else { 1 };

    let mut features = Vec::with_capacity(data.len());
    let mut targets = Vec::with_capacity(data.len());
    for (i, rec) in data.iter().enumerate() {
        let line = i as u64 + offset;
        if rec.len() < 2 {
            return Err(JobError::MalformedRecord {
                line,
                expected: 2,
                found: rec.len(),
            }
            .into());
        }
        let mut row = Vec::with_capacity(rec.len() - 1);
        for (column, cell) in rec.fields().iter().enumerate() {
            let value: f64 = cell.trim().parse().map_err(|_| JobError::Conversion {
                line,
                column,
                value: cell.clone(),
            })?;
            if column + 1 == rec.len() {
                targets.push(value);
            } else {
                row.push(value);
            }
        }
        features.push(row);
    }
    fit_ols(&features, &targets)
}

/// Fit by ordinary least squares, intercept included.
///
/// # Errors
/// Returns an error on empty or ragged input, on fewer observations than
/// `features + 2` (adjusted R² would be undefined), on a constant target
/// (R² undefined), or on a singular normal system (collinear features).
pub fn fit_ols(features: &[Vec<f64>], targets: &[f64]) -> Result<FitReport> {
    let n = targets.len();
    if n == 0 || features.len() != n {
        bail!(
            "design matrix has {} rows but target vector has {n}",
            features.len()
        );
    }
    let p = features[0].len();
    if features.iter().any(|row| row.len() != p) {
        bail!("design matrix rows have inconsistent widths");
    }
    if n < p + 2 {
        bail!("need at least {} observations to fit {p} features, got {n}", p + 2);
    }

    // Accumulate X'X and X'y directly; X gains a leading intercept column.
    let dim = p + 1;
    let mut xtx = vec![vec![0.0f64; dim]; dim];
    let mut xty = vec![0.0f64; dim];
    for (row, &y) in features.iter().zip(targets) {
        let mut x = Vec::with_capacity(dim);
        x.push(1.0);
        x.extend_from_slice(row);
        for i in 0..dim {
            for j in 0..dim {
                xtx[i][j] += x[i] * x[j];
            }
            xty[i] += x[i] * y;
        }
    }

    let coefficients = solve(xtx, xty).context("solve normal equations")?;

    let mean_y = targets.iter().sum::<f64>() / n as f64;
    let mut sse = 0.0;
    let mut sst = 0.0;
    for (row, &y) in features.iter().zip(targets) {
        let mut predicted = coefficients[0];
        for (j, &x) in row.iter().enumerate() {
            predicted += coefficients[j + 1] * x;
        }
        sse += (y - predicted).powi(2);
        sst += (y - mean_y).powi(2);
    }
    if sst == 0.0 {
        bail!("target vector is constant; R\u{b2} is undefined");
    }

    let r_squared = 1.0 - sse / sst;
    let adj_r_squared =
        1.0 - (1.0 - r_squared) * (n as f64 - 1.0) / (n as f64 - p as f64 - 1.0);
    Ok(FitReport {
        coefficients,
        r_squared,
        adj_r_squared,
        observations: n,
    })
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let dim = b.len();
    for col in 0..dim {
        let pivot = (col..dim)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot][col].abs() < f64::EPSILON {
            bail!("normal system is singular (collinear features)");
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..dim {
            let factor = a[row][col] / a[col][col];
            for k in col..dim {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0f64; dim];
    for col in (0..dim).rev() {
        let mut sum = b[col];
        for k in col + 1..dim {
            sum -= a[col][k] * x[k];
        }
        x[col] = sum / a[col][col];
    }
    Ok(x)
}
