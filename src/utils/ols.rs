//! Ordinary least squares on ordered regressor columns.
//!
//! Used by the ARIMAX backend to absorb exogenous regressors (regression
//! with ARIMA errors). Columns are positional, not named lookups: the break
//! encoder's column order carries meaning and must survive into the
//! coefficient vector.

use crate::core::ExogenousMatrix;
use crate::error::{ForecastError, Result};

/// Fitted OLS coefficients: `y ≈ intercept + Σ coefficients[i] * x_i`.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Intercept term.
    pub intercept: f64,
    /// One coefficient per regressor column, in column order.
    pub coefficients: Vec<f64>,
}

impl OlsFit {
    /// Evaluate the linear predictor on a regressor matrix with the same
    /// column layout as the fit.
    pub fn predict(&self, exog: &ExogenousMatrix) -> Result<Vec<f64>> {
        if exog.num_columns() != self.coefficients.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: exog.num_columns(),
            });
        }
        let mut predictions = vec![self.intercept; exog.rows()];
        for (coef, column) in self.coefficients.iter().zip(exog.columns()) {
            for (pred, &x) in predictions.iter_mut().zip(column.iter()) {
                *pred += coef * x;
            }
        }
        Ok(predictions)
    }

    /// Number of regressors.
    pub fn num_regressors(&self) -> usize {
        self.coefficients.len()
    }
}

/// Fit `y = intercept + X b` by solving the normal equations.
pub fn ols_fit(y: &[f64], exog: &ExogenousMatrix) -> Result<OlsFit> {
    let n = y.len();
    if n == 0 {
        return Err(ForecastError::EmptyData);
    }
    if exog.rows() != n {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: exog.rows(),
        });
    }

    let k = exog.num_columns();
    if k == 0 {
        // Intercept-only model: the mean.
        return Ok(OlsFit {
            intercept: y.iter().sum::<f64>() / n as f64,
            coefficients: vec![],
        });
    }

    // Augmented design: column 0 is the intercept.
    let dim = k + 1;
    let design_column = |j: usize, i: usize| -> f64 {
        if j == 0 {
            1.0
        } else {
            exog.columns()[j - 1][i]
        }
    };

    // Normal equations X'X b = X'y.
    let mut xtx = vec![vec![0.0; dim]; dim];
    let mut xty = vec![0.0; dim];
    for i in 0..n {
        for j in 0..dim {
            let xj = design_column(j, i);
            xty[j] += xj * y[i];
            for l in j..dim {
                xtx[j][l] += xj * design_column(l, i);
            }
        }
    }
    for j in 0..dim {
        for l in 0..j {
            xtx[j][l] = xtx[l][j];
        }
    }

    let solution = solve_linear_system(&mut xtx, &mut xty)?;

    Ok(OlsFit {
        intercept: solution[0],
        coefficients: solution[1..].to_vec(),
    })
}

/// Gaussian elimination with partial pivoting. Consumes its inputs.
fn solve_linear_system(a: &mut [Vec<f64>], b: &mut [f64]) -> Result<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        // Pivot on the largest remaining entry in this column.
        let pivot_row = (col..n)
            .max_by(|&r1, &r2| {
                a[r1][col]
                    .abs()
                    .partial_cmp(&a[r2][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);

        if a[pivot_row][col].abs() < 1e-12 {
            return Err(ForecastError::ComputationError(
                "singular design matrix in OLS (collinear regressors)".to_string(),
            ));
        }

        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for c in col..n {
                a[row][c] -= factor * a[col][c];
            }
            b[row] -= factor * b[col];
        }
    }

    // Back substitution.
    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for col in (row + 1)..n {
            sum -= a[row][col] * x[col];
        }
        x[row] = sum / a[row][row];
    }
    Ok(x)
}
