//! Linear and ridge regression via the normal equations.

use crate::algorithms::Regressor;
use crate::data::matrix::Matrix;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Ordinary (or L2-regularized) least-squares fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Ordinary least squares.
    pub fn fit(x: &Matrix, y: &[f64]) -> Result<Self, PipelineError> {
        Self::fit_regularized(x, y, 0.0)
    }

    /// Ridge regression; `alpha` penalizes every weight except the
    /// intercept. `alpha = 0` is plain least squares.
    pub fn fit_regularized(x: &Matrix, y: &[f64], alpha: f64) -> Result<Self, PipelineError> {
        let n = x.n_rows();
        if n == 0 || n != y.len() {
            return Err(PipelineError::training(format!(
                "design matrix has {n} rows for {} targets",
                y.len()
            )));
        }
        let p = x.n_cols() + 1;

        // Normal equations over the intercept-augmented design matrix.
        let mut xtx = vec![vec![0.0f64; p]; p];
        let mut xty = vec![0.0f64; p];
        for (i, row) in x.iter_rows().enumerate().take(n) {
            let mut aug = Vec::with_capacity(p);
            aug.push(1.0);
            aug.extend_from_slice(row);
            for a in 0..p {
                xty[a] += aug[a] * y[i];
                for b in a..p {
                    xtx[a][b] += aug[a] * aug[b];
                }
            }
        }
        for a in 0..p {
            for b in 0..a {
                xtx[a][b] = xtx[b][a];
            }
        }
        for (a, row) in xtx.iter_mut().enumerate().skip(1) {
            row[a] += alpha;
        }

        let weights = solve(xtx, xty)?;
        Ok(Self {
            intercept: weights[0],
            coefficients: weights[1..].to_vec(),
        })
    }
}

impl Regressor for LinearRegression {
    fn predict_row(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, f)| c * f)
                .sum::<f64>()
    }
}

/// Gaussian elimination with partial pivoting. Rejects singular systems,
/// which arise from perfectly collinear feature columns.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>, PipelineError> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-10 {
            return Err(PipelineError::training(
                "singular normal matrix (collinear feature columns)",
            ));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let (head, tail) = a.split_at_mut(col + 1);
        let pivot_row_vals = &head[col];
        let pivot_b = b[col];
        for (offset, row_vals) in tail.iter_mut().enumerate() {
            let factor = row_vals[col] / pivot_row_vals[col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                row_vals[k] -= factor * pivot_row_vals[k];
            }
            b[col + 1 + offset] -= factor * pivot_b;
        }
    }

    let mut x = vec![0.0f64; n];
    for row in (0..n).rev() {
        let mut sum = b[row];
        for k in row + 1..n {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_line() {
        // y = 3 + 2a - b
        let x = Matrix::from_rows(vec![
            vec![1.0, 0.0],
            vec![2.0, 1.0],
            vec![3.0, 5.0],
            vec![4.0, 2.0],
        ])
        .unwrap();
        let y: Vec<f64> = x.iter_rows().map(|r| 3.0 + 2.0 * r[0] - r[1]).collect();
        let model = LinearRegression::fit(&x, &y).unwrap();
        assert!((model.intercept - 3.0).abs() < 1e-8);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-8);
        assert!((model.coefficients[1] + 1.0).abs() < 1e-8);
        assert!((model.predict_row(&[5.0, 1.0]) - 12.0).abs() < 1e-8);
    }

    #[test]
    fn test_ridge_shrinks_coefficients() {
        let x = Matrix::from_rows(vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
        let y = vec![2.0, 4.0, 6.0, 8.0];
        let ols = LinearRegression::fit(&x, &y).unwrap();
        let ridge = LinearRegression::fit_regularized(&x, &y, 10.0).unwrap();
        assert!((ols.coefficients[0] - 2.0).abs() < 1e-8);
        assert!(ridge.coefficients[0] < ols.coefficients[0]);
        assert!(ridge.coefficients[0] > 0.0);
    }

    #[test]
    fn test_collinear_columns_rejected() {
        // Second column duplicates the first exactly.
        let x = Matrix::from_rows(vec![
            vec![1.0, 1.0],
            vec![2.0, 2.0],
            vec![3.0, 3.0],
        ])
        .unwrap();
        let y = vec![1.0, 2.0, 3.0];
        let err = LinearRegression::fit(&x, &y).unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
        // Regularization makes the same system solvable.
        assert!(LinearRegression::fit_regularized(&x, &y, 0.1).is_ok());
    }
}
