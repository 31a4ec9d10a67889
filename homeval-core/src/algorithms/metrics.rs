//! Regression scoring.

use serde::{Deserialize, Serialize};

/// Metric record for a trained model on its held-out test split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub r2: f64,
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
}

impl RegressionMetrics {
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Self {
        let mse = mean_squared_error(y_true, y_pred);
        Self {
            r2: r2_score(y_true, y_pred),
            mae: mean_absolute_error(y_true, y_pred),
            mse,
            rmse: mse.sqrt(),
        }
    }
}

/// Coefficient of determination. A constant target scores 1.0 only for a
/// perfect fit, 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit() {
        let y = [1.0, 2.0, 3.0];
        let m = RegressionMetrics::compute(&y, &y);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
    }

    #[test]
    fn test_mean_predictor_scores_zero() {
        let y = [1.0, 2.0, 3.0];
        let pred = [2.0, 2.0, 2.0];
        assert!(r2_score(&y, &pred).abs() < 1e-12);
    }

    #[test]
    fn test_known_values() {
        let y = [3.0, -0.5, 2.0, 7.0];
        let pred = [2.5, 0.0, 2.0, 8.0];
        assert!((r2_score(&y, &pred) - 0.9486081370449679).abs() < 1e-12);
        assert!((mean_absolute_error(&y, &pred) - 0.5).abs() < 1e-12);
        assert!((mean_squared_error(&y, &pred) - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_constant_target() {
        let y = [5.0, 5.0];
        assert_eq!(r2_score(&y, &[5.0, 5.0]), 1.0);
        assert_eq!(r2_score(&y, &[4.0, 6.0]), 0.0);
    }
}
