//! Regression algorithms — candidate parameterizations and fitted models.
//!
//! The trainer never names a concrete algorithm: it expands configured
//! [`selection::CandidateGrid`]s into [`RegressorParams`], fits each through
//! the uniform [`RegressorParams::fit`], and keeps whichever
//! [`FittedRegressor`] scores best.

pub mod forest;
pub mod linear;
pub mod metrics;
pub mod selection;
pub mod tree;

use crate::data::matrix::Matrix;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};

pub use forest::RandomForestRegressor;
pub use linear::LinearRegression;
pub use metrics::{RegressionMetrics, r2_score};
pub use selection::{ModelGridConfig, SelectionReport, select_best_model};
pub use tree::DecisionTreeRegressor;

/// Uniform prediction capability over fitted models.
pub trait Regressor {
    fn predict_row(&self, features: &[f64]) -> f64;

    fn predict(&self, x: &Matrix) -> Vec<f64> {
        x.iter_rows().map(|row| self.predict_row(row)).collect()
    }
}

/// One concrete candidate configuration, ready to fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegressorParams {
    LinearRegression,
    Ridge {
        alpha: f64,
    },
    DecisionTree {
        max_depth: usize,
        min_samples_split: usize,
    },
    RandomForest {
        n_trees: usize,
        max_depth: usize,
        min_samples_split: usize,
    },
}

impl RegressorParams {
    /// Fit this configuration on the given features and target.
    pub fn fit(&self, x: &Matrix, y: &[f64], seed: u64) -> Result<FittedRegressor, PipelineError> {
        match self {
            Self::LinearRegression => {
                Ok(FittedRegressor::Linear(LinearRegression::fit(x, y)?))
            }
            Self::Ridge { alpha } => Ok(FittedRegressor::Linear(
                LinearRegression::fit_regularized(x, y, *alpha)?,
            )),
            Self::DecisionTree {
                max_depth,
                min_samples_split,
            } => Ok(FittedRegressor::Tree(DecisionTreeRegressor::fit(
                x,
                y,
                *max_depth,
                *min_samples_split,
            )?)),
            Self::RandomForest {
                n_trees,
                max_depth,
                min_samples_split,
            } => Ok(FittedRegressor::Forest(RandomForestRegressor::fit(
                x,
                y,
                *n_trees,
                *max_depth,
                *min_samples_split,
                seed,
            )?)),
        }
    }

    /// Short human-readable label for logs and trial reports.
    pub fn label(&self) -> String {
        match self {
            Self::LinearRegression => "linear_regression".to_string(),
            Self::Ridge { alpha } => format!("ridge(alpha={alpha})"),
            Self::DecisionTree {
                max_depth,
                min_samples_split,
            } => format!("decision_tree(depth={max_depth},split={min_samples_split})"),
            Self::RandomForest {
                n_trees,
                max_depth,
                min_samples_split,
            } => format!(
                "random_forest(trees={n_trees},depth={max_depth},split={min_samples_split})"
            ),
        }
    }
}

/// A fitted model, serializable as part of the model bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FittedRegressor {
    Linear(LinearRegression),
    Tree(DecisionTreeRegressor),
    Forest(RandomForestRegressor),
}

impl Regressor for FittedRegressor {
    fn predict_row(&self, features: &[f64]) -> f64 {
        match self {
            Self::Linear(m) => m.predict_row(features),
            Self::Tree(m) => m.predict_row(features),
            Self::Forest(m) => m.predict_row(features),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_fit_dispatch() {
        let x = Matrix::from_rows(vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]]).unwrap();
        let y = vec![2.0, 4.0, 6.0, 8.0];
        for params in [
            RegressorParams::LinearRegression,
            RegressorParams::Ridge { alpha: 0.5 },
            RegressorParams::DecisionTree {
                max_depth: 3,
                min_samples_split: 2,
            },
            RegressorParams::RandomForest {
                n_trees: 5,
                max_depth: 3,
                min_samples_split: 2,
            },
        ] {
            let model = params.fit(&x, &y, 42).unwrap();
            let pred = model.predict_row(&[2.5]);
            assert!(pred.is_finite(), "{} predicted {pred}", params.label());
        }
    }

    #[test]
    fn test_fitted_regressor_serde_roundtrip() {
        let x = Matrix::from_rows(vec![vec![1.0], vec![2.0], vec![3.0]]).unwrap();
        let y = vec![1.0, 2.0, 3.0];
        let model = RegressorParams::LinearRegression.fit(&x, &y, 42).unwrap();
        let json = serde_json::to_string(&model).unwrap();
        assert!(json.contains("\"type\""));
        let restored: FittedRegressor = serde_json::from_str(&json).unwrap();
        assert_eq!(model.predict_row(&[2.0]), restored.predict_row(&[2.0]));
    }
}
