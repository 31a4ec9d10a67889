//! Candidate-model selection: grid expansion + validation-split scoring.

use crate::algorithms::metrics::r2_score;
use crate::algorithms::{Regressor, RegressorParams};
use crate::data::matrix::Matrix;
use crate::error::PipelineError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Candidate models and their hyperparameter grids, loaded from
/// `config/model.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelGridConfig {
    /// Fraction of the training matrix held out for candidate scoring.
    #[serde(default = "default_validation_fraction")]
    pub validation_fraction: f64,
    pub candidates: Vec<CandidateGrid>,
}

fn default_validation_fraction() -> f64 {
    0.2
}

impl ModelGridConfig {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("cannot read model grid {}: {e}", path.display()))
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// A named candidate with its hyperparameter axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CandidateGrid {
    LinearRegression,
    Ridge {
        alphas: Vec<f64>,
    },
    DecisionTree {
        max_depths: Vec<usize>,
        min_samples_splits: Vec<usize>,
    },
    RandomForest {
        n_trees: Vec<usize>,
        max_depths: Vec<usize>,
        min_samples_splits: Vec<usize>,
    },
}

impl CandidateGrid {
    /// Expand the grid into every concrete parameter combination.
    pub fn expand(&self) -> Vec<RegressorParams> {
        match self {
            Self::LinearRegression => vec![RegressorParams::LinearRegression],
            Self::Ridge { alphas } => alphas
                .iter()
                .map(|&alpha| RegressorParams::Ridge { alpha })
                .collect(),
            Self::DecisionTree {
                max_depths,
                min_samples_splits,
            } => {
                let mut out = Vec::new();
                for &max_depth in max_depths {
                    for &min_samples_split in min_samples_splits {
                        out.push(RegressorParams::DecisionTree {
                            max_depth,
                            min_samples_split,
                        });
                    }
                }
                out
            }
            Self::RandomForest {
                n_trees,
                max_depths,
                min_samples_splits,
            } => {
                let mut out = Vec::new();
                for &trees in n_trees {
                    for &max_depth in max_depths {
                        for &min_samples_split in min_samples_splits {
                            out.push(RegressorParams::RandomForest {
                                n_trees: trees,
                                max_depth,
                                min_samples_split,
                            });
                        }
                    }
                }
                out
            }
        }
    }
}

/// One scored candidate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialReport {
    pub params: RegressorParams,
    pub validation_r2: Option<f64>,
    pub status: String,
}

/// Outcome of the selection sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionReport {
    pub best: RegressorParams,
    pub best_score: f64,
    pub trials: Vec<TrialReport>,
}

/// Score every expanded candidate on a seeded validation split of the
/// training matrix (features + target in the last column) and return the
/// single best performer by validation R².
///
/// Candidates that fail to fit (e.g. a singular least-squares system) are
/// recorded in their trial and skipped; only a sweep with zero successful
/// fits is an error.
pub fn select_best_model(
    train: &Matrix,
    grid: &ModelGridConfig,
    seed: u64,
) -> Result<SelectionReport, PipelineError> {
    let n = train.n_rows();
    if n < 4 {
        return Err(PipelineError::training(format!(
            "training matrix has only {n} rows"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let val_n = ((n as f64 * grid.validation_fraction).round() as usize).clamp(1, n - 1);
    let (val_idx, fit_idx) = indices.split_at(val_n);

    let fit_matrix = train.take_rows(fit_idx);
    let val_matrix = train.take_rows(val_idx);
    let (x_fit, y_fit) = fit_matrix.split_target()?;
    let (x_val, y_val) = val_matrix.split_target()?;

    let mut trials = Vec::new();
    let mut best: Option<(RegressorParams, f64)> = None;
    for candidate in &grid.candidates {
        for params in candidate.expand() {
            match params.fit(&x_fit, &y_fit, seed) {
                Ok(model) => {
                    let score = r2_score(&y_val, &model.predict(&x_val));
                    tracing::debug!(candidate = %params.label(), score, "scored candidate");
                    if best.as_ref().is_none_or(|(_, b)| score > *b) {
                        best = Some((params.clone(), score));
                    }
                    trials.push(TrialReport {
                        params,
                        validation_r2: Some(score),
                        status: "ok".to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(candidate = %params.label(), error = %e, "candidate failed to fit");
                    trials.push(TrialReport {
                        params,
                        validation_r2: None,
                        status: e.to_string(),
                    });
                }
            }
        }
    }

    let (best_params, best_score) = best
        .ok_or_else(|| PipelineError::training("every candidate configuration failed to fit"))?;
    Ok(SelectionReport {
        best: best_params,
        best_score,
        trials,
    })
}
