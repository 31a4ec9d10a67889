//! Immutable per-stage artifacts.
//!
//! Each stage produces one artifact record — file paths plus the numbers
//! the next stage branches on — passed by value down the pipeline and never
//! mutated after creation.

use crate::algorithms::RegressionMetrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Output of the ingestion stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionArtifact {
    pub feature_store_path: PathBuf,
    pub train_path: PathBuf,
    pub test_path: PathBuf,
}

/// Output of the validation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationArtifact {
    pub passed: bool,
    pub message: String,
    pub report_path: PathBuf,
}

/// Output of the transformation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationArtifact {
    pub preprocessor_path: PathBuf,
    pub train_matrix_path: PathBuf,
    pub test_matrix_path: PathBuf,
}

/// Output of the trainer stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerArtifact {
    pub model_path: PathBuf,
    /// SHA-256 of the persisted bundle.
    pub model_hash: String,
    /// Metrics of the selected model on the held-out test matrix.
    pub metrics: RegressionMetrics,
    /// Best validation R² from the selection sweep.
    pub validation_r2: f64,
    /// Label of the winning candidate configuration.
    pub model_label: String,
}

/// Output of the evaluation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationArtifact {
    pub accepted: bool,
    /// Challenger minus champion test R² (champion defaults to 0 when no
    /// model is promoted yet).
    pub changed_accuracy: f64,
    pub challenger_r2: f64,
    pub champion_r2: Option<f64>,
    pub champion_key: String,
    pub trained_model_path: PathBuf,
}

/// Output of the promotion stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionArtifact {
    pub champion_key: String,
    pub model_path: PathBuf,
}

/// Summary of one full pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: String,
    pub accepted: bool,
    pub promoted: bool,
    pub metrics: RegressionMetrics,
    pub changed_accuracy: f64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
