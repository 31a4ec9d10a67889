//! Trainer stage: candidate selection, acceptance gate, bundle persistence.

use crate::algorithms::{
    ModelGridConfig, Regressor, RegressionMetrics, select_best_model,
};
use crate::config::PipelineConfig;
use crate::data::matrix::Matrix;
use crate::data::transform::Preprocessor;
use crate::error::PipelineError;
use crate::inference::ModelBundle;
use crate::persistence::load_json;
use crate::pipeline::artifact::{TrainerArtifact, TransformationArtifact};
use std::path::PathBuf;

pub struct ModelTrainer {
    config: PipelineConfig,
    run_dir: PathBuf,
}

impl ModelTrainer {
    pub fn new(config: PipelineConfig, run_dir: PathBuf) -> Self {
        Self { config, run_dir }
    }

    pub fn run(
        &self,
        transformation: &TransformationArtifact,
    ) -> Result<TrainerArtifact, PipelineError> {
        let train = Matrix::load(&transformation.train_matrix_path)?;
        let test = Matrix::load(&transformation.test_matrix_path)?;
        let grid = ModelGridConfig::load(&self.config.model_grid_path)?;

        let selection = select_best_model(&train, &grid, self.config.seed)?;
        tracing::info!(
            best = %selection.best.label(),
            score = selection.best_score,
            trials = selection.trials.len(),
            "selection sweep complete"
        );

        // Nothing is persisted when the floor is not met.
        let floor = self.config.trainer.expected_accuracy;
        if selection.best_score < floor {
            return Err(PipelineError::NoAcceptableModel {
                best: selection.best_score,
                floor,
            });
        }

        // Refit the winner on the full training matrix before final scoring.
        let (x_train, y_train) = train.split_target()?;
        let model = selection.best.fit(&x_train, &y_train, self.config.seed)?;

        let (x_test, y_test) = test.split_target()?;
        let metrics = RegressionMetrics::compute(&y_test, &model.predict(&x_test));
        tracing::info!(
            r2 = metrics.r2,
            mae = metrics.mae,
            rmse = metrics.rmse,
            "scored selected model on held-out test split"
        );

        let preprocessor: Preprocessor = load_json(&transformation.preprocessor_path)?;
        let bundle = ModelBundle {
            preprocessor,
            regressor: model,
        };
        let model_path = self
            .run_dir
            .join("model_trainer")
            .join("trained_model")
            .join(&self.config.trainer.model_file);
        bundle.save(&model_path)?;
        let model_hash = crate::persistence::hash_file(&model_path)?;

        Ok(TrainerArtifact {
            model_path,
            model_hash,
            metrics,
            validation_r2: selection.best_score,
            model_label: selection.best.label(),
        })
    }
}
