//! Evaluation stage: champion/challenger comparison.

use crate::algorithms::r2_score;
use crate::config::PipelineConfig;
use crate::data::frame::{Frame, value_to_f64};
use crate::data::schema::SchemaConfig;
use crate::error::PipelineError;
use crate::features::engineer_features;
use crate::inference::{Estimator, ModelBundle};
use crate::pipeline::artifact::{EvaluationArtifact, IngestionArtifact, TrainerArtifact};
use crate::storage::ObjectStore;
use std::path::PathBuf;
use std::sync::Arc;

pub struct ModelEvaluation {
    config: PipelineConfig,
    schema: SchemaConfig,
    run_dir: PathBuf,
    object_store: Arc<dyn ObjectStore>,
}

impl ModelEvaluation {
    pub fn new(
        config: PipelineConfig,
        schema: SchemaConfig,
        run_dir: PathBuf,
        object_store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            schema,
            run_dir,
            object_store,
        }
    }

    /// Score the currently promoted model on the held-out evaluation set;
    /// absence of a champion is not an error.
    async fn champion_score(&self, eval_frame: &Frame) -> Result<Option<f64>, PipelineError> {
        let mut estimator = Estimator::new(
            self.object_store.clone(),
            self.config.evaluation.champion_key.clone(),
            self.run_dir.join("model_evaluation"),
        );
        if !estimator.is_present().await? {
            tracing::info!("no champion model promoted yet");
            return Ok(None);
        }

        let target_idx = eval_frame
            .col_index(&self.schema.target_column)
            .ok_or_else(|| {
                PipelineError::evaluation(format!(
                    "evaluation frame lost target column '{}'",
                    self.schema.target_column
                ))
            })?;
        let mut y_true = Vec::with_capacity(eval_frame.row_count());
        for (r, row) in eval_frame.rows.iter().enumerate() {
            let y = row.get(target_idx).and_then(value_to_f64).ok_or_else(|| {
                PipelineError::evaluation(format!("non-numeric target at evaluation row {r}"))
            })?;
            y_true.push(y);
        }

        let predictions = estimator.predict_frame(eval_frame).await?;
        Ok(Some(r2_score(&y_true, &predictions)))
    }

    pub async fn run(
        &self,
        ingestion: &IngestionArtifact,
        trainer: &TrainerArtifact,
    ) -> Result<EvaluationArtifact, PipelineError> {
        // The evaluation set goes through the exact feature-engineering
        // treatment training data saw, under the challenger's frozen
        // vocabulary, so champion and challenger see comparable inputs.
        let challenger = ModelBundle::load(&trainer.model_path)?;
        let eval_raw = Frame::from_csv(&tokio::fs::read_to_string(&ingestion.test_path).await?)?;
        let eval_clean =
            engineer_features(&eval_raw, &self.schema, &challenger.preprocessor.vocabulary)?;
        if eval_clean.row_count() == 0 {
            return Err(PipelineError::evaluation(
                "no evaluation rows survived feature engineering",
            ));
        }

        let champion_r2 = self.champion_score(&eval_clean).await?;
        let challenger_r2 = trainer.metrics.r2;
        let benchmark = champion_r2.unwrap_or(0.0);
        // Strictly greater wins; the configured min_improvement margin is
        // intentionally not applied here (see DESIGN.md).
        let accepted = challenger_r2 > benchmark;
        let changed_accuracy = challenger_r2 - benchmark;
        tracing::info!(
            challenger_r2,
            champion_r2 = champion_r2.unwrap_or(0.0),
            accepted,
            changed_accuracy,
            "champion/challenger comparison"
        );

        Ok(EvaluationArtifact {
            accepted,
            changed_accuracy,
            challenger_r2,
            champion_r2,
            champion_key: self.config.evaluation.champion_key.clone(),
            trained_model_path: trainer.model_path.clone(),
        })
    }
}
