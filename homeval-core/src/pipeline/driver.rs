//! Pipeline driver: fixed-order orchestration of the six stages.

use crate::config::PipelineConfig;
use crate::data::schema::SchemaConfig;
use crate::data::source::DocumentStore;
use crate::error::PipelineError;
use crate::persistence::atomic_write_json;
use crate::pipeline::artifact::PipelineReport;
use crate::pipeline::evaluation::ModelEvaluation;
use crate::pipeline::ingestion::DataIngestion;
use crate::pipeline::promotion::ModelPusher;
use crate::pipeline::trainer::ModelTrainer;
use crate::pipeline::transformation::DataTransformation;
use crate::pipeline::validation::DataValidation;
use crate::storage::ObjectStore;
use std::sync::Arc;

/// The end-to-end training pipeline.
///
/// Stages run strictly in order, each consuming the previous stage's
/// artifact; a failure aborts the run with a typed error and nothing
/// written beyond the artifacts of completed stages. Store clients are
/// injected here and live for exactly one run.
pub struct TrainingPipeline {
    config: PipelineConfig,
    document_store: Arc<dyn DocumentStore>,
    object_store: Arc<dyn ObjectStore>,
}

impl TrainingPipeline {
    pub fn new(
        config: PipelineConfig,
        document_store: Arc<dyn DocumentStore>,
        object_store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            config,
            document_store,
            object_store,
        }
    }

    /// Run ingestion → validation → transformation → training →
    /// evaluation → promotion.
    ///
    /// A rejected challenger is a successful run with `accepted = false`
    /// and no promotion; the existing champion stays authoritative.
    pub async fn run(&self) -> Result<PipelineReport, PipelineError> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let started_at = chrono::Utc::now();
        let run_dir = self.config.artifact_dir.join(&run_id);
        tracing::info!(%run_id, "starting training pipeline run");

        let schema = SchemaConfig::load(&self.config.schema_path)?;

        let ingestion = DataIngestion::new(
            self.config.clone(),
            run_dir.clone(),
            self.document_store.clone(),
        )
        .run()
        .await?;

        let validation = DataValidation::new(schema.clone(), run_dir.clone())
            .run(&ingestion)
            .await?;
        if !validation.passed {
            return Err(PipelineError::Validation(validation.message));
        }

        let transformation = DataTransformation::new(schema.clone(), run_dir.clone())
            .run(&ingestion)
            .await?;

        let trainer =
            ModelTrainer::new(self.config.clone(), run_dir.clone()).run(&transformation)?;

        let evaluation = ModelEvaluation::new(
            self.config.clone(),
            schema,
            run_dir.clone(),
            self.object_store.clone(),
        )
        .run(&ingestion, &trainer)
        .await?;

        let promoted = if evaluation.accepted {
            ModelPusher::new(self.object_store.clone())
                .run(&evaluation)
                .await?;
            true
        } else {
            tracing::warn!(
                challenger_r2 = evaluation.challenger_r2,
                champion_r2 = evaluation.champion_r2.unwrap_or(0.0),
                "challenger rejected; champion remains authoritative"
            );
            false
        };

        let report = PipelineReport {
            run_id,
            accepted: evaluation.accepted,
            promoted,
            metrics: trainer.metrics,
            changed_accuracy: evaluation.changed_accuracy,
            started_at,
            finished_at: chrono::Utc::now(),
        };
        atomic_write_json(&run_dir.join("report.json"), &report)?;
        tracing::info!(
            accepted = report.accepted,
            promoted = report.promoted,
            r2 = report.metrics.r2,
            "training pipeline run finished"
        );
        Ok(report)
    }
}
