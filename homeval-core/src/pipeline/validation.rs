//! Validation stage: gate the ingested snapshot against the schema.

use crate::data::frame::Frame;
use crate::data::schema::SchemaConfig;
use crate::data::validate::validate_frame;
use crate::error::PipelineError;
use crate::persistence::atomic_write;
use crate::pipeline::artifact::{IngestionArtifact, ValidationArtifact};
use std::path::PathBuf;

pub struct DataValidation {
    schema: SchemaConfig,
    run_dir: PathBuf,
}

impl DataValidation {
    pub fn new(schema: SchemaConfig, run_dir: PathBuf) -> Self {
        Self { schema, run_dir }
    }

    pub async fn run(
        &self,
        ingestion: &IngestionArtifact,
    ) -> Result<ValidationArtifact, PipelineError> {
        let content = tokio::fs::read_to_string(&ingestion.feature_store_path).await?;
        let frame = Frame::from_csv(&content)?;
        let report = validate_frame(&frame, &self.schema);

        let report_path = self.run_dir.join("validation").join("report.yaml");
        atomic_write(&report_path, serde_yaml::to_string(&report)?.as_bytes())?;

        if report.passed {
            tracing::info!(rows = report.total_rows, "data validation passed");
        } else {
            tracing::warn!(message = %report.message, "data validation failed");
        }
        Ok(ValidationArtifact {
            passed: report.passed,
            message: report.message,
            report_path,
        })
    }
}
