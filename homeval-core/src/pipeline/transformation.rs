//! Transformation stage: feature engineering, preprocessor fitting, and
//! numeric matrix production.

use crate::data::frame::Frame;
use crate::data::schema::SchemaConfig;
use crate::data::transform::Preprocessor;
use crate::error::PipelineError;
use crate::features::engineer_features;
use crate::features::vocabulary::LocationVocabulary;
use crate::persistence::atomic_write_json;
use crate::pipeline::artifact::{IngestionArtifact, TransformationArtifact};
use std::path::PathBuf;

/// Column the location vocabulary is fitted over.
pub const LOCATION_COLUMN: &str = "location";

pub struct DataTransformation {
    schema: SchemaConfig,
    run_dir: PathBuf,
}

impl DataTransformation {
    pub fn new(schema: SchemaConfig, run_dir: PathBuf) -> Self {
        Self { schema, run_dir }
    }

    pub async fn run(
        &self,
        ingestion: &IngestionArtifact,
    ) -> Result<TransformationArtifact, PipelineError> {
        let train_raw =
            Frame::from_csv(&tokio::fs::read_to_string(&ingestion.train_path).await?)?;
        let test_raw = Frame::from_csv(&tokio::fs::read_to_string(&ingestion.test_path).await?)?;

        // The vocabulary is fitted on the training split only and reused
        // frozen for the test split, evaluation, and inference.
        let vocabulary = self.fit_vocabulary(&train_raw);
        tracing::info!(
            kept_locations = vocabulary.len(),
            "fitted location vocabulary on training split"
        );

        let train_clean = engineer_features(&train_raw, &self.schema, &vocabulary)?;
        let test_clean = engineer_features(&test_raw, &self.schema, &vocabulary)?;
        if train_clean.row_count() == 0 {
            return Err(PipelineError::transformation(
                "no training rows survived feature engineering",
            ));
        }
        if test_clean.row_count() == 0 {
            return Err(PipelineError::transformation(
                "no test rows survived feature engineering",
            ));
        }

        let preprocessor = Preprocessor::fit(&train_clean, &self.schema, vocabulary)?;
        let train_matrix = preprocessor.transform_with_target(&train_clean)?;
        let test_matrix = preprocessor.transform_with_target(&test_clean)?;
        tracing::info!(
            train_rows = train_matrix.n_rows(),
            test_rows = test_matrix.n_rows(),
            features = preprocessor.width(),
            "transformed engineered frames to matrices"
        );

        let stage_dir = self.run_dir.join("data_transformation");
        let preprocessor_path = stage_dir
            .join("transformed_object")
            .join("preprocessing.json");
        atomic_write_json(&preprocessor_path, &preprocessor)?;
        let train_matrix_path = stage_dir.join("transformed").join("train.mat");
        let test_matrix_path = stage_dir.join("transformed").join("test.mat");
        train_matrix.save(&train_matrix_path)?;
        test_matrix.save(&test_matrix_path)?;

        Ok(TransformationArtifact {
            preprocessor_path,
            train_matrix_path,
            test_matrix_path,
        })
    }

    /// Count locations on the column-dropped, null-free training frame.
    fn fit_vocabulary(&self, train_raw: &Frame) -> LocationVocabulary {
        let mut pre = train_raw.clone();
        pre.drop_columns(&self.schema.drop_columns);
        pre.drop_null_rows();
        LocationVocabulary::fit(&pre, LOCATION_COLUMN)
    }
}
