//! Ingestion stage: export the collection, snapshot it, split train/test.

use crate::config::PipelineConfig;
use crate::data::frame::Frame;
use crate::data::source::{DocumentStore, normalize_export};
use crate::error::PipelineError;
use crate::persistence::atomic_write;
use crate::pipeline::artifact::IngestionArtifact;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;

pub struct DataIngestion {
    config: PipelineConfig,
    run_dir: PathBuf,
    store: Arc<dyn DocumentStore>,
}

impl DataIngestion {
    pub fn new(config: PipelineConfig, run_dir: PathBuf, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            config,
            run_dir,
            store,
        }
    }

    /// Export the collection into the feature-store snapshot.
    async fn export_to_feature_store(&self) -> Result<(Frame, PathBuf), PipelineError> {
        let frame = normalize_export(
            self.store
                .export_collection(&self.config.collection_name)
                .await?,
        );
        if frame.row_count() == 0 {
            return Err(PipelineError::ingestion(format!(
                "collection '{}' exported no rows",
                self.config.collection_name
            )));
        }
        tracing::info!(
            collection = %self.config.collection_name,
            rows = frame.row_count(),
            columns = frame.column_count(),
            "exported collection"
        );

        let path = self
            .run_dir
            .join("data_ingestion")
            .join("feature_store")
            .join(&self.config.ingestion.feature_store_file);
        atomic_write(&path, frame.to_csv().as_bytes())?;
        Ok((frame, path))
    }

    /// Seeded shuffle split into train and test CSVs.
    fn split_train_test(&self, frame: &Frame) -> Result<(PathBuf, PathBuf), PipelineError> {
        let n = frame.row_count();
        if n < 2 {
            return Err(PipelineError::ingestion(format!(
                "cannot split {n} rows into train and test"
            )));
        }
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);
        let test_n = ((n as f64 * self.config.ingestion.train_test_split_ratio).round() as usize)
            .clamp(1, n - 1);
        let (test_idx, train_idx) = indices.split_at(test_n);

        let ingested = self.run_dir.join("data_ingestion").join("ingested");
        let train_path = ingested.join(&self.config.ingestion.train_file);
        let test_path = ingested.join(&self.config.ingestion.test_file);
        atomic_write(&train_path, frame.take_rows(train_idx).to_csv().as_bytes())?;
        atomic_write(&test_path, frame.take_rows(test_idx).to_csv().as_bytes())?;
        tracing::info!(
            train_rows = train_idx.len(),
            test_rows = test_idx.len(),
            "split snapshot into train and test"
        );
        Ok((train_path, test_path))
    }

    pub async fn run(&self) -> Result<IngestionArtifact, PipelineError> {
        let (frame, feature_store_path) = self.export_to_feature_store().await?;
        let (train_path, test_path) = self.split_train_test(&frame)?;
        Ok(IngestionArtifact {
            feature_store_path,
            train_path,
            test_path,
        })
    }
}
