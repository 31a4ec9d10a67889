//! Inference-time model bundle and the store-backed estimator.

use crate::algorithms::{FittedRegressor, Regressor};
use crate::data::frame::Frame;
use crate::data::transform::Preprocessor;
use crate::error::PipelineError;
use crate::storage::ObjectStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A fitted preprocessor paired with a fitted regressor.
///
/// The two are persisted and loaded as one unit and always invoked in
/// order: raw rows go through the preprocessor exactly as training data
/// did, then through the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub preprocessor: Preprocessor,
    pub regressor: FittedRegressor,
}

impl ModelBundle {
    /// Transform a raw frame and predict one value per row.
    pub fn predict_frame(&self, frame: &Frame) -> Result<Vec<f64>, PipelineError> {
        let features = self.preprocessor.transform(frame)?;
        Ok(self.regressor.predict(&features))
    }

    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        crate::persistence::atomic_write_json(path, self)
    }

    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        crate::persistence::load_json(path)
    }
}

/// A single listing to price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyQuery {
    pub location: String,
    pub no_of_bhk: u32,
    pub total_sqft: f64,
    pub bath: f64,
}

impl PropertyQuery {
    /// One-row frame in the engineered-column layout the preprocessor
    /// expects.
    pub fn to_frame(&self) -> Frame {
        let mut frame = Frame::new(vec![
            "location".to_string(),
            "total_sqft".to_string(),
            "bath".to_string(),
            "no_of_BHK".to_string(),
        ]);
        // Row width matches the four columns above.
        let _ = frame.push_row(vec![
            json!(self.location),
            json!(self.total_sqft),
            json!(self.bath),
            json!(self.no_of_bhk),
        ]);
        frame
    }
}

/// Store-backed model handle: checks for, lazily downloads, and caches the
/// bundle at a key, then serves predictions from it.
pub struct Estimator {
    store: Arc<dyn ObjectStore>,
    key: String,
    work_dir: PathBuf,
    loaded: Option<ModelBundle>,
}

impl Estimator {
    pub fn new(store: Arc<dyn ObjectStore>, key: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            key: key.into(),
            work_dir: work_dir.into(),
            loaded: None,
        }
    }

    /// Whether a model is present at this estimator's key.
    pub async fn is_present(&self) -> Result<bool, PipelineError> {
        self.store.exists(&self.key).await
    }

    /// Download and deserialize the bundle, caching it for later calls.
    pub async fn load(&mut self) -> Result<&ModelBundle, PipelineError> {
        if self.loaded.is_none() {
            let local = self
                .work_dir
                .join(format!("estimator-{}.json", uuid::Uuid::new_v4()));
            self.store.download(&self.key, &local).await?;
            let bundle = ModelBundle::load(&local)?;
            self.loaded = Some(bundle);
        }
        // Just populated above.
        self.loaded
            .as_ref()
            .ok_or_else(|| PipelineError::inference("bundle cache unexpectedly empty"))
    }

    /// Upload a locally persisted bundle to this estimator's key.
    pub async fn save_model(&self, local: &Path) -> Result<(), PipelineError> {
        self.store.upload(local, &self.key).await
    }

    /// Predict prices for every row of a raw frame.
    pub async fn predict_frame(&mut self, frame: &Frame) -> Result<Vec<f64>, PipelineError> {
        let bundle = self.load().await?;
        bundle.predict_frame(frame)
    }

    /// Price a single listing, in the same lakh units as the target.
    pub async fn predict(&mut self, query: &PropertyQuery) -> Result<f64, PipelineError> {
        let frame = query.to_frame();
        let predictions = self.predict_frame(&frame).await?;
        predictions
            .first()
            .copied()
            .ok_or_else(|| PipelineError::inference("empty prediction batch"))
    }
}
