//! # homeval-core — house-price regression pipeline
//!
//! One fixed tabular workflow, end to end: export raw listing records from
//! a document store, validate them against a schema, clean and engineer
//! features, fit a preprocessor and the best candidate regressor, compare
//! the result against the currently promoted model, and promote the winner
//! to the serving location.
//!
//! Stages are strictly sequential and communicate only through immutable
//! artifacts; the store clients are injected per run.

// Foundation
pub mod config;
pub mod error;
pub mod persistence;

// Data engineering
pub mod data;
pub mod features;

// Models
pub mod algorithms;

// Serving
pub mod inference;
pub mod storage;

// Orchestration
pub mod pipeline;

// Re-exports
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use inference::{Estimator, ModelBundle, PropertyQuery};
pub use pipeline::{PipelineReport, TrainingPipeline};
