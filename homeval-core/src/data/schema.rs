//! Dataset schema configuration.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Column data type expected by the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
}

/// Schema for a single required column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub dtype: ColumnType,
}

/// Schema configuration for the listings collection.
///
/// Loaded from `config/schema.yaml`; drives validation, column dropping,
/// and the preprocessor's encoded/scaled column selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Name of the regression target column.
    pub target_column: String,
    /// Columns that must be present in a raw export.
    pub required_columns: Vec<ColumnSchema>,
    /// Columns dropped before any cleaning.
    #[serde(default)]
    pub drop_columns: Vec<String>,
    /// Categorical columns one-hot encoded by the preprocessor.
    #[serde(default)]
    pub oh_columns: Vec<String>,
    /// Numeric columns standardized by the preprocessor.
    #[serde(default)]
    pub num_features: Vec<String>,
}

impl SchemaConfig {
    /// Load a schema config from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("cannot read schema {}: {e}", path.display()))
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
