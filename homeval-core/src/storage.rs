//! Object storage for serialized model bundles.
//!
//! The serving location is an opaque key/value blob store; the pipeline is
//! handed a client at construction time. The filesystem-backed
//! implementation keeps local runs and tests free of cloud credentials.

use crate::error::PipelineError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Blob-store client: upload, download, existence checks.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, local: &Path, key: &str) -> Result<(), PipelineError>;
    async fn download(&self, key: &str, local: &Path) -> Result<(), PipelineError>;
    async fn exists(&self, key: &str) -> Result<bool, PipelineError>;
}

/// Filesystem-backed object store rooted at a directory; keys are relative
/// paths beneath it.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, local: &Path, key: &str) -> Result<(), PipelineError> {
        let target = self.key_path(key);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local, &target).await.map_err(|e| {
            PipelineError::storage(format!(
                "upload {} -> {}: {e}",
                local.display(),
                target.display()
            ))
        })?;
        tracing::info!(key, "uploaded object");
        Ok(())
    }

    async fn download(&self, key: &str, local: &Path) -> Result<(), PipelineError> {
        let source = self.key_path(key);
        if !source.exists() {
            return Err(PipelineError::not_found(format!("object '{key}'")));
        }
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(&source, local).await.map_err(|e| {
            PipelineError::storage(format!(
                "download {} -> {}: {e}",
                source.display(),
                local.display()
            ))
        })?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, PipelineError> {
        Ok(self.key_path(key).exists())
    }
}
