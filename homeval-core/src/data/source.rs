//! Document-store clients for raw listing exports.
//!
//! The pipeline never talks to a database driver directly; it consumes a
//! [`DocumentStore`] handed to it at construction time, so runs can target a
//! JSONL dump on disk or an in-memory collection in tests.

use crate::data::frame::Frame;
use crate::error::PipelineError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Client for exporting whole collections as frames.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Export every record of a collection as a frame.
    ///
    /// Implementations return records as-is; callers normalize via
    /// [`normalize_export`].
    async fn export_collection(&self, name: &str) -> Result<Frame, PipelineError>;
}

/// Normalize a raw export: drop the store-internal `_id` column and map the
/// literal "na" marker (any case) to a true null.
pub fn normalize_export(mut frame: Frame) -> Frame {
    frame.drop_columns(&["_id".to_string()]);
    for row in &mut frame.rows {
        for cell in row.iter_mut() {
            if let Value::String(s) = cell {
                if s.eq_ignore_ascii_case("na") {
                    *cell = Value::Null;
                }
            }
        }
    }
    frame
}

// ---------------------------------------------------------------------------
// JsonlDocumentStore
// ---------------------------------------------------------------------------

/// Document store backed by JSONL files — one collection per
/// `<root>/<name>.jsonl`, one JSON object per line.
pub struct JsonlDocumentStore {
    root: PathBuf,
}

impl JsonlDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentStore for JsonlDocumentStore {
    async fn export_collection(&self, name: &str) -> Result<Frame, PipelineError> {
        let path = self.root.join(format!("{name}.jsonl"));
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            PipelineError::ingestion(format!("cannot read collection {}: {e}", path.display()))
        })?;

        let mut items = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line)?;
            items.push(value);
        }

        Ok(frame_from_objects(&items))
    }
}

// ---------------------------------------------------------------------------
// MemoryDocumentStore
// ---------------------------------------------------------------------------

/// In-memory document store for tests and synthetic runs.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: HashMap<String, Vec<Value>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, records: Vec<Value>) {
        self.collections.insert(name.to_string(), records);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn export_collection(&self, name: &str) -> Result<Frame, PipelineError> {
        let records = self
            .collections
            .get(name)
            .ok_or_else(|| PipelineError::not_found(format!("collection '{name}'")))?;
        Ok(frame_from_objects(records))
    }
}

/// Build a frame from JSON objects. Columns come from the first record;
/// fields missing in later records become null.
fn frame_from_objects(items: &[Value]) -> Frame {
    let columns: Vec<String> = if let Some(Value::Object(map)) = items.first() {
        map.keys().cloned().collect()
    } else {
        return Frame::empty();
    };

    let rows: Vec<Vec<Value>> = items
        .iter()
        .map(|item| {
            columns
                .iter()
                .map(|col| item.get(col).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    Frame { columns, rows }
}
