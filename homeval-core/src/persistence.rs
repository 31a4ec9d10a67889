//! Atomic file persistence helpers.
//!
//! Artifacts are never updated in place: every write goes to a `.tmp`
//! sibling first and is renamed over the target, so readers only ever see
//! complete files.

use crate::error::PipelineError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Atomically serialize a value as pretty JSON to a file.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(data)?;
    atomic_write(path, json.as_bytes())
}

/// Atomically write raw bytes to a file.
///
/// Writes to a `.tmp` sibling file, then renames to the target path.
/// Creates parent directories if they don't exist.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load and deserialize JSON from a file.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Compute the SHA-256 hash of a file's contents.
pub fn hash_file(path: &Path) -> Result<String, PipelineError> {
    let content = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        name: String,
        count: usize,
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("payload.json");
        let payload = Payload {
            name: "snapshot".into(),
            count: 3,
        };
        atomic_write_json(&path, &payload).unwrap();
        let loaded: Payload = load_json(&path).unwrap();
        assert_eq!(loaded, payload);
    }

    #[test]
    fn test_hash_file_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        atomic_write(&path, b"abc").unwrap();
        let h1 = hash_file(&path).unwrap();
        let h2 = hash_file(&path).unwrap();
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }
}
