//! Dense numeric matrices and their on-disk format.
//!
//! Transformed train/test data is a row-major `f64` matrix with the target
//! appended as the last column, persisted as a raw little-endian binary:
//! magic bytes, u64 row/column counts, then the payload.

use crate::error::PipelineError;
use std::path::Path;

const MAGIC: &[u8; 8] = b"HVMATRIX";

/// A dense row-major f64 matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, PipelineError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for row in &rows {
            if row.len() != n_cols {
                return Err(PipelineError::invalid_input(format!(
                    "ragged matrix: row width {} != {n_cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: n_rows,
            cols: n_cols,
            data,
        })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        self.data[i * self.cols + j] = v;
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols.max(1))
    }

    /// Split into features (all columns but the last) and target (last
    /// column), the layout every trainer input uses.
    pub fn split_target(&self) -> Result<(Matrix, Vec<f64>), PipelineError> {
        if self.cols < 2 {
            return Err(PipelineError::invalid_input(
                "matrix needs at least one feature column and a target column",
            ));
        }
        let mut features = Matrix::zeros(self.rows, self.cols - 1);
        let mut target = Vec::with_capacity(self.rows);
        for i in 0..self.rows {
            let row = self.row(i);
            features.data[i * (self.cols - 1)..(i + 1) * (self.cols - 1)]
                .copy_from_slice(&row[..self.cols - 1]);
            target.push(row[self.cols - 1]);
        }
        Ok((features, target))
    }

    /// A new matrix containing the given row indices, in order.
    pub fn take_rows(&self, indices: &[usize]) -> Matrix {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Matrix {
            rows: indices.len(),
            cols: self.cols,
            data,
        }
    }

    /// Persist in the raw binary format (atomic write).
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        let mut buf = Vec::with_capacity(24 + self.data.len() * 8);
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&(self.rows as u64).to_le_bytes());
        buf.extend_from_slice(&(self.cols as u64).to_le_bytes());
        for v in &self.data {
            buf.extend_from_slice(&v.to_le_bytes());
        }
        crate::persistence::atomic_write(path, &buf)
    }

    /// Load a matrix from the raw binary format.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let bytes = std::fs::read(path)?;
        if bytes.len() < 24 || &bytes[..8] != MAGIC {
            return Err(PipelineError::invalid_input(format!(
                "not a matrix file: {}",
                path.display()
            )));
        }
        let rows = u64::from_le_bytes(bytes[8..16].try_into().unwrap_or_default()) as usize;
        let cols = u64::from_le_bytes(bytes[16..24].try_into().unwrap_or_default()) as usize;
        let expected = 24 + rows * cols * 8;
        if bytes.len() != expected {
            return Err(PipelineError::invalid_input(format!(
                "matrix file {} truncated: {} bytes, expected {expected}",
                path.display(),
                bytes.len()
            )));
        }
        let data = bytes[24..]
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().unwrap_or_default()))
            .collect();
        Ok(Self { rows, cols, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.mat");
        let m = Matrix::from_rows(vec![vec![1.0, 2.5, 80.0], vec![-3.0, 0.0, 42.25]]).unwrap();
        m.save(&path).unwrap();
        let loaded = Matrix::load(&path).unwrap();
        assert_eq!(loaded, m);
    }

    #[test]
    fn test_split_target() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 10.0], vec![3.0, 4.0, 20.0]]).unwrap();
        let (x, y) = m.split_target().unwrap();
        assert_eq!(x.n_cols(), 2);
        assert_eq!(x.row(1), &[3.0, 4.0]);
        assert_eq!(y, vec![10.0, 20.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Matrix::from_rows(vec![vec![1.0], vec![1.0, 2.0]]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }

    #[test]
    fn test_take_rows() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let sub = m.take_rows(&[2, 0]);
        assert_eq!(sub.row(0), &[5.0, 6.0]);
        assert_eq!(sub.row(1), &[1.0, 2.0]);
    }
}
