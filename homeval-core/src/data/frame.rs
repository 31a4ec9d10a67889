//! Tabular frame: named columns over row-major JSON values.
//!
//! All pipeline stages operate on whole frames; there is no per-row
//! streaming. Cells are `serde_json::Value` so a frame can carry raw string
//! exports and derived numerics side by side.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A batch of tabular data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Frame {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.col_index(name).is_some()
    }

    /// Append a row. The row must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), PipelineError> {
        if row.len() != self.columns.len() {
            return Err(PipelineError::invalid_input(format!(
                "row width {} does not match {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append a derived column. The values must match the row count.
    pub fn add_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), PipelineError> {
        if values.len() != self.rows.len() {
            return Err(PipelineError::invalid_input(format!(
                "column '{name}' has {} values for {} rows",
                values.len(),
                self.rows.len()
            )));
        }
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        Ok(())
    }

    /// Drop the named columns. Missing names are ignored.
    pub fn drop_columns(&mut self, names: &[String]) {
        let drop_indices: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| names.iter().any(|n| n == *c))
            .map(|(i, _)| i)
            .collect();
        for &idx in drop_indices.iter().rev() {
            self.columns.remove(idx);
            for row in &mut self.rows {
                if idx < row.len() {
                    row.remove(idx);
                }
            }
        }
    }

    /// Keep only rows matching the predicate.
    pub fn retain_rows<F: FnMut(&[Value]) -> bool>(&mut self, mut keep: F) {
        self.rows.retain(|row| keep(row));
    }

    /// Drop rows containing any null cell.
    pub fn drop_null_rows(&mut self) {
        self.rows.retain(|row| !row.iter().any(|v| v.is_null()));
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Numeric view of a cell: JSON numbers directly, numeric strings parsed.
    pub fn f64_at(&self, row: usize, col: usize) -> Option<f64> {
        self.cell(row, col).and_then(value_to_f64)
    }

    pub fn str_at(&self, row: usize, col: usize) -> Option<&str> {
        match self.cell(row, col) {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// A new frame containing only the named columns, in the given order.
    pub fn select(&self, names: &[String]) -> Result<Frame, PipelineError> {
        let indices: Vec<usize> = names
            .iter()
            .map(|n| {
                self.col_index(n)
                    .ok_or_else(|| PipelineError::invalid_input(format!("unknown column '{n}'")))
            })
            .collect::<Result<_, _>>()?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Frame {
            columns: names.to_vec(),
            rows,
        })
    }

    /// A new frame containing the given row indices, in order.
    pub fn take_rows(&self, indices: &[usize]) -> Frame {
        Frame {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Parse a CSV string, coercing cells to typed JSON values.
    ///
    /// Empty cells become null; integers, floats, and booleans are parsed,
    /// everything else stays a string.
    pub fn from_csv(content: &str) -> Result<Frame, PipelineError> {
        let mut lines = content.lines();
        let columns: Vec<String> = lines
            .next()
            .ok_or_else(|| PipelineError::invalid_input("empty CSV content"))?
            .split(',')
            .map(|s| s.trim().trim_matches('"').to_string())
            .collect();

        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let row: Vec<Value> = line
                .split(',')
                .map(|s| coerce_value(s.trim().trim_matches('"')))
                .collect();
            if row.len() != columns.len() {
                return Err(PipelineError::invalid_input(format!(
                    "CSV row width {} does not match {} columns",
                    row.len(),
                    columns.len()
                )));
            }
            rows.push(row);
        }
        Ok(Frame { columns, rows })
    }

    /// Render the frame as CSV. Nulls become empty cells.
    pub fn to_csv(&self) -> String {
        let mut out = self.columns.join(",");
        out.push('\n');
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(render_cell).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

/// Coerce a raw text cell to a typed JSON value.
pub fn coerce_value(s: &str) -> Value {
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        return serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(s.to_string()));
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

/// Numeric view of a JSON value: numbers directly, numeric strings parsed.
pub fn value_to_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn render_cell(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
