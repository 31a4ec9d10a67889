//! Schema validation for ingested frames.

use crate::data::frame::{Frame, value_to_f64};
use crate::data::schema::{ColumnType, SchemaConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Outcome of validating an ingested frame against the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub message: String,
    pub total_rows: usize,
    pub missing_columns: Vec<String>,
    /// Per required column, fraction of rows (%) whose cell is null.
    pub null_percentage: HashMap<String, f64>,
    /// Per required column, count of cells that cannot coerce to the
    /// declared type.
    pub type_violations: HashMap<String, usize>,
}

/// Validate a raw export against the schema config.
///
/// Null cells are expected upstream-data defects and are reported but never
/// fail validation; missing required columns or an empty frame do.
pub fn validate_frame(frame: &Frame, schema: &SchemaConfig) -> ValidationReport {
    let total_rows = frame.row_count();

    let missing_columns: Vec<String> = schema
        .required_columns
        .iter()
        .filter(|c| !frame.has_column(&c.name))
        .map(|c| c.name.clone())
        .collect();

    let mut null_percentage = HashMap::new();
    let mut type_violations = HashMap::new();
    for col in &schema.required_columns {
        let Some(idx) = frame.col_index(&col.name) else {
            continue;
        };
        let mut nulls = 0usize;
        let mut violations = 0usize;
        for row in &frame.rows {
            match row.get(idx) {
                None | Some(Value::Null) => nulls += 1,
                Some(v) => {
                    if !coercible(v, col.dtype) {
                        violations += 1;
                    }
                }
            }
        }
        let pct = if total_rows > 0 {
            nulls as f64 / total_rows as f64 * 100.0
        } else {
            0.0
        };
        null_percentage.insert(col.name.clone(), pct);
        if violations > 0 {
            type_violations.insert(col.name.clone(), violations);
        }
    }

    let (passed, message) = if total_rows == 0 {
        (false, "exported collection is empty".to_string())
    } else if !missing_columns.is_empty() {
        (
            false,
            format!("missing required columns: {}", missing_columns.join(", ")),
        )
    } else if !type_violations.is_empty() {
        let mut cols: Vec<&String> = type_violations.keys().collect();
        cols.sort();
        let detail: Vec<String> = cols
            .iter()
            .map(|c| format!("{c} ({} cells)", type_violations[*c]))
            .collect();
        (
            false,
            format!("type violations in columns: {}", detail.join(", ")),
        )
    } else {
        (true, "validation passed".to_string())
    };

    ValidationReport {
        passed,
        message,
        total_rows,
        missing_columns,
        null_percentage,
        type_violations,
    }
}

fn coercible(v: &Value, dtype: ColumnType) -> bool {
    match dtype {
        ColumnType::String => v.is_string() || v.is_number(),
        ColumnType::Float => value_to_f64(v).is_some(),
        ColumnType::Integer => match v {
            Value::Number(n) => n.as_i64().is_some() || n.as_f64().is_some_and(|f| f.fract() == 0.0),
            Value::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        },
        ColumnType::Boolean => v.is_boolean(),
    }
}
