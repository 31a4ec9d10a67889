//! Fitted preprocessing: standardization and one-hot encoding.
//!
//! The [`Preprocessor`] is fitted exactly once, on training data, and then
//! applied unchanged to test rows and inference rows. No statistic in here
//! may ever be derived from non-training data.

use crate::data::frame::{Frame, value_to_f64};
use crate::data::matrix::Matrix;
use crate::data::schema::SchemaConfig;
use crate::error::PipelineError;
use crate::features::vocabulary::{LocationVocabulary, OTHER_BUCKET};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Zero-mean/unit-variance standardization over configured numeric columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub means: Vec<f64>,
    /// Population standard deviations; constant columns scale by 1.0.
    pub scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit means and scales on the given frame.
    pub fn fit(frame: &Frame, columns: &[String]) -> Result<Self, PipelineError> {
        let mut means = Vec::with_capacity(columns.len());
        let mut scales = Vec::with_capacity(columns.len());
        for col in columns {
            let values = numeric_column(frame, col)?;
            if values.is_empty() {
                return Err(PipelineError::transformation(format!(
                    "cannot fit scaler on empty column '{col}'"
                )));
            }
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let var =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
            let std = var.sqrt();
            means.push(mean);
            scales.push(if std == 0.0 { 1.0 } else { std });
        }
        Ok(Self {
            columns: columns.to_vec(),
            means,
            scales,
        })
    }

    /// Standardize one value of the i-th fitted column.
    pub fn transform_value(&self, i: usize, value: f64) -> f64 {
        (value - self.means[i]) / self.scales[i]
    }
}

/// One-hot encoding with an ignore-unknown policy.
///
/// Categories are the distinct training-time values per column; a value
/// outside them encodes as all zeros. The rare-location sentinel is dropped
/// from the category list, so the all-zero row doubles as its encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub encodings: Vec<ColumnEncoding>,
}

/// Fitted categories of a single encoded column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnEncoding {
    pub column: String,
    pub categories: Vec<String>,
}

impl OneHotEncoder {
    /// Fit category lists on the given frame.
    pub fn fit(frame: &Frame, columns: &[String]) -> Result<Self, PipelineError> {
        let mut encodings = Vec::with_capacity(columns.len());
        for col in columns {
            let idx = frame.col_index(col).ok_or_else(|| {
                PipelineError::transformation(format!("missing categorical column '{col}'"))
            })?;
            let mut categories: Vec<String> = Vec::new();
            for row in &frame.rows {
                if let Some(Value::String(s)) = row.get(idx) {
                    if s != OTHER_BUCKET && !categories.iter().any(|c| c == s) {
                        categories.push(s.clone());
                    }
                }
            }
            categories.sort();
            encodings.push(ColumnEncoding {
                column: col.clone(),
                categories,
            });
        }
        Ok(Self { encodings })
    }

    /// Total number of dummy columns this encoder emits.
    pub fn width(&self) -> usize {
        self.encodings.iter().map(|e| e.categories.len()).sum()
    }
}

/// Fitted preprocessing bundle: frozen location vocabulary, one-hot
/// encoder, and numeric scaler. Serialized alongside the model so the
/// inference path transforms a new row exactly as training rows were.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preprocessor {
    pub vocabulary: LocationVocabulary,
    pub encoder: OneHotEncoder,
    pub scaler: StandardScaler,
    pub target_column: String,
    /// Output feature layout: dummy columns first, scaled numerics after.
    pub feature_names: Vec<String>,
}

impl Preprocessor {
    /// Fit on an engineered training frame. Never call with test or
    /// inference data.
    pub fn fit(
        frame: &Frame,
        schema: &SchemaConfig,
        vocabulary: LocationVocabulary,
    ) -> Result<Self, PipelineError> {
        let encoder = OneHotEncoder::fit(frame, &schema.oh_columns)?;
        let scaler = StandardScaler::fit(frame, &schema.num_features)?;

        let mut feature_names = Vec::new();
        for enc in &encoder.encodings {
            for cat in &enc.categories {
                feature_names.push(format!("{}={}", enc.column, cat));
            }
        }
        feature_names.extend(scaler.columns.iter().cloned());

        Ok(Self {
            vocabulary,
            encoder,
            scaler,
            target_column: schema.target_column.clone(),
            feature_names,
        })
    }

    /// Width of the transformed feature vector.
    pub fn width(&self) -> usize {
        self.feature_names.len()
    }

    /// Transform a frame to the numeric feature matrix.
    pub fn transform(&self, frame: &Frame) -> Result<Matrix, PipelineError> {
        let mut cat_indices = Vec::with_capacity(self.encoder.encodings.len());
        for enc in &self.encoder.encodings {
            let idx = frame.col_index(&enc.column).ok_or_else(|| {
                PipelineError::transformation(format!("missing categorical column '{}'", enc.column))
            })?;
            cat_indices.push(idx);
        }
        let mut num_indices = Vec::with_capacity(self.scaler.columns.len());
        for col in &self.scaler.columns {
            let idx = frame.col_index(col).ok_or_else(|| {
                PipelineError::transformation(format!("missing numeric column '{col}'"))
            })?;
            num_indices.push(idx);
        }

        let mut rows = Vec::with_capacity(frame.row_count());
        for (r, row) in frame.rows.iter().enumerate() {
            let mut out = Vec::with_capacity(self.width());
            for (enc, &idx) in self.encoder.encodings.iter().zip(&cat_indices) {
                let raw = match row.get(idx) {
                    Some(Value::String(s)) => s.as_str(),
                    // Unknown or non-string encodes as all zeros.
                    _ => "",
                };
                // Only the vocabulary's own column is rebucketed; other
                // categoricals rely on the ignore-unknown policy alone.
                let value = if enc.column == self.vocabulary.column {
                    self.vocabulary.bucket(raw)
                } else {
                    raw.trim().to_string()
                };
                for cat in &enc.categories {
                    out.push(if cat == &value { 1.0 } else { 0.0 });
                }
            }
            for (i, &idx) in num_indices.iter().enumerate() {
                let v = row.get(idx).and_then(value_to_f64).ok_or_else(|| {
                    PipelineError::transformation(format!(
                        "non-numeric cell in column '{}' at row {r}",
                        self.scaler.columns[i]
                    ))
                })?;
                out.push(self.scaler.transform_value(i, v));
            }
            rows.push(out);
        }
        Matrix::from_rows(rows)
    }

    /// Transform a frame and append the target as the last column, the
    /// layout the trainer slices uniformly.
    pub fn transform_with_target(&self, frame: &Frame) -> Result<Matrix, PipelineError> {
        let target_idx = frame.col_index(&self.target_column).ok_or_else(|| {
            PipelineError::transformation(format!("missing target column '{}'", self.target_column))
        })?;
        let features = self.transform(frame)?;
        let mut rows = Vec::with_capacity(frame.row_count());
        for (r, row) in frame.rows.iter().enumerate() {
            let y = row.get(target_idx).and_then(value_to_f64).ok_or_else(|| {
                PipelineError::transformation(format!("non-numeric target at row {r}"))
            })?;
            let mut out = features.row(r).to_vec();
            out.push(y);
            rows.push(out);
        }
        Matrix::from_rows(rows)
    }
}

fn numeric_column(frame: &Frame, col: &str) -> Result<Vec<f64>, PipelineError> {
    let idx = frame
        .col_index(col)
        .ok_or_else(|| PipelineError::transformation(format!("missing numeric column '{col}'")))?;
    let mut values = Vec::with_capacity(frame.row_count());
    for (r, row) in frame.rows.iter().enumerate() {
        let v = row.get(idx).and_then(value_to_f64).ok_or_else(|| {
            PipelineError::transformation(format!("non-numeric cell in column '{col}' at row {r}"))
        })?;
        values.push(v);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::{ColumnSchema, ColumnType};

    fn schema() -> SchemaConfig {
        SchemaConfig {
            target_column: "price".into(),
            required_columns: vec![ColumnSchema {
                name: "price".into(),
                dtype: ColumnType::Float,
            }],
            drop_columns: Vec::new(),
            oh_columns: vec!["location".into()],
            num_features: vec!["total_sqft".into()],
        }
    }

    fn train_frame() -> Frame {
        Frame::from_csv(
            "location,total_sqft,price\n\
             hebbal,90,10\n\
             hebbal,100,11\n\
             hsr,110,12\n\
             other,100,9\n",
        )
        .unwrap()
    }

    #[test]
    fn test_scaler_fit_apply_separation() {
        // Mean 100, population std 10.
        let frame = Frame::from_csv("x\n90\n110\n").unwrap();
        let scaler = StandardScaler::fit(&frame, &["x".to_string()]).unwrap();
        assert!((scaler.means[0] - 100.0).abs() < 1e-12);
        assert!((scaler.scales[0] - 10.0).abs() < 1e-12);
        // A later value of 110 maps through the frozen parameters to 1.0,
        // independent of whatever dataset it arrives with.
        assert!((scaler.transform_value(0, 110.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_scaler_constant_column_scale_is_one() {
        let frame = Frame::from_csv("x\n5\n5\n").unwrap();
        let scaler = StandardScaler::fit(&frame, &["x".to_string()]).unwrap();
        assert_eq!(scaler.scales[0], 1.0);
        assert_eq!(scaler.transform_value(0, 5.0), 0.0);
    }

    #[test]
    fn test_encoder_drops_sentinel_category() {
        let encoder = OneHotEncoder::fit(&train_frame(), &["location".to_string()]).unwrap();
        assert_eq!(encoder.encodings[0].categories, vec!["hebbal", "hsr"]);
        assert_eq!(encoder.width(), 2);
    }

    #[test]
    fn test_preprocessor_transform_layout() {
        let vocab = LocationVocabulary::from_locations(vec!["hebbal".into(), "hsr".into()]);
        let pre = Preprocessor::fit(&train_frame(), &schema(), vocab).unwrap();
        assert_eq!(
            pre.feature_names,
            vec!["location=hebbal", "location=hsr", "total_sqft"]
        );
        let m = pre.transform(&train_frame()).unwrap();
        assert_eq!(m.n_cols(), 3);
        // Row 0: hebbal → [1, 0], sqft 90 standardized below the mean.
        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(0, 1), 0.0);
        assert!(m.get(0, 2) < 0.0);
        // Row 3: sentinel bucket → all-zero dummies.
        assert_eq!(m.get(3, 0), 0.0);
        assert_eq!(m.get(3, 1), 0.0);
    }

    #[test]
    fn test_unknown_location_encodes_as_zeros() {
        let vocab = LocationVocabulary::from_locations(vec!["hebbal".into(), "hsr".into()]);
        let pre = Preprocessor::fit(&train_frame(), &schema(), vocab).unwrap();
        let unseen = Frame::from_csv("location,total_sqft,price\nwhitefield,100,10\n").unwrap();
        let m = pre.transform(&unseen).unwrap();
        assert_eq!(m.get(0, 0), 0.0);
        assert_eq!(m.get(0, 1), 0.0);
    }

    #[test]
    fn test_transform_with_target_appends_last() {
        let vocab = LocationVocabulary::from_locations(vec!["hebbal".into(), "hsr".into()]);
        let pre = Preprocessor::fit(&train_frame(), &schema(), vocab).unwrap();
        let m = pre.transform_with_target(&train_frame()).unwrap();
        assert_eq!(m.n_cols(), 4);
        assert_eq!(m.get(0, 3), 10.0);
        assert_eq!(m.get(2, 3), 12.0);
    }
}
