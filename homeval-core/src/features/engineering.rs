//! Cleaning and feature derivation for raw listing exports.
//!
//! A raw export (still carrying the `size` column) goes through the full
//! treatment: column drops, null-row drops, BHK/sqft/price-per-sqft
//! derivation, location rebucketing, the statistical outlier passes, and
//! the invariant filters. A frame that has already been engineered only
//! faces the invariant filters again, so re-running the function on clean
//! output removes nothing.

use crate::data::frame::{Frame, value_to_f64};
use crate::data::schema::SchemaConfig;
use crate::error::PipelineError;
use crate::features::outliers::{remove_bhk_outliers, remove_pps_outliers};
use crate::features::vocabulary::LocationVocabulary;
use serde_json::Value;

/// Raw column holding size descriptors like "2 BHK" / "4 Bedroom".
pub const SIZE_COLUMN: &str = "size";
/// Derived bedroom-count column.
pub const BHK_COLUMN: &str = "no_of_BHK";
/// Raw/derived area column.
pub const SQFT_COLUMN: &str = "total_sqft";
/// Derived price-per-square-foot column (intermediate, dropped at the end).
pub const PPS_COLUMN: &str = "price_per_sqft";
/// Bathroom-count column.
pub const BATH_COLUMN: &str = "bath";

/// Minimum plausible area per bedroom; listings below this are dropped.
pub const MIN_SQFT_PER_BHK: f64 = 300.0;
/// Listings with `bath >= no_of_BHK + BATH_MARGIN` are dropped.
pub const BATH_MARGIN: f64 = 2.0;
/// Prices arrive in lakh units; price-per-sqft works in rupees.
const LAKH: f64 = 100_000.0;

/// Run the full feature-engineering treatment.
///
/// The vocabulary must have been fitted on training data; it is applied
/// frozen here regardless of which frame is passed in.
pub fn engineer_features(
    frame: &Frame,
    schema: &SchemaConfig,
    vocabulary: &LocationVocabulary,
) -> Result<Frame, PipelineError> {
    let mut frame = frame.clone();
    let rows_in = frame.row_count();

    frame.drop_columns(&schema.drop_columns);
    frame.drop_null_rows();

    // A frame still carrying the size column is a raw export; engineered
    // frames skip derivation and the statistical passes below.
    let raw = frame.has_column(SIZE_COLUMN);

    if raw {
        derive_bhk(&mut frame)?;
    } else if !frame.has_column(BHK_COLUMN) {
        return Err(PipelineError::feature_engineering(format!(
            "frame has neither '{SIZE_COLUMN}' nor '{BHK_COLUMN}'"
        )));
    }

    normalize_sqft(&mut frame)?;

    if raw {
        derive_price_per_sqft(&mut frame, &schema.target_column)?;
    }

    bucket_locations(&mut frame, vocabulary);
    filter_area_ratio(&mut frame)?;

    if raw {
        remove_pps_outliers(&mut frame, &vocabulary.column)?;
        remove_bhk_outliers(&mut frame, &vocabulary.column)?;
    }

    filter_bath(&mut frame)?;
    frame.drop_columns(&[SIZE_COLUMN.to_string(), PPS_COLUMN.to_string()]);

    tracing::debug!(
        rows_in,
        rows_out = frame.row_count(),
        raw,
        "feature engineering complete"
    );
    Ok(frame)
}

/// Parse the leading integer token of the size descriptor; rows without one
/// get a null, which the area-ratio filter later removes.
fn derive_bhk(frame: &mut Frame) -> Result<(), PipelineError> {
    let idx = frame
        .col_index(SIZE_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing size column"))?;
    let values: Vec<Value> = frame
        .rows
        .iter()
        .map(|row| match row.get(idx) {
            Some(Value::String(s)) => parse_leading_int(s)
                .map(|n| Value::Number(n.into()))
                .unwrap_or(Value::Null),
            Some(Value::Number(n)) => Value::Number(n.clone()),
            _ => Value::Null,
        })
        .collect();
    frame.add_column(BHK_COLUMN, values)
}

/// Normalize the area column in place: hyphenated ranges become their
/// midpoint, plain values parse to floats, anything else becomes null.
fn normalize_sqft(frame: &mut Frame) -> Result<(), PipelineError> {
    let idx = frame
        .col_index(SQFT_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing total_sqft column"))?;
    for row in &mut frame.rows {
        if let Some(cell) = row.get_mut(idx) {
            *cell = parse_sqft(cell);
        }
    }
    Ok(())
}

fn derive_price_per_sqft(frame: &mut Frame, target_column: &str) -> Result<(), PipelineError> {
    let price_idx = frame.col_index(target_column).ok_or_else(|| {
        PipelineError::feature_engineering(format!("missing target column '{target_column}'"))
    })?;
    let sqft_idx = frame
        .col_index(SQFT_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing total_sqft column"))?;
    let values: Vec<Value> = frame
        .rows
        .iter()
        .map(|row| {
            let price = row.get(price_idx).and_then(value_to_f64);
            let sqft = row.get(sqft_idx).and_then(value_to_f64);
            match (price, sqft) {
                // Null-propagate instead of dividing by a zero or missing area.
                (Some(p), Some(s)) if s > 0.0 => serde_json::Number::from_f64(p * LAKH / s)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            }
        })
        .collect();
    frame.add_column(PPS_COLUMN, values)
}

fn bucket_locations(frame: &mut Frame, vocabulary: &LocationVocabulary) {
    if let Some(idx) = frame.col_index(&vocabulary.column) {
        for row in &mut frame.rows {
            if let Some(Value::String(s)) = row.get(idx) {
                let bucketed = vocabulary.bucket(s);
                row[idx] = Value::String(bucketed);
            }
        }
    }
}

/// Drop physically implausible listings: area below the per-bedroom floor,
/// or rows whose derived BHK/sqft failed to parse.
fn filter_area_ratio(frame: &mut Frame) -> Result<(), PipelineError> {
    let sqft_idx = frame
        .col_index(SQFT_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing total_sqft column"))?;
    let bhk_idx = frame
        .col_index(BHK_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing no_of_BHK column"))?;
    frame.retain_rows(|row| {
        match (
            row.get(sqft_idx).and_then(value_to_f64),
            row.get(bhk_idx).and_then(value_to_f64),
        ) {
            (Some(sqft), Some(bhk)) if bhk > 0.0 => sqft / bhk >= MIN_SQFT_PER_BHK,
            _ => false,
        }
    });
    Ok(())
}

/// Drop listings with implausibly many bathrooms for their bedroom count.
fn filter_bath(frame: &mut Frame) -> Result<(), PipelineError> {
    let bath_idx = frame
        .col_index(BATH_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing bath column"))?;
    let bhk_idx = frame
        .col_index(BHK_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing no_of_BHK column"))?;
    frame.retain_rows(|row| {
        match (
            row.get(bath_idx).and_then(value_to_f64),
            row.get(bhk_idx).and_then(value_to_f64),
        ) {
            (Some(bath), Some(bhk)) => bath < bhk + BATH_MARGIN,
            _ => false,
        }
    });
    Ok(())
}

fn parse_leading_int(s: &str) -> Option<i64> {
    s.split_whitespace().next()?.parse::<i64>().ok()
}

fn parse_sqft(v: &Value) -> Value {
    match v {
        Value::Number(_) => v.clone(),
        Value::String(s) => {
            let tokens: Vec<&str> = s.split('-').collect();
            if tokens.len() == 2 {
                if let (Ok(a), Ok(b)) = (
                    tokens[0].trim().parse::<f64>(),
                    tokens[1].trim().parse::<f64>(),
                ) {
                    return serde_json::Number::from_f64((a + b) / 2.0)
                        .map(Value::Number)
                        .unwrap_or(Value::Null);
                }
            }
            s.trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
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
            drop_columns: vec!["society".into()],
            oh_columns: vec!["location".into()],
            num_features: vec![
                "total_sqft".into(),
                "bath".into(),
                "no_of_BHK".into(),
            ],
        }
    }

    fn vocab() -> LocationVocabulary {
        LocationVocabulary::from_locations(vec!["hebbal".into(), "hsr".into()])
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("2 BHK"), Some(2));
        assert_eq!(parse_leading_int("4 Bedroom"), Some(4));
        assert_eq!(parse_leading_int("Studio"), None);
    }

    #[test]
    fn test_parse_sqft_range_midpoint() {
        assert_eq!(
            value_to_f64(&parse_sqft(&serde_json::json!("1000-1200"))),
            Some(1100.0)
        );
        assert_eq!(
            value_to_f64(&parse_sqft(&serde_json::json!("1450"))),
            Some(1450.0)
        );
        assert!(parse_sqft(&serde_json::json!("34.46Sq. Meter")).is_null());
    }

    #[test]
    fn test_invariants_hold_for_survivors() {
        let frame = Frame::from_csv(
            "location,size,total_sqft,bath,price,society\n\
             hsr,2 BHK,1000,2,40,abc\n\
             hsr,2 BHK,1000,2,50,abc\n\
             hsr,2 BHK,1000,2,55,abc\n\
             hsr,2 BHK,1000,2,60,abc\n\
             hsr,2 BHK,1000,2,70,abc\n\
             hsr,3 BHK,1500,6,95,abc\n\
             hebbal,2 BHK,500,2,30,xyz\n",
        )
        .unwrap();
        let out = engineer_features(&frame, &schema(), &vocab()).unwrap();
        assert!(!out.has_column("society"));
        assert!(!out.has_column("size"));
        assert!(!out.has_column("price_per_sqft"));
        let sqft = out.col_index(SQFT_COLUMN).unwrap();
        let bhk = out.col_index(BHK_COLUMN).unwrap();
        let bath = out.col_index(BATH_COLUMN).unwrap();
        for r in 0..out.row_count() {
            let sqft_v = out.f64_at(r, sqft).unwrap();
            let bhk_v = out.f64_at(r, bhk).unwrap();
            let bath_v = out.f64_at(r, bath).unwrap();
            assert!(sqft_v / bhk_v >= MIN_SQFT_PER_BHK);
            assert!(bath_v < bhk_v + BATH_MARGIN);
        }
        // The 500 sqft 2 BHK fails the area ratio, the 6-bath 3 BHK fails
        // the bath rule, and the per-location band trims the price extremes.
        assert_eq!(out.row_count(), 3);
    }

    #[test]
    fn test_zero_sqft_row_dropped_not_crashed() {
        // Two-value location bands keep the upper row, so a survivor
        // remains to assert on.
        let frame = Frame::from_csv(
            "location,size,total_sqft,bath,price\n\
             hebbal,2 BHK,0,2,80\n\
             hebbal,2 BHK,1000,2,40\n\
             hebbal,2 BHK,1000,2,60\n",
        )
        .unwrap();
        let out = engineer_features(&frame, &schema(), &vocab()).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.f64_at(0, out.col_index(SQFT_COLUMN).unwrap()), Some(1000.0));
    }

    #[test]
    fn test_unparsable_size_row_dropped() {
        let frame = Frame::from_csv(
            "location,size,total_sqft,bath,price\n\
             hebbal,Studio,600,1,35\n\
             hebbal,1 BHK,600,1,30\n\
             hebbal,1 BHK,600,1,36\n",
        )
        .unwrap();
        let out = engineer_features(&frame, &schema(), &vocab()).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.f64_at(0, out.col_index(BHK_COLUMN).unwrap()), Some(1.0));
    }

    #[test]
    fn test_rare_location_bucketed() {
        // Both rare lanes share the sentinel bucket, which then filters as
        // one group and keeps its upper row.
        let frame = Frame::from_csv(
            "location,size,total_sqft,bath,price\n\
             obscure_lane,2 BHK,1000,2,50\n\
             forgotten_cross,2 BHK,1000,2,60\n",
        )
        .unwrap();
        let out = engineer_features(&frame, &schema(), &vocab()).unwrap();
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.str_at(0, out.col_index("location").unwrap()), Some("other"));
    }

    #[test]
    fn test_idempotent_on_engineered_frame() {
        let frame = Frame::from_csv(
            "location,size,total_sqft,bath,price\n\
             hebbal,2 BHK,1100,2,50\n\
             hebbal,2 BHK,1150,2,58\n\
             hebbal,3 BHK,1650,3,81\n\
             hsr,2 BHK,1200,2,66\n\
             hsr,2 BHK,1250,2,60\n",
        )
        .unwrap();
        let once = engineer_features(&frame, &schema(), &vocab()).unwrap();
        let twice = engineer_features(&once, &schema(), &vocab()).unwrap();
        assert_eq!(twice.row_count(), once.row_count());
        assert_eq!(twice.columns, once.columns);
    }
}
