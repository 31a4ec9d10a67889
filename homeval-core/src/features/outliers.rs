//! Statistical outlier passes over the derived price-per-sqft column.
//!
//! Both passes group by location and work on the frame as it stood when the
//! pass started; removal decisions never see partially filtered statistics.

use crate::data::frame::{Frame, value_to_f64};
use crate::error::PipelineError;
use crate::features::engineering::{BHK_COLUMN, PPS_COLUMN};
use std::collections::HashMap;

/// A BHK tier must have more than this many samples before it can disqualify
/// rows of the next tier up.
pub const BHK_TIER_MIN_SAMPLES: usize = 5;

/// Keep, per location, only rows whose price-per-sqft lies in
/// `(mean - std, mean + std]` of that location's distribution
/// (population standard deviation).
///
/// Degenerate groups fall out naturally: a single-listing location has
/// std 0 and an empty half-open band.
pub fn remove_pps_outliers(frame: &mut Frame, location_column: &str) -> Result<(), PipelineError> {
    let loc_idx = frame
        .col_index(location_column)
        .ok_or_else(|| PipelineError::feature_engineering("missing location column"))?;
    let pps_idx = frame
        .col_index(PPS_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing price_per_sqft column"))?;

    let mut groups: HashMap<String, Vec<f64>> = HashMap::new();
    for row in &frame.rows {
        let (Some(loc), Some(pps)) = (
            row.get(loc_idx).and_then(|v| v.as_str()),
            row.get(pps_idx).and_then(value_to_f64),
        ) else {
            continue;
        };
        groups.entry(loc.to_string()).or_default().push(pps);
    }

    let bands: HashMap<String, (f64, f64)> = groups
        .into_iter()
        .map(|(loc, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let var =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
            (loc, (mean, var.sqrt()))
        })
        .collect();

    frame.retain_rows(|row| {
        let (Some(loc), Some(pps)) = (
            row.get(loc_idx).and_then(|v| v.as_str()),
            row.get(pps_idx).and_then(value_to_f64),
        ) else {
            return false;
        };
        match bands.get(loc) {
            Some(&(mean, std)) => pps > mean - std && pps <= mean + std,
            None => false,
        }
    });
    Ok(())
}

/// Within each location, drop rows of BHK tier `b` priced (per sqft) below
/// the mean of tier `b - 1`, provided that smaller tier has more than
/// [`BHK_TIER_MIN_SAMPLES`] samples. A larger home should not be cheaper
/// per square foot than a smaller one at the same location.
pub fn remove_bhk_outliers(frame: &mut Frame, location_column: &str) -> Result<(), PipelineError> {
    let loc_idx = frame
        .col_index(location_column)
        .ok_or_else(|| PipelineError::feature_engineering("missing location column"))?;
    let bhk_idx = frame
        .col_index(BHK_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing no_of_BHK column"))?;
    let pps_idx = frame
        .col_index(PPS_COLUMN)
        .ok_or_else(|| PipelineError::feature_engineering("missing price_per_sqft column"))?;

    // (location, bhk) -> price-per-sqft samples, gathered before any removal.
    let mut tiers: HashMap<(String, i64), Vec<f64>> = HashMap::new();
    for row in &frame.rows {
        let (Some(loc), Some(bhk), Some(pps)) = (
            row.get(loc_idx).and_then(|v| v.as_str()),
            row.get(bhk_idx).and_then(value_to_f64),
            row.get(pps_idx).and_then(value_to_f64),
        ) else {
            continue;
        };
        tiers
            .entry((loc.to_string(), bhk as i64))
            .or_default()
            .push(pps);
    }

    let floors: HashMap<(String, i64), f64> = tiers
        .iter()
        .filter(|(_, values)| values.len() > BHK_TIER_MIN_SAMPLES)
        .map(|((loc, bhk), values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            ((loc.clone(), *bhk), mean)
        })
        .collect();

    frame.retain_rows(|row| {
        let (Some(loc), Some(bhk), Some(pps)) = (
            row.get(loc_idx).and_then(|v| v.as_str()),
            row.get(bhk_idx).and_then(value_to_f64),
            row.get(pps_idx).and_then(value_to_f64),
        ) else {
            return false;
        };
        match floors.get(&(loc.to_string(), bhk as i64 - 1)) {
            Some(&smaller_tier_mean) => pps >= smaller_tier_mean,
            None => true,
        }
    });
    Ok(())
}
