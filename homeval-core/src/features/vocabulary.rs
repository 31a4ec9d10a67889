//! Frozen location vocabulary.
//!
//! The set of locations frequent enough to keep their own one-hot column is
//! computed once, from training data, and persisted inside the preprocessor
//! bundle. Evaluation and inference reuse it unchanged; re-deriving it per
//! call would let rare evaluation-time locations shift the encoding schema.

use crate::data::frame::Frame;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel bucket for locations outside the vocabulary. Never emitted as
/// an explicit one-hot column; the all-zero dummy row represents it.
pub const OTHER_BUCKET: &str = "other";

/// Locations with at most this many training occurrences collapse into the
/// sentinel bucket.
pub const RARE_LOCATION_MAX_COUNT: usize = 10;

/// Fitted set of non-rare locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationVocabulary {
    /// Column the vocabulary applies to.
    pub column: String,
    /// Kept locations, sorted for a deterministic one-hot layout.
    pub locations: Vec<String>,
}

impl LocationVocabulary {
    /// Count location occurrences in a training frame and keep those seen
    /// more than [`RARE_LOCATION_MAX_COUNT`] times.
    pub fn fit(frame: &Frame, column: &str) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        if let Some(idx) = frame.col_index(column) {
            for row in &frame.rows {
                if let Some(serde_json::Value::String(s)) = row.get(idx) {
                    *counts.entry(s.trim().to_string()).or_default() += 1;
                }
            }
        }
        let mut locations: Vec<String> = counts
            .into_iter()
            .filter(|(loc, count)| *count > RARE_LOCATION_MAX_COUNT && loc != OTHER_BUCKET)
            .map(|(loc, _)| loc)
            .collect();
        locations.sort();
        Self {
            column: column.to_string(),
            locations,
        }
    }

    /// Build a vocabulary from an explicit location list (tests, fixtures).
    pub fn from_locations(mut locations: Vec<String>) -> Self {
        locations.sort();
        Self {
            column: "location".to_string(),
            locations,
        }
    }

    pub fn contains(&self, location: &str) -> bool {
        self.locations.iter().any(|l| l == location)
    }

    /// Map a raw location to its bucket: itself when in-vocabulary, the
    /// sentinel otherwise.
    pub fn bucket(&self, location: &str) -> String {
        let trimmed = location.trim();
        if self.contains(trimmed) {
            trimmed.to_string()
        } else {
            OTHER_BUCKET.to_string()
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_counts(counts: &[(&str, usize)]) -> Frame {
        let mut frame = Frame::new(vec!["location".into()]);
        for (loc, n) in counts {
            for _ in 0..*n {
                frame.push_row(vec![serde_json::json!(loc)]).unwrap();
            }
        }
        frame
    }

    #[test]
    fn test_rare_locations_collapse() {
        let frame = frame_with_counts(&[("hebbal", 11), ("hsr", 12), ("obscure_lane", 10)]);
        let vocab = LocationVocabulary::fit(&frame, "location");
        assert_eq!(vocab.locations, vec!["hebbal", "hsr"]);
        assert_eq!(vocab.bucket("hebbal"), "hebbal");
        assert_eq!(vocab.bucket("obscure_lane"), OTHER_BUCKET);
        assert_eq!(vocab.bucket("never_seen"), OTHER_BUCKET);
    }

    #[test]
    fn test_boundary_eleven_kept() {
        let frame = frame_with_counts(&[("edge_case", 11)]);
        let vocab = LocationVocabulary::fit(&frame, "location");
        assert!(vocab.contains("edge_case"));
    }

    #[test]
    fn test_sentinel_never_in_vocabulary() {
        let frame = frame_with_counts(&[("other", 50), ("hsr", 20)]);
        let vocab = LocationVocabulary::fit(&frame, "location");
        assert_eq!(vocab.locations, vec!["hsr"]);
    }

    #[test]
    fn test_bucket_trims_whitespace() {
        let vocab = LocationVocabulary::from_locations(vec!["hebbal".into()]);
        assert_eq!(vocab.bucket(" hebbal "), "hebbal");
    }
}
