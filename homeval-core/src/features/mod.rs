//! Feature engineering — derivation, rebucketing, outlier removal.

pub mod engineering;
pub mod outliers;
pub mod vocabulary;

pub use engineering::engineer_features;
pub use vocabulary::{LocationVocabulary, OTHER_BUCKET, RARE_LOCATION_MAX_COUNT};
