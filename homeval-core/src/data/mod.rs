//! Data layer — frames, sources, schema, validation, matrices, transforms.

pub mod frame;
pub mod matrix;
pub mod schema;
pub mod source;
pub mod transform;
pub mod validate;

pub use frame::Frame;
pub use matrix::Matrix;
pub use schema::{ColumnSchema, ColumnType, SchemaConfig};
pub use source::{DocumentStore, JsonlDocumentStore, MemoryDocumentStore, normalize_export};
pub use transform::{OneHotEncoder, Preprocessor, StandardScaler};
pub use validate::{ValidationReport, validate_frame};
