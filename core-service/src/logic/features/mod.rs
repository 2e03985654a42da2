//! Features Module - Feature Encoding Pipeline
//!
//! Turns a `CarAttributes` record into the fixed 64-slot vector the price
//! model was trained on.

pub mod layout;
pub mod record;
pub mod vector;
pub mod encoder;


// Re-export common types
pub use layout::{feature_index, registry, validate_registry, LayoutInfo, FEATURE_COUNT};
pub use record::CarAttributes;
pub use vector::FeatureVector;
pub use encoder::{encode, encode_with_report, EncodingReport};
