//! Feature extraction and encoding
//!
//! Converts validated requests into model-ready feature vectors.

pub mod encoding;
pub mod vector;

pub use encoding::{land_cover_code, soil_type_code};
pub use vector::{encode, FeatureVector, FEATURE_ORDER};
