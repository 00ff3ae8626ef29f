//! Persisted inputs
//!
//! Normalization parameters and model artifact packaging.

pub mod normalization;
pub mod setup;

pub use normalization::{Bounds, NormalizationTable};
pub use setup::{package_artifacts, SetupReport};
