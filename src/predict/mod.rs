//! Prediction and inference
//!
//! Wire the codec and the model gateway together and interpret the output.

pub mod bootstrap;
pub mod service;

pub use bootstrap::{bootstrap, NormalizationStatus, Startup};
pub use service::{format_prediction, PredictionService, ServedPrediction};
