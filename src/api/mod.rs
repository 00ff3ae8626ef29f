//! HTTP transport
//!
//! Thin axum layer over [`PredictionService`](crate::predict::PredictionService).

pub mod error;
pub mod routes;

pub use error::ApiError;
pub use routes::{router, serve, AppState};
