//! Mapping from pipeline errors to HTTP responses

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::FloodError;

pub const UNAVAILABLE_DETAIL: &str = "Model not loaded. Please try again later.";
pub const INTERNAL_DETAIL: &str = "Internal server error";

/// An error response: status code plus a `{"detail": ...}` body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn unavailable() -> Self {
        ApiError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            detail: UNAVAILABLE_DETAIL.to_string(),
        }
    }

    pub fn internal() -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: INTERNAL_DETAIL.to_string(),
        }
    }
}

impl From<FloodError> for ApiError {
    fn from(error: FloodError) -> Self {
        match error {
            FloodError::ServiceUnavailable | FloodError::NotLoaded => ApiError::unavailable(),
            FloodError::Validation { .. } => ApiError {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                detail: error.to_string(),
            },
            // Already logged by the service
            FloodError::PredictionFailed { .. } => ApiError::internal(),
            other => {
                log::error!("Unexpected error: {}", other);
                ApiError::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(FloodError::ServiceUnavailable).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(FloodError::NotLoaded).status,
            StatusCode::SERVICE_UNAVAILABLE
        );

        let validation = ApiError::from(FloodError::Validation {
            field: "rainfall",
            message: "too much".to_string(),
        });
        assert_eq!(validation.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(validation.detail.contains("rainfall"));
    }

    #[test]
    fn test_internal_errors_are_opaque() {
        let error = ApiError::from(FloodError::PredictionFailed {
            source: Box::new(FloodError::Inference("secret backend detail".to_string())),
        });
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.detail, INTERNAL_DETAIL);

        let error = ApiError::from(FloodError::Config("bad".to_string()));
        assert_eq!(error, ApiError::internal());
    }
}
