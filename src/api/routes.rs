//! Endpoints: `/`, `/health`, `/info`, `/predict`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;

use crate::api::error::ApiError;
use crate::features::FEATURE_ORDER;
use crate::predict::PredictionService;
use crate::{ConfidenceLevel, PredictionRequest, Result};

pub const API_NAME: &str = "River Flood Prediction API";
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared, read-only server state
#[derive(Clone)]
pub struct AppState {
    pub service: PredictionService,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        AppState { service }
    }

    fn model_loaded(&self) -> bool {
        self.service.is_available()
    }
}

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub model_loaded: bool,
    pub docs: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    /// Unix time in seconds
    pub timestamp: f64,
}

#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub predict: &'static str,
    pub health: &'static str,
    pub info: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub api_name: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    pub features: Vec<&'static str>,
    pub endpoints: Endpoints,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// 0: no flood, 1: flood
    pub prediction: u8,
    pub probability: f32,
    pub confidence: ConfidenceLevel,
    pub model_used: String,
    /// Seconds
    pub processing_time: f64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/predict", post(predict))
        .with_state(state)
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: API_NAME,
        version: API_VERSION,
        status: "running",
        model_loaded: state.model_loaded(),
        docs: "/info",
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.model_loaded();
    let now = chrono::Utc::now();
    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" },
        model_loaded,
        timestamp: now.timestamp_micros() as f64 / 1_000_000.0,
    })
}

async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        api_name: API_NAME,
        version: API_VERSION,
        model_loaded: state.model_loaded(),
        features: FEATURE_ORDER.to_vec(),
        endpoints: Endpoints {
            predict: "/predict",
            health: "/health",
            info: "/info",
        },
    })
}

async fn predict(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PredictionRequest>, JsonRejection>,
) -> std::result::Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;

    if !state.model_loaded() {
        return Err(ApiError::unavailable());
    }

    // Inference is CPU bound; keep it off the async workers
    let service = state.service.clone();
    let served = tokio::task::spawn_blocking(move || service.predict_timed(&request))
        .await
        .map_err(|e| {
            log::error!("Prediction task failed: {}", e);
            ApiError::internal()
        })??;

    Ok(Json(PredictResponse {
        prediction: served.outcome.decision,
        probability: served.outcome.probability,
        confidence: served.outcome.confidence,
        model_used: served.model_used,
        processing_time: served.processing_time.as_secs_f64(),
    }))
}

/// Serve until Ctrl-C
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
