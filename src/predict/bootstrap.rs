//! One-shot startup
//!
//! Loads the normalization table and the model exactly once and hands both to
//! a [`PredictionService`]. Nothing here is fatal: every failure leaves the
//! service running in degraded mode.

use std::path::Path;
use std::sync::Arc;

use crate::data::NormalizationTable;
use crate::model::{ArtifactLoader, LoadReport, ModelGateway};
use crate::predict::service::PredictionService;
use crate::Config;

/// Result of reading the normalization file
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizationStatus {
    /// Number of features with bounds
    Loaded(usize),
    Missing,
    Invalid(String),
}

/// Everything startup produced
pub struct Startup {
    pub service: PredictionService,
    pub normalization: NormalizationStatus,
    /// Empty when model loading was skipped
    pub report: LoadReport,
}

/// Build the service from `config`.
///
/// An unreadable normalization file skips model loading, so the network never
/// sees unscaled inputs it was not trained on. A missing file only disables
/// scaling.
pub fn bootstrap(config: &Config, loader: &dyn ArtifactLoader) -> Startup {
    let normalization_path = Path::new(&config.data.normalization_path);

    let (table, normalization) = match NormalizationTable::load(normalization_path) {
        Ok(Some(table)) => {
            log::info!(
                "Normalization parameters loaded ({} features)",
                table.len()
            );
            let count = table.len();
            (Some(Arc::new(table)), NormalizationStatus::Loaded(count))
        }
        Ok(None) => {
            log::warn!(
                "No normalization parameters at {}; using raw features",
                normalization_path.display()
            );
            (None, NormalizationStatus::Missing)
        }
        Err(e) => {
            log::error!("Error loading normalization parameters: {}", e);
            let service = PredictionService::new(
                Arc::new(ModelGateway::unloaded()),
                None,
                config.model.name.clone(),
            );
            return Startup {
                service,
                normalization: NormalizationStatus::Invalid(e.to_string()),
                report: LoadReport::default(),
            };
        }
    };

    let (gateway, report) = ModelGateway::load(&config.candidate_paths(), loader);
    if gateway.is_loaded() {
        log::info!("Model loaded successfully");
    } else {
        log::warn!("Model loading failed - API will run with limited functionality");
    }

    Startup {
        service: PredictionService::new(Arc::new(gateway), table, config.model.name.clone()),
        normalization,
        report,
    }
}
