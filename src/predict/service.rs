//! Prediction service

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::data::NormalizationTable;
use crate::features::encode;
use crate::model::ModelGateway;
use crate::{FloodError, PredictionOutcome, PredictionRequest, Result};

/// A prediction together with serving metadata
#[derive(Debug, Clone)]
pub struct ServedPrediction {
    pub outcome: PredictionOutcome,
    pub model_used: String,
    pub processing_time: Duration,
}

/// Encodes requests, runs the gateway and derives decision and confidence
#[derive(Clone)]
pub struct PredictionService {
    gateway: Arc<ModelGateway>,
    table: Option<Arc<NormalizationTable>>,
    model_name: String,
}

impl PredictionService {
    pub fn new(
        gateway: Arc<ModelGateway>,
        table: Option<Arc<NormalizationTable>>,
        model_name: impl Into<String>,
    ) -> Self {
        PredictionService {
            gateway,
            table,
            model_name: model_name.into(),
        }
    }

    /// False while degraded
    pub fn is_available(&self) -> bool {
        self.gateway.is_loaded()
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Predict flood risk for one request.
    ///
    /// Fails with [`FloodError::ServiceUnavailable`] before touching the
    /// request when no model is loaded. Gateway failures are wrapped in
    /// [`FloodError::PredictionFailed`].
    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionOutcome> {
        if !self.gateway.is_loaded() {
            return Err(FloodError::ServiceUnavailable);
        }

        let vector = encode(request, self.table.as_deref());
        let probability = self
            .gateway
            .infer(&vector)
            .and_then(|p| {
                if (0.0..=1.0).contains(&p) {
                    Ok(p)
                } else {
                    Err(FloodError::Inference(format!(
                        "model output {} is not a probability",
                        p
                    )))
                }
            })
            .map_err(|e| {
                log::error!("Prediction error: {}", e);
                FloodError::PredictionFailed {
                    source: Box::new(e),
                }
            })?;

        log::debug!("Model output {:.4} for {:?}", probability, vector.values());
        Ok(PredictionOutcome::from_probability(probability))
    }

    /// [`predict`](Self::predict) plus model name and wall-clock latency
    pub fn predict_timed(&self, request: &PredictionRequest) -> Result<ServedPrediction> {
        let start = Instant::now();
        let outcome = self.predict(request)?;
        Ok(ServedPrediction {
            outcome,
            model_used: self.model_name.clone(),
            processing_time: start.elapsed(),
        })
    }
}

/// Format a prediction for display
pub fn format_prediction(served: &ServedPrediction) -> String {
    let outcome = &served.outcome;
    let verdict = if outcome.is_flood() {
        "Flood likely"
    } else {
        "No flood expected"
    };

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {}
├─────────────────────────────────────────────────┤
│  Flood probability:  {:.1}%
│  Confidence:         {}
│  Model:              {}
│  Processing time:    {:.2} ms
└─────────────────────────────────────────────────┘
"#,
        verdict,
        outcome.probability * 100.0,
        outcome.confidence,
        served.model_used,
        served.processing_time.as_secs_f64() * 1000.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Bounds;
    use crate::testing::{sample_request, FailingClassifier, FixedClassifier};
    use crate::ConfidenceLevel;

    fn service_with_score(score: f32) -> PredictionService {
        let gateway = ModelGateway::with_model(Box::new(FixedClassifier::new(score)), "fixed");
        PredictionService::new(Arc::new(gateway), None, "test model")
    }

    #[test]
    fn test_high_flood_probability() {
        let outcome = service_with_score(0.83).predict(&sample_request()).unwrap();
        assert_eq!(outcome.decision, 1);
        assert_eq!(outcome.confidence, ConfidenceLevel::High);
        assert_eq!(outcome.probability, 0.83);
    }

    #[test]
    fn test_marginal_flood_probability() {
        let outcome = service_with_score(0.55).predict(&sample_request()).unwrap();
        assert_eq!(outcome.decision, 1);
        assert_eq!(outcome.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_low_flood_probability() {
        let outcome = service_with_score(0.1).predict(&sample_request()).unwrap();
        assert_eq!(outcome.decision, 0);
        assert_eq!(outcome.confidence, ConfidenceLevel::High);
    }

    #[test]
    fn test_exact_half_is_no_flood() {
        let outcome = service_with_score(0.5).predict(&sample_request()).unwrap();
        assert_eq!(outcome.decision, 0);
        assert_eq!(outcome.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_unloaded_is_unavailable() {
        let service = PredictionService::new(Arc::new(ModelGateway::unloaded()), None, "none");
        assert!(!service.is_available());
        assert!(matches!(
            service.predict(&sample_request()),
            Err(FloodError::ServiceUnavailable)
        ));
        assert!(matches!(
            service.predict_timed(&sample_request()),
            Err(FloodError::ServiceUnavailable)
        ));
    }

    #[test]
    fn test_classifier_called_once_per_prediction() {
        let classifier = FixedClassifier::new(0.7);
        let calls = classifier.calls.clone();
        let gateway = ModelGateway::with_model(Box::new(classifier), "fixed");
        let service = PredictionService::new(Arc::new(gateway), None, "test model");

        service.predict(&sample_request()).unwrap();
        service.predict(&sample_request()).unwrap();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[test]
    fn test_inference_failure_is_wrapped() {
        let gateway = ModelGateway::with_model(Box::new(FailingClassifier), "failing");
        let service = PredictionService::new(Arc::new(gateway), None, "test model");

        match service.predict(&sample_request()) {
            Err(FloodError::PredictionFailed { source }) => {
                assert!(matches!(*source, FloodError::Inference(_)));
            }
            other => panic!("Expected PredictionFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_output_fails() {
        let result = service_with_score(f32::NAN).predict(&sample_request());
        assert!(matches!(result, Err(FloodError::PredictionFailed { .. })));
    }

    #[test]
    fn test_output_outside_unit_interval_fails() {
        for score in [1.3, -0.01, f32::INFINITY] {
            match service_with_score(score).predict(&sample_request()) {
                Err(FloodError::PredictionFailed { source }) => {
                    assert!(matches!(*source, FloodError::Inference(_)), "score {}", score);
                }
                other => panic!("Expected PredictionFailed for {}, got {:?}", score, other),
            }
        }
        assert!(service_with_score(1.0).predict(&sample_request()).is_ok());
        assert!(service_with_score(0.0).predict(&sample_request()).is_ok());
    }

    #[test]
    fn test_timed_prediction_metadata() {
        let mut table = NormalizationTable::default();
        table.insert("rainfall", Bounds { min: 0.0, max: 100.0 });
        let gateway = ModelGateway::with_model(Box::new(FixedClassifier::new(0.9)), "fixed");
        let service = PredictionService::new(Arc::new(gateway), Some(Arc::new(table)), "v7");

        let served = service.predict_timed(&sample_request()).unwrap();
        assert_eq!(served.model_used, service.model_name());
        assert_eq!(served.model_used, "v7");
        assert_eq!(
            service.gateway().source(),
            Some(std::path::Path::new("fixed"))
        );
        assert_eq!(served.outcome.decision, 1);
        assert!(format_prediction(&served).contains("Flood likely"));
    }
}
