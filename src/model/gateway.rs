//! Model gateway
//!
//! Searches an ordered list of artifact locations once at startup and keeps
//! the first model that loads. A gateway that found nothing stays unloaded
//! for the life of the process; callers see that as degraded mode.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::features::FeatureVector;
use crate::model::classifier::{ArtifactLoader, Classifier};
use crate::{FloodError, Result};

/// What happened at one candidate location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Missing,
    Failed(String),
    Loaded,
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Missing => write!(f, "missing"),
            AttemptOutcome::Failed(reason) => write!(f, "failed: {}", reason),
            AttemptOutcome::Loaded => write!(f, "loaded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub path: PathBuf,
    pub outcome: AttemptOutcome,
}

/// Every candidate that was examined, in search order.
///
/// Candidates after the first successful one are never examined and do not
/// appear here.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub attempts: Vec<Attempt>,
}

impl LoadReport {
    pub fn is_success(&self) -> bool {
        self.loaded_from().is_some()
    }

    pub fn loaded_from(&self) -> Option<&Path> {
        self.attempts
            .iter()
            .find(|a| a.outcome == AttemptOutcome::Loaded)
            .map(|a| a.path.as_path())
    }
}

/// The loaded model and where it came from
struct ModelHandle {
    model: Box<dyn Classifier>,
    source: PathBuf,
}

enum Candidate {
    Missing,
    Failed(FloodError),
    Loaded(Box<dyn Classifier>),
}

fn try_candidate(path: &Path, loader: &dyn ArtifactLoader) -> Candidate {
    if !path.exists() {
        return Candidate::Missing;
    }
    match loader.load(path) {
        Ok(model) => Candidate::Loaded(model),
        Err(e) => Candidate::Failed(e),
    }
}

/// Owns the model handle; `Unloaded → Loaded` happens only at construction
pub struct ModelGateway {
    handle: Option<ModelHandle>,
}

impl ModelGateway {
    /// A gateway with no model
    pub fn unloaded() -> Self {
        ModelGateway { handle: None }
    }

    /// A gateway around an already loaded model
    pub fn with_model(model: Box<dyn Classifier>, source: impl Into<PathBuf>) -> Self {
        ModelGateway {
            handle: Some(ModelHandle {
                model,
                source: source.into(),
            }),
        }
    }

    /// Try each candidate in order until one exists and loads.
    ///
    /// Failures are logged and recorded in the report; they never abort the
    /// search or the caller.
    pub fn load(candidates: &[PathBuf], loader: &dyn ArtifactLoader) -> (Self, LoadReport) {
        let mut report = LoadReport::default();

        for path in candidates {
            match try_candidate(path, loader) {
                Candidate::Loaded(model) => {
                    log::info!("Model loaded from: {}", path.display());
                    report.attempts.push(Attempt {
                        path: path.clone(),
                        outcome: AttemptOutcome::Loaded,
                    });
                    return (Self::with_model(model, path.clone()), report);
                }
                Candidate::Failed(e) => {
                    log::warn!("Failed to load model from {}: {}", path.display(), e);
                    report.attempts.push(Attempt {
                        path: path.clone(),
                        outcome: AttemptOutcome::Failed(e.to_string()),
                    });
                }
                Candidate::Missing => {
                    log::debug!("No model at {}", path.display());
                    report.attempts.push(Attempt {
                        path: path.clone(),
                        outcome: AttemptOutcome::Missing,
                    });
                }
            }
        }

        log::warn!("Model not found or could not be loaded");
        (Self::unloaded(), report)
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Path the model was loaded from
    pub fn source(&self) -> Option<&Path> {
        self.handle.as_ref().map(|h| h.source.as_path())
    }

    /// Run the model over one vector and return its raw output
    pub fn infer(&self, vector: &FeatureVector) -> Result<f32> {
        let handle = self.handle.as_ref().ok_or(FloodError::NotLoaded)?;
        handle.model.infer(vector)
    }
}
