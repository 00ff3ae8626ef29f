//! Artifact packaging
//!
//! Copies a trained model and its normalization parameters from the training
//! workspace into the locations the server searches first.

use std::path::{Path, PathBuf};

use crate::Result;

/// Where training runs leave their artifacts, relative to the project root
pub const MODEL_SOURCES: [&str; 2] = [
    "Neural Network Classifier0/Neural Network Classifier_v7/best_model.mpk",
    "Neural Network Classifier/best_model.mpk",
];

/// Normalization file name, relative to the project root
pub const NORMALIZATION_SOURCE: &str = "Normalized_param.json";

/// A file that was copied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// What `package_artifacts` copied. `None` means no source was found.
#[derive(Debug, Clone, Default)]
pub struct SetupReport {
    pub model: Option<CopiedFile>,
    pub normalization: Option<CopiedFile>,
}

impl SetupReport {
    pub fn is_complete(&self) -> bool {
        self.model.is_some() && self.normalization.is_some()
    }
}

/// Copy the first existing model artifact under `root` to `model_dest` and the
/// normalization file to `normalization_dest`.
///
/// Missing sources are logged and reported, not treated as errors.
pub fn package_artifacts(
    root: &Path,
    model_dest: &Path,
    normalization_dest: &Path,
) -> Result<SetupReport> {
    let mut report = SetupReport::default();

    let model_source = MODEL_SOURCES
        .iter()
        .map(|relative| root.join(relative))
        .find(|path| path.exists());

    match model_source {
        Some(source) => {
            copy_into(&source, model_dest)?;
            log::info!("Copied model: {} -> {}", source.display(), model_dest.display());
            report.model = Some(CopiedFile {
                source,
                destination: model_dest.to_path_buf(),
            });
        }
        None => log::warn!("No model artifact found under {}", root.display()),
    }

    let normalization_source = root.join(NORMALIZATION_SOURCE);
    if normalization_source.exists() {
        copy_into(&normalization_source, normalization_dest)?;
        log::info!(
            "Copied normalization parameters: {} -> {}",
            normalization_source.display(),
            normalization_dest.display()
        );
        report.normalization = Some(CopiedFile {
            source: normalization_source,
            destination: normalization_dest.to_path_buf(),
        });
    } else {
        log::warn!(
            "Normalization parameters not found at {}",
            normalization_source.display()
        );
    }

    Ok(report)
}

fn copy_into(source: &Path, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(source, destination)?;
    Ok(())
}
