//! Min-max normalization parameters
//!
//! Stored as a JSON object keyed by feature name:
//! `{"rainfall": {"min": 0.0, "max": 500.0}, ...}`
//!
//! Only keys naming a model feature are read; anything else in the file is
//! skipped.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::features::FEATURE_ORDER;
use crate::{FloodError, Result};

/// Observed training range of a single feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    /// Scale into the training range; a zero-width range maps to 0.0
    pub fn scale(&self, value: f64) -> f64 {
        let width = self.max - self.min;
        if width != 0.0 {
            (value - self.min) / width
        } else {
            0.0
        }
    }
}

/// Per-feature bounds, read once at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizationTable {
    features: BTreeMap<String, Bounds>,
}

impl NormalizationTable {
    /// Read the table from disk.
    ///
    /// Returns `Ok(None)` when the file does not exist. A file that exists but
    /// cannot be read or parsed is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| FloodError::Normalization {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let table = Self::from_json(&content).map_err(|e| FloodError::Normalization {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        log::debug!("Normalization features: {:?}", table.features.keys());
        Ok(Some(table))
    }

    /// Parse a table from its JSON text.
    ///
    /// Entries for model features must be `{min, max}` objects. Other keys
    /// are ignored whatever their shape.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)?;

        let mut table = NormalizationTable::default();
        for (name, value) in raw {
            if FEATURE_ORDER.contains(&name.as_str()) {
                let bounds: Bounds = serde_json::from_value(value)?;
                table.features.insert(name, bounds);
            } else {
                log::debug!("Skipping normalization entry {:?}: not a model feature", name);
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, feature: &str, bounds: Bounds) {
        self.features.insert(feature.to_string(), bounds);
    }

    pub fn bounds(&self, feature: &str) -> Option<&Bounds> {
        self.features.get(feature)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_scale() {
        let bounds = Bounds { min: 10.0, max: 30.0 };
        assert_eq!(bounds.scale(10.0), 0.0);
        assert_eq!(bounds.scale(20.0), 0.5);
        assert_eq!(bounds.scale(30.0), 1.0);
        // Values outside the training range are not clamped
        assert_eq!(bounds.scale(40.0), 1.5);
    }

    #[test]
    fn test_zero_width_scale() {
        let bounds = Bounds { min: 3.0, max: 3.0 };
        assert_eq!(bounds.scale(3.0), 0.0);
        assert_eq!(bounds.scale(100.0), 0.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"rainfall": {{"min": 0.0, "max": 300.0}}, "elevation": {{"min": 1, "max": 9000}}}}"#
        )
        .unwrap();

        let table = NormalizationTable::load(file.path()).unwrap().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.bounds("rainfall"), Some(&Bounds { min: 0.0, max: 300.0 }));
        assert_eq!(table.bounds("elevation").unwrap().max, 9000.0);
        assert!(table.bounds("humidity").is_none());
    }

    #[test]
    fn test_unrelated_keys_are_skipped() {
        let table = NormalizationTable::from_json(
            r#"{
                "rainfall": {"min": 0, "max": 100},
                "target": "Flood Occurred",
                "row_count": 10000,
                "notes": {"source": "training export"}
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.bounds("rainfall"), Some(&Bounds { min: 0.0, max: 100.0 }));
        assert!(table.bounds("target").is_none());
    }

    #[test]
    fn test_malformed_feature_entry_is_error() {
        let result = NormalizationTable::from_json(r#"{"humidity": "wide", "target": "x"}"#);
        assert!(matches!(result, Err(FloodError::Json(_))));
    }

    #[test]
    fn test_missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let table = NormalizationTable::load(dir.path().join("Normalized_param.json")).unwrap();
        assert!(table.is_none());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"rainfall": {{"min": "low"}}}}"#).unwrap();

        match NormalizationTable::load(file.path()) {
            Err(FloodError::Normalization { path, .. }) => assert_eq!(path, file.path()),
            other => panic!("Expected normalization error, got {:?}", other),
        }
    }
}
