//! Canonical feature vector for the flood network
//!
//! The network reads 13 inputs in a fixed order. That order comes from the
//! training data layout, not from the request struct, and must not change.

use crate::data::NormalizationTable;
use crate::features::encoding::{land_cover_code, soil_type_code};
use crate::PredictionRequest;

/// Feature names in the order the network consumes them
pub const FEATURE_ORDER: [&str; FeatureVector::DIM] = [
    "latitude",
    "longitude",
    "rainfall",
    "temperature",
    "humidity",
    "river_discharge",
    "water_level",
    "elevation",
    "land_cover",
    "soil_type",
    "population_density",
    "infrastructure",
    "historical_floods",
];

/// Encoded (and possibly normalized) model input for one location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FeatureVector::DIM]);

impl FeatureVector {
    /// Dimension of feature vector
    pub const DIM: usize = 13;

    /// Raw values in canonical order, categoricals replaced by their codes
    pub fn from_request(request: &PredictionRequest) -> Self {
        FeatureVector([
            request.latitude(),
            request.longitude(),
            request.rainfall(),
            request.temperature(),
            request.humidity(),
            request.river_discharge(),
            request.water_level(),
            request.elevation(),
            land_cover_code(request.land_cover()) as f64,
            soil_type_code(request.soil_type()) as f64,
            request.population_density(),
            request.infrastructure() as f64,
            request.historical_floods() as f64,
        ])
    }

    /// Min-max scale every feature the table has bounds for.
    ///
    /// Features without an entry keep their raw value.
    pub fn normalized(&self, table: &NormalizationTable) -> Self {
        let mut values = self.0;
        for (value, name) in values.iter_mut().zip(FEATURE_ORDER) {
            if let Some(bounds) = table.bounds(name) {
                *value = bounds.scale(*value);
            }
        }
        FeatureVector(values)
    }

    pub fn values(&self) -> &[f64; FeatureVector::DIM] {
        &self.0
    }

    /// Look up a feature by name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_ORDER
            .iter()
            .position(|feature| *feature == name)
            .map(|i| self.0[i])
    }

    /// Single-precision copy for the tensor backend
    pub fn to_f32_vec(&self) -> Vec<f32> {
        self.0.iter().map(|v| *v as f32).collect()
    }
}

/// Encode a request for the network.
///
/// Without a table (or with an empty one) the raw encoded values are used as
/// is.
pub fn encode(request: &PredictionRequest, table: Option<&NormalizationTable>) -> FeatureVector {
    let raw = FeatureVector::from_request(request);
    match table {
        Some(table) if !table.is_empty() => raw.normalized(table),
        _ => raw,
    }
}
