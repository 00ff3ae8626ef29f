//! River flood prediction
//!
//! Encodes location, weather and land-use readings into the feature layout a
//! frozen neural network was trained on, and serves its flood probability.

pub mod api;
pub mod data;
pub mod features;
pub mod model;
pub mod predict;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Dominant land cover at the location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandCover {
    #[serde(rename = "Water Body")]
    WaterBody,
    Forest,
    Agricultural,
    Desert,
    Urban,
}

impl fmt::Display for LandCover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandCover::WaterBody => write!(f, "Water Body"),
            LandCover::Forest => write!(f, "Forest"),
            LandCover::Agricultural => write!(f, "Agricultural"),
            LandCover::Desert => write!(f, "Desert"),
            LandCover::Urban => write!(f, "Urban"),
        }
    }
}

/// Dominant soil type at the location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilType {
    Clay,
    Peat,
    Loam,
    Sandy,
    Silt,
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoilType::Clay => write!(f, "Clay"),
            SoilType::Peat => write!(f, "Peat"),
            SoilType::Loam => write!(f, "Loam"),
            SoilType::Sandy => write!(f, "Sandy"),
            SoilType::Silt => write!(f, "Silt"),
        }
    }
}

/// Unvalidated request fields as they arrive on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFields {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub rainfall: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub river_discharge: f64,
    pub water_level: f64,
    pub land_cover: LandCover,
    pub soil_type: SoilType,
    pub population_density: f64,
    pub infrastructure: i64,
    pub historical_floods: i64,
}

/// A validated prediction request.
///
/// Only constructible through [`PredictionRequest::new`] (or deserialization,
/// which goes through it), so every value is inside its documented range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RequestFields")]
pub struct PredictionRequest {
    latitude: f64,
    longitude: f64,
    elevation: f64,
    rainfall: f64,
    temperature: f64,
    humidity: f64,
    river_discharge: f64,
    water_level: f64,
    land_cover: LandCover,
    soil_type: SoilType,
    population_density: f64,
    infrastructure: u8,
    historical_floods: u8,
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(FloodError::Validation {
            field,
            message: format!("{} is outside [{}, {}]", value, min, max),
        })
    }
}

fn check_flag(field: &'static str, value: i64) -> Result<u8> {
    match value {
        0 => Ok(0),
        1 => Ok(1),
        other => Err(FloodError::Validation {
            field,
            message: format!("{} is not a 0/1 flag", other),
        }),
    }
}

impl PredictionRequest {
    /// Validate raw fields, failing on the first out-of-range value
    pub fn new(fields: RequestFields) -> Result<Self> {
        Ok(PredictionRequest {
            latitude: check_range("latitude", fields.latitude, -90.0, 90.0)?,
            longitude: check_range("longitude", fields.longitude, -180.0, 180.0)?,
            elevation: check_range("elevation", fields.elevation, 0.0, 10_000.0)?,
            rainfall: check_range("rainfall", fields.rainfall, 0.0, 1_000.0)?,
            temperature: check_range("temperature", fields.temperature, -50.0, 60.0)?,
            humidity: check_range("humidity", fields.humidity, 0.0, 100.0)?,
            river_discharge: check_range(
                "river_discharge",
                fields.river_discharge,
                0.0,
                10_000.0,
            )?,
            water_level: check_range("water_level", fields.water_level, 0.0, 50.0)?,
            land_cover: fields.land_cover,
            soil_type: fields.soil_type,
            population_density: check_range(
                "population_density",
                fields.population_density,
                0.0,
                50_000.0,
            )?,
            infrastructure: check_flag("infrastructure", fields.infrastructure)?,
            historical_floods: check_flag("historical_floods", fields.historical_floods)?,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn rainfall(&self) -> f64 {
        self.rainfall
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    pub fn river_discharge(&self) -> f64 {
        self.river_discharge
    }

    pub fn water_level(&self) -> f64 {
        self.water_level
    }

    pub fn land_cover(&self) -> LandCover {
        self.land_cover
    }

    pub fn soil_type(&self) -> SoilType {
        self.soil_type
    }

    pub fn population_density(&self) -> f64 {
        self.population_density
    }

    pub fn infrastructure(&self) -> u8 {
        self.infrastructure
    }

    pub fn historical_floods(&self) -> u8 {
        self.historical_floods
    }
}

impl TryFrom<RequestFields> for PredictionRequest {
    type Error = FloodError;

    fn try_from(fields: RequestFields) -> Result<Self> {
        PredictionRequest::new(fields)
    }
}

/// Coarse confidence label derived from the flood probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// Bucket a probability.
    ///
    /// The predicates overlap and are evaluated in order, so the bands are
    /// not symmetric around 0.5: 0.5, 0.4 and 0.6 are Low, 0.2 and 0.8 are
    /// Medium.
    pub fn from_probability(probability: f32) -> Self {
        if probability > 0.8 || probability < 0.2 {
            ConfidenceLevel::High
        } else if probability > 0.6 || probability < 0.4 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLevel::High => write!(f, "High"),
            ConfidenceLevel::Medium => write!(f, "Medium"),
            ConfidenceLevel::Low => write!(f, "Low"),
        }
    }
}

/// Model prediction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    /// 1 = flood, 0 = no flood
    pub decision: u8,
    pub probability: f32,
    pub confidence: ConfidenceLevel,
}

impl PredictionOutcome {
    /// Derive decision and confidence from a raw model probability
    pub fn from_probability(probability: f32) -> Self {
        PredictionOutcome {
            decision: if probability > 0.5 { 1 } else { 0 },
            probability,
            confidence: ConfidenceLevel::from_probability(probability),
        }
    }

    pub fn is_flood(&self) -> bool {
        self.decision == 1
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum FloodError {
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Model not loaded")]
    NotLoaded,

    #[error("Service unavailable: model not loaded")]
    ServiceUnavailable,

    #[error("Prediction failed: {source}")]
    PredictionFailed {
        #[source]
        source: Box<FloodError>,
    },

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Failed to load model artifact {}: {message}", path.display())]
    Artifact { path: PathBuf, message: String },

    #[error("Failed to load normalization parameters {}: {message}", path.display())]
    Normalization { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FloodError>;

/// Application configuration loaded from flood.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub data: DataConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Reported as `model_used` in prediction responses
    pub name: String,
    /// Hidden layer widths of the frozen network
    pub hidden_dims: Vec<usize>,
    /// Artifact locations, most preferred first
    pub candidates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub normalization_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8001,
            },
            model: ModelConfig {
                name: "Neural Network Classifier v7".to_string(),
                hidden_dims: vec![64, 32],
                candidates: vec![
                    "models/best_model.mpk".to_string(),
                    "../Neural Network Classifier0/Neural Network Classifier_v7/best_model.mpk"
                        .to_string(),
                    "../Neural Network Classifier/best_model.mpk".to_string(),
                ],
            },
            data: DataConfig {
                normalization_path: "Normalized_param.json".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FloodError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| FloodError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FloodError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.model.hidden_dims.is_empty() || self.model.hidden_dims.contains(&0) {
            return Err(FloodError::Config(
                "model.hidden_dims must list at least one non-zero width".to_string(),
            ));
        }
        Ok(())
    }

    /// Candidate artifact paths in search order
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        self.model.candidates.iter().map(PathBuf::from).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::sample_fields;
    use super::*;

    #[test]
    fn test_valid_request() {
        let request = PredictionRequest::new(sample_fields()).unwrap();
        assert_eq!(request.rainfall(), 50.0);
        assert_eq!(request.land_cover(), LandCover::Urban);
        assert_eq!(request.infrastructure(), 1);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut fields = sample_fields();
        fields.latitude = -90.0;
        fields.longitude = 180.0;
        fields.water_level = 50.0;
        fields.population_density = 0.0;
        assert!(PredictionRequest::new(fields).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut fields = sample_fields();
        fields.humidity = 100.5;
        match PredictionRequest::new(fields) {
            Err(FloodError::Validation { field, .. }) => assert_eq!(field, "humidity"),
            other => panic!("Expected validation error, got {:?}", other),
        }

        let mut fields = sample_fields();
        fields.temperature = -51.0;
        assert!(PredictionRequest::new(fields).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut fields = sample_fields();
        fields.rainfall = f64::NAN;
        assert!(PredictionRequest::new(fields).is_err());

        let mut fields = sample_fields();
        fields.elevation = f64::INFINITY;
        assert!(PredictionRequest::new(fields).is_err());
    }

    #[test]
    fn test_flags_must_be_binary() {
        let mut fields = sample_fields();
        fields.historical_floods = 2;
        match PredictionRequest::new(fields) {
            Err(FloodError::Validation { field, .. }) => assert_eq!(field, "historical_floods"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{
            "latitude": 10.0, "longitude": 20.0, "elevation": 100.0,
            "rainfall": 1200.0, "temperature": 25.0, "humidity": 50.0,
            "river_discharge": 100.0, "water_level": 1.0,
            "land_cover": "Water Body", "soil_type": "Silt",
            "population_density": 10.0, "infrastructure": 0, "historical_floods": 1
        }"#;
        let err = serde_json::from_str::<PredictionRequest>(json).unwrap_err();
        assert!(err.to_string().contains("rainfall"));

        let ok = json.replace("1200.0", "120.0");
        let request: PredictionRequest = serde_json::from_str(&ok).unwrap();
        assert_eq!(request.land_cover(), LandCover::WaterBody);
        assert_eq!(request.soil_type(), SoilType::Silt);
    }

    #[test]
    fn test_unknown_enum_value_rejected() {
        let mut value = serde_json::to_value(sample_fields()).unwrap();
        value["land_cover"] = serde_json::json!("Tundra");
        assert!(serde_json::from_value::<PredictionRequest>(value).is_err());
    }

    #[test]
    fn test_decision_threshold() {
        assert_eq!(PredictionOutcome::from_probability(0.5).decision, 0);
        assert_eq!(PredictionOutcome::from_probability(0.500_001).decision, 1);
        assert_eq!(PredictionOutcome::from_probability(0.0).decision, 0);
        assert!(PredictionOutcome::from_probability(1.0).is_flood());
    }

    #[test]
    fn test_confidence_boundaries() {
        use ConfidenceLevel::*;
        let cases = [
            (0.0, High),
            (0.19, High),
            (0.2, Medium),
            (0.39, Medium),
            (0.4, Low),
            (0.5, Low),
            (0.6, Low),
            (0.61, Medium),
            (0.75, Medium),
            (0.8, Medium),
            (0.81, High),
            (1.0, High),
        ];
        for (p, expected) in cases {
            assert_eq!(ConfidenceLevel::from_probability(p), expected, "p = {}", p);
        }
    }

    #[test]
    fn test_confidence_total_over_unit_interval() {
        for i in 0..=1000 {
            let p = i as f32 / 1000.0;
            let level = ConfidenceLevel::from_probability(p);
            let expected = if p > 0.8 || p < 0.2 {
                ConfidenceLevel::High
            } else if p > 0.6 || p < 0.4 {
                ConfidenceLevel::Medium
            } else {
                ConfidenceLevel::Low
            };
            assert_eq!(level, expected);
        }
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.port, 8001);
        assert_eq!(parsed.model.candidates.len(), 3);
        assert_eq!(parsed.candidate_paths()[0], PathBuf::from("models/best_model.mpk"));
    }

    #[test]
    fn test_config_rejects_empty_hidden_dims() {
        let mut config = Config::default();
        config.model.hidden_dims.clear();
        assert!(config.validate().is_err());
    }
}
