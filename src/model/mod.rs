//! Model loading and inference
//!
//! - `flood_net`: the frozen feed-forward network
//! - `classifier`: loader/classifier seam and the burn implementations
//! - `gateway`: prioritized artifact search and load state

pub mod classifier;
pub mod flood_net;
pub mod gateway;

pub use classifier::{ArtifactLoader, BurnClassifier, BurnLoader, Classifier, InferenceBackend};
pub use flood_net::{FloodNet, FloodNetConfig};
pub use gateway::{Attempt, AttemptOutcome, LoadReport, ModelGateway};
