//! Inference seam between the gateway and the network backend

use burn::backend::NdArray;
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use std::path::Path;
use std::sync::Mutex;

use crate::features::FeatureVector;
use crate::model::flood_net::{FloodNet, FloodNetConfig};
use crate::{FloodError, Result};

/// CPU backend used for serving
pub type InferenceBackend = NdArray<f32>;

/// A loaded model that maps one feature vector to a flood probability
pub trait Classifier: Send + Sync {
    fn infer(&self, vector: &FeatureVector) -> Result<f32>;
}

/// Turns an artifact on disk into a [`Classifier`]
pub trait ArtifactLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn Classifier>>;
}

/// [`FloodNet`] on the CPU backend
pub struct BurnClassifier {
    // Modules are only guaranteed `Send`; each call clones the handle out.
    model: Mutex<FloodNet<InferenceBackend>>,
    device: <InferenceBackend as Backend>::Device,
}

impl BurnClassifier {
    pub fn new(
        model: FloodNet<InferenceBackend>,
        device: <InferenceBackend as Backend>::Device,
    ) -> Self {
        BurnClassifier {
            model: Mutex::new(model),
            device,
        }
    }
}

impl Classifier for BurnClassifier {
    fn infer(&self, vector: &FeatureVector) -> Result<f32> {
        let model = self
            .model
            .lock()
            .map_err(|_| FloodError::Inference("model lock poisoned".to_string()))?
            .clone();

        let input = Tensor::<InferenceBackend, 1>::from_floats(
            vector.to_f32_vec().as_slice(),
            &self.device,
        )
        .reshape([1, FeatureVector::DIM]);

        let output = model
            .forward(input)
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| FloodError::Inference(format!("{:?}", e)))?;

        output
            .first()
            .copied()
            .ok_or_else(|| FloodError::Inference("model returned no output".to_string()))
    }
}

/// Loads `.mpk` records written by [`FloodNet::save`]
pub struct BurnLoader {
    config: FloodNetConfig,
    device: <InferenceBackend as Backend>::Device,
}

impl BurnLoader {
    pub fn new(config: FloodNetConfig) -> Self {
        BurnLoader {
            config,
            device: Default::default(),
        }
    }
}

impl ArtifactLoader for BurnLoader {
    fn load(&self, path: &Path) -> Result<Box<dyn Classifier>> {
        let model = FloodNet::<InferenceBackend>::load(&self.device, path, &self.config)?;
        Ok(Box::new(BurnClassifier::new(model, self.device.clone())))
    }
}
