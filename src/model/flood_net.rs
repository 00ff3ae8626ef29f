//! Flood classifier network
//!
//! Architecture: Input(13) → Hidden(h0) → ReLU → ... → Hidden(hn) → ReLU
//!                         → head(1) → sigmoid

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder};
use burn::tensor::activation::{relu, sigmoid};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use std::path::Path;

use crate::features::FeatureVector;
use crate::{FloodError, ModelConfig, Result};

/// Configuration for the flood network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloodNetConfig {
    /// Input dimension (encoded features)
    pub input_dim: usize,
    /// Hidden layer widths, input side first
    pub hidden_dims: Vec<usize>,
}

impl Default for FloodNetConfig {
    fn default() -> Self {
        FloodNetConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: vec![64, 32],
        }
    }
}

impl FloodNetConfig {
    pub fn from_model_config(config: &ModelConfig) -> Self {
        FloodNetConfig {
            input_dim: FeatureVector::DIM,
            hidden_dims: config.hidden_dims.clone(),
        }
    }

    /// Weight shapes `[d_input, d_output]` of every linear layer, input first
    pub fn layer_shapes(&self) -> Vec<[usize; 2]> {
        let mut shapes = Vec::with_capacity(self.hidden_dims.len() + 1);
        let mut in_dim = self.input_dim;
        for &out_dim in &self.hidden_dims {
            shapes.push([in_dim, out_dim]);
            in_dim = out_dim;
        }
        shapes.push([in_dim, 1]);
        shapes
    }
}

/// A single hidden layer block: Linear → ReLU
#[derive(Module, Debug)]
pub struct HiddenBlock<B: Backend> {
    linear: Linear<B>,
}

impl<B: Backend> HiddenBlock<B> {
    pub fn new(device: &B::Device, in_dim: usize, out_dim: usize) -> Self {
        HiddenBlock {
            linear: LinearConfig::new(in_dim, out_dim).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        relu(self.linear.forward(x))
    }
}

/// Feed-forward binary classifier over the 13 encoded features
#[derive(Module, Debug)]
pub struct FloodNet<B: Backend> {
    hidden: Vec<HiddenBlock<B>>,
    head: Linear<B>,
}

impl<B: Backend> FloodNet<B> {
    /// Create a freshly initialized network
    pub fn new(device: &B::Device, config: &FloodNetConfig) -> Self {
        let mut hidden = Vec::with_capacity(config.hidden_dims.len());
        let mut in_dim = config.input_dim;
        for &out_dim in &config.hidden_dims {
            hidden.push(HiddenBlock::new(device, in_dim, out_dim));
            in_dim = out_dim;
        }

        FloodNet {
            hidden,
            head: LinearConfig::new(in_dim, 1).init(device),
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    /// * `features` - Encoded features [batch, input_dim]
    ///
    /// # Returns
    /// Flood probabilities [batch, 1]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self
            .hidden
            .iter()
            .fold(features, |x, block| block.forward(x));
        sigmoid(self.head.forward(x))
    }

    /// Weight shapes of the loaded layers, input first
    pub fn layer_shapes(&self) -> Vec<[usize; 2]> {
        self.hidden
            .iter()
            .map(|block| block.linear.weight.val().dims())
            .chain(std::iter::once(self.head.weight.val().dims()))
            .collect()
    }

    /// Save model to file (Burn writes `.mpk`)
    pub fn save(&self, path: &Path) -> Result<()>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        recorder
            .record(self.clone().into_record(), path.to_path_buf())
            .map_err(|e| FloodError::Artifact {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    /// Load model from file, rejecting records that do not fit `config`
    pub fn load(device: &B::Device, path: &Path, config: &FloodNetConfig) -> Result<Self>
    where
        B::FloatElem: serde::Serialize + serde::de::DeserializeOwned,
        B::IntElem: serde::Serialize + serde::de::DeserializeOwned,
    {
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let record: FloodNetRecord<B> = recorder
            .load(path.to_path_buf(), device)
            .map_err(|e| FloodError::Artifact {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        // Shapes are checked on the record, before any weights are applied
        let expected = config.layer_shapes();
        let found: Vec<[usize; 2]> = record
            .hidden
            .iter()
            .map(|block| block.linear.weight.val().dims())
            .chain(std::iter::once(record.head.weight.val().dims()))
            .collect();
        if found != expected {
            return Err(FloodError::Artifact {
                path: path.to_path_buf(),
                message: format!(
                    "layer shapes {:?} do not match configured architecture {:?}",
                    found, expected
                ),
            });
        }

        Ok(Self::new(device, config).load_record(record))
    }
}
