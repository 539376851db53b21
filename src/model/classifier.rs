//! Crop Disease Classifier
//!
//! A ResNet backbone whose final fully connected layer is replaced by a
//! small head sized for one crop's disease labels.

use burn::{
    module::Module,
    nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu},
    tensor::{activation::softmax, backend::Backend, Tensor},
};

use super::config::ClassifierConfig;
use super::resnet::ResNetBackbone;

/// Replacement classification head: Linear -> ReLU -> Dropout -> Linear
#[derive(Module, Debug)]
pub struct ClassifierHead<B: Backend> {
    pub hidden: Linear<B>,
    pub activation: Relu,
    pub dropout: Dropout,
    pub output: Linear<B>,
}

impl<B: Backend> ClassifierHead<B> {
    /// Create the head for `config`
    pub fn new(config: &ClassifierConfig, device: &B::Device) -> Self {
        Self {
            hidden: LinearConfig::new(config.feature_dim(), config.hidden_units).init(device),
            activation: Relu::new(),
            dropout: DropoutConfig::new(config.dropout).init(),
            output: LinearConfig::new(config.hidden_units, config.num_classes).init(device),
        }
    }

    /// Map pooled features to class logits
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.hidden.forward(features);
        let x = self.activation.forward(x);
        let x = self.dropout.forward(x);
        self.output.forward(x)
    }
}

/// Per-crop disease classifier
#[derive(Module, Debug)]
pub struct CropClassifier<B: Backend> {
    pub backbone: ResNetBackbone<B>,
    pub head: ClassifierHead<B>,
    num_classes: usize,
}

impl<B: Backend> CropClassifier<B> {
    /// Create a classifier with freshly initialised weights
    pub fn new(config: &ClassifierConfig, device: &B::Device) -> Self {
        Self {
            backbone: ResNetBackbone::new(config, device),
            head: ClassifierHead::new(config, device),
            num_classes: config.num_classes,
        }
    }

    /// Forward pass through the network
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, 3, height, width]
    ///
    /// # Returns
    /// * Logits tensor of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let features = self.backbone.forward(x);
        self.head.forward(features)
    }

    /// Forward pass with softmax for inference
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        softmax(self.forward(x), 1)
    }

    /// Get the number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}
