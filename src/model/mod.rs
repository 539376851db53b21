//! Model module for the per-crop classifiers using the Burn framework
//!
//! This module provides:
//! - A ResNet-50 style backbone
//! - The replaced classification head sized for one crop's labels
//! - Configuration and weight loading (native Burn records and PyTorch checkpoints)

pub mod classifier;
pub mod config;
pub mod resnet;
pub mod weights;

// Re-export main types for convenience
pub use classifier::{ClassifierHead, CropClassifier};
pub use config::ClassifierConfig;
pub use resnet::{Bottleneck, ResNetBackbone};
pub use weights::{find_weights, load_classifier, save_classifier, weights_path, WeightsFormat};
