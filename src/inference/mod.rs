//! Inference module: preprocessing, classifier invocation and the model registry
//!
//! This module provides:
//! - The fixed resize/normalize transform shared by every crop
//! - Single forward pass classification with softmax and argmax
//! - A registry holding one loaded classifier per crop

pub mod predictor;
pub mod preprocess;
pub mod registry;

// Re-export main types for convenience
pub use predictor::{argmax, classify, Prediction};
pub use preprocess::{decode_image, open_image, PreprocessConfig, Preprocessor};
pub use registry::{CropModelStatus, LoadedModel, ModelRegistry};
