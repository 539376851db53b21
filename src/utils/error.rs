//! Error Handling Module
//!
//! Defines the error type shared by the AgriAid library.
//! Uses thiserror for ergonomic error definitions.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for AgriAid operations
#[derive(Error, Debug)]
pub enum AgriAidError {
    /// Error opening an image from disk
    #[error("Failed to load image at '{0}': {1}")]
    ImageLoad(PathBuf, String),

    /// Uploaded bytes could not be decoded as an image
    #[error("Failed to decode image: {0}")]
    ImageDecode(String),

    /// Error building or loading a classifier
    #[error("Model error: {0}")]
    Model(String),

    /// No classifier is registered for the crop
    #[error("Model for {0} is not available")]
    ModelUnavailable(String),

    /// Crop key outside the supported catalog
    #[error("Unknown crop: {0}")]
    UnknownCrop(String),

    /// Error during the forward pass
    #[error("Inference error: {0}")]
    Inference(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Path not found
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),
}

impl From<serde_json::Error> for AgriAidError {
    fn from(err: serde_json::Error) -> Self {
        AgriAidError::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for AgriAidError {
    fn from(err: image::ImageError) -> Self {
        AgriAidError::ImageDecode(err.to_string())
    }
}

/// Convenience Result type for AgriAid operations
pub type Result<T> = std::result::Result<T, AgriAidError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgriAidError::ModelUnavailable("rice".to_string());
        assert_eq!(format!("{}", err), "Model for rice is not available");
    }

    #[test]
    fn test_image_load_error() {
        let path = PathBuf::from("/uploads/leaf.jpg");
        let err = AgriAidError::ImageLoad(path, "file not found".to_string());
        assert!(format!("{}", err).contains("leaf.jpg"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AgriAidError = io_err.into();
        assert!(matches!(err, AgriAidError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope");
        let err: AgriAidError = parse.unwrap_err().into();
        assert!(matches!(err, AgriAidError::Serialization(_)));
    }
}
