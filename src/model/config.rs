//! Classifier Configuration
//!
//! Architecture hyperparameters for the per-crop classifier. The defaults
//! describe a ResNet-50 backbone with the replaced two-layer head that every
//! crop model is fine-tuned with.

use burn::config::Config;

use crate::crops::Crop;
use crate::utils::error::{self, AgriAidError};

/// Bottleneck expansion factor of ResNet-50 style blocks
pub const BOTTLENECK_EXPANSION: usize = 4;

/// Configuration for [`CropClassifier`](super::CropClassifier)
#[derive(Config, Debug, PartialEq)]
pub struct ClassifierConfig {
    /// Number of output classes (disease labels of the crop)
    pub num_classes: usize,

    /// Bottleneck blocks per stage
    #[config(default = "[3, 4, 6, 3]")]
    pub layers: [usize; 4],

    /// Channel width of the stem and of the first stage
    #[config(default = "64")]
    pub base_width: usize,

    /// Units in the hidden layer of the classification head
    #[config(default = "256")]
    pub hidden_units: usize,

    /// Dropout rate between the two head layers
    #[config(default = "0.5")]
    pub dropout: f64,

    /// Number of input channels (3 for RGB)
    #[config(default = "3")]
    pub in_channels: usize,
}

impl ClassifierConfig {
    /// ResNet-50 configuration sized for a crop's label list
    pub fn for_crop(crop: Crop) -> Self {
        Self::new(crop.num_classes())
    }

    /// Width of the pooled feature vector fed into the head
    pub fn feature_dim(&self) -> usize {
        self.base_width * 8 * BOTTLENECK_EXPANSION
    }

    /// Validate the configuration
    pub fn validate(&self) -> error::Result<()> {
        if self.num_classes == 0 {
            return Err(AgriAidError::Config(
                "num_classes must be greater than 0".to_string(),
            ));
        }

        if self.base_width == 0 || self.hidden_units == 0 || self.in_channels == 0 {
            return Err(AgriAidError::Config(
                "base_width, hidden_units and in_channels must be positive".to_string(),
            ));
        }

        if self.layers.iter().any(|&blocks| blocks == 0) {
            return Err(AgriAidError::Config(
                "every stage needs at least one block".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.dropout) {
            return Err(AgriAidError::Config(
                "dropout must be in range [0.0, 1.0)".to_string(),
            ));
        }

        Ok(())
    }
}
