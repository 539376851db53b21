//! Inference Predictor Module
//!
//! Runs one forward pass of a crop classifier and turns the softmax output
//! into a labelled [`Prediction`].

use std::time::{Duration, Instant};

use burn::tensor::backend::Backend;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::preprocess::Preprocessor;
use crate::crops::{class_name, display_label, is_healthy_label, Crop};
use crate::model::CropClassifier;
use crate::utils::error::{AgriAidError, Result};
use crate::utils::{format_millis, format_percent};

/// Result of classifying one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Crop whose classifier produced the prediction
    pub crop: Crop,

    /// Predicted class index
    pub class_index: usize,

    /// Raw label, e.g. `Rice___Leaf_Blast`
    pub label: String,

    /// Label for presentation, e.g. `Rice - Leaf Blast`
    pub display_label: String,

    /// Probability of the predicted class (0..1)
    pub confidence: f32,

    /// `confidence` as a percentage (0..100)
    pub confidence_percent: f32,

    /// Full probability distribution over the crop's classes
    pub probabilities: Vec<f32>,

    /// Whether the predicted label is the crop's healthy class
    pub is_healthy: bool,

    /// Forward pass time in milliseconds
    pub inference_time_ms: f64,
}

/// Index and value of the largest probability.
///
/// Ties go to the lowest index; NaN never wins.
pub fn argmax(probabilities: &[f32]) -> Option<(usize, f32)> {
    probabilities
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, p)| match best {
            None if !p.is_nan() => Some((i, p)),
            Some((_, b)) if !p.is_nan() && p > b => Some((i, p)),
            _ => best,
        })
}

impl Prediction {
    /// Build a prediction from a crop's softmax output
    pub fn from_probabilities(
        crop: Crop,
        probabilities: Vec<f32>,
        inference_time: Duration,
    ) -> Result<Self> {
        if probabilities.len() != crop.num_classes() {
            return Err(AgriAidError::Inference(format!(
                "{} classifier produced {} outputs, expected {}",
                crop,
                probabilities.len(),
                crop.num_classes()
            )));
        }

        let (class_index, confidence) = argmax(&probabilities).ok_or_else(|| {
            AgriAidError::Inference("classifier output contains no finite values".to_string())
        })?;

        let label = class_name(crop, class_index)
            .ok_or_else(|| AgriAidError::Inference(format!("no label for class {}", class_index)))?;

        Ok(Self {
            crop,
            class_index,
            label: label.to_string(),
            display_label: display_label(label),
            confidence,
            confidence_percent: confidence * 100.0,
            probabilities,
            is_healthy: is_healthy_label(label),
            inference_time_ms: inference_time.as_secs_f64() * 1000.0,
        })
    }

    /// The `k` most likely classes, most likely first.
    ///
    /// NaN ranks below every number; ties keep index order.
    pub fn top_k(&self, k: usize) -> Vec<(usize, &'static str, f32)> {
        let rank = |p: f32| if p.is_nan() { f32::NEG_INFINITY } else { p };

        let mut indexed: Vec<(usize, f32)> = self.probabilities.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| rank(b.1).total_cmp(&rank(a.1)));

        indexed
            .into_iter()
            .take(k)
            .filter_map(|(idx, prob)| class_name(self.crop, idx).map(|name| (idx, name, prob)))
            .collect()
    }

    /// Pretty print the prediction
    pub fn display(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Crop: {}\n", self.crop.display_name()));
        output.push_str(&format!(
            "Prediction: {} (class {})\n",
            self.display_label, self.class_index
        ));
        output.push_str(&format!("Confidence: {}\n", format_percent(self.confidence)));
        output.push_str(&format!(
            "Inference time: {}\n",
            format_millis(self.inference_time_ms)
        ));

        output.push_str("\nAll classes:\n");
        for (i, (idx, name, prob)) in self.top_k(self.probabilities.len()).iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} (class {}) - {}\n",
                i + 1,
                display_label(name),
                idx,
                format_percent(*prob)
            ));
        }

        output
    }
}

/// Run a classifier on an already decoded image
pub fn classify<B: Backend>(
    crop: Crop,
    model: &CropClassifier<B>,
    preprocessor: &Preprocessor,
    image: &DynamicImage,
    device: &B::Device,
) -> Result<Prediction> {
    let input = preprocessor.to_tensor::<B>(image, device);

    let start = Instant::now();
    let probabilities: Vec<f32> = model
        .forward_softmax(input)
        .into_data()
        .convert::<f32>()
        .to_vec()
        .map_err(|e| AgriAidError::Inference(format!("{:?}", e)))?;
    let elapsed = start.elapsed();

    Prediction::from_probabilities(crop, probabilities, elapsed)
}
