//! Diagnosis pipeline
//!
//! upload -> preprocess -> classify -> (if diseased) remediation lookup.
//! [`Diagnoser`] owns the read-only model registry and disease database and
//! is shared by the CLI and the HTTP server.

use std::path::Path;

use burn::tensor::backend::Backend;
use image::DynamicImage;
use serde::Serialize;
use tracing::info;

use crate::backend::InferenceBackend;
use crate::crops::Crop;
use crate::inference::{ModelRegistry, Prediction};
use crate::remediation::{DiseaseDatabase, Remediation};
use crate::utils::error::Result;

/// Everything shown to the user for one upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnosis {
    pub crop: Crop,
    pub crop_display: &'static str,
    pub prediction: String,
    pub confidence_percent: f32,
    pub is_healthy: bool,
    /// Present only for diseased predictions
    pub remediation: Option<Remediation>,
    pub details: Prediction,
}

impl Diagnosis {
    /// Attach remediation to a prediction when it is not healthy
    pub fn from_prediction(prediction: Prediction, database: &DiseaseDatabase) -> Self {
        let remediation = if prediction.is_healthy {
            None
        } else {
            Some(database.lookup(prediction.crop, &prediction.label))
        };

        Self {
            crop: prediction.crop,
            crop_display: prediction.crop.display_name(),
            prediction: prediction.display_label.clone(),
            confidence_percent: prediction.confidence_percent,
            is_healthy: prediction.is_healthy,
            remediation,
            details: prediction,
        }
    }
}

/// Registry plus disease database
pub struct Diagnoser<B: Backend = InferenceBackend> {
    registry: ModelRegistry<B>,
    database: DiseaseDatabase,
}

impl<B: Backend> Diagnoser<B> {
    pub fn new(registry: ModelRegistry<B>, database: DiseaseDatabase) -> Self {
        Self { registry, database }
    }

    pub fn registry(&self) -> &ModelRegistry<B> {
        &self.registry
    }

    pub fn database(&self) -> &DiseaseDatabase {
        &self.database
    }

    /// Diagnose a decoded image
    pub fn diagnose_image(&self, crop: Crop, image: &DynamicImage) -> Result<Diagnosis> {
        let prediction = self.registry.predict_image(crop, image)?;
        Ok(self.finish(prediction))
    }

    /// Diagnose raw uploaded bytes
    pub fn diagnose_bytes(&self, crop: Crop, bytes: &[u8]) -> Result<Diagnosis> {
        let prediction = self.registry.predict_bytes(crop, bytes)?;
        Ok(self.finish(prediction))
    }

    /// Diagnose an image file
    pub fn diagnose_file(&self, crop: Crop, path: &Path) -> Result<Diagnosis> {
        let prediction = self.registry.predict_file(crop, path)?;
        Ok(self.finish(prediction))
    }

    fn finish(&self, prediction: Prediction) -> Diagnosis {
        info!(
            "{}: {} ({:.1}%) in {:.1}ms",
            prediction.crop,
            prediction.display_label,
            prediction.confidence_percent,
            prediction.inference_time_ms
        );
        Diagnosis::from_prediction(prediction, &self.database)
    }
}
