//! Model Registry
//!
//! Holds one classifier per supported crop. The registry is filled once at
//! start-up from a models directory and is read-only afterwards; crops whose
//! weight file is missing or fails to load are skipped and reported through
//! [`ModelRegistry::status`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use burn::tensor::backend::Backend;
use image::DynamicImage;
use serde::Serialize;
use tracing::{error, info, warn};

use super::predictor::{classify, Prediction};
use super::preprocess::{decode_image, open_image, Preprocessor};
use crate::backend::InferenceBackend;
use crate::crops::{Crop, NUM_CROPS};
use crate::model::{
    find_weights, load_classifier, weights_path, ClassifierConfig, CropClassifier, WeightsFormat,
};
use crate::utils::error::{AgriAidError, Result};

/// A classifier that was loaded for a crop
pub struct LoadedModel<B: Backend> {
    // Burn modules are Send but not guaranteed Sync
    classifier: Mutex<CropClassifier<B>>,
    source: Option<(PathBuf, WeightsFormat)>,
}

impl<B: Backend> LoadedModel<B> {
    fn new(classifier: CropClassifier<B>, source: Option<(PathBuf, WeightsFormat)>) -> Self {
        Self {
            classifier: Mutex::new(classifier),
            source,
        }
    }

    /// File the weights came from (`None` for models inserted in memory)
    pub fn path(&self) -> Option<&Path> {
        self.source.as_ref().map(|(path, _)| path.as_path())
    }

    /// Format the weights were read in
    pub fn format(&self) -> Option<WeightsFormat> {
        self.source.as_ref().map(|(_, format)| *format)
    }
}

/// Why a crop has no classifier
#[derive(Debug, Clone, PartialEq)]
enum SkipReason {
    NotFound(Vec<PathBuf>),
    LoadFailed(PathBuf, String),
}

/// Per-crop availability, as reported to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropModelStatus {
    pub crop: Crop,
    pub display_name: &'static str,
    pub loaded: bool,
    pub format: Option<WeightsFormat>,
    pub path: Option<PathBuf>,
    pub reason: Option<String>,
}

/// Read-only collection of per-crop classifiers
pub struct ModelRegistry<B: Backend = InferenceBackend> {
    models: BTreeMap<Crop, LoadedModel<B>>,
    skipped: BTreeMap<Crop, SkipReason>,
    preprocessor: Preprocessor,
    device: B::Device,
}

impl<B: Backend> ModelRegistry<B> {
    /// Registry with no classifiers
    pub fn empty(device: B::Device) -> Self {
        Self {
            models: BTreeMap::new(),
            skipped: BTreeMap::new(),
            preprocessor: Preprocessor::default(),
            device,
        }
    }

    /// Load the ResNet-50 classifier of every crop found in `models_dir`
    pub fn load(models_dir: &Path, device: B::Device) -> Self {
        Self::load_with(models_dir, device, ClassifierConfig::for_crop)
    }

    /// Load every crop found in `models_dir`, building each network from `architecture`
    pub fn load_with<F>(models_dir: &Path, device: B::Device, architecture: F) -> Self
    where
        F: Fn(Crop) -> ClassifierConfig,
    {
        let mut registry = Self::empty(device);
        info!("Loading crop models from {:?}", models_dir);

        for crop in Crop::ALL {
            let Some((path, format)) = find_weights(models_dir, crop) else {
                let expected: Vec<PathBuf> = WeightsFormat::PRIORITY
                    .iter()
                    .map(|&format| weights_path(models_dir, crop, format))
                    .collect();
                warn!("{}: model file not found (looked for {:?})", crop, expected);
                registry.skipped.insert(crop, SkipReason::NotFound(expected));
                continue;
            };

            match load_classifier::<B>(&architecture(crop), &path, &registry.device) {
                Ok(classifier) => {
                    info!("{}: model loaded from {:?} ({})", crop, path, format);
                    registry
                        .models
                        .insert(crop, LoadedModel::new(classifier, Some((path, format))));
                }
                Err(e) => {
                    error!("{}: failed to load - {}", crop, e);
                    registry
                        .skipped
                        .insert(crop, SkipReason::LoadFailed(path, e.to_string()));
                }
            }
        }

        info!("Loaded {} of {} crop models", registry.len(), NUM_CROPS);
        registry
    }

    /// Use a different preprocessing configuration
    pub fn with_preprocessor(mut self, preprocessor: Preprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Register an in-memory classifier, replacing any previous one
    pub fn insert(&mut self, crop: Crop, classifier: CropClassifier<B>) -> Result<()> {
        if classifier.num_classes() != crop.num_classes() {
            return Err(AgriAidError::Model(format!(
                "{} needs {} classes, classifier has {}",
                crop,
                crop.num_classes(),
                classifier.num_classes()
            )));
        }

        self.skipped.remove(&crop);
        self.models.insert(crop, LoadedModel::new(classifier, None));
        Ok(())
    }

    /// Classifier of a crop, if loaded
    pub fn get(&self, crop: Crop) -> Option<&LoadedModel<B>> {
        self.models.get(&crop)
    }

    /// Whether a crop has a classifier
    pub fn is_loaded(&self, crop: Crop) -> bool {
        self.models.contains_key(&crop)
    }

    /// Crops with a classifier, in catalog order
    pub fn loaded_crops(&self) -> Vec<Crop> {
        Crop::ALL
            .into_iter()
            .filter(|crop| self.is_loaded(*crop))
            .collect()
    }

    /// Number of loaded classifiers
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no classifier is loaded
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Availability of every crop in the catalog
    pub fn status(&self) -> Vec<CropModelStatus> {
        Crop::ALL
            .into_iter()
            .map(|crop| {
                let mut status = CropModelStatus {
                    crop,
                    display_name: crop.display_name(),
                    loaded: false,
                    format: None,
                    path: None,
                    reason: None,
                };

                if let Some(model) = self.models.get(&crop) {
                    status.loaded = true;
                    status.format = model.format();
                    status.path = model.path().map(Path::to_path_buf);
                } else {
                    status.reason = Some(match self.skipped.get(&crop) {
                        Some(SkipReason::NotFound(_)) => "model file not found".to_string(),
                        Some(SkipReason::LoadFailed(path, e)) => {
                            status.path = Some(path.clone());
                            format!("failed to load: {}", e)
                        }
                        None => "not registered".to_string(),
                    });
                }

                status
            })
            .collect()
    }

    /// Classify a decoded image with a crop's classifier
    pub fn predict_image(&self, crop: Crop, image: &DynamicImage) -> Result<Prediction> {
        let model = self
            .models
            .get(&crop)
            .ok_or_else(|| AgriAidError::ModelUnavailable(crop.key().to_string()))?;

        let classifier = model
            .classifier
            .lock()
            .map_err(|_| AgriAidError::Inference(format!("{} classifier lock poisoned", crop)))?;

        classify(crop, &classifier, &self.preprocessor, image, &self.device)
    }

    /// Decode uploaded bytes and classify them
    pub fn predict_bytes(&self, crop: Crop, bytes: &[u8]) -> Result<Prediction> {
        if !self.is_loaded(crop) {
            return Err(AgriAidError::ModelUnavailable(crop.key().to_string()));
        }
        let image = decode_image(bytes)?;
        self.predict_image(crop, &image)
    }

    /// Open an image file and classify it
    pub fn predict_file(&self, crop: Crop, path: &Path) -> Result<Prediction> {
        if !self.is_loaded(crop) {
            return Err(AgriAidError::ModelUnavailable(crop.key().to_string()));
        }
        let image = open_image(path)?;
        self.predict_image(crop, &image)
    }
}
