//! Weight Loading
//!
//! Classifier weights are read either from native Burn records (`.mpk`,
//! written with `CompactRecorder`) or from PyTorch state dicts (`.pth`) of
//! the original fine-tuned models. The native format wins when both exist.

use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    record::{CompactRecorder, FullPrecisionSettings, Recorder},
    tensor::backend::Backend,
};
use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classifier::{CropClassifier, CropClassifierRecord};
use super::config::ClassifierConfig;
use crate::crops::Crop;
use crate::utils::error::{AgriAidError, Result};

/// On-disk weight formats, in lookup priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightsFormat {
    /// Burn `CompactRecorder` record
    Native,
    /// PyTorch `state_dict` pickle
    PyTorch,
}

impl WeightsFormat {
    /// Lookup order used by [`find_weights`]
    pub const PRIORITY: [WeightsFormat; 2] = [WeightsFormat::Native, WeightsFormat::PyTorch];

    /// File extension of the format
    pub fn extension(&self) -> &'static str {
        match self {
            WeightsFormat::Native => "mpk",
            WeightsFormat::PyTorch => "pth",
        }
    }

    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "mpk" => Some(WeightsFormat::Native),
            "pth" | "pt" => Some(WeightsFormat::PyTorch),
            _ => None,
        }
    }
}

impl std::fmt::Display for WeightsFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeightsFormat::Native => write!(f, "native"),
            WeightsFormat::PyTorch => write!(f, "pytorch"),
        }
    }
}

/// Key remaps from the fine-tuned torchvision layout onto [`CropClassifier`].
///
/// The original head is `base_model.fc = Sequential(Linear, ReLU, Dropout, Linear)`,
/// so its two linear layers sit at indices 0 and 3.
const PYTORCH_KEY_REMAP: [(&str, &str); 5] = [
    (r"^(?:module\.)?base_model\.fc\.0\.(.+)$", "head.hidden.$1"),
    (r"^(?:module\.)?base_model\.fc\.3\.(.+)$", "head.output.$1"),
    (r"^(?:module\.)?base_model\.(.+)$", "backbone.$1"),
    (r"\.downsample\.0\.", ".downsample.conv."),
    (r"\.downsample\.1\.", ".downsample.bn."),
];

/// Path of a crop's weight file in a given format
pub fn weights_path(models_dir: &Path, crop: Crop, format: WeightsFormat) -> PathBuf {
    models_dir.join(format!("{}.{}", crop.weights_file_stem(), format.extension()))
}

/// Find the weight file of a crop, preferring the native format
pub fn find_weights(models_dir: &Path, crop: Crop) -> Option<(PathBuf, WeightsFormat)> {
    WeightsFormat::PRIORITY
        .iter()
        .map(|&format| (weights_path(models_dir, crop, format), format))
        .find(|(path, _)| path.is_file())
}

/// Build a classifier for `config` and load weights from `path`
pub fn load_classifier<B: Backend>(
    config: &ClassifierConfig,
    path: &Path,
    device: &B::Device,
) -> Result<CropClassifier<B>> {
    config.validate()?;

    if !path.is_file() {
        return Err(AgriAidError::PathNotFound(path.to_path_buf()));
    }

    let format = WeightsFormat::from_path(path).ok_or_else(|| {
        AgriAidError::Model(format!("Unrecognised weight file extension: {:?}", path))
    })?;

    let model = CropClassifier::<B>::new(config, device);

    match format {
        WeightsFormat::Native => model
            .load_file(path.to_path_buf(), &CompactRecorder::new(), device)
            .map_err(|e| AgriAidError::Model(format!("Failed to load {:?}: {:?}", path, e))),
        WeightsFormat::PyTorch => {
            let mut args = LoadArgs::new(path.to_path_buf());
            for (pattern, replacement) in PYTORCH_KEY_REMAP {
                args = args.with_key_remap(pattern, replacement);
            }

            let record: CropClassifierRecord<B> = PyTorchFileRecorder::<FullPrecisionSettings>::default()
                .load(args, device)
                .map_err(|e| AgriAidError::Model(format!("Failed to load {:?}: {:?}", path, e)))?;

            debug!("Remapped PyTorch checkpoint {:?}", path);
            Ok(model.load_record(record))
        }
    }
}

/// Save a classifier as a native record (`.mpk`)
pub fn save_classifier<B: Backend>(model: &CropClassifier<B>, path: &Path) -> Result<()> {
    model
        .clone()
        .save_file(path.to_path_buf(), &CompactRecorder::new())
        .map_err(|e| AgriAidError::Model(format!("Failed to save {:?}: {:?}", path, e)))
}
