//! # AgriAid
//!
//! Crop leaf disease diagnosis built on the Burn framework. A user picks a
//! crop and uploads a leaf photo; the crop's fine-tuned classifier predicts a
//! disease label and, for diseased leaves, remediation guidance is attached.
//!
//! ## Modules
//!
//! - `crops`: the supported crops and their disease labels
//! - `model`: ResNet-50 backbone with a per-crop classification head, weight loading
//! - `inference`: preprocessing, forward pass, and the per-crop model registry
//! - `remediation`: disease database lookup with generic fallback guidance
//! - `diagnosis`: the end-to-end pipeline used by the CLI and the server
//! - `utils`: logging and error types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agriaid::{Crop, Diagnoser, DiseaseDatabase, ModelRegistry};
//!
//! let registry = ModelRegistry::load("models".as_ref(), agriaid::backend::default_device());
//! let database = DiseaseDatabase::load_or_empty("data/disease_database.json".as_ref());
//! let diagnoser = Diagnoser::new(registry, database);
//! let diagnosis = diagnoser.diagnose_file(Crop::Rice, "leaf.jpg".as_ref())?;
//! ```

pub mod backend;
pub mod crops;
pub mod diagnosis;
pub mod inference;
pub mod model;
pub mod remediation;
pub mod utils;

// Re-export commonly used items for convenience
pub use crops::Crop;
pub use diagnosis::{Diagnoser, Diagnosis};
pub use inference::{CropModelStatus, ModelRegistry, Prediction, PreprocessConfig, Preprocessor};
pub use model::{ClassifierConfig, CropClassifier, WeightsFormat};
pub use remediation::{DiseaseDatabase, Remediation, RemediationInfo, RemediationSource};
pub use utils::error::{AgriAidError, Result};

/// Default directory holding `<crop>_model.{mpk,pth}` files
pub const DEFAULT_MODELS_DIR: &str = "models";

/// Maximum accepted upload size (16 MiB)
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
