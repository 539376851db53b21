//! Remediation Lookup
//!
//! Maps a (crop, disease label) pair to treatment and prevention guidance.
//! Entries come from a JSON disease database; anything missing from it gets
//! generic guidance so a diseased prediction always has advice attached.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::crops::{plain_label, Crop};
use crate::utils::error::{AgriAidError, Result};

/// Default location of the disease database
pub const DEFAULT_DATABASE_FILE: &str = "data/disease_database.json";

const FALLBACK_ORGANIC: [&str; 4] = [
    "Apply neem-based organic treatments",
    "Use balanced organic fertilizers",
    "Maintain proper field hygiene",
    "Remove infected plant parts",
];

const FALLBACK_CHEMICAL: [&str; 4] = [
    "Consult local agricultural extension officer",
    "Use appropriate fungicides as recommended",
    "Follow proper application timing",
    "Maintain recommended dosage",
];

const FALLBACK_PREVENTION: [&str; 4] = [
    "Use resistant crop varieties",
    "Maintain proper plant spacing",
    "Ensure good field drainage",
    "Practice crop rotation",
];

/// Guidance for one disease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationInfo {
    pub description: String,
    #[serde(default)]
    pub organic_solutions: Vec<String>,
    #[serde(default)]
    pub chemical_solutions: Vec<String>,
    #[serde(default)]
    pub prevention: Vec<String>,
}

impl RemediationInfo {
    /// Generic guidance used when the database has no entry
    pub fn fallback(crop: Crop, label: &str) -> Self {
        Self {
            description: format!("{} detected in {}", plain_label(label), crop.key()),
            organic_solutions: strings(&FALLBACK_ORGANIC),
            chemical_solutions: strings(&FALLBACK_CHEMICAL),
            prevention: strings(&FALLBACK_PREVENTION),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Where a [`Remediation`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemediationSource {
    Database,
    Fallback,
}

/// Guidance plus its origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remediation {
    #[serde(flatten)]
    pub info: RemediationInfo,
    pub source: RemediationSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CropDiseases {
    #[serde(default)]
    diseases: HashMap<String, RemediationInfo>,
}

/// Disease database keyed by crop key, then disease label
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiseaseDatabase {
    crops: HashMap<String, CropDiseases>,
}

impl DiseaseDatabase {
    /// Database with no entries; every lookup falls back
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a database from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a database file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AgriAidError::PathNotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a database file, degrading to an empty database on any error
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(db) => {
                info!(
                    "Loaded disease database {:?} ({} entries)",
                    path,
                    db.entry_count()
                );
                db
            }
            Err(e) => {
                warn!("Disease database unavailable, using fallback guidance: {}", e);
                Self::empty()
            }
        }
    }

    /// Add or replace an entry
    pub fn insert(&mut self, crop: Crop, label: &str, info: RemediationInfo) {
        self.crops
            .entry(crop.key().to_string())
            .or_default()
            .diseases
            .insert(label.to_string(), info);
    }

    /// Database entry for a (crop, label) pair, without fallback
    pub fn get(&self, crop: Crop, label: &str) -> Option<&RemediationInfo> {
        self.crops.get(crop.key())?.diseases.get(label)
    }

    /// Guidance for a (crop, label) pair, falling back to generic advice
    pub fn lookup(&self, crop: Crop, label: &str) -> Remediation {
        match self.get(crop, label) {
            Some(info) => Remediation {
                info: info.clone(),
                source: RemediationSource::Database,
            },
            None => Remediation {
                info: RemediationInfo::fallback(crop, label),
                source: RemediationSource::Fallback,
            },
        }
    }

    /// Total number of disease entries across crops
    pub fn entry_count(&self) -> usize {
        self.crops.values().map(|c| c.diseases.len()).sum()
    }
}
