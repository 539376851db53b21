//! Crop catalog
//!
//! The fixed set of supported crops and their disease labels. The order of
//! each label list is the output order of that crop's classifier, so it must
//! never be re-sorted.
//!
//! Labels come in two shapes: `Crop___Disease` (wheat, rice, corn, potato)
//! and plain words (sugarcane). [`display_label`] normalises both for
//! presentation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::error::AgriAidError;

/// Number of supported crops
pub const NUM_CROPS: usize = 5;

/// Marker that identifies a healthy (non-diseased) label
pub const HEALTHY_MARKER: &str = "Healthy";

const SUGARCANE_CLASSES: [&str; 3] = ["Bacterial Blight", "Healthy", "Red Rot"];

const WHEAT_CLASSES: [&str; 3] = [
    "Wheat___Brown_Rust",
    "Wheat___Healthy",
    "Wheat___Yellow_Rust",
];

const RICE_CLASSES: [&str; 4] = [
    "Rice___Brown_Spot",
    "Rice___Healthy",
    "Rice___Leaf_Blast",
    "Rice___Neck_Blast",
];

const CORN_CLASSES: [&str; 4] = [
    "Corn___Common_Rust",
    "Corn___Gray_Leaf_Spot",
    "Corn___Healthy",
    "Corn___Northern_Leaf_Blight",
];

const POTATO_CLASSES: [&str; 3] = [
    "Potato___Early_Blight",
    "Potato___Healthy",
    "Potato___Late_Blight",
];

/// A supported crop species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Crop {
    Sugarcane,
    Wheat,
    Rice,
    Corn,
    Potato,
}

impl Crop {
    /// All crops, in catalog order
    pub const ALL: [Crop; NUM_CROPS] = [
        Crop::Sugarcane,
        Crop::Wheat,
        Crop::Rice,
        Crop::Corn,
        Crop::Potato,
    ];

    /// Lowercase key used in forms, file names and the disease database
    pub fn key(&self) -> &'static str {
        match self {
            Crop::Sugarcane => "sugarcane",
            Crop::Wheat => "wheat",
            Crop::Rice => "rice",
            Crop::Corn => "corn",
            Crop::Potato => "potato",
        }
    }

    /// Name shown to users
    pub fn display_name(&self) -> &'static str {
        match self {
            Crop::Sugarcane => "Sugarcane",
            Crop::Wheat => "Wheat",
            Crop::Rice => "Rice",
            Crop::Corn => "Corn",
            Crop::Potato => "Potato",
        }
    }

    /// Disease labels in classifier output order
    pub fn classes(&self) -> &'static [&'static str] {
        match self {
            Crop::Sugarcane => &SUGARCANE_CLASSES,
            Crop::Wheat => &WHEAT_CLASSES,
            Crop::Rice => &RICE_CLASSES,
            Crop::Corn => &CORN_CLASSES,
            Crop::Potato => &POTATO_CLASSES,
        }
    }

    /// Number of output classes of this crop's classifier
    pub fn num_classes(&self) -> usize {
        self.classes().len()
    }

    /// File stem of the weight file, e.g. `rice_model`
    pub fn weights_file_stem(&self) -> String {
        format!("{}_model", self.key())
    }

    /// Index of a label in this crop's class list
    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.classes().iter().position(|&c| c == label)
    }
}

impl fmt::Display for Crop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Crop {
    type Err = AgriAidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Crop::ALL
            .iter()
            .copied()
            .find(|crop| crop.key() == key)
            .ok_or_else(|| AgriAidError::UnknownCrop(s.trim().to_string()))
    }
}

/// Get the label for a class index of a crop
pub fn class_name(crop: Crop, index: usize) -> Option<&'static str> {
    crop.classes().get(index).copied()
}

/// Check if a label represents a healthy plant
pub fn is_healthy_label(label: &str) -> bool {
    label.contains(HEALTHY_MARKER)
}

/// Human-readable label: `Rice___Leaf_Blast` becomes `Rice - Leaf Blast`
pub fn display_label(label: &str) -> String {
    label.replace("___", " - ").replace('_', " ")
}

/// Label with every separator flattened to spaces, as used in fallback text:
/// `Rice___Leaf_Blast` becomes `Rice Leaf Blast`
pub fn plain_label(label: &str) -> String {
    label.replace("___", " ").replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(Crop::Sugarcane.num_classes(), 3);
        assert_eq!(Crop::Wheat.num_classes(), 3);
        assert_eq!(Crop::Rice.num_classes(), 4);
        assert_eq!(Crop::Corn.num_classes(), 4);
        assert_eq!(Crop::Potato.num_classes(), 3);
    }

    #[test]
    fn test_every_crop_has_exactly_one_healthy_class() {
        for crop in Crop::ALL {
            let healthy = crop.classes().iter().filter(|c| is_healthy_label(c)).count();
            assert_eq!(healthy, 1, "{} should have one healthy class", crop);
        }
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name(Crop::Rice, 2), Some("Rice___Leaf_Blast"));
        assert_eq!(class_name(Crop::Sugarcane, 0), Some("Bacterial Blight"));
        assert_eq!(class_name(Crop::Potato, 3), None);
    }

    #[test]
    fn test_class_index() {
        assert_eq!(Crop::Corn.class_index("Corn___Healthy"), Some(2));
        assert_eq!(Crop::Corn.class_index("Rice___Healthy"), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("wheat".parse::<Crop>().unwrap(), Crop::Wheat);
        assert_eq!("  Potato ".parse::<Crop>().unwrap(), Crop::Potato);
        assert!(matches!(
            "tomato".parse::<Crop>(),
            Err(AgriAidError::UnknownCrop(_))
        ));
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("Rice___Leaf_Blast"), "Rice - Leaf Blast");
        assert_eq!(
            display_label("Corn___Northern_Leaf_Blight"),
            "Corn - Northern Leaf Blight"
        );
        assert_eq!(display_label("Red Rot"), "Red Rot");
    }

    #[test]
    fn test_plain_label() {
        assert_eq!(plain_label("Wheat___Yellow_Rust"), "Wheat Yellow Rust");
    }

    #[test]
    fn test_weights_file_stem() {
        assert_eq!(Crop::Sugarcane.weights_file_stem(), "sugarcane_model");
    }

    #[test]
    fn test_serde_uses_keys() {
        let json = serde_json::to_string(&Crop::Corn).unwrap();
        assert_eq!(json, "\"corn\"");
        let crop: Crop = serde_json::from_str("\"rice\"").unwrap();
        assert_eq!(crop, Crop::Rice);
    }
}
