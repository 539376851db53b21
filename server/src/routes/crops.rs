//! Crop catalog and model status endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use agriaid::crops::display_label;
use agriaid::{Crop, CropModelStatus};

use crate::state::SharedState;

/// A crop as offered on the prediction form
#[derive(Debug, Serialize)]
pub struct CropSummary {
    pub key: &'static str,
    pub display_name: &'static str,
    pub classes: Vec<&'static str>,
    pub display_classes: Vec<String>,
    /// Whether a classifier is loaded for this crop
    pub available: bool,
}

/// GET /crops - List supported crops
pub async fn list_crops(State(state): State<SharedState>) -> Json<Vec<CropSummary>> {
    let registry = state.diagnoser.registry();

    let crops = Crop::ALL
        .into_iter()
        .map(|crop| CropSummary {
            key: crop.key(),
            display_name: crop.display_name(),
            classes: crop.classes().to_vec(),
            display_classes: crop.classes().iter().map(|c| display_label(c)).collect(),
            available: registry.is_loaded(crop),
        })
        .collect();

    Json(crops)
}

/// GET /models - Per-crop model availability
pub async fn list_models(State(state): State<SharedState>) -> Json<Vec<CropModelStatus>> {
    Json(state.diagnoser.registry().status())
}
