//! Prediction endpoint
//!
//! Accepts a multipart form with a `crop` field and a `file` upload. The
//! upload stays in memory; nothing is written to disk.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use tracing::{debug, error};

use agriaid::{Crop, Diagnosis};

use crate::error::{ApiError, MISSING_FIELDS, MISSING_FILE};
use crate::state::SharedState;

/// Uploaded file with its client-side name
struct Upload {
    filename: String,
    bytes: Bytes,
}

/// POST /predict - Diagnose an uploaded leaf photo
pub async fn predict(
    State(state): State<SharedState>,
    mut multipart: Multipart,
) -> Result<Json<Diagnosis>, ApiError> {
    let mut crop_field: Option<String> = None;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("crop") => crop_field = Some(field.text().await?),
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                upload = Some(Upload { filename, bytes });
            }
            other => debug!("Ignoring form field {:?}", other),
        }
    }

    let (Some(crop_field), Some(upload)) = (crop_field, upload) else {
        return Err(ApiError::bad_request(MISSING_FIELDS));
    };

    if upload.filename.trim().is_empty() || upload.bytes.is_empty() {
        return Err(ApiError::bad_request(MISSING_FILE));
    }

    let crop: Crop = crop_field.parse()?;

    if !state.diagnoser.registry().is_loaded(crop) {
        return Err(ApiError::model_unavailable(crop.key()));
    }

    debug!(
        "Diagnosing {:?} ({} bytes) as {}",
        upload.filename,
        upload.bytes.len(),
        crop
    );

    let worker_state = state.clone();
    let diagnosis = tokio::task::spawn_blocking(move || {
        worker_state.diagnoser.diagnose_bytes(crop, &upload.bytes)
    })
    .await
    .map_err(|e| {
        error!("Inference task failed: {}", e);
        ApiError::new(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Server error: inference task failed",
        )
    })??;

    Ok(Json(diagnosis))
}
