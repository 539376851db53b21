//! API error responses
//!
//! Maps library errors onto HTTP status codes with a JSON `{ "error": ... }` body.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use agriaid::AgriAidError;

pub const MISSING_FIELDS: &str = "Please select both a crop and upload an image.";
pub const MISSING_FILE: &str = "Please select an image file.";

/// Error returned by request handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn model_unavailable(crop: &str) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            format!(
                "Model for {} is not available. Please try another crop.",
                crop
            ),
        )
    }
}

impl From<AgriAidError> for ApiError {
    fn from(err: AgriAidError) -> Self {
        match err {
            // Crops outside the catalog have no model either
            AgriAidError::ModelUnavailable(crop) | AgriAidError::UnknownCrop(crop) => {
                Self::model_unavailable(&crop)
            }
            AgriAidError::ImageDecode(_) | AgriAidError::ImageLoad(_, _) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Error processing image: {}", err),
            ),
            other => {
                error!("Request failed: {}", other);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Server error: {}", other),
                )
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let unavailable: ApiError = AgriAidError::ModelUnavailable("rice".into()).into();
        assert_eq!(unavailable.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            unavailable.message,
            "Model for rice is not available. Please try another crop."
        );

        let unknown: ApiError = AgriAidError::UnknownCrop("tomato".into()).into();
        assert_eq!(unknown.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            unknown.message,
            "Model for tomato is not available. Please try another crop."
        );

        let decode: ApiError = AgriAidError::ImageDecode("bad header".into()).into();
        assert_eq!(decode.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(decode.message.starts_with("Error processing image"));

        let model: ApiError = AgriAidError::Model("boom".into()).into();
        assert_eq!(model.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
