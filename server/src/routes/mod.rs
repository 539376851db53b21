//! HTTP routes

pub mod crops;
pub mod health;
pub mod predict;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::SharedState;

/// Build the application router
pub fn router(state: SharedState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    let static_dir = state
        .config
        .static_dir
        .clone()
        .filter(|dir| dir.is_dir());

    let mut app = Router::new()
        // Health check
        .route("/health", get(health::health_check))

        // Catalog
        .route("/crops", get(crops::list_crops))
        .route("/models", get(crops::list_models))

        // Diagnosis
        .route("/predict", post(predict::predict))
        .layer(DefaultBodyLimit::max(body_limit))

        // Add state
        .with_state(state);

    if let Some(dir) = static_dir {
        info!("Serving static files from {:?}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use image::{DynamicImage, ImageFormat};
    use tower::ServiceExt;

    use agriaid::backend::{default_device, InferenceBackend};
    use agriaid::{
        ClassifierConfig, Crop, CropClassifier, Diagnoser, DiseaseDatabase, ModelRegistry,
        PreprocessConfig, Preprocessor,
    };

    use super::*;
    use crate::state::{AppState, ServerConfig};

    const BOUNDARY: &str = "agriaid-test-boundary";

    fn test_state(config: ServerConfig) -> SharedState {
        let device = default_device();
        let classifier_config = ClassifierConfig::for_crop(Crop::Rice)
            .with_layers([1, 1, 1, 1])
            .with_base_width(2)
            .with_hidden_units(4);

        let mut registry = ModelRegistry::<InferenceBackend>::empty(device.clone())
            .with_preprocessor(Preprocessor::new(PreprocessConfig::default().with_image_size(32)));
        registry
            .insert(Crop::Rice, CropClassifier::new(&classifier_config, &device))
            .unwrap();

        let diagnoser = Diagnoser::new(registry, DiseaseDatabase::empty());
        Arc::new(AppState::new(config, diagnoser))
    }

    fn png() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::new_rgb8(24, 24)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn multipart(crop: Option<&str>, file: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body = Vec::new();

        if let Some(crop) = crop {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"crop\"\r\n\r\n{}\r\n",
                    BOUNDARY, crop
                )
                .as_bytes(),
            );
        }

        if let Some((filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = router(test_state(ServerConfig::default()));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["models_loaded"], 1);
    }

    #[tokio::test]
    async fn test_crops_report_availability() {
        let app = router(test_state(ServerConfig::default()));
        let request = Request::builder().uri("/crops").body(Body::empty()).unwrap();

        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);

        let crops = json.as_array().unwrap();
        assert_eq!(crops.len(), 5);
        let rice = crops.iter().find(|c| c["key"] == "rice").unwrap();
        assert_eq!(rice["available"], true);
        assert_eq!(rice["display_classes"][2], "Rice - Leaf Blast");
        let corn = crops.iter().find(|c| c["key"] == "corn").unwrap();
        assert_eq!(corn["available"], false);
    }

    #[tokio::test]
    async fn test_models_status() {
        let app = router(test_state(ServerConfig::default()));
        let request = Request::builder().uri("/models").body(Body::empty()).unwrap();

        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_predict_success() {
        let app = router(test_state(ServerConfig::default()));
        let image = png();

        let (status, json) = send(app, multipart(Some("rice"), Some(("leaf.png", &image)))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["crop"], "rice");
        assert_eq!(json["crop_display"], "Rice");
        assert!(json["prediction"].as_str().unwrap().starts_with("Rice - "));

        let healthy = json["is_healthy"].as_bool().unwrap();
        assert_eq!(healthy, json["remediation"].is_null());
    }

    #[tokio::test]
    async fn test_predict_missing_crop() {
        let app = router(test_state(ServerConfig::default()));
        let image = png();

        let (status, json) = send(app, multipart(None, Some(("leaf.png", &image)))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Please select both a crop and upload an image.");
    }

    #[tokio::test]
    async fn test_predict_empty_filename() {
        let app = router(test_state(ServerConfig::default()));
        let image = png();

        let (status, json) = send(app, multipart(Some("rice"), Some(("", &image)))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Please select an image file.");
    }

    #[tokio::test]
    async fn test_predict_unknown_crop() {
        let app = router(test_state(ServerConfig::default()));
        let image = png();

        let (status, json) =
            send(app, multipart(Some("tomato"), Some(("leaf.png", &image)))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            json["error"],
            "Model for tomato is not available. Please try another crop."
        );
    }

    #[tokio::test]
    async fn test_predict_unloaded_crop() {
        let app = router(test_state(ServerConfig::default()));
        let image = png();

        let (status, json) = send(app, multipart(Some("wheat"), Some(("leaf.png", &image)))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            json["error"],
            "Model for wheat is not available. Please try another crop."
        );
    }

    #[tokio::test]
    async fn test_predict_corrupt_image() {
        let app = router(test_state(ServerConfig::default()));

        let (status, json) =
            send(app, multipart(Some("rice"), Some(("leaf.png", b"not a png")))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"]
            .as_str()
            .unwrap()
            .starts_with("Error processing image"));
    }

    #[tokio::test]
    async fn test_predict_rejects_oversized_upload() {
        let config = ServerConfig {
            max_upload_bytes: 1024,
            ..ServerConfig::default()
        };
        let app = router(test_state(config));
        let big = vec![0u8; 4096];

        let (status, _) = send(app, multipart(Some("rice"), Some(("leaf.png", &big)))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
