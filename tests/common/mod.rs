//! Utilidades de test: detectores falsos, cuerpos multipart y el router.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::sync::Arc;

use yolo_predict_api::adapters::http::{router, state::HttpState};
use yolo_predict_api::application::ports::DetectorPort;
use yolo_predict_api::application::services::PredictionService;
use yolo_predict_api::domain::detection::{Detection, DetectionResult};
use yolo_predict_api::domain::errors::{DomainError, DomainResult};

pub const BOUNDARY: &str = "----yolo-test-boundary";

/// Devuelve una caja que cubre la imagen entera: cada respuesta identifica su propia subida.
pub struct ImageSizeDetector;

#[async_trait]
impl DetectorPort for ImageSizeDetector {
    async fn detect(&self, image: DynamicImage) -> DomainResult<DetectionResult> {
        // cede el turno para que las peticiones concurrentes se intercalen
        tokio::task::yield_now().await;
        Ok(DetectionResult {
            detections: vec![Detection {
                x1: 0.0,
                y1: 0.0,
                x2: image.width() as f32,
                y2: image.height() as f32,
                score: 0.75,
                class_id: 1,
            }],
            classes: [(0, "person".to_string()), (1, "bicycle".to_string())].into(),
        })
    }
}

pub struct FailingDetector;

#[async_trait]
impl DetectorPort for FailingDetector {
    async fn detect(&self, _image: DynamicImage) -> DomainResult<DetectionResult> {
        Err(DomainError::OperationFailed("model exploded".into()))
    }
}

pub fn app_with(detector: Arc<dyn DetectorPort>) -> Router {
    router(HttpState {
        prediction: Arc::new(PredictionService::new(detector)),
        upload_limit: 1024 * 1024,
    })
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut buf, ImageFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn predict_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("build request")
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
