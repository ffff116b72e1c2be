use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use image::DynamicImage;
use tracing::{info, warn};

use crate::{
    application::ports::DetectorPort,
    domain::{
        detection::DetectionResult,
        errors::{DomainError, DomainResult},
    },
};

/// Caso de uso de predicción: decodifica la imagen subida en memoria y la
/// pasa al detector. No se escribe nada en disco.
#[derive(Clone)]
pub struct PredictionService {
    detector: Arc<dyn DetectorPort>,
}

impl PredictionService {
    pub fn new(detector: Arc<dyn DetectorPort>) -> Self {
        Self { detector }
    }

    pub async fn predict(&self, image_bytes: Bytes) -> DomainResult<DetectionResult> {
        let image = decode_image(image_bytes).await?;
        let (width, height) = (image.width(), image.height());

        let start = Instant::now();
        let result = self.detector.detect(image).await.inspect_err(|e| {
            warn!("Inferencia fallida sobre imagen {}x{}: {}", width, height, e);
        })?;

        info!(
            detections = result.detections.len(),
            infer_ms = start.elapsed().as_secs_f32() * 1000.0,
            "Predicción completada ({}x{})",
            width,
            height
        );
        Ok(result)
    }
}

/// La decodificación es trabajo de CPU: se hace en el pool bloqueante.
async fn decode_image(image_bytes: Bytes) -> DomainResult<DynamicImage> {
    if image_bytes.is_empty() {
        return Err(DomainError::InvalidInput("Invalid image: empty payload".into()));
    }

    tokio::task::spawn_blocking(move || image::load_from_memory(&image_bytes))
        .await
        .map_err(|e| DomainError::OperationFailed(format!("image decode task failed: {e}")))?
        .map_err(|e| DomainError::InvalidInput(format!("Invalid image: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    use crate::domain::detection::Detection;

    struct SizeEcho;

    #[async_trait]
    impl DetectorPort for SizeEcho {
        async fn detect(&self, image: DynamicImage) -> DomainResult<DetectionResult> {
            Ok(DetectionResult {
                detections: vec![Detection {
                    x1: 0.0,
                    y1: 0.0,
                    x2: image.width() as f32,
                    y2: image.height() as f32,
                    score: 1.0,
                    class_id: 0,
                }],
                classes: [(0, "thing".to_string())].into(),
            })
        }
    }

    fn png(width: u32, height: u32) -> Bytes {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        Bytes::from(buf.into_inner())
    }

    #[tokio::test]
    async fn decodes_and_forwards_to_detector() {
        let service = PredictionService::new(Arc::new(SizeEcho));
        let result = service.predict(png(4, 3)).await.unwrap();
        assert_eq!(result.detections[0].x2, 4.0);
        assert_eq!(result.detections[0].y2, 3.0);
        assert_eq!(result.classes.get(&0).map(String::as_str), Some("thing"));
    }

    #[tokio::test]
    async fn empty_payload_is_invalid_input() {
        let service = PredictionService::new(Arc::new(SizeEcho));
        let err = service.predict(Bytes::new()).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn garbage_bytes_are_invalid_input() {
        let service = PredictionService::new(Arc::new(SizeEcho));
        let err = service
            .predict(Bytes::from_static(b"definitely not an image"))
            .await
            .unwrap_err();
        match err {
            DomainError::InvalidInput(msg) => assert!(msg.starts_with("Invalid image")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
