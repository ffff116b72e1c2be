use async_trait::async_trait;
use image::DynamicImage;

use crate::domain::{detection::DetectionResult, errors::DomainResult};

/// Modelo de detección ya cargado. Se comparte entre todas las peticiones.
#[async_trait]
pub trait DetectorPort: Send + Sync {
    async fn detect(&self, image: DynamicImage) -> DomainResult<DetectionResult>;
}
