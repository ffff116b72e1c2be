use serde::{Deserialize, Serialize};

use crate::domain::detection::{ClassNames, DetectionResult};

/// Cuerpo de `POST /predict`. `classes` se serializa con los ids como claves de texto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<[f32; 6]>,
    pub classes: ClassNames,
}

impl From<DetectionResult> for PredictResponse {
    fn from(r: DetectionResult) -> Self {
        Self {
            predictions: r.detections.iter().map(|d| d.to_row()).collect(),
            classes: r.classes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
