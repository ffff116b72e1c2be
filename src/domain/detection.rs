use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapa id de clase -> nombre, ordenado por id.
pub type ClassNames = BTreeMap<usize, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
}

impl Detection {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn intersection_area(&self, other: &Detection) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 > x1 && y2 > y1 {
            (x2 - x1) * (y2 - y1)
        } else {
            0.0
        }
    }

    pub fn iou(&self, other: &Detection) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }

    /// Recorta la caja a los límites de una imagen `width` x `height`.
    pub fn clip(self, width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        Self {
            x1: self.x1.clamp(0.0, w),
            y1: self.y1.clamp(0.0, h),
            x2: self.x2.clamp(0.0, w),
            y2: self.y2.clamp(0.0, h),
            ..self
        }
    }

    /// Fila plana `[x1, y1, x2, y2, conf, class_id]`, el formato que esperan los clientes.
    pub fn to_row(&self) -> [f32; 6] {
        [self.x1, self.y1, self.x2, self.y2, self.score, self.class_id as f32]
    }
}

/// Resultado completo de una inferencia: cajas y nombres de clase del modelo.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionResult {
    pub detections: Vec<Detection>,
    pub classes: ClassNames,
}

/// NMS por clase: conserva la caja de mayor score y descarta las de su misma
/// clase que la solapen más de `iou_threshold`.
pub fn non_max_suppression(
    mut candidates: Vec<Detection>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<Detection> {
    candidates.sort_unstable_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Detection> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
