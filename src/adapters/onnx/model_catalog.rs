use ort::session::Session;
use std::path::Path;
use tracing::warn;

use crate::domain::detection::ClassNames;
use crate::domain::errors::{DomainError, DomainResult};

/// Lo que un export de Ultralytics guarda en los metadatos ONNX y nos interesa.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMetadata {
    pub names: Option<ClassNames>,
    pub imgsz: Option<u32>,
}

pub fn validate_model_path(path: &Path) -> DomainResult<()> {
    if path.as_os_str().is_empty() {
        return Err(DomainError::InvalidInput("model path empty".into()));
    }
    if !path.exists() {
        return Err(DomainError::NotFound(format!("model file not found: {}", path.display())));
    }
    Ok(())
}

pub fn read_metadata(session: &Session) -> ModelMetadata {
    let metadata = match session.metadata() {
        Ok(m) => m,
        Err(e) => {
            warn!("No se pudieron leer los metadatos del modelo: {}", e);
            return ModelMetadata::default();
        }
    };

    let names = metadata
        .custom("names")
        .ok()
        .flatten()
        .and_then(|raw| parse_class_names(&raw));
    let imgsz = metadata
        .custom("imgsz")
        .ok()
        .flatten()
        .and_then(|raw| parse_imgsz(&raw));

    ModelMetadata { names, imgsz }
}

/// `names` llega como `{0: 'person', 1: 'bicycle', ...}`, que es un mapping YAML en flujo.
pub fn parse_class_names(raw: &str) -> Option<ClassNames> {
    match serde_yaml::from_str::<ClassNames>(raw) {
        Ok(names) if !names.is_empty() => Some(names),
        Ok(_) => None,
        Err(e) => {
            warn!("Metadato `names` no válido ({}): {}", e, raw);
            None
        }
    }
}

/// `imgsz` llega como `[640, 640]`; las entradas son cuadradas, basta el primero.
pub fn parse_imgsz(raw: &str) -> Option<u32> {
    serde_yaml::from_str::<Vec<u32>>(raw)
        .ok()
        .and_then(|dims| dims.first().copied())
        .or_else(|| serde_yaml::from_str::<u32>(raw).ok())
        .filter(|&n| n > 0)
}

/// Nombres genéricos cuando el modelo no trae metadatos.
pub fn fallback_names(num_classes: usize) -> ClassNames {
    (0..num_classes).map(|i| (i, format!("class_{i}"))).collect()
}
