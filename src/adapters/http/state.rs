use std::sync::Arc;
use crate::application::services::PredictionService;

/// Estado compartido para los manejadores HTTP de Axum.
#[derive(Clone)]
pub struct HttpState {
    /// Caso de uso de predicción; contiene el único modelo cargado del proceso.
    pub prediction: Arc<PredictionService>,
    /// Tamaño máximo del cuerpo multipart, en bytes.
    pub upload_limit: usize,
}
