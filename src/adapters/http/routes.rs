use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use tracing::debug;

use crate::adapters::http::{error::ApiError, state::HttpState};
use crate::application::dto::PredictResponse;

pub const LIVENESS_MESSAGE: &str = "API is running";

pub async fn home() -> &'static str {
    LIVENESS_MESSAGE
}

/// `POST /predict`: busca el campo `image` del formulario multipart y ejecuta la detección.
/// Una petición que ni siquiera es multipart se trata igual que una sin imagen.
pub async fn predict(
    State(st): State<HttpState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Cuerpo no multipart: {}", rejection);
        ApiError::MissingImage
    })?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            image = Some(field.bytes().await?);
            break;
        }
    }
    let image = image.ok_or(ApiError::MissingImage)?;

    let result = st.prediction.predict(image).await?;
    Ok(Json(result.into()))
}
