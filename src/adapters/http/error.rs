use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::application::dto::ErrorResponse;
use crate::domain::errors::DomainError;

pub const NO_IMAGE_MESSAGE: &str = "No image provided";

/// Todos los fallos de la API acaban como JSON `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    MissingImage,
    Multipart(MultipartError),
    Domain(DomainError),
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::Multipart(e)
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingImage => (StatusCode::BAD_REQUEST, NO_IMAGE_MESSAGE.to_string()),
            Self::Multipart(e) => (e.status(), e.body_text()),
            Self::Domain(DomainError::InvalidInput(m)) => (StatusCode::BAD_REQUEST, m),
            Self::Domain(e @ (DomainError::NotFound(_) | DomainError::OperationFailed(_))) => {
                error!("Fallo interno: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.message().to_string())
            }
        };

        if status.is_client_error() {
            warn!("Petición rechazada ({}): {}", status, message);
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_missing_image_to_bad_request() {
        assert_eq!(ApiError::MissingImage.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn maps_invalid_input_to_bad_request() {
        let err = ApiError::from(DomainError::InvalidInput("Invalid image: nope".into()));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn maps_runtime_faults_to_internal_error() {
        for e in [
            DomainError::OperationFailed("boom".into()),
            DomainError::NotFound("gone".into()),
        ] {
            assert_eq!(
                ApiError::from(e).into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }
}
