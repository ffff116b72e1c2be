use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
}

impl DomainError {
    /// Mensaje sin el prefijo de categoría, tal como se devuelve al cliente.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m) | Self::InvalidInput(m) | Self::OperationFailed(m) => m,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
