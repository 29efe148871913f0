// src/infrastructure/error.rs
use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// Infrastructure errors surface to callers as domain errors.
impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Database(msg) => DomainError::Storage(msg),
            InfrastructureError::Network(msg) => DomainError::Other(msg),
            InfrastructureError::Serialization(msg) => DomainError::Serialization(msg),
        }
    }
}

impl From<rusqlite::Error> for InfrastructureError {
    fn from(error: rusqlite::Error) -> Self {
        InfrastructureError::Database(error.to_string())
    }
}
