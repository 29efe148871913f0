// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Tag operation failed: {0}")]
    TagOperationFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl DomainError {
    /// Prefix the error message with additional context.
    pub fn context<C: Into<String>>(self, context: C) -> Self {
        match self {
            DomainError::Storage(msg) => {
                DomainError::Storage(format!("{}: {}", context.into(), msg))
            }
            DomainError::Serialization(msg) => {
                DomainError::Serialization(format!("{}: {}", context.into(), msg))
            }
            DomainError::Other(msg) => DomainError::Other(format!("{}: {}", context.into(), msg)),
            err => DomainError::Other(format!("{}: {}", context.into(), err)),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
