// src/domain/gateway.rs
use std::fmt::Debug;

use thiserror::Error;

use crate::domain::api_config::ApiConfig;

/// Failure modes of a chat-completion call. Callers route on these: a
/// timeout and an auth failure read very differently to the user.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("API request timed out")]
    Timeout,

    #[error("API request failed ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("Unrecognized API response shape: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Single-attempt chat completion against the configured provider.
///
/// One request, bounded by the configured timeout, no retries. The
/// implementation is responsible for provider-specific request shapes and
/// for extracting the generated text uniformly.
pub trait ChatGateway: Send + Sync + Debug {
    fn complete(&self, config: &ApiConfig, prompt: &str) -> GatewayResult<String>;
}
