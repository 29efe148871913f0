// src/infrastructure/llm/gateway.rs
use reqwest::blocking::RequestBuilder;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use crate::domain::api_config::{ApiConfig, ApiProvider};
use crate::domain::gateway::{ChatGateway, GatewayError, GatewayResult};
use crate::infrastructure::llm::model::{
    ChatMessage, ChatRequest, ChatResponse, ClaudeRequest, ClaudeResponse,
};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Chat completion over HTTP: one request per call, bounded by the
/// configured timeout, dispatching on the provider variant for headers,
/// body shape and response extraction.
#[derive(Debug, Clone, Default)]
pub struct HttpChatGateway;

impl HttpChatGateway {
    pub fn new() -> Self {
        Self
    }

    fn build_request(
        client: &reqwest::blocking::Client,
        config: &ApiConfig,
        prompt: &str,
    ) -> RequestBuilder {
        let base = client
            .post(&config.endpoint)
            .header(CONTENT_TYPE, "application/json");

        match config.provider {
            ApiProvider::OpenAi | ApiProvider::DeepSeek | ApiProvider::Custom => base
                .header("Authorization", format!("Bearer {}", config.api_key))
                .json(&ChatRequest {
                    model: config.model.clone(),
                    messages: vec![ChatMessage::user(prompt)],
                    temperature: config.temperature,
                    max_tokens: config.max_tokens,
                }),
            ApiProvider::Claude => base
                .header("x-api-key", config.api_key.clone())
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(&ClaudeRequest {
                    model: config.model.clone(),
                    max_tokens: config.max_tokens,
                    temperature: config.temperature,
                    messages: vec![ChatMessage::user(prompt)],
                }),
        }
    }
}

impl ChatGateway for HttpChatGateway {
    #[instrument(skip(self, config, prompt), level = "debug", fields(provider = config.provider.as_str()))]
    fn complete(&self, config: &ApiConfig, prompt: &str) -> GatewayResult<String> {
        debug!(prompt_chars = prompt.chars().count(), "dispatching chat completion");

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .build()
            // Fallback to default client in case of builder failure
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        let response = Self::build_request(&client, config, prompt)
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().map_err(map_transport_error)?;

        if !status.is_success() {
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        extract_text(config.provider, &body)
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Network(error.to_string())
    }
}

/// Pull the generated text out of a successful response body, per provider.
/// Custom endpoints get the lenient cascade: OpenAI shape, Claude shape,
/// a flat `text` field, then a raw string body.
fn extract_text(provider: ApiProvider, body: &str) -> GatewayResult<String> {
    let text = match provider {
        ApiProvider::OpenAi | ApiProvider::DeepSeek => openai_text(body),
        ApiProvider::Claude => claude_text(body),
        ApiProvider::Custom => openai_text(body)
            .or_else(|| claude_text(body))
            .or_else(|| flat_text(body)),
    };

    match text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(GatewayError::MalformedResponse(preview(body))),
    }
}

fn openai_text(body: &str) -> Option<String> {
    serde_json::from_str::<ChatResponse>(body)
        .ok()?
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .filter(|text| !text.is_empty())
}

fn claude_text(body: &str) -> Option<String> {
    serde_json::from_str::<ClaudeResponse>(body)
        .ok()?
        .content
        .into_iter()
        .next()
        .map(|content| content.text)
        .filter(|text| !text.is_empty())
}

fn flat_text(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value {
        serde_json::Value::String(text) => Some(text),
        _ => value
            .get("text")
            .and_then(|t| t.as_str())
            .map(str::to_string),
    }
    .filter(|text| !text.is_empty())
}

fn preview(body: &str) -> String {
    const PREVIEW_CHARS: usize = 200;
    if body.chars().count() <= PREVIEW_CHARS {
        body.to_string()
    } else {
        body.chars().take(PREVIEW_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPENAI_BODY: &str =
        r##"{"choices": [{"message": {"role": "assistant", "content": "#rust #cli"}}]}"##;
    const CLAUDE_BODY: &str = r##"{"content": [{"type": "text", "text": "#工作 #学习"}]}"##;

    #[test]
    fn given_openai_body_when_extracted_then_message_content_is_returned() {
        let text = extract_text(ApiProvider::OpenAi, OPENAI_BODY).unwrap();
        assert_eq!(text, "#rust #cli");
    }

    #[test]
    fn given_claude_body_when_extracted_then_first_content_text_is_returned() {
        let text = extract_text(ApiProvider::Claude, CLAUDE_BODY).unwrap();
        assert_eq!(text, "#工作 #学习");
    }

    #[test]
    fn given_custom_provider_when_extracted_then_shapes_are_tried_in_order() {
        assert_eq!(
            extract_text(ApiProvider::Custom, OPENAI_BODY).unwrap(),
            "#rust #cli"
        );
        assert_eq!(
            extract_text(ApiProvider::Custom, CLAUDE_BODY).unwrap(),
            "#工作 #学习"
        );
        assert_eq!(
            extract_text(ApiProvider::Custom, r##"{"text": "#flat"}"##).unwrap(),
            "#flat"
        );
        assert_eq!(
            extract_text(ApiProvider::Custom, r##""#raw string""##).unwrap(),
            "#raw string"
        );
    }

    #[test]
    fn given_empty_or_alien_body_when_extracted_then_malformed_response() {
        for body in ["{}", r#"{"choices": []}"#, r#"{"unexpected": true}"#, ""] {
            let result = extract_text(ApiProvider::OpenAi, body);
            assert!(
                matches!(result, Err(GatewayError::MalformedResponse(_))),
                "body {:?} should be malformed",
                body
            );
        }
    }

    #[test]
    fn given_claude_shape_when_hosted_openai_provider_then_not_accepted() {
        // Strict providers do not get the lenient cascade.
        assert!(extract_text(ApiProvider::OpenAi, CLAUDE_BODY).is_err());
    }

    #[test]
    fn given_long_body_when_previewed_then_bounded() {
        let long = "x".repeat(1000);
        assert_eq!(preview(&long).chars().count(), 200);
    }
}
