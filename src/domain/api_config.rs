// src/domain/api_config.rs
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::util::obfuscation::{decode_credential, encode_credential, is_encoded};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);
pub const MAX_TOKENS_RANGE: (u32, u32) = (1, 4000);
pub const TIMEOUT_MS_RANGE: (u64, u64) = (1000, 120_000);

/// The closed set of supported chat-completion providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    OpenAi,
    Claude,
    DeepSeek,
    Custom,
}

/// Static description of a provider: defaults, known models and the shape
/// its credentials are expected to have.
#[derive(Debug, Clone, Copy)]
pub struct ProviderProfile {
    pub name: &'static str,
    pub endpoint: &'static str,
    pub default_model: &'static str,
    pub models: &'static [&'static str],
    /// Credential-shape pattern; `None` skips the check (custom endpoints).
    pub key_pattern: Option<&'static str>,
    /// Hosted providers require an explicit model; custom endpoints do not.
    pub requires_model: bool,
}

const OPENAI: ProviderProfile = ProviderProfile {
    name: "OpenAI",
    endpoint: "https://api.openai.com/v1/chat/completions",
    default_model: "gpt-3.5-turbo",
    models: &["gpt-3.5-turbo", "gpt-4", "gpt-4-turbo-preview"],
    key_pattern: Some(r"^sk-[A-Za-z0-9]{32,}$"),
    requires_model: true,
};

const CLAUDE: ProviderProfile = ProviderProfile {
    name: "Anthropic Claude",
    endpoint: "https://api.anthropic.com/v1/messages",
    default_model: "claude-3-sonnet-20240229",
    models: &[
        "claude-3-opus-20240229",
        "claude-3-sonnet-20240229",
        "claude-3-haiku-20240307",
    ],
    key_pattern: Some(r"^sk-ant-[A-Za-z0-9_-]{95}$"),
    requires_model: true,
};

const DEEPSEEK: ProviderProfile = ProviderProfile {
    name: "DeepSeek",
    endpoint: "https://api.deepseek.com/v1/chat/completions",
    default_model: "deepseek-chat",
    models: &["deepseek-chat", "deepseek-coder"],
    key_pattern: Some(r"^sk-[A-Za-z0-9]{32,}$"),
    requires_model: true,
};

const CUSTOM: ProviderProfile = ProviderProfile {
    name: "Custom API",
    endpoint: "",
    default_model: "",
    models: &[],
    key_pattern: None,
    requires_model: false,
};

impl ApiProvider {
    pub const ALL: [ApiProvider; 4] = [
        ApiProvider::OpenAi,
        ApiProvider::Claude,
        ApiProvider::DeepSeek,
        ApiProvider::Custom,
    ];

    pub fn profile(self) -> &'static ProviderProfile {
        match self {
            ApiProvider::OpenAi => &OPENAI,
            ApiProvider::Claude => &CLAUDE,
            ApiProvider::DeepSeek => &DEEPSEEK,
            ApiProvider::Custom => &CUSTOM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApiProvider::OpenAi => "openai",
            ApiProvider::Claude => "claude",
            ApiProvider::DeepSeek => "deepseek",
            ApiProvider::Custom => "custom",
        }
    }
}

impl Default for ApiProvider {
    fn default() -> Self {
        ApiProvider::OpenAi
    }
}

/// Resolved runtime configuration for the tag-generation feature.
///
/// The credential is plaintext here; the persisted form
/// ([`ApiConfigRecord`]) carries it obfuscated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub provider: ApiProvider,
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    pub timeout_ms: u64,
    /// Gate for the entire tag-generation feature.
    pub enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let profile = ApiProvider::OpenAi.profile();
        Self {
            provider: ApiProvider::OpenAi,
            endpoint: profile.endpoint.to_string(),
            api_key: String::new(),
            model: profile.default_model.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            enabled: false,
        }
    }
}

/// Outcome of validating an [`ApiConfig`]; collects every violation rather
/// than stopping at the first.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push<S: Into<String>>(&mut self, error: S) {
        self.errors.push(error.into());
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Pure validation; no side effects.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        let profile = self.provider.profile();

        if self.endpoint.trim().is_empty() {
            report.push("Required field missing: endpoint");
        } else {
            match Url::parse(&self.endpoint) {
                Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
                Ok(_) => report.push("API endpoint must use the http or https scheme"),
                Err(_) => report.push("API endpoint is not a valid absolute URL"),
            }
        }

        if self.api_key.trim().is_empty() {
            report.push("Required field missing: apiKey");
        } else if let Some(pattern) = profile.key_pattern {
            // The stored form may still carry the at-rest encoding.
            let key = if is_encoded(&self.api_key) {
                decode_credential(&self.api_key)
            } else {
                self.api_key.clone()
            };
            let re = Regex::new(pattern).expect("provider key pattern is valid");
            if !re.is_match(&key) {
                report.push(format!("API key does not match the {} format", profile.name));
            }
        }

        if profile.requires_model && self.model.trim().is_empty() {
            report.push("Required field missing: model");
        }

        if !(TEMPERATURE_RANGE.0..=TEMPERATURE_RANGE.1).contains(&self.temperature) {
            report.push(format!(
                "temperature must be between {} and {}",
                TEMPERATURE_RANGE.0, TEMPERATURE_RANGE.1
            ));
        }

        if !(MAX_TOKENS_RANGE.0..=MAX_TOKENS_RANGE.1).contains(&self.max_tokens) {
            report.push(format!(
                "maxTokens must be between {} and {}",
                MAX_TOKENS_RANGE.0, MAX_TOKENS_RANGE.1
            ));
        }

        if !(TIMEOUT_MS_RANGE.0..=TIMEOUT_MS_RANGE.1).contains(&self.timeout_ms) {
            report.push(format!(
                "timeout must be between {} and {} milliseconds",
                TIMEOUT_MS_RANGE.0, TIMEOUT_MS_RANGE.1
            ));
        }

        report
    }
}

/// Persisted form of the configuration.
///
/// `endpoint` and `model` are three-valued: `None` means the field was never
/// set and the provider default fills it on read; `Some("")` means the user
/// explicitly cleared it and that intent is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfigRecord {
    #[serde(default)]
    pub provider: ApiProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub enabled: bool,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ApiConfigRecord {
    pub fn from_config(config: &ApiConfig, encode_key: bool) -> Self {
        let api_key = if encode_key {
            encode_credential(&config.api_key)
        } else {
            config.api_key.clone()
        };

        Self {
            provider: config.provider,
            endpoint: Some(config.endpoint.clone()),
            api_key,
            model: Some(config.model.clone()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_ms: config.timeout_ms,
            enabled: config.enabled,
        }
    }

    /// Resolve the record into a runtime config: provider defaults fill
    /// never-set fields, the credential is decoded.
    pub fn resolve(&self) -> ApiConfig {
        let profile = self.provider.profile();

        ApiConfig {
            provider: self.provider,
            endpoint: self
                .endpoint
                .clone()
                .unwrap_or_else(|| profile.endpoint.to_string()),
            api_key: decode_credential(&self.api_key),
            model: self
                .model
                .clone()
                .unwrap_or_else(|| profile.default_model.to_string()),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout_ms: self.timeout_ms,
            enabled: self.enabled,
        }
    }
}
