// src/application/services/config_service.rs
use std::fmt::Debug;

use crate::application::error::ApplicationResult;
use crate::domain::api_config::{ApiConfig, ValidationReport};

/// Service interface for the persisted API configuration.
pub trait ConfigService: Send + Sync + Debug {
    /// The effective configuration. Never fails: defaults are returned when
    /// nothing is persisted or the persisted record is unreadable.
    fn get_config(&self) -> ApiConfig;

    /// Pure validation; convenience passthrough to the domain rules.
    fn validate(&self, config: &ApiConfig) -> ValidationReport {
        config.validate()
    }

    /// Re-validates and persists. The credential is encoded at rest unless
    /// `encode_key` is false (it is left alone if already encoded).
    fn save_config(&self, config: &ApiConfig, encode_key: bool) -> ApplicationResult<()>;

    /// Remove the persisted record; future reads return defaults.
    fn reset_config(&self) -> ApplicationResult<()>;

    /// True when the feature is switched on and the stored configuration
    /// passes validation.
    fn is_enabled_and_valid(&self) -> bool;
}
