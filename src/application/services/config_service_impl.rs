// src/application/services/config_service_impl.rs
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::config_service::ConfigService;
use crate::domain::api_config::{ApiConfig, ApiConfigRecord};
use crate::domain::error::DomainError;
use crate::domain::repositories::storage::{keys, StorageArea};

#[derive(Debug)]
pub struct ConfigServiceImpl {
    storage: Arc<dyn StorageArea>,
}

impl ConfigServiceImpl {
    pub fn new(storage: Arc<dyn StorageArea>) -> Self {
        Self { storage }
    }
}

impl ConfigService for ConfigServiceImpl {
    #[instrument(skip(self), level = "debug")]
    fn get_config(&self) -> ApiConfig {
        let value = match self.storage.get(keys::API_CONFIG) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!("no persisted API config, using defaults");
                return ApiConfig::default();
            }
            Err(e) => {
                warn!("failed to read API config, using defaults: {}", e);
                return ApiConfig::default();
            }
        };

        match serde_json::from_value::<ApiConfigRecord>(value) {
            Ok(record) => record.resolve(),
            Err(e) => {
                warn!("persisted API config is unreadable, using defaults: {}", e);
                ApiConfig::default()
            }
        }
    }

    #[instrument(skip(self, config), level = "debug", fields(provider = config.provider.as_str()))]
    fn save_config(&self, config: &ApiConfig, encode_key: bool) -> ApplicationResult<()> {
        let report = config.validate();
        if !report.is_valid() {
            return Err(ApplicationError::Validation(report.errors.join(", ")));
        }

        let record = ApiConfigRecord::from_config(config, encode_key);
        let value = serde_json::to_value(&record)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;
        self.storage.set(keys::API_CONFIG, value)?;

        debug!(enabled = config.enabled, "API config saved");
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn reset_config(&self) -> ApplicationResult<()> {
        self.storage.remove(keys::API_CONFIG)?;
        Ok(())
    }

    fn is_enabled_and_valid(&self) -> bool {
        let config = self.get_config();
        config.enabled && config.validate().is_valid()
    }
}
