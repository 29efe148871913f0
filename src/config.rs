// src/config.rs
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::domain::error::DomainResult;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    /// Maximum number of cached page-content entries (default: 128)
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Per-entry time to live in seconds (default: 3600)
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_capacity() -> usize {
    128
}

fn default_cache_ttl_secs() -> u64 {
    60 * 60
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Path to the SQLite storage file
    #[serde(default = "default_db_path")]
    pub db_url: String,

    /// Bounds for the in-memory page-content cache
    #[serde(default)]
    pub content_cache: CacheSettings,

    /// Bound on the page-extraction step, in milliseconds (default: 10000)
    #[serde(default = "default_extraction_timeout_ms")]
    pub extraction_timeout_ms: u64,
}

fn default_db_path() -> String {
    let db_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("../db"))
        .join(".config/tagmark");

    // Ensure directory exists
    std::fs::create_dir_all(&db_dir).ok();

    db_dir
        .join("tagmark.db")
        .to_str()
        .unwrap_or("../db/tagmark.db")
        .to_string()
}

fn default_extraction_timeout_ms() -> u64 {
    10_000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_url: default_db_path(),
            content_cache: CacheSettings::default(),
            extraction_timeout_ms: default_extraction_timeout_ms(),
        }
    }
}

// Load settings from config files and environment variables
#[instrument(level = "debug")]
pub fn load_settings(config_file: Option<&Path>) -> DomainResult<Settings> {
    trace!("Loading settings");

    // Start with default settings
    let mut settings = Settings::default();

    let config_sources = [
        config_file.map(Path::to_path_buf),
        dirs::home_dir().map(|p| p.join(".config/tagmark/config.toml")),
    ];

    // Load from the first config file that exists
    for config_path in config_sources.iter().flatten() {
        if config_path.exists() {
            trace!("Loading config from: {:?}", config_path);

            if let Ok(config_text) = std::fs::read_to_string(config_path) {
                if let Ok(file_settings) = toml::from_str::<Settings>(&config_text) {
                    settings = file_settings;
                    break;
                }
            }
        }
    }

    // Override with environment variables
    if let Ok(db_url) = std::env::var("TAGMARK_DB_URL") {
        trace!("Using TAGMARK_DB_URL from environment: {}", db_url);
        settings.db_url = db_url;
    }

    if let Ok(capacity) = std::env::var("TAGMARK_CACHE_CAPACITY") {
        if let Ok(capacity) = capacity.parse() {
            settings.content_cache.capacity = capacity;
        }
    }

    if let Ok(timeout) = std::env::var("TAGMARK_EXTRACTION_TIMEOUT_MS") {
        if let Ok(timeout) = timeout.parse() {
            settings.extraction_timeout_ms = timeout;
        }
    }

    trace!("Settings loaded: {:?}", settings);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::{init_test_env, EnvGuard};
    use serial_test::serial;
    use std::io::Write;

    #[test]
    #[serial]
    fn given_no_environment_when_load_then_defaults() {
        let _ = init_test_env();
        let _guard = EnvGuard::new();

        let settings = load_settings(None).unwrap();
        assert!(settings.db_url.contains("tagmark.db"));
        assert_eq!(settings.content_cache.capacity, 128);
        assert_eq!(settings.content_cache.ttl_secs, 3600);
        assert_eq!(settings.extraction_timeout_ms, 10_000);
    }

    #[test]
    #[serial]
    fn given_env_vars_when_load_then_overrides() {
        let _ = init_test_env();
        let _guard = EnvGuard::new();
        std::env::set_var("TAGMARK_DB_URL", "/test/db.db");
        std::env::set_var("TAGMARK_CACHE_CAPACITY", "9");

        let settings = load_settings(None).unwrap();
        assert_eq!(settings.db_url, "/test/db.db");
        assert_eq!(settings.content_cache.capacity, 9);
    }

    #[test]
    #[serial]
    fn given_config_file_when_load_then_file_values_are_used() {
        let _ = init_test_env();
        let _guard = EnvGuard::new();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "db_url = \"/from/file.db\"\nextraction_timeout_ms = 2500\n\n[content_cache]\ncapacity = 4\nttl_secs = 60\n"
        )
        .unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.db_url, "/from/file.db");
        assert_eq!(settings.extraction_timeout_ms, 2500);
        assert_eq!(settings.content_cache.capacity, 4);
        assert_eq!(settings.content_cache.ttl_secs, 60);
    }
}
