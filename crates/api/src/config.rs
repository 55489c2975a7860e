//! Server configuration

use crate::rate_limit::RateLimitConfig;
use crate::ApiError;
use companion::{ChatConfig, SpeechConfig};
use config::{Config, Environment, File};
use frame_sampler::SamplerConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Config file used when `MINDMATE_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "mindmate.toml";

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Default tracing filter, e.g. "info" or "api=debug"
    pub log_level: String,
    /// Start sampling as soon as the server is up
    pub autostart_sampler: bool,
    /// Replay a scripted expression sequence instead of browser pushes
    pub demo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            log_level: "info".to_string(),
            autostart_sampler: true,
            demo: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub settings_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from("mindmate-settings.json"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub sampler: SamplerConfig,
    pub chat: ChatConfig,
    pub speech: SpeechConfig,
    pub rate_limit: RateLimitConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Load from `MINDMATE_CONFIG` (or `mindmate.toml`) and `MINDMATE__*`
    /// variables. `OPENAI_API_KEY` fills in a missing chat key.
    pub fn load() -> Result<Self, ApiError> {
        let path = std::env::var("MINDMATE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_path(Path::new(&path))?;

        if config.chat.api_key.is_none() {
            config.chat.api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }
        Ok(config)
    }

    /// Load from an optional file, then environment overrides
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let config: AppConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("MINDMATE").separator("__").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.sampler.validate()?;
        info!(
            "Configuration loaded (file {}, sampling every {}ms)",
            path.display(),
            config.sampler.interval_ms
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use companion::ProsodyProfile;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.sampler.interval_ms, 1500);
        assert_eq!(config.chat.max_tokens, 150);
        assert!(config.rate_limit.enabled);
        assert!(!config.server.demo);
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mindmate.toml");
        std::fs::write(
            &path,
            r#"
[server]
demo = true

[sampler]
interval_ms = 2000

[chat]
model = "gpt-4o-mini"

[speech]
profile = "gentle"

[storage]
settings_path = "/var/lib/mindmate/settings.json"
"#,
        )
        .unwrap();

        let config = AppConfig::from_path(&path).unwrap();
        assert!(config.server.demo);
        assert_eq!(config.sampler.interval_ms, 2000);
        assert_eq!(config.chat.model, "gpt-4o-mini");
        assert_eq!(config.chat.temperature, 0.7);
        assert_eq!(config.speech.profile, ProsodyProfile::Gentle);
        assert_eq!(
            config.storage.settings_path,
            PathBuf::from("/var/lib/mindmate/settings.json")
        );
    }

    #[test]
    fn test_zero_interval_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mindmate.toml");
        std::fs::write(&path, "[sampler]\ninterval_ms = 0\n").unwrap();
        assert!(matches!(AppConfig::from_path(&path), Err(ApiError::Config(_))));
    }
}
