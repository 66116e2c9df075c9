//! Client configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/chunkdrop/client.toml`
//! - Windows: `%APPDATA%/chunkdrop/client.toml`

use std::path::{Path, PathBuf};

use chunkdrop_upload::UploadConfig;
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`Config::endpoint`].
pub const ENDPOINT_ENV: &str = "CHUNKDROP_ENDPOINT";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// URL every chunk is posted to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Maximum chunk size in bytes.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Capacity of the progress event channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

fn default_endpoint() -> String {
    chunkdrop_http::DEFAULT_ENDPOINT.into()
}

fn default_chunk_size() -> usize {
    chunkdrop_transfer::DEFAULT_CHUNK_SIZE
}

fn default_event_buffer() -> usize {
    256
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            chunk_size: default_chunk_size(),
            event_buffer: default_event_buffer(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found,
    /// then applies environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from(&config_path()?)?;
        config.apply_endpoint_override(std::env::var(ENDPOINT_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`, writing defaults there if missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Replaces the endpoint with a non-blank override.
    pub fn apply_endpoint_override(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }
        if self.endpoint.is_empty() {
            anyhow::bail!("endpoint must not be empty");
        }
        Ok(())
    }

    /// Engine settings derived from this configuration.
    pub fn upload_config(&self) -> UploadConfig {
        UploadConfig {
            chunk_size: self.chunk_size,
            event_buffer: self.event_buffer,
        }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("chunkdrop")
            .join("client.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("chunkdrop").join("client.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/chunkdrop/client.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint, "http://localhost:8080/upload");
        assert_eq!(config.chunk_size, 5 * 1024 * 1024);
        assert_eq!(config.event_buffer, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_partial_toml() {
        let config: Config = toml::from_str(r#"endpoint = "https://files.example/upload""#).unwrap();
        assert_eq!(config.endpoint, "https://files.example/upload");
        assert_eq!(config.chunk_size, 5 * 1024 * 1024);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("client.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn load_from_reads_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("client.toml");
        std::fs::write(&path, "chunk_size = 1024\nevent_buffer = 8\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.event_buffer, 8);
        assert_eq!(config.endpoint, "http://localhost:8080/upload");
        assert_eq!(
            config.upload_config(),
            UploadConfig {
                chunk_size: 1024,
                event_buffer: 8
            }
        );
    }

    #[test]
    fn malformed_toml_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("client.toml");
        std::fs::write(&path, "chunk_size = \"big\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let config = Config {
            chunk_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn endpoint_override() {
        let mut config = Config::default();
        config.apply_endpoint_override(Some("  http://10.0.0.2:9000/upload ".into()));
        assert_eq!(config.endpoint, "http://10.0.0.2:9000/upload");

        config.apply_endpoint_override(Some("   ".into()));
        assert_eq!(config.endpoint, "http://10.0.0.2:9000/upload");

        config.apply_endpoint_override(None);
        assert_eq!(config.endpoint, "http://10.0.0.2:9000/upload");
    }

    #[test]
    fn config_path_not_empty() {
        let path = config_path().unwrap();
        assert!(path.to_string_lossy().contains("chunkdrop"));
    }
}
