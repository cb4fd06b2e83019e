//! Global Freeagle configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{FreeagleError, FreeagleResult};

static DEFAULT_API_URL: &str = "https://afp-server-g7j1.onrender.com";
static DEFAULT_DATA_DIR: &str = "~/.local/share/freeagle";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// When a newly shared event is written locally relative to publishing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareOrder {
    /// Record locally, then publish in the background. Fast, but a failed
    /// publish leaves a local record the server doesn't know about.
    #[default]
    LocalFirst,
    /// Publish, and record locally only once the server accepted it.
    RemoteFirst,
}

/// Configuration at ~/.config/freeagle/config.toml
///
/// Every key can be overridden with a `FREEAGLE_` environment variable,
/// e.g. `FREEAGLE_API_URL`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FreeagleConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub share_order: ShareOrder,
}

impl Default for FreeagleConfig {
    fn default() -> Self {
        FreeagleConfig {
            api_url: default_api_url(),
            data_dir: default_data_dir(),
            request_timeout_secs: default_request_timeout_secs(),
            share_order: ShareOrder::default(),
        }
    }
}

impl FreeagleConfig {
    pub fn config_path() -> FreeagleResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FreeagleError::Config("Could not determine config directory".into()))?
            .join("freeagle");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, writing a commented default file on first run.
    pub fn load() -> FreeagleResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> FreeagleResult<Self> {
        let config: FreeagleConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("FREEAGLE").try_parsing(true))
            .build()
            .map_err(|e| FreeagleError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| FreeagleError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> FreeagleResult<()> {
        if self.request_timeout_secs == 0 {
            return Err(FreeagleError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn save(&self) -> FreeagleResult<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> FreeagleResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| FreeagleError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FreeagleError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, content)
            .map_err(|e| FreeagleError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> FreeagleResult<()> {
        let contents = format!(
            "\
# freeagle configuration

# Event server:
# api_url = \"{}\"

# Where joined events, favorites and your nickname are stored:
# data_dir = \"{}\"

# Seconds before a server request is abandoned:
# request_timeout_secs = {}

# Record shared events locally before (\"local_first\") or after
# (\"remote_first\") the server has accepted them:
# share_order = \"local_first\"
",
            DEFAULT_API_URL, DEFAULT_DATA_DIR, DEFAULT_REQUEST_TIMEOUT_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                FreeagleError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| FreeagleError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("freeagle/config.toml");

        FreeagleConfig::create_default_config(&path).unwrap();
        let config = FreeagleConfig::load_from(&path).unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.share_order, ShareOrder::LocalFirst);
    }

    #[test]
    fn test_saved_config_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = FreeagleConfig {
            api_url: "http://localhost:3000".to_string(),
            data_dir: PathBuf::from("/tmp/freeagle"),
            request_timeout_secs: 3,
            share_order: ShareOrder::RemoteFirst,
        };
        config.save_to(&path).unwrap();

        let loaded = FreeagleConfig::load_from(&path).unwrap();
        assert_eq!(loaded.api_url, "http://localhost:3000");
        assert_eq!(loaded.data_path(), PathBuf::from("/tmp/freeagle"));
        assert_eq!(loaded.request_timeout_secs, 3);
        assert_eq!(loaded.share_order, ShareOrder::RemoteFirst);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout_secs = 0\n").unwrap();

        let err = FreeagleConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, FreeagleError::Config(msg) if msg.contains("request_timeout_secs")));
    }
}
