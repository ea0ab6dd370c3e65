use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use mado_engine::config::EngineConfig;
use mado_extension::CloudflareConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub cloudflare: CloudflareConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: get_default_data_dir()
                .join("downloads")
                .to_string_lossy()
                .to_string(),
        }
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        get_default_config_dir().join("config.json")
    }

    /// Loads the config, writing the defaults first when the file is missing.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default_config = Self::default();
            default_config.save(path).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path).await.map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content).await.map_err(io_error)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["engine", "user_agent"] => self.engine.user_agent = value.to_string(),
            ["engine", "browser_ws_url"] => {
                self.engine.browser_ws_url = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["engine", "headless"] => self.engine.headless = parse(key, value)?,
            ["engine", "timeout_secs"] => self.engine.timeout_secs = parse(key, value)?,
            ["cloudflare", "max_attempts"] => {
                let max_attempts: u32 = parse(key, value)?;
                if max_attempts == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.cloudflare.max_attempts = max_attempts;
            }
            ["output", "dir"] => self.output.dir = value.to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        let value = match parts.as_slice() {
            ["engine", "user_agent"] => self.engine.user_agent.clone(),
            ["engine", "browser_ws_url"] => self.engine.browser_ws_url.clone().unwrap_or_default(),
            ["engine", "headless"] => self.engine.headless.to_string(),
            ["engine", "timeout_secs"] => self.engine.timeout_secs.to_string(),
            ["cloudflare", "max_attempts"] => self.cloudflare.max_attempts.to_string(),
            ["output", "dir"] => self.output.dir.clone(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };

        Ok(value)
    }

    pub fn show_all(&self) -> String {
        format!(
            "Configuration:\n\
             Engine:\n\
             ├─ user_agent: {}\n\
             ├─ browser_ws_url: {}\n\
             ├─ headless: {}\n\
             └─ timeout_secs: {}\n\
             Cloudflare:\n\
             └─ max_attempts: {}\n\
             Output:\n\
             └─ dir: {}",
            self.engine.user_agent,
            self.engine.browser_ws_url.as_deref().unwrap_or("(not set)"),
            self.engine.headless,
            self.engine.timeout_secs,
            self.cloudflare.max_attempts,
            self.output.dir,
        )
    }

    pub async fn reset(path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save(path).await?;
        Ok(config)
    }
}

fn get_default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "mado", "mado") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        PathBuf::from(".mado").join("config")
    }
}

fn get_default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "mado", "mado") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from(".mado").join("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config::load(&path).await.unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.set_value("cloudflare.max_attempts", "4").unwrap();
        config.set_value("engine.browser_ws_url", "ws://127.0.0.1:9222").unwrap();
        config.save(&path).await.unwrap();

        let loaded = Config::load(&path).await.unwrap();
        assert_eq!(loaded.cloudflare.max_attempts, 4);
        assert_eq!(
            loaded.engine.browser_ws_url.as_deref(),
            Some("ws://127.0.0.1:9222")
        );
    }

    #[tokio::test]
    async fn test_missing_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "cloudflare": { "max_attempts": 2 } }"#).unwrap();

        let config = Config::load(&path).await.unwrap();

        assert_eq!(config.cloudflare.max_attempts, 2);
        assert_eq!(config.engine, EngineConfig::default());
        assert!(config.engine.headless);
    }

    #[tokio::test]
    async fn test_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let error = Config::load(&path).await.unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_set_and_get_value() {
        let mut config = Config::default();

        config.set_value("engine.headless", "false").unwrap();
        assert_eq!(config.get_value("engine.headless").unwrap(), "false");

        config.set_value("engine.browser_ws_url", "").unwrap();
        assert_eq!(config.engine.browser_ws_url, None);

        assert!(matches!(
            config.set_value("engine.timeout_secs", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("cloudflare.max_attempts", "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.get_value("storage.path"),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
