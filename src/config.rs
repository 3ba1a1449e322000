//! Configuration file handling.
//!
//! Settings live in `config.toml` under the user's config directory
//! (`~/.config/motioncalc/config.toml` on Linux). Every field is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::calculator::AngleUnit;
use crate::session::DEFAULT_HISTORY_LIMIT;

const APP_DIR: &str = "motioncalc";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub calculator: CalculatorConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Unit for trigonometric arguments.
    pub angle_unit: AngleUnit,
    /// Number of past calculations to keep.
    pub history_limit: usize,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            angle_unit: AngleUnit::Degrees,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Backend name understood by the `llm` crate (`openai`, `anthropic`,
    /// `ollama`, `google`, ...).
    pub backend: String,
    /// Model name. The backend's default is used when unset.
    pub model: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Override for the backend endpoint.
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Longest user text, in characters, passed into a prompt.
    pub max_input_chars: usize,
    /// Upper bound for one assistant request.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: "openai".to_string(),
            model: None,
            api_key_env: "MOTIONCALC_API_KEY".to_string(),
            base_url: None,
            max_tokens: 1024,
            temperature: 0.2,
            max_input_chars: 500,
            timeout_secs: 30,
        }
    }
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// The API key from the configured environment variable, if set.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Default location of the config file.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used and a missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            r#"
            [calculator]
            angle_unit = "radians"

            [ai]
            backend = "ollama"
            model = "llama3.2"
            timeout_secs = 5
            max_input_chars = 200
            "#,
        )
        .unwrap();

        assert_eq!(config.calculator.angle_unit, AngleUnit::Radians);
        assert_eq!(config.calculator.history_limit, DEFAULT_HISTORY_LIMIT);
        assert_eq!(config.ai.backend, "ollama");
        assert_eq!(config.ai.model.as_deref(), Some("llama3.2"));
        assert_eq!(config.ai.timeout(), Duration::from_secs(5));
        assert_eq!(config.ai.api_key_env, "MOTIONCALC_API_KEY");
        assert_eq!(config.ai.max_input_chars, 200);
    }

    #[test]
    fn test_invalid_angle_unit() {
        assert!(Config::parse("[calculator]\nangle_unit = \"gradians\"").is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/motioncalc.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
