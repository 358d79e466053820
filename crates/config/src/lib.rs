//! Configuration loading and validation for Rivet.
//!
//! Loads `rivet.toml` from the working directory when present, then applies
//! environment variable overrides. Validates all settings at startup so a
//! bad model string fails fast instead of mid-conversation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `rivet.toml`. Everything has a default: a missing config
/// file is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model selector in `provider/model-name` form. Picks the provider
    /// adapter variant; validated when the provider is bound.
    #[serde(default = "default_model")]
    pub model: String,

    /// Session identifier grouping transcript log records. Generated when
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Filesystem root all tool paths resolve against. Defaults to the
    /// working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    /// Directory holding per-session transcript logs.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Max tokens per model response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_model() -> String {
    "anthropic/claude-sonnet-4-20250514".into()
}
fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}
fn default_max_tokens() -> u32 {
    8192
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            session_id: None,
            base_dir: None,
            log_dir: default_log_dir(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `rivet.toml` in the working directory with
    /// environment overrides applied:
    /// - `RIVET_MODEL` or `MODEL`
    /// - `RIVET_SESSION_ID` or `SESSION_ID`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(Path::new("rivet.toml"))?;

        if let Some(model) = env_any(&["RIVET_MODEL", "MODEL"]) {
            config.model = model;
        }
        if config.session_id.is_none() {
            config.session_id = env_any(&["RIVET_SESSION_ID", "SESSION_ID"]);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.model.contains('/') {
            return Err(ConfigError::ValidationError(format!(
                "model must be in 'provider/model-name' form, got '{}'",
                self.model
            )));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// The directory tool paths resolve against.
    pub fn base_dir(&self) -> PathBuf {
        self.base_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|n| std::env::var(n).ok())
        .filter(|v| !v.is_empty())
}

/// Configuration errors. All fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "anthropic/claude-sonnet-4-20250514");
        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.max_tokens, 8192);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/rivet.toml")).unwrap();
        assert_eq!(config.model, default_model());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.max_tokens, config.max_tokens);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rivet.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "model = \"openai/gpt-4o\"\nmax_tokens = 1024").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.max_tokens, 1024);
        // Unset fields keep defaults
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn model_without_separator_rejected() {
        let config = AppConfig {
            model: "gpt-4o".into(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("provider/model-name"));
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let config = AppConfig {
            max_tokens: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_toml_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rivet.toml");
        std::fs::write(&path, "model = [not toml").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
