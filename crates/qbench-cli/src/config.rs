//! Configuration for the qbench CLI.
//!
//! Supports loading configuration from:
//! 1. A YAML file (`--config`)
//! 2. Environment variables (with `QBENCH_` prefix)
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use qbench_adapter_sim::ReadoutError;

/// Complete CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Result cache location
    #[serde(default)]
    pub cache: CacheConfig,

    /// Execution session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Tomography settings
    #[serde(default)]
    pub tomography: TomographyConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Result cache settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache root; `~/.qbench/cache` when unset
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Simulator session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Shots per circuit
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Sampling seed
    #[serde(default)]
    pub seed: Option<u64>,

    /// Readout noise applied by the simulator
    #[serde(default)]
    pub readout_error: Option<ReadoutError>,
}

/// Tomography settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomographyConfig {
    /// Project reconstructed densities onto physical states
    #[serde(default)]
    pub maximum_likelihood: bool,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when no `-v` flag is given
    #[serde(default)]
    pub level: Option<String>,
}

fn default_shots() -> u32 {
    1024
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            shots: default_shots(),
            seed: None,
            readout_error: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::IoError(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.merge_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply `QBENCH_*` overrides read through `lookup`.
    ///
    /// Unset or unparsable variables leave the field unchanged.
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("QBENCH_CACHE_DIR") {
            self.cache.dir = Some(PathBuf::from(v));
        }
        if let Some(val) = lookup("QBENCH_SHOTS").and_then(|v| v.parse().ok()) {
            self.session.shots = val;
        }
        if let Some(val) = lookup("QBENCH_SEED").and_then(|v| v.parse().ok()) {
            self.session.seed = Some(val);
        }
        if let Some(val) = lookup("QBENCH_MAXIMUM_LIKELIHOOD").and_then(|v| v.parse().ok()) {
            self.tomography.maximum_likelihood = val;
        }
        if let Some(v) = lookup("QBENCH_LOG_LEVEL") {
            self.logging.level = Some(v);
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.shots == 0 {
            return Err(ConfigError::ValidationError(
                "session.shots must be greater than 0".to_string(),
            ));
        }

        if let Some(readout) = &self.session.readout_error {
            readout
                .validate()
                .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        }

        if let Some(level) = &self.logging.level {
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {}
                other => {
                    return Err(ConfigError::ValidationError(format!(
                        "Invalid log level: {other}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Cache root, falling back to `~/.qbench/cache`.
    pub fn cache_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.cache.dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(".qbench").join("cache"))
                .ok_or_else(|| {
                    ConfigError::ValidationError("Could not determine home directory".to_string())
                }),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.session.shots, 1024);
        assert!(!config.tomography.maximum_likelihood);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_yaml_with_readout_error() {
        let config = Config::from_yaml(
            r"
cache:
  dir: /tmp/qbench
session:
  shots: 4096
  seed: 7
  readout_error:
    kind: uniform
    p01: 0.02
    p10: 0.05
tomography:
  maximum_likelihood: true
",
        )
        .unwrap();
        assert_eq!(config.cache.dir, Some(PathBuf::from("/tmp/qbench")));
        assert_eq!(config.session.shots, 4096);
        assert_eq!(config.session.seed, Some(7));
        assert_eq!(
            config.session.readout_error,
            Some(ReadoutError::Uniform {
                p01: 0.02,
                p10: 0.05
            })
        );
        assert!(config.tomography.maximum_likelihood);
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("QBENCH_SHOTS", "99"),
            ("QBENCH_LOG_LEVEL", "debug"),
            ("QBENCH_SEED", "not-a-number"),
        ]);
        let mut config = Config::default();
        config.session.seed = Some(1);
        let config = config.merge_env(|key| env.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.session.shots, 99);
        assert_eq!(config.session.seed, Some(1));
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.session.shots = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.session.readout_error = Some(ReadoutError::Uniform { p01: 1.5, p10: 0.0 });
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = Some("loud".to_string());
        assert!(config.validate().is_err());
    }
}
