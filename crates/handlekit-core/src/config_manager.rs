use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Upper bound on map shards; beyond this the per-shard padding dominates memory.
pub const MAX_MAP_SHARDS: usize = 4096;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for HandleKit
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HandleKitConfig {
    /// Concurrent map settings
    #[serde(default)]
    pub map: MapConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MapConfig {
    /// Number of independently locked shards per map (power of two).
    /// Unset means "derive from the CPU count".
    #[serde(default)]
    pub shard_count: Option<usize>,
}

impl MapConfig {
    pub fn effective_shard_count(&self) -> usize {
        self.shard_count
            .unwrap_or_else(|| (num_cpus::get() * 4).next_power_of_two())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error", or any EnvFilter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

/// Configuration manager with layered sources
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: HandleKitConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Process environment
    /// 2. Variables from a .handlekit.env file
    /// 3. Config file (.handlekit.toml)
    /// 4. Defaults
    ///
    /// The process environment is only read, never written: this code runs inside
    /// host processes whose other threads may be calling `getenv`.
    pub fn load() -> Result<Self, ConfigError> {
        debug!("Loading HandleKit configuration");

        let file_vars = Self::load_env_file();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config, &file_vars);
        Self::validate_config(&config)?;

        match config_path {
            Some(ref path) => info!("HandleKit config file: {}", path.display()),
            None => debug!("No HandleKit config file, using defaults"),
        }
        debug!(
            shard_count = config.map.effective_shard_count(),
            log_level = %config.logging.level,
            "HandleKit configuration loaded"
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Build a manager around an already assembled configuration.
    pub fn from_config(config: HandleKitConfig) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    /// Variables from ./.handlekit.env, else ~/.handlekit.env. Empty if neither exists
    /// or the file cannot be parsed.
    fn load_env_file() -> HashMap<String, String> {
        let path = Some(PathBuf::from(".handlekit.env"))
            .filter(|p| p.exists())
            .or_else(|| {
                dirs::home_dir()
                    .map(|home| home.join(".handlekit.env"))
                    .filter(|p| p.exists())
            });

        match path {
            Some(path) => Self::read_env_file(&path).unwrap_or_else(|e| {
                warn!("Failed to load {}: {}", path.display(), e);
                HashMap::new()
            }),
            None => HashMap::new(),
        }
    }

    /// Parse a dotenv-style file into a map without exporting anything.
    pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
        dotenv::from_path_iter(path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?
            .map(|item| item.map_err(|e| ConfigError::ParseError(e.to_string())))
            .collect()
    }

    /// Search order:
    /// 1. ./.handlekit.toml
    /// 2. ~/.handlekit/config.toml
    /// 3. defaults
    fn load_config_file() -> Result<(HandleKitConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".handlekit.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".handlekit").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((HandleKitConfig::default(), None))
    }

    pub fn read_toml_file(path: &Path) -> Result<HandleKitConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn apply_env_overrides(
        config: HandleKitConfig,
        file_vars: &HashMap<String, String>,
    ) -> HandleKitConfig {
        Self::apply_overrides_from(config, |key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides_from<F>(mut config: HandleKitConfig, lookup: F) -> HandleKitConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(shards) = lookup("HANDLEKIT_MAP_SHARDS") {
            match shards.trim().parse() {
                Ok(n) => config.map.shard_count = Some(n),
                Err(_) => warn!("Ignoring non-numeric HANDLEKIT_MAP_SHARDS={}", shards),
            }
        }

        if let Some(level) = lookup("HANDLEKIT_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.logging.level = level;
        }
        if let Some(format) = lookup("HANDLEKIT_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    pub fn validate_config(config: &HandleKitConfig) -> Result<(), ConfigError> {
        if let Some(shards) = config.map.shard_count {
            if shards == 0 || !shards.is_power_of_two() || shards > MAX_MAP_SHARDS {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid map shard count: {}. Must be a power of two between 1 and {}",
                    shards, MAX_MAP_SHARDS
                )));
            }
        }

        if let Err(e) = EnvFilter::try_new(&config.logging.level) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid log level: {}. Must be a level (trace, debug, info, warn, error, off) or a filter directive: {}",
                config.logging.level, e
            )));
        }

        match config.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, compact, json",
                    other
                )))
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &HandleKitConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Write the default configuration to `path`
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = HandleKitConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = HandleKitConfig::default();
        assert_eq!(config.map.shard_count, None);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, "compact");
        assert!(config.map.effective_shard_count().is_power_of_two());
        assert!(ConfigManager::validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = HandleKitConfig::default();
        config.map.shard_count = Some(12);
        assert!(ConfigManager::validate_config(&config).is_err());

        config.map.shard_count = Some(0);
        assert!(ConfigManager::validate_config(&config).is_err());

        config.map.shard_count = Some(64);
        assert!(ConfigManager::validate_config(&config).is_ok());

        config.logging.level = "[[[".to_string();
        assert!(ConfigManager::validate_config(&config).is_err());

        for accepted in ["DEBUG", "hyper", "off"] {
            config.logging.level = accepted.to_string();
            assert!(ConfigManager::validate_config(&config).is_ok(), "{accepted}");
        }

        config.logging.level = "handlekit_registry=debug,warn".to_string();
        assert!(ConfigManager::validate_config(&config).is_ok());

        config.logging.format = "xml".to_string();
        assert!(ConfigManager::validate_config(&config).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HANDLEKIT_MAP_SHARDS", "32"),
            ("RUST_LOG", "debug"),
            ("HANDLEKIT_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let config = ConfigManager::apply_overrides_from(HandleKitConfig::default(), |k| {
            vars.get(k).map(|v| v.to_string())
        });
        assert_eq!(config.map.shard_count, Some(32));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_host_rust_log_keeps_shard_override() {
        let vars: HashMap<&str, &str> = [("RUST_LOG", "DEBUG"), ("HANDLEKIT_MAP_SHARDS", "8")]
            .into_iter()
            .collect();

        let config = ConfigManager::apply_overrides_from(HandleKitConfig::default(), |k| {
            vars.get(k).map(|v| v.to_string())
        });
        let manager = ConfigManager::from_config(config).unwrap();
        assert_eq!(manager.config().map.shard_count, Some(8));
        assert_eq!(manager.config().map.effective_shard_count(), 8);
        assert_eq!(manager.config().logging.level, "DEBUG");
    }

    #[test]
    fn test_env_file_is_read_without_exporting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".handlekit.env");
        std::fs::write(
            &path,
            "HANDLEKIT_MAP_SHARDS=16\nHANDLEKIT_ENV_FILE_MARKER_7731=present\n",
        )
        .unwrap();

        let file_vars = ConfigManager::read_env_file(&path).unwrap();
        assert_eq!(
            file_vars.get("HANDLEKIT_ENV_FILE_MARKER_7731").map(String::as_str),
            Some("present")
        );
        assert!(std::env::var("HANDLEKIT_ENV_FILE_MARKER_7731").is_err());

        let config = ConfigManager::apply_overrides_from(HandleKitConfig::default(), |k| {
            file_vars.get(k).cloned()
        });
        assert_eq!(config.map.shard_count, Some(16));
        assert!(std::env::var("HANDLEKIT_ENV_FILE_MARKER_7731").is_err());
    }

    #[test]
    fn test_missing_env_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ConfigManager::read_env_file(&dir.path().join("absent.env")),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn test_handlekit_log_level_wins_over_rust_log() {
        let vars: HashMap<&str, &str> = [("HANDLEKIT_LOG_LEVEL", "error"), ("RUST_LOG", "trace")]
            .into_iter()
            .collect();

        let config = ConfigManager::apply_overrides_from(HandleKitConfig::default(), |k| {
            vars.get(k).map(|v| v.to_string())
        });
        assert_eq!(config.logging.level, "error");
    }

    #[test]
    fn test_bad_shard_override_is_ignored() {
        let config = ConfigManager::apply_overrides_from(HandleKitConfig::default(), |k| {
            (k == "HANDLEKIT_MAP_SHARDS").then(|| "lots".to_string())
        });
        assert_eq!(config.map.shard_count, None);
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        ConfigManager::create_default_config(&path).unwrap();

        let loaded = ConfigManager::read_toml_file(&path).unwrap();
        assert_eq!(loaded, HandleKitConfig::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[map]\nshard_count = 8\n").unwrap();

        let loaded = ConfigManager::read_toml_file(&path).unwrap();
        assert_eq!(loaded.map.shard_count, Some(8));
        assert_eq!(loaded.map.effective_shard_count(), 8);
        assert_eq!(loaded.logging, LoggingConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[map\nshard_count = ").unwrap();

        assert!(matches!(
            ConfigManager::read_toml_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_from_config_validates() {
        let mut config = HandleKitConfig::default();
        config.map.shard_count = Some(3);
        assert!(ConfigManager::from_config(config).is_err());

        let manager = ConfigManager::from_config(HandleKitConfig::default()).unwrap();
        assert!(manager.config_path().is_none());
    }
}
