use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;

use crate::component::logs::{MIN_SHORTEN_LEN, SHORT_PREFIX_LEN};
use crate::errors::ConfigError;
use crate::infrastructure::logging::{LogConfig, LogFormat, LogOutput};

pub const CONFIG_FILE: &str = "plugwire.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub partitions: PartitionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// "stderr", "stdout" or "file"
    #[serde(default = "default_output")]
    pub output: String,

    /// Directory for rolling log files when `output = "file"`
    #[serde(default)]
    pub directory: Option<PathBuf>,

    #[serde(default)]
    pub filter: Option<String>,

    #[serde(default)]
    pub span_events: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    #[serde(default = "default_prefix_length")]
    pub prefix_length: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            output: default_output(),
            directory: None,
            filter: None,
            span_events: false,
        }
    }
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            min_length: MIN_SHORTEN_LEN,
            prefix_length: SHORT_PREFIX_LEN,
        }
    }
}

fn default_level() -> String { "info".to_string() }
fn default_output() -> String { "stderr".to_string() }
fn default_min_length() -> usize { MIN_SHORTEN_LEN }
fn default_prefix_length() -> usize { SHORT_PREFIX_LEN }

impl LoggingConfig {
    /// Translate into the settings used to install the subscriber.
    pub fn to_log_config(&self) -> Result<LogConfig, ConfigError> {
        let level = Level::from_str(&self.level)
            .map_err(|_| ConfigError::InvalidLevel(self.level.clone()))?;

        let output = match self.output.as_str() {
            "stdout" => LogOutput::Stdout,
            "file" => LogOutput::File {
                directory: self
                    .directory
                    .as_ref()
                    .map(|d| d.to_string_lossy().to_string())
                    .unwrap_or_else(|| ".".to_string()),
                prefix: "plugwire".to_string(),
            },
            _ => LogOutput::Stderr,
        };

        let mut config = LogConfig::new()
            .with_level(level)
            .with_format(self.format)
            .with_output(output)
            .with_span_events(self.span_events);
        if let Some(filter) = &self.filter {
            config = config.with_filter(filter.clone());
        }
        Ok(config)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Find and load `plugwire.toml` from the current directory or its parents
    pub fn discover() -> Self {
        let mut current = std::env::current_dir().ok();

        while let Some(dir) = current {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                match Self::load(&config_path) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Ignoring {}: {}", config_path.display(), e),
                }
            }

            current = dir.parent().map(|p| p.to_path_buf());
        }

        Self::default()
    }

    /// Generate default configuration file content
    pub fn generate_default() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate config"))
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;

        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.partitions.min_length, 10);
        assert_eq!(config.partitions.prefix_length, 7);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[logging]
level = "debug"
format = "json"

[partitions]
prefix_length = 9
"#;

        let config = Config::parse(toml).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.partitions.prefix_length, 9);
        assert_eq!(config.partitions.min_length, 10);

        let log = config.logging.to_log_config().unwrap();
        assert_eq!(log.level, Level::DEBUG);
        assert_eq!(log.output, LogOutput::Stderr);
    }

    #[test]
    fn test_invalid_level() {
        let config = Config::parse("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(matches!(
            config.logging.to_log_config(),
            Err(ConfigError::InvalidLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.partitions.prefix_length = 8;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_generate_default_round_trips() {
        let text = Config::generate_default();
        assert_eq!(Config::parse(&text).unwrap(), Config::default());
    }
}
