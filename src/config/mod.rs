//! Configuration management for magick-convert

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::error::{Result, ConvertError};
use crate::processing::{ConversionRequest, DEFAULT_CONVERTER, DEFAULT_QUALITY};

pub mod profiles;
pub use profiles::*;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// External converter settings
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Values applied to every request
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Named conversion profiles
    #[serde(default)]
    pub profiles: HashMap<String, ConversionProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            converter: ConverterConfig::default(),
            defaults: DefaultsConfig::default(),
            logging: LoggingConfig::default(),
            profiles: Profiles::all(),
        }
    }
}

/// External converter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path or command name of the converter binary
    #[serde(default = "default_converter_path")]
    pub path: PathBuf,
}

fn default_converter_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONVERTER)
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            path: default_converter_path(),
        }
    }
}

/// Request defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Output quality when a request does not set one (1-100)
    #[serde(default = "default_quality")]
    pub quality: u32,
}

fn default_quality() -> u32 {
    DEFAULT_QUALITY
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            quality: default_quality(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter: a level (trace, debug, info, warn, error) or
    /// `RUST_LOG`-style directives
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_format: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConvertError::config(
                format!("Failed to read config file {:?}: {}", path.as_ref(), e)
            ))?;

        let extension = path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(Into::into),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(Into::into),
            _ => Err(ConvertError::config(
                "Unsupported config file format. Use .toml or .yaml"
            )),
        }
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let extension = path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let content = match extension.to_lowercase().as_str() {
            "toml" => toml::to_string_pretty(self)
                .map_err(|e| ConvertError::config(format!("TOML serialization failed: {}", e)))?,
            "yaml" | "yml" => serde_yaml::to_string(self)
                .map_err(|e| ConvertError::config(format!("YAML serialization failed: {}", e)))?,
            _ => return Err(ConvertError::config(
                "Unsupported config file format. Use .toml or .yaml"
            )),
        };

        std::fs::write(&path, content)
            .map_err(|e| ConvertError::config(
                format!("Failed to write config file {:?}: {}", path.as_ref(), e)
            ))?;

        Ok(())
    }

    /// Get a conversion profile by name
    pub fn get_profile(&self, name: &str) -> Result<&ConversionProfile> {
        self.profiles.get(name)
            .ok_or_else(|| ConvertError::unknown_profile(name))
    }

    /// Profile names in sorted order
    pub fn profile_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// A request primed with the configured converter and default quality
    pub fn request(&self) -> ConversionRequest {
        ConversionRequest::new(&self.converter.path).quality(self.defaults.quality)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.converter.path.as_os_str().is_empty() {
            return Err(ConvertError::config("Converter path must not be empty"));
        }

        if self.defaults.quality == 0 || self.defaults.quality > 100 {
            return Err(ConvertError::config(
                format!("Default quality must be between 1-100, got {}", self.defaults.quality)
            ));
        }

        tracing_subscriber::EnvFilter::try_new(&self.logging.level)
            .map_err(|e| ConvertError::config(
                format!("Invalid log level '{}': {}", self.logging.level, e)
            ))?;

        // Validate profiles
        for (name, profile) in &self.profiles {
            profile.validate()
                .map_err(|e| ConvertError::config(
                    format!("Invalid profile '{}': {}", name, e)
                ))?;
        }

        Ok(())
    }

    /// Merge with another configuration (other takes precedence)
    pub fn merge(mut self, other: Config) -> Self {
        // Merge profiles (other wins on conflicts)
        self.profiles.extend(other.profiles);

        if other.converter.path != default_converter_path() {
            self.converter.path = other.converter.path;
        }
        if other.defaults.quality != DEFAULT_QUALITY {
            self.defaults.quality = other.defaults.quality;
        }
        self.logging = other.logging;

        self
    }
}
