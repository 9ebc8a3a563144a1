//! Error types and handling for magick-convert

use std::path::PathBuf;
use thiserror::Error;

use crate::processing::{ConvertCommand, RunStatus};

/// Result type alias for magick-convert operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Main error type for magick-convert operations
#[derive(Debug, Error)]
pub enum ConvertError {
    /// No converter executable configured
    #[error("No converter path configured")]
    MissingConverter,

    /// No source image configured
    #[error("No source image configured")]
    MissingSource,

    /// Source path does not name a regular file
    #[error("Source image not found: {path:?}")]
    SourceNotFound { path: PathBuf },

    /// Source could not be read as an image
    #[error("Cannot read image dimensions from {path:?}: {message}")]
    UnreadableSource { path: PathBuf, message: String },

    /// Width, height, quality, crop or ratio out of range
    #[error("Invalid conversion parameters: {message}")]
    InvalidParameters { message: String },

    /// The converter ran but no destination file exists afterwards
    #[error("Converter produced no output at {path:?} ({})", status_text(.status))]
    OutputMissing {
        path: PathBuf,
        command: ConvertCommand,
        /// `None` when the converter could not be started
        status: Option<RunStatus>,
    },

    /// The converter could not be started or queried
    #[error("Converter error: {message}")]
    ConverterError { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Named profile does not exist
    #[error("Profile '{name}' not found")]
    UnknownProfile { name: String },

    /// I/O related errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    SerdeError(String),
}

impl ConvertError {
    /// Create a new source-not-found error
    pub fn source_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Self::SourceNotFound { path: path.into() }
    }

    /// Create a new unreadable source error
    pub fn unreadable_source<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::UnreadableSource {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new invalid parameters error
    pub fn invalid_parameters<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameters {
            message: message.into(),
        }
    }

    /// Create a new missing output error
    pub fn output_missing<P: Into<PathBuf>>(
        path: P,
        command: ConvertCommand,
        status: Option<RunStatus>,
    ) -> Self {
        Self::OutputMissing {
            path: path.into(),
            command,
            status,
        }
    }

    /// Create a new converter error
    pub fn converter<S: Into<String>>(message: S) -> Self {
        Self::ConverterError {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new unknown profile error
    pub fn unknown_profile<S: Into<String>>(name: S) -> Self {
        Self::UnknownProfile { name: name.into() }
    }

    /// Check if this error comes from how the request was set up rather
    /// than from running the converter
    pub fn is_misconfiguration(&self) -> bool {
        match self {
            Self::MissingConverter
            | Self::MissingSource
            | Self::SourceNotFound { .. }
            | Self::UnreadableSource { .. }
            | Self::InvalidParameters { .. }
            | Self::ConfigError { .. }
            | Self::UnknownProfile { .. }
            | Self::SerdeError(_) => true,

            Self::OutputMissing { .. } | Self::ConverterError { .. } | Self::IoError(_) => false,
        }
    }

    /// Get the associated file path if available
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::SourceNotFound { path }
            | Self::UnreadableSource { path, .. }
            | Self::OutputMissing { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingConverter => {
                "No converter configured. Pass --converter or set converter.path in the config file."
                    .to_string()
            }
            Self::SourceNotFound { path } => {
                format!("Source image does not exist or is not a file: {}", path.display())
            }
            Self::UnreadableSource { path, .. } => {
                format!(
                    "Could not read {} as an image. Ratio crops need a readable source image.",
                    path.display()
                )
            }
            Self::OutputMissing { path, status, .. } => {
                format!(
                    "The converter did not produce {} ({}). Check its output above for details.",
                    path.display(),
                    status_text(status)
                )
            }
            Self::UnknownProfile { name } => {
                format!("Unknown profile '{}'. Run 'magick-convert profiles' to list them.", name)
            }
            other => other.to_string(),
        }
    }
}

fn status_text(status: &Option<RunStatus>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "converter did not start".to_string(),
    }
}

// Convert serde errors to our error type
impl From<toml::de::Error> for ConvertError {
    fn from(err: toml::de::Error) -> Self {
        Self::SerdeError(format!("TOML parsing error: {}", err))
    }
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::SerdeError(format!("YAML parsing error: {}", err))
    }
}
