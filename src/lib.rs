//! magick-convert - crop, resize and recompress images with ImageMagick
//!
//! A small builder around the external `convert` binary. Parameters are
//! collected on a [`ConversionRequest`], turned into a single converter
//! invocation and run synchronously. Success means the destination file
//! exists afterwards. No pixel data is decoded locally; the only local image
//! access is reading the source dimensions for ratio crops.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use magick_convert::{ConversionRequest, Gravity};
//!
//! let request = ConversionRequest::with_source("convert", "photo.jpg")
//!     .crop_by_ratio(16.0 / 9.0, Gravity::Center)?
//!     .width(1600)
//!     .quality(85);
//!
//! // convert photo.jpg -gravity Center -extent 4000x2250 -resize 1600 \
//! //   -background white -flatten -auto-orient -quality 85 banner.jpg
//! if request.convert("banner.jpg") {
//!     println!("done");
//! }
//! # Ok::<(), magick_convert::ConvertError>(())
//! ```
//!
//! Arguments are passed to the converter as a vector, never through a
//! shell, so paths containing spaces or metacharacters are safe.

pub mod config;
pub mod error;
pub mod processing;

// Re-export commonly used types
pub use config::{Config, ConversionProfile, Profiles};
pub use error::{ConvertError, Result};
pub use processing::{
    CommandRunner, Conversion, ConversionRequest, ConvertCommand, CropSpec, Gravity, ResizeSpec,
    RunStatus, SystemRunner,
};

use tracing::info;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging from `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init() -> Result<()> {
    if tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .finish()
    ).is_ok() {
        info!("magick-convert v{} initialized", VERSION);
    }

    Ok(())
}

/// Initialize logging from a loaded configuration
pub fn init_with_config(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.logging.level)
        .map_err(|e| ConvertError::config(
            format!("Invalid log level '{}': {}", config.logging.level, e)
        ))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = if config.logging.json_format {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        tracing::subscriber::set_global_default(builder.finish()).is_ok()
    };

    if installed {
        info!("magick-convert v{} initialized with custom config", VERSION);
    }

    Ok(())
}
