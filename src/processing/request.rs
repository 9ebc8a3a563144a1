//! The conversion request builder

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{ConvertError, Result};
use super::command::ConvertCommand;
use super::geometry::{self, CropSpec, Gravity, ResizeSpec, MAX_DIMENSION};
use super::probe::source_dimensions;
use super::runner::{CommandRunner, RunStatus, SystemRunner};

/// Converter invoked when none is given explicitly
pub const DEFAULT_CONVERTER: &str = "convert";

/// Output quality used until one is set
pub const DEFAULT_QUALITY: u32 = 90;

/// Flags emitted on every command: composite onto white and honour EXIF
/// orientation.
const FLATTEN_ARGS: [&str; 4] = ["-background", "white", "-flatten", "-auto-orient"];

/// Parameters for converting one image with the external converter.
///
/// Setters consume and return the request so they can be chained, and each
/// one replaces whatever was set before for its field. Nothing is checked
/// until [`command`](Self::command) or one of the convert methods runs.
///
/// ```rust,no_run
/// use magick_convert::{ConversionRequest, Gravity};
///
/// let converted = ConversionRequest::new("convert")
///     .file_path("photo.jpg")
///     .crop_by_ratio(16.0 / 9.0, Gravity::Center)?
///     .width(1600)
///     .quality(85)
///     .convert("photo-wide.jpg");
/// # Ok::<(), magick_convert::ConvertError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    converter: Option<PathBuf>,
    source: Option<PathBuf>,
    crop: CropSpec,
    width: Option<u32>,
    height: Option<u32>,
    quality: u32,
}

/// A conversion whose destination file exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub destination: PathBuf,
    pub command: ConvertCommand,
    /// `None` when the converter could not be started
    pub status: Option<RunStatus>,
}

impl ConversionRequest {
    /// Create a request for the given converter executable
    pub fn new<P: Into<PathBuf>>(converter: P) -> Self {
        Self {
            converter: Some(converter.into()),
            ..Self::unconfigured()
        }
    }

    /// Create a request for a converter and a source image
    pub fn with_source<P: Into<PathBuf>, S: Into<PathBuf>>(converter: P, source: S) -> Self {
        Self::new(converter).file_path(source)
    }

    /// Create a request with no converter configured yet
    pub fn unconfigured() -> Self {
        Self {
            converter: None,
            source: None,
            crop: CropSpec::None,
            width: None,
            height: None,
            quality: DEFAULT_QUALITY,
        }
    }

    /// Set the converter executable path or command name
    pub fn converter_path<P: Into<PathBuf>>(mut self, converter: P) -> Self {
        self.converter = Some(converter.into());
        self
    }

    /// Forget the converter path
    pub fn clear_converter_path(mut self) -> Self {
        self.converter = None;
        self
    }

    /// Set the source image path
    pub fn file_path<P: Into<PathBuf>>(mut self, source: P) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the target width in pixels
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn clear_width(mut self) -> Self {
        self.width = None;
        self
    }

    /// Set the target height in pixels
    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn clear_height(mut self) -> Self {
        self.height = None;
        self
    }

    /// Set the output quality (1-100)
    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    /// Crop to the largest box of `ratio` (width / height) that fits the
    /// source, anchored at `gravity`.
    ///
    /// The source must already be set and readable as an image, since its
    /// dimensions are read here rather than at conversion time.
    pub fn crop_by_ratio(mut self, ratio: f64, gravity: Gravity) -> Result<Self> {
        geometry::validate_ratio(ratio)?;

        let source = self.source.as_deref().ok_or(ConvertError::MissingSource)?;
        let (src_w, src_h) = source_dimensions(source)?;
        let (width, height) = geometry::ratio_crop_dimensions((src_w, src_h), ratio);

        debug!(
            "Ratio crop {:.4} on {}x{} -> {}x{} ({})",
            ratio, src_w, src_h, width, height, gravity
        );

        self.crop = CropSpec::Extent {
            width,
            height,
            gravity,
        };
        Ok(self)
    }

    /// Ratio crop anchored at the centre
    pub fn crop_by_ratio_centered(self, ratio: f64) -> Result<Self> {
        self.crop_by_ratio(ratio, Gravity::Center)
    }

    /// Crop a `width x height` box with its origin at `(x, y)`.
    ///
    /// The box is not checked against the source bounds.
    pub fn crop_by_coordinates(mut self, width: u32, height: u32, x: u32, y: u32) -> Self {
        self.crop = CropSpec::Region {
            width,
            height,
            x,
            y,
        };
        self
    }

    /// Set the crop directly
    pub fn crop(mut self, crop: CropSpec) -> Self {
        self.crop = crop;
        self
    }

    pub fn clear_crop(mut self) -> Self {
        self.crop = CropSpec::None;
        self
    }

    pub fn get_converter_path(&self) -> Option<&Path> {
        self.converter.as_deref()
    }

    pub fn get_file_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn get_crop(&self) -> &CropSpec {
        &self.crop
    }

    pub fn get_width(&self) -> Option<u32> {
        self.width
    }

    pub fn get_height(&self) -> Option<u32> {
        self.height
    }

    pub fn get_quality(&self) -> u32 {
        self.quality
    }

    /// Resize form implied by the current width and height
    pub fn resize_spec(&self) -> Option<ResizeSpec> {
        ResizeSpec::from_dimensions(self.width, self.height)
    }

    /// Check numeric parameters against the ranges the converter accepts
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("Width", self.width), ("Height", self.height)] {
            if let Some(value) = value {
                if value == 0 || value > MAX_DIMENSION {
                    return Err(ConvertError::invalid_parameters(format!(
                        "{} must be between 1-{}, got {}",
                        name, MAX_DIMENSION, value
                    )));
                }
            }
        }

        if self.quality == 0 || self.quality > 100 {
            return Err(ConvertError::invalid_parameters(format!(
                "Quality must be between 1-100, got {}",
                self.quality
            )));
        }

        self.crop.validate()
    }

    /// Compose the converter command that writes `dest`.
    ///
    /// Fails if no converter is set, the source is not an existing regular
    /// file, or a parameter is out of range.
    pub fn command<P: AsRef<Path>>(&self, dest: P) -> Result<ConvertCommand> {
        let converter = self.converter.as_ref().ok_or(ConvertError::MissingConverter)?;
        let source = self.source.as_ref().ok_or(ConvertError::MissingSource)?;

        if !source.is_file() {
            return Err(ConvertError::source_not_found(source));
        }

        self.validate()?;
        Ok(self.compose(converter, source, dest.as_ref()))
    }

    /// Argument order: source, crop, resize, flatten/orient, quality, destination
    fn compose(&self, converter: &Path, source: &Path, dest: &Path) -> ConvertCommand {
        let mut command = ConvertCommand::new(converter)
            .arg(source)
            .args(self.crop.args());

        if let Some(resize) = self.resize_spec() {
            command = command.args(resize.args());
        }

        command
            .args(FLATTEN_ARGS)
            .arg("-quality")
            .arg(self.quality.to_string())
            .arg(dest)
    }

    /// Run the converter and report whether `dest` exists afterwards
    pub fn convert<P: AsRef<Path>>(&self, dest: P) -> bool {
        self.convert_with(dest, &SystemRunner)
    }

    /// Like [`convert`](Self::convert) with a caller-supplied runner
    pub fn convert_with<P: AsRef<Path>>(&self, dest: P, runner: &dyn CommandRunner) -> bool {
        match self.try_convert_with(dest, runner) {
            Ok(_) => true,
            Err(e) => {
                debug!("Conversion failed: {}", e);
                false
            }
        }
    }

    /// Run the converter, returning why no output was produced on failure
    pub fn try_convert<P: AsRef<Path>>(&self, dest: P) -> Result<Conversion> {
        self.try_convert_with(dest, &SystemRunner)
    }

    /// Like [`try_convert`](Self::try_convert) with a caller-supplied runner.
    ///
    /// The converter's exit status is logged but does not decide the
    /// outcome: success means a regular file exists at `dest` once the
    /// process has finished. A destination left over from an earlier run
    /// therefore also counts.
    pub fn try_convert_with<P: AsRef<Path>>(
        &self,
        dest: P,
        runner: &dyn CommandRunner,
    ) -> Result<Conversion> {
        let dest = dest.as_ref();
        let command = self.command(dest)?;

        debug!("Converting {:?} -> {:?}", self.source, dest);

        let status = match runner.run(&command) {
            Ok(status) => {
                debug!("Converter finished with {}", status);
                Some(status)
            }
            Err(e) => {
                warn!("Failed to start converter {:?}: {}", command.program(), e);
                None
            }
        };

        if !dest.is_file() {
            return Err(ConvertError::output_missing(dest, command, status));
        }

        Ok(Conversion {
            destination: dest.to_path_buf(),
            command,
            status,
        })
    }
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERTER)
    }
}
