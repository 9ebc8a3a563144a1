//! Lookups against the source image and the converter binary

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{ConvertError, Result};

/// Read the pixel dimensions of an image from its header
pub fn source_dimensions<P: AsRef<Path>>(path: P) -> Result<(u32, u32)> {
    let path = path.as_ref();

    let (width, height) = image::image_dimensions(path)
        .map_err(|e| ConvertError::unreadable_source(path, e.to_string()))?;

    if width == 0 || height == 0 {
        return Err(ConvertError::unreadable_source(
            path,
            format!("image has zero width or height ({}x{})", width, height),
        ));
    }

    debug!("Source dimensions for {:?}: {}x{}", path, width, height);
    Ok((width, height))
}

/// Ask the converter for its version banner.
///
/// Returns the first non-empty line of `<converter> -version`.
pub fn converter_version<P: AsRef<Path>>(converter: P) -> Result<String> {
    let converter = converter.as_ref();

    let output = Command::new(converter)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| {
            ConvertError::converter(format!("Failed to run {}: {}", converter.display(), e))
        })?;

    if !output.status.success() {
        return Err(ConvertError::converter(format!(
            "{} -version exited with {}",
            converter.display(),
            output.status
        )));
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ConvertError::converter(format!("{} printed no version", converter.display()))
        })
}
