//! Named conversion presets

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::processing::geometry::{self, CropSpec, Gravity, MAX_DIMENSION};
use crate::processing::ConversionRequest;

/// Crop stored in a profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProfileCrop {
    /// Largest box of `ratio` (width / height) that fits the source
    Ratio {
        ratio: f64,
        #[serde(default)]
        gravity: Gravity,
    },

    /// Fixed box at `(x, y)`
    Region { width: u32, height: u32, x: u32, y: u32 },
}

/// A conversion profile bundles the parameters for a recurring use
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConversionProfile {
    /// Target width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Target height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    /// Output quality (1-100, None = request default)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<u32>,

    /// Optional crop applied before resizing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<ProfileCrop>,
}

impl ConversionProfile {
    /// Create a profile that resizes to a width
    pub fn width(width: u32) -> Self {
        Self {
            width: Some(width),
            ..Default::default()
        }
    }

    /// Create a profile that resizes to a height
    pub fn height(height: u32) -> Self {
        Self {
            height: Some(height),
            ..Default::default()
        }
    }

    /// Create a profile that crops to a ratio
    pub fn ratio(ratio: f64) -> Self {
        Self {
            crop: Some(ProfileCrop::Ratio {
                ratio,
                gravity: Gravity::Center,
            }),
            ..Default::default()
        }
    }

    /// Set the target width
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the target height
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Set the output quality
    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Set the crop gravity (ratio crops only)
    pub fn gravity(mut self, gravity: Gravity) -> Self {
        if let Some(ProfileCrop::Ratio { ratio, .. }) = self.crop {
            self.crop = Some(ProfileCrop::Ratio { ratio, gravity });
        }
        self
    }

    /// Validate the profile configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(quality) = self.quality {
            if quality == 0 || quality > 100 {
                return Err(ConvertError::invalid_parameters(format!(
                    "Quality must be between 1-100, got {}",
                    quality
                )));
            }
        }

        for value in [self.width, self.height].into_iter().flatten() {
            if value == 0 || value > MAX_DIMENSION {
                return Err(ConvertError::invalid_parameters(format!(
                    "Dimension must be between 1-{}, got {}",
                    MAX_DIMENSION, value
                )));
            }
        }

        match self.crop {
            Some(ProfileCrop::Ratio { ratio, .. }) => geometry::validate_ratio(ratio),
            Some(ProfileCrop::Region {
                width,
                height,
                x,
                y,
            }) => CropSpec::Region {
                width,
                height,
                x,
                y,
            }
            .validate(),
            None => Ok(()),
        }
    }

    /// Apply this profile on top of a request.
    ///
    /// Fields the profile leaves unset keep the request's values. A ratio
    /// crop reads the source dimensions, so the source must be set first.
    pub fn apply(&self, mut request: ConversionRequest) -> Result<ConversionRequest> {
        if let Some(width) = self.width {
            request = request.width(width);
        }
        if let Some(height) = self.height {
            request = request.height(height);
        }
        if let Some(quality) = self.quality {
            request = request.quality(quality);
        }

        match self.crop {
            Some(ProfileCrop::Ratio { ratio, gravity }) => request.crop_by_ratio(ratio, gravity),
            Some(ProfileCrop::Region {
                width,
                height,
                x,
                y,
            }) => Ok(request.crop_by_coordinates(width, height, x, y)),
            None => Ok(request),
        }
    }

    /// One-line summary for listings
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();

        match self.crop {
            Some(ProfileCrop::Ratio { ratio, gravity }) => {
                parts.push(format!("crop {:.3}:1 ({})", ratio, gravity))
            }
            Some(ProfileCrop::Region {
                width,
                height,
                x,
                y,
            }) => parts.push(format!("crop {}x{}+{}+{}", width, height, x, y)),
            None => {}
        }

        match (self.width, self.height) {
            (Some(w), Some(h)) => parts.push(format!("resize {}x{}", w, h)),
            (Some(w), None) => parts.push(format!("{}px wide", w)),
            (None, Some(h)) => parts.push(format!("{}px high", h)),
            (None, None) => {}
        }

        if let Some(quality) = self.quality {
            parts.push(format!("quality {}", quality));
        }

        if parts.is_empty() {
            "no changes".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Predefined profiles for common use cases
pub struct Profiles;

impl Profiles {
    /// Square thumbnail
    pub fn thumbnail() -> ConversionProfile {
        ConversionProfile::ratio(1.0).with_width(300).quality(80)
    }

    /// Web optimization profile
    pub fn web() -> ConversionProfile {
        ConversionProfile::width(1920).quality(85)
    }

    /// Wide 16:9 banner
    pub fn banner() -> ConversionProfile {
        ConversionProfile::ratio(16.0 / 9.0).with_width(1600).quality(85)
    }

    /// 4:5 portrait for social feeds
    pub fn portrait() -> ConversionProfile {
        ConversionProfile::ratio(4.0 / 5.0).with_width(1080).quality(85)
    }

    /// High-quality print profile
    pub fn print() -> ConversionProfile {
        ConversionProfile::default().quality(95)
    }

    /// Get all predefined profiles
    pub fn all() -> std::collections::HashMap<String, ConversionProfile> {
        let mut profiles = std::collections::HashMap::new();
        profiles.insert("thumbnail".to_string(), Self::thumbnail());
        profiles.insert("web".to_string(), Self::web());
        profiles.insert("banner".to_string(), Self::banner());
        profiles.insert("portrait".to_string(), Self::portrait());
        profiles.insert("print".to_string(), Self::print());
        profiles
    }
}
