//! Crop and resize geometry for the converter command line

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ConvertError, Result};

/// Largest accepted value for a target width or height
pub const MAX_DIMENSION: u32 = 32768;

/// Anchor point used by extent crops.
///
/// Serialized in lowercase; deserialized with the same rules as `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gravity {
    NorthWest,
    North,
    NorthEast,
    West,
    #[default]
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Gravity {
    /// All gravity values in reading order
    pub const ALL: [Gravity; 9] = [
        Gravity::NorthWest,
        Gravity::North,
        Gravity::NorthEast,
        Gravity::West,
        Gravity::Center,
        Gravity::East,
        Gravity::SouthWest,
        Gravity::South,
        Gravity::SouthEast,
    ];

    /// Name as the converter spells it
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NorthWest => "NorthWest",
            Self::North => "North",
            Self::NorthEast => "NorthEast",
            Self::West => "West",
            Self::Center => "Center",
            Self::East => "East",
            Self::SouthWest => "SouthWest",
            Self::South => "South",
            Self::SouthEast => "SouthEast",
        }
    }
}

impl fmt::Display for Gravity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gravity {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();

        if normalized == "centre" {
            return Ok(Self::Center);
        }

        Self::ALL
            .into_iter()
            .find(|g| g.as_str().to_lowercase() == normalized)
            .ok_or_else(|| ConvertError::invalid_parameters(format!("Unknown gravity '{}'", s)))
    }
}

impl<'de> Deserialize<'de> for Gravity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Crop transformation applied before resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropSpec {
    /// No crop
    #[default]
    None,

    /// Keep a `width x height` box anchored at `gravity`
    Extent {
        width: u32,
        height: u32,
        gravity: Gravity,
    },

    /// Keep a `width x height` box whose origin is at `(x, y)`
    Region { width: u32, height: u32, x: u32, y: u32 },
}

impl CropSpec {
    /// Converter arguments for this crop (empty for `None`)
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::Extent {
                width,
                height,
                gravity,
            } => vec![
                "-gravity".to_string(),
                gravity.to_string(),
                "-extent".to_string(),
                format!("{}x{}", width, height),
            ],
            Self::Region {
                width,
                height,
                x,
                y,
            } => vec!["-crop".to_string(), format!("{}x{}+{}+{}", width, height, x, y)],
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Reject crops the converter cannot act on
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::None => Ok(()),
            Self::Extent { width, height, .. } | Self::Region { width, height, .. } => {
                if *width == 0 || *height == 0 {
                    return Err(ConvertError::invalid_parameters(format!(
                        "Crop dimensions must be greater than 0, got {}x{}",
                        width, height
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Resize geometry derived from an optional width and height
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeSpec {
    /// Exact box, may distort the aspect ratio
    Exact { width: u32, height: u32 },
    /// Scale proportionally to this width
    Width(u32),
    /// Scale proportionally to this height
    Height(u32),
}

impl ResizeSpec {
    /// Pick the resize form for the dimensions that are set
    pub fn from_dimensions(width: Option<u32>, height: Option<u32>) -> Option<Self> {
        match (width, height) {
            (Some(width), Some(height)) => Some(Self::Exact { width, height }),
            (Some(width), None) => Some(Self::Width(width)),
            (None, Some(height)) => Some(Self::Height(height)),
            (None, None) => None,
        }
    }

    /// Geometry argument for `-resize`
    pub fn geometry(&self) -> String {
        match self {
            Self::Exact { width, height } => format!("{}x{}", width, height),
            Self::Width(width) => width.to_string(),
            Self::Height(height) => format!("x{}", height),
        }
    }

    pub fn args(&self) -> Vec<String> {
        vec!["-resize".to_string(), self.geometry()]
    }
}

/// Largest box of the given aspect ratio that fits inside `source`.
///
/// Starts from the full source width and derives the height from `ratio`
/// (width / height). When that height overflows the source, the box is
/// rebuilt from the full source height instead. Results are rounded to
/// whole pixels and never exceed the source bounds.
pub fn ratio_crop_dimensions(source: (u32, u32), ratio: f64) -> (u32, u32) {
    let (src_w, src_h) = (source.0.max(1) as f64, source.1.max(1) as f64);

    let mut width = src_w;
    let mut height = width / ratio;

    if height > src_h {
        width = src_h * ratio;
        height = src_h;
    }

    (
        width.round().clamp(1.0, src_w) as u32,
        height.round().clamp(1.0, src_h) as u32,
    )
}

/// Check a crop ratio before using it
pub fn validate_ratio(ratio: f64) -> Result<()> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(ConvertError::invalid_parameters(format!(
            "Crop ratio must be a positive number, got {}",
            ratio
        )));
    }
    Ok(())
}

/// Parse a ratio given as `W:H`, `W/H` or a plain decimal
pub fn parse_ratio(s: &str) -> Result<f64> {
    let s = s.trim();
    let invalid = || ConvertError::invalid_parameters(format!("Invalid ratio '{}'", s));

    let ratio = match s.split_once([':', '/']) {
        Some((w, h)) => {
            let w: f64 = w.trim().parse().map_err(|_| invalid())?;
            let h: f64 = h.trim().parse().map_err(|_| invalid())?;
            if h == 0.0 {
                return Err(invalid());
            }
            w / h
        }
        None => s.parse().map_err(|_| invalid())?,
    };

    validate_ratio(ratio)?;
    Ok(ratio)
}

/// Parse a crop region given as `WxH+X+Y`
pub fn parse_region(s: &str) -> Result<CropSpec> {
    let invalid = || {
        ConvertError::invalid_parameters(format!(
            "Crop region must be in format 'WIDTHxHEIGHT+X+Y' (e.g. '800x600+10+20'), got '{}'",
            s
        ))
    };

    let mut parts = s.trim().split('+');
    let size = parts.next().ok_or_else(invalid)?;
    let x = parts.next().ok_or_else(invalid)?;
    let y = parts.next().ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    let (width, height) = size.split_once(['x', 'X']).ok_or_else(invalid)?;

    let crop = CropSpec::Region {
        width: width.parse().map_err(|_| invalid())?,
        height: height.parse().map_err(|_| invalid())?,
        x: x.parse().map_err(|_| invalid())?,
        y: y.parse().map_err(|_| invalid())?,
    };
    crop.validate()?;
    Ok(crop)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_crop_landscape_source() {
        assert_eq!(ratio_crop_dimensions((4000, 3000), 16.0 / 9.0), (4000, 2250));
    }

    #[test]
    fn test_ratio_crop_square_on_tall_source() {
        assert_eq!(ratio_crop_dimensions((1000, 2000), 1.0), (1000, 1000));
    }

    #[test]
    fn test_ratio_crop_corrects_height_overflow() {
        // 4000 / 0.5 = 8000 > 3000, so the box is rebuilt from the height
        assert_eq!(ratio_crop_dimensions((4000, 3000), 0.5), (1500, 3000));
        // 1:1 on a landscape source
        assert_eq!(ratio_crop_dimensions((4000, 3000), 1.0), (3000, 3000));
    }

    #[test]
    fn test_ratio_crop_stays_in_bounds_across_ratios() {
        let sources = [(4000, 3000), (1000, 2000), (640, 640), (1, 500), (3, 7)];
        let ratios = [0.1, 0.25, 0.5, 2.0 / 3.0, 0.8, 1.0, 1.25, 1.5, 16.0 / 9.0, 3.0, 10.0];

        for &(w0, h0) in &sources {
            for &ratio in &ratios {
                let (w, h) = ratio_crop_dimensions((w0, h0), ratio);
                assert!(w >= 1 && w <= w0, "width {} out of bounds for {}x{} @ {}", w, w0, h0, ratio);
                assert!(h >= 1 && h <= h0, "height {} out of bounds for {}x{} @ {}", h, w0, h0, ratio);
                // One side always spans the full source
                assert!(w == w0 || h == h0);
            }
        }
    }

    #[test]
    fn test_ratio_crop_matches_ratio_within_rounding() {
        let sources = [(4000, 3000), (1000, 2000), (1920, 1080), (1234, 987)];
        let ratios = [0.25, 0.5, 0.75, 1.0, 4.0 / 3.0, 16.0 / 9.0, 2.5];

        for &source in &sources {
            for &ratio in &ratios {
                let (w, h) = ratio_crop_dimensions(source, ratio);
                // Half a pixel of rounding on each side
                let tolerance = ratio * (0.5 / h as f64) + 0.5 / h as f64;
                assert!(
                    ((w as f64 / h as f64) - ratio).abs() <= tolerance,
                    "{}x{} does not match ratio {}",
                    w,
                    h,
                    ratio
                );
            }
        }
    }

    #[test]
    fn test_resize_spec_selection() {
        assert_eq!(
            ResizeSpec::from_dimensions(Some(800), Some(600)).map(|r| r.geometry()),
            Some("800x600".to_string())
        );
        assert_eq!(
            ResizeSpec::from_dimensions(Some(800), None).map(|r| r.geometry()),
            Some("800".to_string())
        );
        assert_eq!(
            ResizeSpec::from_dimensions(None, Some(600)).map(|r| r.geometry()),
            Some("x600".to_string())
        );
        assert_eq!(ResizeSpec::from_dimensions(None, None), None);
    }

    #[test]
    fn test_crop_args() {
        let extent = CropSpec::Extent {
            width: 4000,
            height: 2250,
            gravity: Gravity::Center,
        };
        assert_eq!(extent.args(), vec!["-gravity", "Center", "-extent", "4000x2250"]);

        let region = CropSpec::Region {
            width: 100,
            height: 50,
            x: 10,
            y: 20,
        };
        assert_eq!(region.args(), vec!["-crop", "100x50+10+20"]);

        assert!(CropSpec::None.args().is_empty());
    }

    #[test]
    fn test_gravity_parsing() {
        assert_eq!("center".parse::<Gravity>().unwrap(), Gravity::Center);
        assert_eq!("Centre".parse::<Gravity>().unwrap(), Gravity::Center);
        assert_eq!("north-east".parse::<Gravity>().unwrap(), Gravity::NorthEast);
        assert_eq!("SouthWest".parse::<Gravity>().unwrap(), Gravity::SouthWest);
        assert!("middle".parse::<Gravity>().is_err());
        assert_eq!(Gravity::default(), Gravity::Center);
    }

    #[test]
    fn test_parse_ratio() {
        assert!((parse_ratio("16:9").unwrap() - 16.0 / 9.0).abs() < 1e-9);
        assert!((parse_ratio("4/5").unwrap() - 0.8).abs() < 1e-9);
        assert!((parse_ratio("1.5").unwrap() - 1.5).abs() < 1e-9);
        assert!(parse_ratio("16:0").is_err());
        assert!(parse_ratio("-2").is_err());
        assert!(parse_ratio("wide").is_err());
    }

    #[test]
    fn test_parse_region() {
        assert_eq!(
            parse_region("800x600+10+20").unwrap(),
            CropSpec::Region {
                width: 800,
                height: 600,
                x: 10,
                y: 20
            }
        );
        assert!(parse_region("800x600").is_err());
        assert!(parse_region("0x600+0+0").is_err());
        assert!(parse_region("800x600+1+2+3").is_err());
        assert!(parse_region("800-600+1+2").is_err());
    }
}
