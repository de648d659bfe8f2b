use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Pixel dimensions of a scene canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn width_f(&self) -> f32 {
        self.width as f32
    }

    pub fn height_f(&self) -> f32 {
        self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        SizePreset::Banner.size()
    }
}

/// The enumerated canvas sizes offered by the generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    #[default]
    Banner,
    Card,
    Avatar,
}

impl SizePreset {
    pub const fn size(self) -> CanvasSize {
        match self {
            SizePreset::Banner => CanvasSize::new(1067, 300),
            SizePreset::Card => CanvasSize::new(600, 400),
            SizePreset::Avatar => CanvasSize::new(400, 400),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SizePreset::Banner => "banner",
            SizePreset::Card => "card",
            SizePreset::Avatar => "avatar",
        }
    }
}

impl fmt::Display for SizePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum CanvasSizeParseError {
    #[error("Invalid canvas size: expected a preset (banner, card, avatar) or WIDTHxHEIGHT (e.g., 1067x300)")]
    InvalidFormat,
    #[error("Invalid width: {0}")]
    InvalidWidth(String),
    #[error("Invalid height: {0}")]
    InvalidHeight(String),
    #[error("Width must be positive")]
    ZeroWidth,
    #[error("Height must be positive")]
    ZeroHeight,
}

impl FromStr for SizePreset {
    type Err = CanvasSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "banner" => Ok(SizePreset::Banner),
            "card" => Ok(SizePreset::Card),
            "avatar" => Ok(SizePreset::Avatar),
            _ => Err(CanvasSizeParseError::InvalidFormat),
        }
    }
}

impl FromStr for CanvasSize {
    type Err = CanvasSizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(preset) = s.parse::<SizePreset>() {
            return Ok(preset.size());
        }

        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            return Err(CanvasSizeParseError::InvalidFormat);
        }

        let width: u32 = parts[0]
            .trim()
            .parse()
            .map_err(|_| CanvasSizeParseError::InvalidWidth(parts[0].to_string()))?;

        let height: u32 = parts[1]
            .trim()
            .parse()
            .map_err(|_| CanvasSizeParseError::InvalidHeight(parts[1].to_string()))?;

        if width == 0 {
            return Err(CanvasSizeParseError::ZeroWidth);
        }
        if height == 0 {
            return Err(CanvasSizeParseError::ZeroHeight);
        }

        Ok(CanvasSize { width, height })
    }
}

impl fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_explicit_dimensions() {
        let size: CanvasSize = "1067x300".parse().unwrap();
        assert_eq!(size, CanvasSize::new(1067, 300));
    }

    #[test]
    fn parse_with_spaces() {
        let size: CanvasSize = " 600 x 400 ".parse().unwrap();
        assert_eq!(size.width, 600);
        assert_eq!(size.height, 400);
    }

    #[test]
    fn parse_preset_names() {
        assert_eq!("banner".parse::<CanvasSize>().unwrap(), CanvasSize::new(1067, 300));
        assert_eq!("Card".parse::<CanvasSize>().unwrap(), CanvasSize::new(600, 400));
        assert_eq!("avatar".parse::<CanvasSize>().unwrap(), CanvasSize::new(400, 400));
    }

    #[test]
    fn parse_invalid_format() {
        assert!("1067".parse::<CanvasSize>().is_err());
        assert!("1x2x3".parse::<CanvasSize>().is_err());
        assert!("x300".parse::<CanvasSize>().is_err());
        assert!("poster".parse::<SizePreset>().is_err());
    }

    #[test]
    fn parse_zero_dimensions() {
        assert!(matches!(
            "0x300".parse::<CanvasSize>(),
            Err(CanvasSizeParseError::ZeroWidth)
        ));
        assert!(matches!(
            "1067x0".parse::<CanvasSize>(),
            Err(CanvasSizeParseError::ZeroHeight)
        ));
    }

    #[test]
    fn default_is_banner() {
        assert_eq!(CanvasSize::default(), CanvasSize::new(1067, 300));
        assert_eq!(SizePreset::default(), SizePreset::Banner);
    }

    #[test]
    fn display_round_trips_through_parse() {
        let size = CanvasSize::new(320, 240);
        assert_eq!(format!("{}", size), "320x240");
        assert_eq!(SizePreset::Card.to_string(), "card");
    }
}
