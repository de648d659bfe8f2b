//! Hex colors and the nickname fill.

use palette::Srgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid color '{0}': expected #rgb, #rrggbb or #rrggbbaa")]
pub struct ColorParseError(pub String);

/// A straight-alpha 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Rgba8 = Rgba8::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Multiplies the alpha channel by `factor` (clamped to [0, 1]).
    pub fn faded(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    pub fn to_hex(self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl FromStr for Rgba8 {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let err = || ColorParseError(s.to_string());
        let (rgb, alpha) = match hex.len() {
            3 | 6 => (hex, 0xff),
            8 if hex.is_char_boundary(6) => {
                let alpha = u8::from_str_radix(&hex[6..], 16).map_err(|_| err())?;
                (&hex[..6], alpha)
            }
            _ => return Err(err()),
        };
        let parsed: Srgb<u8> = rgb.parse().map_err(|_| err())?;
        Ok(Rgba8::rgba(parsed.red, parsed.green, parsed.blue, alpha))
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba8> for String {
    fn from(value: Rgba8) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Fill for the nickname layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ColorSpec {
    Solid {
        color: Rgba8,
    },
    Gradient {
        from: Rgba8,
        to: Rgba8,
        /// Degrees in [0, 360).
        angle: f32,
    },
}

impl ColorSpec {
    pub fn solid(color: Rgba8) -> Self {
        ColorSpec::Solid { color }
    }

    pub fn gradient(from: Rgba8, to: Rgba8, angle: f32) -> Self {
        ColorSpec::Gradient {
            from,
            to,
            angle: normalize_angle(angle),
        }
    }

    pub fn primary(&self) -> Rgba8 {
        match self {
            ColorSpec::Solid { color } => *color,
            ColorSpec::Gradient { from, .. } => *from,
        }
    }
}

impl Default for ColorSpec {
    fn default() -> Self {
        ColorSpec::solid(Rgba8::rgb(0x25, 0xa5, 0xd0))
    }
}

pub fn normalize_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
