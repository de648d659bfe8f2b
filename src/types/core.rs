//! Geometry and identity types for scene layers.
//!
//! - [`Point`] - canvas-space coordinates
//! - [`BoundingBox`] - axis-aligned rectangles used for hit testing
//! - [`Anchor`] - which point of a layer its position refers to
//! - [`LayerId`] - identity of a layer within a scene

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl FromStr for Point {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got '{s}'"))?;
        let x: f32 = x
            .trim()
            .parse()
            .map_err(|_| format!("invalid x coordinate '{}'", x.trim()))?;
        let y: f32 = y
            .trim()
            .parse()
            .map_err(|_| format!("invalid y coordinate '{}'", y.trim()))?;
        Ok(Point::new(x, y))
    }
}

/// Rectangle bounds for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Which point of the layer's box its position refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    Center,
}

impl Anchor {
    /// The layer box in layer-local coordinates, before rotation and scale.
    pub fn local_box(self, width: f32, height: f32) -> BoundingBox {
        match self {
            Anchor::TopLeft => BoundingBox {
                x: 0.0,
                y: 0.0,
                width,
                height,
            },
            Anchor::Center => BoundingBox {
                x: -width / 2.0,
                y: -height / 2.0,
                width,
                height,
            },
        }
    }
}

/// Identity of a layer in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayerId {
    Logo,
    Label,
    Nickname,
    Sticker(u32),
}

impl LayerId {
    /// Fixed layers in hit-test priority order.
    pub const FIXED_HIT_ORDER: [LayerId; 3] = [LayerId::Nickname, LayerId::Label, LayerId::Logo];
    /// Fixed layers in draw order.
    pub const FIXED_DRAW_ORDER: [LayerId; 3] = [LayerId::Logo, LayerId::Label, LayerId::Nickname];

    pub fn is_sticker(self) -> bool {
        matches!(self, LayerId::Sticker(_))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerId::Logo => f.write_str("logo"),
            LayerId::Label => f.write_str("label"),
            LayerId::Nickname => f.write_str("nickname"),
            LayerId::Sticker(n) => write!(f, "sticker{n}"),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown layer id '{0}' (expected logo, label, nickname or stickerN)")]
pub struct LayerIdParseError(pub String);

impl FromStr for LayerId {
    type Err = LayerIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "logo" => Ok(LayerId::Logo),
            "label" | "linuxdo" => Ok(LayerId::Label),
            "nickname" => Ok(LayerId::Nickname),
            other => other
                .strip_prefix("sticker")
                .and_then(|n| n.parse().ok())
                .map(LayerId::Sticker)
                .ok_or_else(|| LayerIdParseError(other.to_string())),
        }
    }
}

impl Serialize for LayerId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LayerId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
