//! Per-generator layout and styling rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DragBounds;
use crate::image_loader::FitRect;
use crate::types::{Anchor, CanvasSize, LayerId, Point, Rgba8, SizePreset};

use super::layer::Layer;

pub const STICKER_SIZE: f32 = 50.0;

/// Which generator a scene belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// The "dynamic background" banner/card generator.
    Banner,
    /// The square "L-station" avatar generator.
    Avatar,
}

impl Variant {
    pub fn default_size_preset(self) -> SizePreset {
        match self {
            Variant::Banner => SizePreset::Banner,
            Variant::Avatar => SizePreset::Avatar,
        }
    }

    /// Scale a fixed layer returns to on layout reset or delete.
    pub fn default_scale(self, size: CanvasSize) -> f32 {
        if self == Variant::Banner && size == SizePreset::Banner.size() {
            0.8
        } else {
            1.0
        }
    }

    pub fn drag_bounds(self) -> DragBounds {
        match self {
            Variant::Banner => DragBounds::Unbounded,
            Variant::Avatar => DragBounds::Canvas,
        }
    }

    /// The fixed logo, label and nickname layers in their initial layout.
    pub fn fixed_layers(self, size: CanvasSize) -> [Layer; 3] {
        let scale = self.default_scale(size);
        match self {
            Variant::Banner => {
                let (w, h) = (size.width_f(), size.height_f());
                [
                    Layer::fixed(LayerId::Logo, Anchor::Center, Point::new(w * 0.1, h / 2.0), (40.0, 40.0), scale),
                    Layer::fixed(LayerId::Label, Anchor::Center, Point::new(w * 0.3, h / 2.0), (120.0, 30.0), scale),
                    Layer::fixed(LayerId::Nickname, Anchor::Center, Point::new(w * 0.6, h / 2.0), (100.0, 35.0), scale),
                ]
            }
            Variant::Avatar => [
                Layer::fixed(LayerId::Logo, Anchor::TopLeft, Point::new(80.0, 150.0), (120.0, 120.0), scale),
                Layer::fixed(LayerId::Label, Anchor::TopLeft, Point::new(210.0, 150.0), (150.0, 30.0), scale),
                Layer::fixed(LayerId::Nickname, Anchor::Center, Point::new(200.0, 300.0), (200.0, 40.0), scale),
            ],
        }
    }

    pub fn selection_style(self) -> SelectionStyle {
        match self {
            Variant::Banner => SelectionStyle {
                color: Rgba8::rgb(0xff, 0x66, 0x00),
                line_width: 2.0,
                dash: &[5.0, 5.0],
                over_content: false,
            },
            Variant::Avatar => SelectionStyle {
                color: Rgba8::rgb(0x00, 0x7b, 0xff),
                line_width: 2.0,
                dash: &[],
                over_content: true,
            },
        }
    }

    /// Outline rectangle for a highlighted layer, in layer-local coordinates.
    pub fn selection_rect(self, layer: &Layer) -> FitRect {
        let local = layer.anchor.local_box(layer.width, layer.height);
        let pad = match (self, layer.id) {
            (Variant::Banner, _) => 0.0,
            (Variant::Avatar, LayerId::Logo) => 2.0,
            (Variant::Avatar, _) => 5.0,
        };
        let y = match (self, layer.id) {
            // the avatar nickname outline hangs below the text anchor
            (Variant::Avatar, LayerId::Nickname) => 0.0,
            _ => local.y,
        };
        FitRect {
            x: local.x - pad,
            y: y - pad,
            width: local.width + pad * 2.0,
            height: local.height + pad * 2.0,
        }
    }

    pub fn text_layout(self) -> TextLayout {
        match self {
            Variant::Banner => TextLayout {
                logo_placeholder_size: 8.0,
                label_size: 24.0,
                label_color: Rgba8::BLACK,
                label_origin: Point::new(0.0, 0.0),
                label_centered: true,
                nickname_size: 28.0,
                nickname_origin: Point::new(0.0, 0.0),
                nickname_middle: true,
                gradient_extent: (50.0, 50.0),
            },
            Variant::Avatar => TextLayout {
                logo_placeholder_size: 14.0,
                label_size: 38.0,
                label_color: Rgba8::rgb(0x0b, 0x0b, 0x0b),
                label_origin: Point::new(0.0, 20.0),
                label_centered: false,
                nickname_size: 51.0,
                nickname_origin: Point::new(0.0, 25.0),
                nickname_middle: false,
                gradient_extent: (100.0, 30.0),
            },
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Banner => f.write_str("banner"),
            Variant::Avatar => f.write_str("avatar"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "banner" => Ok(Variant::Banner),
            "avatar" | "lstation" => Ok(Variant::Avatar),
            other => Err(format!("unknown generator '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionStyle {
    pub color: Rgba8,
    pub line_width: f32,
    /// Empty for a solid line.
    pub dash: &'static [f32],
    /// Drawn after the layer content rather than beneath it.
    pub over_content: bool,
}

/// Text placement for the fixed layers, relative to the layer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLayout {
    pub logo_placeholder_size: f32,
    pub label_size: f32,
    pub label_color: Rgba8,
    pub label_origin: Point,
    pub label_centered: bool,
    pub nickname_size: f32,
    pub nickname_origin: Point,
    /// Middle baseline when true, alphabetic otherwise.
    pub nickname_middle: bool,
    /// Half-length of the nickname gradient axis along x and y.
    pub gradient_extent: (f32, f32),
}
