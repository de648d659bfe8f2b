//! Procedural background presets for the banner generator.
//!
//! Every preset is a pure function of the canvas size and an optional
//! [`FramePhase`]: no phase renders the static preview, a phase renders one
//! frame of the looping animation. Identical inputs yield identical pixels.

mod gradient;
mod matrix;
mod particles;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canvas::{Canvas, FontBook};
use crate::types::CanvasSize;

pub use gradient::{draw_gradient, RAINBOW_STOPS};
pub use matrix::{draw_matrix, matrix_color, COLUMN_WIDTH, LINE_HEIGHT};
pub use particles::{draw_particles, particle_count};

/// Built-in backgrounds, used only when no custom image is uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundPreset {
    #[default]
    Blank,
    Matrix,
    Gradient,
    Particles,
}

impl BackgroundPreset {
    pub const ALL: [BackgroundPreset; 4] = [
        BackgroundPreset::Blank,
        BackgroundPreset::Matrix,
        BackgroundPreset::Gradient,
        BackgroundPreset::Particles,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            BackgroundPreset::Blank => "blank",
            BackgroundPreset::Matrix => "matrix",
            BackgroundPreset::Gradient => "gradient",
            BackgroundPreset::Particles => "particles",
        }
    }
}

impl fmt::Display for BackgroundPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
#[error("Unknown background preset '{0}' (expected blank, matrix, gradient or particles)")]
pub struct BackgroundPresetParseError(pub String);

impl FromStr for BackgroundPreset {
    type Err = BackgroundPresetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| BackgroundPresetParseError(s.to_string()))
    }
}

/// Position of a frame inside an animation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePhase {
    pub index: u32,
    pub total: u32,
}

impl FramePhase {
    pub fn new(index: u32, total: u32) -> Self {
        Self { index, total }
    }

    /// Fraction of the loop elapsed, in [0, 1).
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.index as f64 / self.total as f64
        }
    }
}

/// Paints `preset` over the whole canvas. `Blank` leaves the canvas untouched.
pub fn render_background(
    canvas: &mut Canvas,
    preset: BackgroundPreset,
    size: CanvasSize,
    phase: Option<FramePhase>,
    fonts: &FontBook,
) {
    match preset {
        BackgroundPreset::Blank => {}
        BackgroundPreset::Matrix => draw_matrix(canvas, size, phase, fonts),
        BackgroundPreset::Gradient => draw_gradient(canvas, size, phase),
        BackgroundPreset::Particles => draw_particles(canvas, size, phase),
    }
}
