//! Core data types shared by the scene composer, exporters and viewer.
//!
//! - [`core`] - geometry and layer identity
//! - [`color`] - hex colors and the nickname [`ColorSpec`]

pub mod color;
pub mod core;

pub use self::color::{ColorParseError, ColorSpec, Rgba8};
pub use self::core::{Anchor, BoundingBox, LayerId, LayerIdParseError, Point};
pub use crate::canvas_size::{CanvasSize, SizePreset};
