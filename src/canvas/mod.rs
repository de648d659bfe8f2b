//! Immediate-mode 2D drawing surface backed by a `tiny_skia::Pixmap`.
//!
//! Mirrors the subset of the HTML canvas state model the scene renderer
//! needs: a save/restore stack of transform and global alpha, solid and
//! gradient fills, dashed strokes, and image blits.

pub mod text;

use tiny_skia::{
    FillRule, FilterQuality, GradientStop, LinearGradient, Paint, PathBuilder, Pixmap,
    PixmapPaint, RadialGradient, Rect, Shader, SpreadMode, Stroke, StrokeDash, Transform,
};

use crate::error::{Result, WidgetError};
use crate::image_loader::{pixmap_to_rgba, FitRect};
use crate::types::{CanvasSize, Point, Rgba8};

pub use text::{FontBook, TextAlign, TextBaseline, TextStyle};

/// A paint source: solid color or a gradient in current user space.
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Rgba8),
    Linear {
        start: Point,
        end: Point,
        stops: Vec<(f32, Rgba8)>,
    },
    Radial {
        center: Point,
        radius: f32,
        stops: Vec<(f32, Rgba8)>,
    },
}

impl Fill {
    fn first_color(&self) -> Rgba8 {
        match self {
            Fill::Solid(c) => *c,
            Fill::Linear { stops, .. } | Fill::Radial { stops, .. } => {
                stops.first().map(|(_, c)| *c).unwrap_or(Rgba8::BLACK)
            }
        }
    }

    fn to_shader(&self) -> Shader<'static> {
        let skia_stops = |stops: &[(f32, Rgba8)]| {
            stops
                .iter()
                .map(|(pos, c)| GradientStop::new(*pos, c.to_skia()))
                .collect::<Vec<_>>()
        };
        let shader = match self {
            Fill::Solid(c) => Some(Shader::SolidColor(c.to_skia())),
            Fill::Linear { start, end, stops } => LinearGradient::new(
                tiny_skia::Point::from_xy(start.x, start.y),
                tiny_skia::Point::from_xy(end.x, end.y),
                skia_stops(stops),
                SpreadMode::Pad,
                Transform::identity(),
            ),
            Fill::Radial {
                center,
                radius,
                stops,
            } => {
                let c = tiny_skia::Point::from_xy(center.x, center.y);
                RadialGradient::new(
                    c,
                    c,
                    *radius,
                    skia_stops(stops),
                    SpreadMode::Pad,
                    Transform::identity(),
                )
            }
        };
        // gradients tiny-skia rejects fall back to their first stop
        shader.unwrap_or_else(|| Shader::SolidColor(self.first_color().to_skia()))
    }
}

impl From<Rgba8> for Fill {
    fn from(color: Rgba8) -> Self {
        Fill::Solid(color)
    }
}

#[derive(Debug, Clone, Copy)]
struct CanvasState {
    transform: Transform,
    alpha: f32,
}

impl CanvasState {
    fn new() -> Self {
        Self {
            transform: Transform::identity(),
            alpha: 1.0,
        }
    }
}

pub struct Canvas {
    pixmap: Pixmap,
    current: CanvasState,
    stack: Vec<CanvasState>,
}

impl Canvas {
    pub fn new(size: CanvasSize) -> Result<Self> {
        let pixmap = Pixmap::new(size.width, size.height).ok_or_else(|| {
            WidgetError::config(format!("Cannot allocate a {size} canvas: size must be non-zero"))
        })?;
        Ok(Self {
            pixmap,
            current: CanvasState::new(),
            stack: Vec::new(),
        })
    }

    pub fn size(&self) -> CanvasSize {
        CanvasSize::new(self.pixmap.width(), self.pixmap.height())
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    pub fn to_rgba(&self) -> image::RgbaImage {
        pixmap_to_rgba(&self.pixmap)
    }

    pub fn save(&mut self) {
        self.stack.push(self.current);
    }

    /// Pops the last saved state; a no-op on an empty stack.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.current = state;
        }
    }

    pub fn state_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current.transform = self.current.transform.pre_translate(dx, dy);
    }

    pub fn rotate_degrees(&mut self, degrees: f32) {
        if degrees != 0.0 {
            self.current.transform = self.current.transform.pre_rotate(degrees);
        }
    }

    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.current.transform = self.current.transform.pre_scale(sx, sy);
    }

    /// Sets the global alpha applied to every subsequent draw.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.current.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn alpha(&self) -> f32 {
        self.current.alpha
    }

    /// Fills the whole surface, ignoring the transform and alpha.
    pub fn clear(&mut self, color: Rgba8) {
        self.pixmap.fill(color.to_skia());
    }

    fn paint_for(&self, fill: &Fill) -> Paint<'static> {
        let mut shader = fill.to_shader();
        if self.current.alpha < 1.0 {
            shader.apply_opacity(self.current.alpha);
        }
        Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        }
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: &Fill) {
        if self.current.alpha <= 0.0 {
            return;
        }
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let paint = self.paint_for(fill);
        self.pixmap
            .fill_path(&path, &paint, FillRule::Winding, self.current.transform, None);
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, fill: &Fill) {
        if radius <= 0.0 || self.current.alpha <= 0.0 {
            return;
        }
        if let Some(path) = PathBuilder::from_circle(cx, cy, radius) {
            let paint = self.paint_for(fill);
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, self.current.transform, None);
        }
    }

    /// Fills an arbitrary path given in user space.
    pub fn fill_path(&mut self, path: &tiny_skia::Path, fill: &Fill) {
        if self.current.alpha <= 0.0 {
            return;
        }
        let paint = self.paint_for(fill);
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, self.current.transform, None);
    }

    /// Strokes a rectangle outline; an empty `dash` draws a solid line.
    pub fn stroke_rect(&mut self, bounds: FitRect, color: Rgba8, line_width: f32, dash: &[f32]) {
        let Some(rect) = Rect::from_xywh(bounds.x, bounds.y, bounds.width, bounds.height) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let paint = self.paint_for(&Fill::Solid(color));
        let stroke = Stroke {
            width: line_width,
            dash: if dash.is_empty() {
                None
            } else {
                StrokeDash::new(dash.to_vec(), 0.0)
            },
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, self.current.transform, None);
    }

    /// Draws `image` scaled into `dest` (user space) at the current alpha times `opacity`.
    pub fn draw_image(&mut self, image: &Pixmap, dest: FitRect, opacity: f32) {
        let alpha = (self.current.alpha * opacity).clamp(0.0, 1.0);
        if alpha <= 0.0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        if dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let transform = self
            .current
            .transform
            .pre_translate(dest.x, dest.y)
            .pre_scale(
                dest.width / image.width() as f32,
                dest.height / image.height() as f32,
            );
        let paint = PixmapPaint {
            opacity: alpha,
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        self.pixmap
            .draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
    }

    /// Reads back a straight-alpha pixel, for inspection in tests and tools.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Rgba8::rgba(c.red(), c.green(), c.blue(), c.alpha())
        })
    }
}
