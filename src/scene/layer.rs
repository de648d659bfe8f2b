use std::sync::Arc;

use tiny_skia::Pixmap;

use crate::types::{Anchor, BoundingBox, LayerId, Point};

pub const MIN_FIXED_SCALE: f32 = 0.2;
pub const MAX_FIXED_SCALE: f32 = 3.0;
pub const MIN_STICKER_SCALE: f32 = 0.01;

/// A positioned, transformable element of a scene.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: LayerId,
    pub anchor: Anchor,
    pub position: Point,
    pub width: f32,
    pub height: f32,
    scale: f32,
    /// Degrees, clockwise.
    pub rotation: f32,
    pub image: Option<Arc<Pixmap>>,
}

impl Layer {
    pub fn fixed(id: LayerId, anchor: Anchor, position: Point, size: (f32, f32), scale: f32) -> Self {
        let mut layer = Self {
            id,
            anchor,
            position,
            width: size.0,
            height: size.1,
            scale: 1.0,
            rotation: 0.0,
            image: None,
        };
        layer.set_scale(scale);
        layer
    }

    pub fn sticker(number: u32, position: Point, size: f32, image: Arc<Pixmap>) -> Self {
        Self {
            id: LayerId::Sticker(number),
            anchor: Anchor::Center,
            position,
            width: size,
            height: size,
            scale: 1.0,
            rotation: 0.0,
            image: Some(image),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Sets the scale within the layer's limits: [0.2, 3.0] for fixed layers,
    /// at least 0.01 and uncapped for stickers.
    pub fn set_scale(&mut self, scale: f32) {
        let scale = if scale.is_finite() { scale } else { 1.0 };
        self.scale = if self.id.is_sticker() {
            scale.max(MIN_STICKER_SCALE)
        } else {
            scale.clamp(MIN_FIXED_SCALE, MAX_FIXED_SCALE)
        };
    }

    /// Axis-aligned hit box in canvas space. Rotation is ignored.
    pub fn hit_box(&self) -> BoundingBox {
        let local = self.anchor.local_box(self.width, self.height);
        BoundingBox {
            x: self.position.x + local.x * self.scale,
            y: self.position.y + local.y * self.scale,
            width: self.width * self.scale,
            height: self.height * self.scale,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        self.hit_box().contains(p)
    }

    /// Moves the layer so its hit box lies inside a `width` x `height` canvas
    /// where it fits; an oversized box is pinned to the top-left edge.
    pub fn clamp_into(&mut self, width: f32, height: f32) {
        let hit = self.hit_box();
        let dx = (width - hit.width - hit.x).min(0.0).max(-hit.x);
        let dy = (height - hit.height - hit.y).min(0.0).max(-hit.y);
        self.position.x += dx;
        self.position.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sticker() -> Layer {
        let pixmap = Arc::new(Pixmap::new(2, 2).unwrap());
        Layer::sticker(1, Point::new(100.0, 100.0), 50.0, pixmap)
    }

    #[test]
    fn fixed_scale_is_clamped() {
        let mut layer = Layer::fixed(LayerId::Logo, Anchor::Center, Point::default(), (40.0, 40.0), 1.0);
        layer.set_scale(10.0);
        assert_eq!(layer.scale(), 3.0);
        layer.set_scale(0.01);
        assert_eq!(layer.scale(), 0.2);
        layer.set_scale(f32::NAN);
        assert_eq!(layer.scale(), 1.0);
    }

    #[test]
    fn sticker_scale_is_uncapped_but_positive() {
        let mut layer = sticker();
        layer.set_scale(12.0);
        assert_eq!(layer.scale(), 12.0);
        layer.set_scale(-3.0);
        assert_eq!(layer.scale(), 0.01);
    }

    #[test]
    fn hit_box_scales_around_anchor() {
        let mut centered = sticker();
        centered.set_scale(2.0);
        let b = centered.hit_box();
        assert_eq!((b.x, b.y, b.width, b.height), (50.0, 50.0, 100.0, 100.0));

        let top_left = Layer::fixed(
            LayerId::Label,
            Anchor::TopLeft,
            Point::new(210.0, 150.0),
            (150.0, 30.0),
            1.0,
        );
        assert!(top_left.contains(Point::new(210.0, 150.0)));
        assert!(top_left.contains(Point::new(360.0, 180.0)));
        assert!(!top_left.contains(Point::new(209.0, 160.0)));
    }

    #[test]
    fn clamp_into_keeps_box_on_canvas() {
        let mut layer = Layer::fixed(
            LayerId::Logo,
            Anchor::TopLeft,
            Point::new(350.0, -20.0),
            (120.0, 120.0),
            1.0,
        );
        layer.clamp_into(400.0, 400.0);
        assert_eq!(layer.position, Point::new(280.0, 0.0));

        let mut nickname = Layer::fixed(
            LayerId::Nickname,
            Anchor::Center,
            Point::new(-10.0, 390.0),
            (200.0, 40.0),
            1.0,
        );
        nickname.clamp_into(400.0, 400.0);
        assert_eq!(nickname.position, Point::new(100.0, 380.0));
    }
}
