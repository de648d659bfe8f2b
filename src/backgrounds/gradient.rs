use std::f64::consts::PI;

use crate::canvas::{Canvas, Fill};
use crate::types::{CanvasSize, Point, Rgba8};

use super::FramePhase;

pub const RAINBOW_STOPS: [(f32, Rgba8); 7] = [
    (0.0, Rgba8::rgb(0xff, 0x00, 0x00)),
    (0.16, Rgba8::rgb(0xff, 0x7f, 0x00)),
    (0.33, Rgba8::rgb(0xff, 0xff, 0x00)),
    (0.5, Rgba8::rgb(0x00, 0xff, 0x00)),
    (0.66, Rgba8::rgb(0x00, 0x00, 0xff)),
    (0.83, Rgba8::rgb(0x4b, 0x00, 0x82)),
    (1.0, Rgba8::rgb(0x94, 0x00, 0xd3)),
];

/// Gradient axis: the top-left to bottom-right diagonal when static, else
/// a line through the centre rotated by `2π·progress`.
fn axis(size: CanvasSize, phase: Option<FramePhase>) -> (Point, Point) {
    let (w, h) = (size.width as f64, size.height as f64);
    match phase {
        None => (Point::new(0.0, 0.0), Point::new(w as f32, h as f32)),
        Some(phase) => {
            let angle = phase.progress() * PI * 2.0;
            let (dx, dy) = (angle.cos() * w / 2.0, angle.sin() * h / 2.0);
            (
                Point::new((w / 2.0 + dx) as f32, (h / 2.0 + dy) as f32),
                Point::new((w / 2.0 - dx) as f32, (h / 2.0 - dy) as f32),
            )
        }
    }
}

pub fn draw_gradient(canvas: &mut Canvas, size: CanvasSize, phase: Option<FramePhase>) {
    let (start, end) = axis(size, phase);
    let fill = Fill::Linear {
        start,
        end,
        stops: RAINBOW_STOPS.to_vec(),
    };
    canvas.fill_rect(0.0, 0.0, size.width_f(), size.height_f(), &fill);
}
