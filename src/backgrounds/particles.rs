use std::f64::consts::PI;

use crate::canvas::{Canvas, Fill};
use crate::types::{CanvasSize, Point, Rgba8};

use super::FramePhase;

const BASE_INNER: Rgba8 = Rgba8::rgb(0x1e, 0x3c, 0x72);
const BASE_OUTER: Rgba8 = Rgba8::rgb(0x2a, 0x52, 0x98);

/// One particle per 5000 px² of canvas.
pub fn particle_count(size: CanvasSize) -> u32 {
    ((size.width as u64 * size.height as u64) / 5000) as u32
}

/// splitmix64 over (particle, channel), mapped to [0, 1).
fn hash01(index: u32, channel: u32) -> f64 {
    let mut z = ((index as u64) << 32 | channel as u64).wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

struct Particle {
    x: f64,
    y: f64,
    radius: f64,
    alpha: f64,
}

fn particle(index: u32, size: CanvasSize, phase: Option<FramePhase>) -> Particle {
    let (w, h) = (size.width as f64, size.height as f64);
    match phase {
        None => Particle {
            x: hash01(index, 0) * w,
            y: hash01(index, 1) * h,
            radius: hash01(index, 2) * 2.0 + 0.5,
            alpha: 0.8,
        },
        Some(phase) => {
            let p = phase.progress();
            let seed = index as f64 * 0.1;
            Particle {
                x: ((seed * 1000.0 + p * 100.0) % 1.0) * w,
                y: ((seed * 1500.0 + p * 80.0) % 1.0) * h,
                radius: ((p * PI * 2.0 + seed).sin() * 1.5 + 2.0).max(0.5),
                alpha: (p * PI * 4.0 + seed).sin() * 0.3 + 0.7,
            }
        }
    }
}

pub fn draw_particles(canvas: &mut Canvas, size: CanvasSize, phase: Option<FramePhase>) {
    let (w, h) = (size.width_f(), size.height_f());
    let base = Fill::Radial {
        center: Point::new(w / 2.0, h / 2.0),
        radius: w.max(h) / 2.0,
        stops: vec![(0.0, BASE_INNER), (1.0, BASE_OUTER)],
    };
    canvas.fill_rect(0.0, 0.0, w, h, &base);

    for index in 0..particle_count(size) {
        let dot = particle(index, size, phase);
        let color = Rgba8::WHITE.faded(dot.alpha as f32);
        canvas.fill_circle(dot.x as f32, dot.y as f32, dot.radius as f32, &Fill::Solid(color));
    }
}
