use crate::canvas::{Canvas, Fill, FontBook, TextAlign, TextStyle};
use crate::types::{CanvasSize, Rgba8};

use super::FramePhase;

pub const COLUMN_WIDTH: f32 = 25.0;
pub const LINE_HEIGHT: f32 = 18.0;
const FONT_SIZE: f32 = 16.0;

/// Character set per column, cycled by column index.
const CHAR_SETS: [&str; 5] = [
    "アイウエオカキクケコサシスセソタチツテトナニヌネノハヒフヘホマミムメモヤユヨラリルレロワヲン123456789",
    "ガギグゲゴザジズゼゾダヂヅデドバビブベボパピプペポヴァィゥェォャュョッABCDEFGHIJKLMNOPQRSTUVWXYZ",
    "アカサタナハマヤラワイキシチニヒミリウクスツヌフムユルエケセテネヘメレオコソトノホモヨロヲン0987654321",
    "ンヲロヨモホノトソコオレメヘネテセケエルユムフヌツスクウリミヒニチシキイワラヤマハナタサカア",
    "ガザダバパギジヂビピグズヅブプゲゼデベペゴゾドボポヴァィゥェォャュョッ!@#$%^&*()_+-=[]{}|;:,.<>?",
];

/// Color of a glyph at `position` (0 = head, 1 = tail) within its column.
///
/// The static preview drops the last tenth of the tail entirely; the
/// animation keeps it as a faint trail.
pub fn matrix_color(position: f64, animated: bool) -> Option<Rgba8> {
    let green = |alpha: f64| Rgba8::rgba(0x00, 0xff, 0x41, (alpha * 255.0).round() as u8);
    let color = match position {
        p if p < 0.1 => Rgba8::WHITE,
        p if p < 0.2 => Rgba8::rgb(0x00, 0xff, 0x41),
        p if p < 0.3 => Rgba8::rgb(0x00, 0xdd, 0x33),
        p if p < 0.4 => Rgba8::rgb(0x00, 0xbb, 0x22),
        p if p < 0.5 => Rgba8::rgb(0x00, 0x99, 0x11),
        p if p < 0.6 => Rgba8::rgb(0x00, 0x77, 0x00),
        p if p < 0.7 => Rgba8::rgb(0x00, 0x55, 0x00),
        p if p < 0.8 => Rgba8::rgb(0x00, 0x33, 0x00),
        p if p < 0.9 => green((1.0 - (p - 0.8) * 5.0) * 0.5),
        _ if !animated => return None,
        p => green((1.0 - (p - 0.9) * 10.0).max(0.0) * 0.2),
    };
    Some(color)
}

pub fn draw_matrix(canvas: &mut Canvas, size: CanvasSize, phase: Option<FramePhase>, fonts: &FontBook) {
    canvas.fill_rect(
        0.0,
        0.0,
        size.width_f(),
        size.height_f(),
        &Fill::Solid(Rgba8::BLACK),
    );

    let style = TextStyle::new(FONT_SIZE)
        .family("monospace")
        .align(TextAlign::Center);
    let columns = (size.width_f() / COLUMN_WIDTH).floor() as u32;
    let height = size.height as f64;
    let line_height = LINE_HEIGHT as f64;
    let rows_visible = (height / line_height).floor() as u32;
    let mut buf = [0u8; 4];

    for col in 0..columns {
        let chars: Vec<char> = CHAR_SETS[col as usize % CHAR_SETS.len()].chars().collect();
        let x = col as f32 * COLUMN_WIDTH + COLUMN_WIDTH / 2.0;

        match phase {
            None => {
                let column_height = rows_visible + 10;
                for row in 0..column_height {
                    let y = row as f64 * line_height;
                    if y >= height + line_height {
                        break;
                    }
                    let position = row as f64 / column_height as f64;
                    let Some(color) = matrix_color(position, false) else {
                        continue;
                    };
                    let ch = chars[(col as usize * 7 + row as usize * 3) % chars.len()];
                    fonts.draw_text(
                        canvas,
                        ch.encode_utf8(&mut buf),
                        x,
                        y as f32,
                        &style,
                        &Fill::Solid(color),
                    );
                }
            }
            Some(phase) => {
                let progress = phase.progress();
                let delay = (col as f64 * 0.1) % 1.0;
                let speed = 2.5 + (col % 3) as f64 * 0.5;
                let adjusted = ((progress + delay) * speed) % 1.0;
                let column_height = rows_visible + 20;
                let stream_len = column_height as f64 * line_height;
                let start_y = -stream_len + adjusted * (height + stream_len);
                let shift = (progress * 10.0).floor() as usize;

                for row in 0..column_height {
                    let y = start_y + row as f64 * line_height;
                    if y <= -line_height || y >= height + line_height {
                        continue;
                    }
                    let position = row as f64 / column_height as f64;
                    let Some(color) = matrix_color(position, true) else {
                        continue;
                    };
                    let ch = chars[(col as usize * 7 + row as usize * 3 + shift) % chars.len()];
                    fonts.draw_text(
                        canvas,
                        ch.encode_utf8(&mut buf),
                        x,
                        y as f32,
                        &style,
                        &Fill::Solid(color),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_runs_white_to_green_to_fade() {
        assert_eq!(matrix_color(0.0, false), Some(Rgba8::WHITE));
        assert_eq!(matrix_color(0.15, false), Some(Rgba8::rgb(0x00, 0xff, 0x41)));
        assert_eq!(matrix_color(0.75, true), Some(Rgba8::rgb(0x00, 0x33, 0x00)));
        // 0.85 -> alpha (1 - 0.25) * 0.5
        assert_eq!(matrix_color(0.85, false).map(|c| c.a), Some(96));
    }

    #[test]
    fn tail_is_skipped_only_when_static() {
        assert_eq!(matrix_color(0.92, false), None);
        let trail = matrix_color(0.92, true).expect("animated trail");
        assert_eq!(trail.a, 41);
        assert_eq!(matrix_color(1.2, true).map(|c| c.a), Some(0));
    }

    #[test]
    fn narrow_canvas_gets_black_base_only() {
        let size = CanvasSize::new(20, 20);
        let mut canvas = Canvas::new(size).unwrap();
        draw_matrix(&mut canvas, size, None, &FontBook::empty());
        assert_eq!(canvas.pixel(10, 10), Some(Rgba8::BLACK));
    }
}
