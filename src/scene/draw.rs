use tiny_skia::Pixmap;

use crate::backgrounds::{render_background, FramePhase};
use crate::canvas::{Canvas, Fill, FontBook, TextAlign, TextBaseline, TextStyle};
use crate::image_loader::{cover_rect, FitRect};
use crate::types::{CanvasSize, ColorSpec, LayerId, Point, Rgba8};

use super::{Background, Layer, NicknameStyle, Variant, LABEL_TEXT};

const PLACEHOLDER_FILL: Rgba8 = Rgba8::rgb(0xf0, 0xf0, 0xf0);
const PLACEHOLDER_TEXT: Rgba8 = Rgba8::rgb(0x66, 0x66, 0x66);

/// Shared inputs for drawing the fixed layers.
pub struct DrawContext<'a> {
    pub fonts: &'a FontBook,
    pub nickname: &'a NicknameStyle,
    pub logo: Option<&'a Pixmap>,
    /// Draw a stand-in box where the logo has not been loaded.
    pub placeholders: bool,
}

/// White base, then the uploaded image cover-fitted at its opacity, or the preset.
pub fn draw_background(
    canvas: &mut Canvas,
    background: &Background,
    size: CanvasSize,
    phase: Option<FramePhase>,
    fonts: &FontBook,
) {
    canvas.clear(Rgba8::WHITE);
    match &background.custom {
        Some(image) => {
            let dest = cover_rect(image.width(), image.height(), size.width_f(), size.height_f());
            canvas.draw_image(image, dest, background.opacity);
        }
        None => render_background(canvas, background.preset, size, phase, fonts),
    }
}

/// Fill for the nickname text; gradients run through the text anchor along
/// `angle`, spanning `extent` on each axis.
pub fn nickname_fill(color: &ColorSpec, extent: (f32, f32)) -> Fill {
    match *color {
        ColorSpec::Solid { color } => Fill::Solid(color),
        ColorSpec::Gradient { from, to, angle } => {
            let (sin, cos) = angle.to_radians().sin_cos();
            Fill::Linear {
                start: Point::new(-cos * extent.0, -sin * extent.1),
                end: Point::new(cos * extent.0, sin * extent.1),
                stops: vec![(0.0, from), (1.0, to)],
            }
        }
    }
}

fn local_rect(layer: &Layer) -> FitRect {
    let b = layer.anchor.local_box(layer.width, layer.height);
    FitRect {
        x: b.x,
        y: b.y,
        width: b.width,
        height: b.height,
    }
}

/// Draws one layer about its anchor: translate, rotate, then scale.
pub fn draw_layer(
    canvas: &mut Canvas,
    variant: Variant,
    layer: &Layer,
    ctx: &DrawContext<'_>,
    highlight: bool,
) {
    let selection = variant.selection_style();
    canvas.save();
    canvas.translate(layer.position.x, layer.position.y);
    canvas.rotate_degrees(layer.rotation);
    canvas.scale(layer.scale(), layer.scale());

    if highlight && !selection.over_content {
        draw_outline(canvas, variant, layer);
    }
    match layer.id {
        LayerId::Logo => draw_logo(canvas, variant, layer, ctx),
        LayerId::Label => draw_label(canvas, variant, ctx.fonts),
        LayerId::Nickname => draw_nickname(canvas, variant, ctx),
        LayerId::Sticker(_) => {
            if let Some(image) = &layer.image {
                canvas.draw_image(image, local_rect(layer), 1.0);
            }
        }
    }
    if highlight && selection.over_content {
        draw_outline(canvas, variant, layer);
    }

    canvas.restore();
}

fn draw_outline(canvas: &mut Canvas, variant: Variant, layer: &Layer) {
    let style = variant.selection_style();
    canvas.stroke_rect(
        variant.selection_rect(layer),
        style.color,
        style.line_width,
        style.dash,
    );
}

fn draw_logo(canvas: &mut Canvas, variant: Variant, layer: &Layer, ctx: &DrawContext<'_>) {
    let rect = local_rect(layer);
    if let Some(logo) = ctx.logo {
        canvas.draw_image(logo, rect, 1.0);
        return;
    }
    if !ctx.placeholders {
        return;
    }
    canvas.fill_rect(rect.x, rect.y, rect.width, rect.height, &Fill::Solid(PLACEHOLDER_FILL));
    let style = TextStyle::new(variant.text_layout().logo_placeholder_size)
        .align(TextAlign::Center)
        .baseline(TextBaseline::Middle);
    ctx.fonts.draw_text(
        canvas,
        "LOGO",
        rect.x + rect.width / 2.0,
        rect.y + rect.height / 2.0,
        &style,
        &Fill::Solid(PLACEHOLDER_TEXT),
    );
}

fn draw_label(canvas: &mut Canvas, variant: Variant, fonts: &FontBook) {
    let layout = variant.text_layout();
    let style = if layout.label_centered {
        TextStyle::new(layout.label_size)
            .align(TextAlign::Center)
            .baseline(TextBaseline::Middle)
    } else {
        TextStyle::new(layout.label_size)
    };
    fonts.draw_text(
        canvas,
        LABEL_TEXT,
        layout.label_origin.x,
        layout.label_origin.y,
        &style,
        &Fill::Solid(layout.label_color),
    );
}

fn draw_nickname(canvas: &mut Canvas, variant: Variant, ctx: &DrawContext<'_>) {
    let layout = variant.text_layout();
    let baseline = if layout.nickname_middle {
        TextBaseline::Middle
    } else {
        TextBaseline::Alphabetic
    };
    let style = TextStyle::new(layout.nickname_size)
        .family(ctx.nickname.font.clone())
        .align(TextAlign::Center)
        .baseline(baseline);
    ctx.fonts.draw_text(
        canvas,
        ctx.nickname.display_text(),
        layout.nickname_origin.x,
        layout.nickname_origin.y,
        &style,
        &nickname_fill(&ctx.nickname.color, layout.gradient_extent),
    );
}
