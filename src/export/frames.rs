//! Frame generation for the two exporters.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backgrounds::FramePhase;
use crate::canvas::{Canvas, FontBook};
use crate::config::{AvatarExportConfig, BannerExportConfig};
use crate::error::{Result, WidgetError};
use crate::image_loader::{contain_rect, encode_png, to_pixmap};
use crate::progress::{ProgressCallback, StatusCallback};
use crate::scene::{RenderOptions, SceneComposer};

use super::artifact::{avatar_filename, banner_filename, timestamp_millis, ArtifactKind, ExportArtifact};
use super::encoder::{EncoderFactory, FrameEncoder};
use super::video::VideoClip;

/// Collaborators shared by both exporters.
pub struct ExportContext<'a> {
    pub fonts: &'a FontBook,
    pub encoders: &'a dyn EncoderFactory,
    pub progress: Option<ProgressCallback>,
    pub status: Option<StatusCallback>,
}

impl ExportContext<'_> {
    fn report(&self, message: &str) {
        debug!("{message}");
        if let Some(status) = &self.status {
            status(message);
        }
    }
}

/// Renders `frame_count` frames of the animated background under the
/// layers and encodes them as a looping GIF.
pub async fn export_banner(
    composer: &SceneComposer,
    config: &BannerExportConfig,
    ctx: &ExportContext<'_>,
) -> Result<ExportArtifact> {
    let size = composer.size();
    let mut encoder = ctx.encoders.create(size, config.quality)?;

    ctx.report("rendering frames");
    for index in 0..config.frame_count {
        let phase = FramePhase::new(index, config.frame_count);
        let canvas = composer.render_to_canvas(RenderOptions::export(Some(phase)), ctx.fonts)?;
        encoder.add_frame(canvas.to_rgba(), config.frame_delay).await?;
        tokio::task::yield_now().await;
    }

    ctx.report("encoding");
    let frame_count = encoder.frame_count();
    let bytes = encoder.finish(ctx.progress.clone()).await?;
    info!(%size, frames = frame_count, bytes = bytes.len(), "banner exported");
    Ok(ExportArtifact {
        bytes,
        kind: ArtifactKind::Gif,
        filename: banner_filename(size, timestamp_millis()),
        frame_count,
    })
}

/// Alpha of the composition on fade frame `index`: a linear ramp over the
/// first `fade_in` frames, then opaque.
pub fn fade_alpha(index: u32, fade_in: u32) -> f32 {
    if index >= fade_in {
        return 1.0;
    }
    index as f32 / fade_in.saturating_sub(1).max(1) as f32
}

/// Exports the avatar: the character clip (when present) followed by the
/// composition fading in over white.
///
/// An encoder failure other than abort falls back to a PNG of the static
/// composition.
pub async fn export_avatar(
    composer: &SceneComposer,
    character: &str,
    clip: Option<&mut dyn VideoClip>,
    config: &AvatarExportConfig,
    ctx: &ExportContext<'_>,
) -> Result<ExportArtifact> {
    let nickname = composer.scene().nickname.text.trim().to_string();
    if character.trim().is_empty() || nickname.is_empty() {
        return Err(WidgetError::config(
            "Avatar export needs both a character and a nickname",
        ));
    }
    let encoder = ctx.encoders.create(composer.size(), config.quality)?;
    let encoded = encode_avatar_frames(encoder, clip, composer, config, ctx).await;

    let millis = timestamp_millis();
    match encoded {
        Ok((bytes, frame_count)) => {
            info!(frames = frame_count, bytes = bytes.len(), "avatar exported");
            Ok(ExportArtifact {
                bytes,
                kind: ArtifactKind::Gif,
                filename: avatar_filename(&nickname, character, millis, ArtifactKind::Gif),
                frame_count,
            })
        }
        Err(WidgetError::Encoder(message)) => {
            warn!(%message, "gif encoding failed; exporting a still image");
            let canvas = composer.render_to_canvas(RenderOptions::export(None), ctx.fonts)?;
            Ok(ExportArtifact {
                bytes: encode_png(&canvas.to_rgba())?,
                kind: ArtifactKind::Png,
                filename: avatar_filename(&nickname, character, millis, ArtifactKind::Png),
                frame_count: 1,
            })
        }
        Err(other) => Err(other),
    }
}

/// Streams the clip frames and the fade-in into `encoder`, then finishes it.
async fn encode_avatar_frames(
    mut encoder: Box<dyn FrameEncoder>,
    clip: Option<&mut dyn VideoClip>,
    composer: &SceneComposer,
    config: &AvatarExportConfig,
    ctx: &ExportContext<'_>,
) -> Result<(Vec<u8>, usize)> {
    if let Some(clip) = clip {
        ctx.report("rendering character clip");
        let added = add_clip_frames(encoder.as_mut(), clip, composer, config).await?;
        debug!(frames = added, "character clip frames added");
    }

    ctx.report("rendering fade-in");
    for index in 0..config.fade_frames {
        let alpha = fade_alpha(index, config.fade_in_frames);
        let options = RenderOptions::export(None).with_content_alpha(alpha);
        let canvas = composer.render_to_canvas(options, ctx.fonts)?;
        encoder.add_frame(canvas.to_rgba(), config.fade_delay).await?;
        tokio::task::yield_now().await;
    }

    ctx.report("encoding");
    let frame_count = encoder.frame_count();
    let bytes = encoder.finish(ctx.progress.clone()).await?;
    Ok((bytes, frame_count))
}

/// Samples the clip at `clip_fps`, contain-fitting each frame onto a
/// transparent canvas. Frames that fail or exceed the seek timeout are skipped.
async fn add_clip_frames(
    encoder: &mut dyn FrameEncoder,
    clip: &mut dyn VideoClip,
    composer: &SceneComposer,
    config: &AvatarExportConfig,
) -> Result<usize> {
    let size = composer.size();
    let fps = config.clip_fps.max(1) as f64;
    let total = (clip.duration().as_secs_f64() * fps).floor() as u32;
    let delay = Duration::from_millis((1000.0 / fps).round() as u64);
    let mut added = 0;

    for index in 0..total {
        let at = Duration::from_secs_f64(index as f64 / fps);
        let frame = match tokio::time::timeout(config.clip_seek_timeout, clip.frame_at(at)).await {
            Ok(Ok(frame)) => frame,
            Ok(Err(e)) => {
                debug!(index, error = %e, "clip frame skipped");
                continue;
            }
            Err(_) => {
                debug!(index, "clip seek timed out");
                continue;
            }
        };
        let Some(pixmap) = to_pixmap(&image::DynamicImage::ImageRgba8(frame)) else {
            continue;
        };
        let mut canvas = Canvas::new(size)?;
        let dest = contain_rect(pixmap.width(), pixmap.height(), size.width_f(), size.height_f());
        canvas.draw_image(&pixmap, dest, 1.0);
        encoder.add_frame(canvas.to_rgba(), delay).await?;
        added += 1;
        tokio::task::yield_now().await;
    }
    Ok(added)
}
