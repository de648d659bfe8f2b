mod avatar;
mod banner;
mod viewer;

pub use avatar::run_avatar;
pub use banner::run_banner;
pub use viewer::{run_viewer, ViewerArgs};

use std::sync::Arc;

use tracing::{debug, info, warn};
use wixo_lib::{
    fetch_image_source, load_image_source, parse_script, ColorSpec, Config, ProgressCallback,
    SceneComposer, StatusCallback, WidgetError,
};

use crate::cli::SceneArgs;

/// Applies the shared scene flags to `composer`, then replays the
/// interaction script.
pub(crate) async fn apply_scene_args(
    composer: &mut SceneComposer,
    args: &SceneArgs,
    config: &Config,
    client: &reqwest::Client,
) -> Result<(), WidgetError> {
    if let Some(nickname) = &args.nickname {
        composer.set_nickname(nickname.clone());
    }
    if let Some(font) = &args.font {
        composer.set_nickname_font(font.clone());
    }
    if let Some(color) = nickname_color(args, composer.scene().nickname.color) {
        composer.set_nickname_color(color);
    }

    if let Some(source) = args.logo.as_deref().or(config.logo.source.as_deref()) {
        let logo = fetch_image_source(client, source).await;
        if let Some(logo) = skip_unloadable("logo", source, logo)? {
            composer.set_logo(&logo)?;
            debug!(%source, "logo loaded");
        }
    }
    if let Some(source) = &args.background_image {
        let image = load_image_source(source).map_err(WidgetError::from);
        if let Some(image) = skip_unloadable("background image", source, image)? {
            composer.set_background_image(&image)?;
        }
    }
    if let Some(opacity) = args.opacity {
        composer.set_background_opacity(opacity);
    }
    for source in &args.stickers {
        let image = load_image_source(source).map_err(WidgetError::from);
        if let Some(image) = skip_unloadable("sticker", source, image)? {
            let id = composer.add_sticker(&image)?;
            debug!(%source, %id, "sticker loaded");
        }
    }

    if let Some(path) = &args.script {
        let source = std::fs::read_to_string(path)?;
        let steps = parse_script(&source)?;
        for step in &steps {
            let outcome = step.apply(composer);
            debug!(?step, ?outcome, "script step");
        }
        info!(steps = steps.len(), selected = ?composer.selected(), "interaction script applied");
    }
    Ok(())
}

/// An upload that cannot be read leaves its layer as it was; other errors propagate.
fn skip_unloadable<T>(
    what: &str,
    source: &str,
    result: Result<T, WidgetError>,
) -> Result<Option<T>, WidgetError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_recoverable() => {
            warn!(%source, error = %err, "{what} could not be loaded; continuing without it");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// `--color` alone is a solid fill; with `--gradient-to` it starts a gradient.
fn nickname_color(args: &SceneArgs, current: ColorSpec) -> Option<ColorSpec> {
    match (args.color, args.gradient_to) {
        (None, None) => None,
        (Some(color), None) => Some(ColorSpec::solid(color)),
        (from, Some(to)) => Some(ColorSpec::gradient(
            from.unwrap_or_else(|| current.primary()),
            to,
            args.gradient_angle,
        )),
    }
}

pub(crate) fn progress_callbacks() -> (ProgressCallback, StatusCallback) {
    let progress: ProgressCallback = Arc::new(|fraction: f32| {
        debug!(percent = (fraction * 100.0).round(), "encoding");
    });
    let status: StatusCallback = Arc::new(|message: &str| {
        info!("{message}");
    });
    (progress, status)
}
