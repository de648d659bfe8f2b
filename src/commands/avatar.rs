use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{info, warn};
use url::Url;
use wixo_lib::{
    export_avatar, load_character_clip, AvatarExportConfig, ExportContext, ExportOutput,
    FfmpegClip, FontBook, GeneratorSession, GifEncoderFactory, SceneComposer, Variant, VideoClip,
    WidgetError, WixoOutput,
};

use crate::cli::{OutputFormat, SceneArgs};
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, log_effective_config, resolve_avatar_settings};

use super::{apply_scene_args, progress_callbacks};

/// Run the avatar command.
#[allow(clippy::too_many_arguments)]
pub async fn run_avatar(
    config_path: Option<PathBuf>,
    verbose: bool,
    character: String,
    video_base_url: Option<String>,
    no_clip: bool,
    scene: SceneArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let body = match build_avatar(config_path, verbose, &character, video_base_url, no_clip, &scene)
        .await
    {
        Ok(body) => body,
        Err(err) => return render_error(err, format, output),
    };
    if let Err(err) = write_output(&body, format, output.clone()) {
        return render_error(WidgetError::Config(err.to_string()), format, output);
    }
    ExitCode::SUCCESS
}

async fn build_avatar(
    config_path: Option<PathBuf>,
    verbose: bool,
    character: &str,
    video_base_url: Option<String>,
    no_clip: bool,
    scene: &SceneArgs,
) -> Result<WixoOutput, WidgetError> {
    let config = load_config(config_path.as_deref())?;
    if verbose {
        log_effective_config(&config, config_path.as_deref());
    }
    let settings = resolve_avatar_settings(&config.avatar, video_base_url);

    let mut composer = SceneComposer::for_variant(Variant::Avatar, &config.composer)?;
    let client = reqwest::Client::new();
    apply_scene_args(&mut composer, scene, &config, &client).await?;

    let mut clip = if no_clip {
        None
    } else {
        open_clip(&client, &settings, character).await?
    };

    let fonts = FontBook::from_config(&config.fonts)?;
    let (progress, status) = progress_callbacks();
    let ctx = ExportContext {
        fonts: &fonts,
        encoders: &GifEncoderFactory,
        progress: Some(progress),
        status: Some(status),
    };
    info!(%character, with_clip = clip.is_some(), "exporting avatar");
    let artifact = export_avatar(
        &composer,
        character,
        clip.as_mut().map(|c| c as &mut dyn VideoClip),
        &settings,
        &ctx,
    )
    .await?;

    let mut session = GeneratorSession::new();
    let artifact = session.store(artifact);
    let mut body = ExportOutput::new(&composer, artifact);
    body.character = Some(character.to_string());
    if let Some(dir) = &scene.save_dir {
        body.saved_to = session.save_to(dir)?;
    }
    Ok(WixoOutput::Avatar(body))
}

/// Fetches and opens the character clip. A missing or undecodable clip means
/// the animation starts with the fade-in.
async fn open_clip(
    client: &reqwest::Client,
    settings: &AvatarExportConfig,
    character: &str,
) -> Result<Option<FfmpegClip>, WidgetError> {
    let Some(base) = &settings.video_base_url else {
        info!("no video base url configured; skipping character clip");
        return Ok(None);
    };
    let base = Url::parse(base)?;
    let Some(clip) = load_character_clip(client, &base, character).await else {
        return Ok(None);
    };
    match FfmpegClip::open(&clip).await {
        Ok(clip) => Ok(Some(clip)),
        Err(e) => {
            warn!(error = %e, "character clip could not be decoded; continuing without it");
            Ok(None)
        }
    }
}
