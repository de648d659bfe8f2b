use std::path::PathBuf;
use std::process::ExitCode;

use tracing::info;
use wixo_lib::{
    export_banner, BackgroundPreset, CanvasSize, ExportContext, ExportOutput, FontBook,
    GeneratorSession, GifEncoderFactory, SceneComposer, Variant, WidgetError, WixoOutput,
};

use crate::cli::{OutputFormat, SceneArgs};
use crate::formatting::{render_error, write_output};
use crate::settings::{load_config, log_effective_config, resolve_banner_settings};

use super::{apply_scene_args, progress_callbacks};

/// Run the banner command.
#[allow(clippy::too_many_arguments)]
pub async fn run_banner(
    config_path: Option<PathBuf>,
    verbose: bool,
    size: CanvasSize,
    background: BackgroundPreset,
    frames: Option<u32>,
    delay_ms: Option<u64>,
    scene: SceneArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let body = match build_banner(config_path, verbose, size, background, frames, delay_ms, &scene)
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

async fn build_banner(
    config_path: Option<PathBuf>,
    verbose: bool,
    size: CanvasSize,
    background: BackgroundPreset,
    frames: Option<u32>,
    delay_ms: Option<u64>,
    scene: &SceneArgs,
) -> Result<WixoOutput, WidgetError> {
    let config = load_config(config_path.as_deref())?;
    if verbose {
        log_effective_config(&config, config_path.as_deref());
    }
    let settings = resolve_banner_settings(&config.banner, frames, delay_ms)?;

    let mut composer = SceneComposer::new(Variant::Banner, size, &config.composer)?;
    composer.set_background_preset(background);
    let client = reqwest::Client::new();
    apply_scene_args(&mut composer, scene, &config, &client).await?;

    let fonts = FontBook::from_config(&config.fonts)?;
    let (progress, status) = progress_callbacks();
    let ctx = ExportContext {
        fonts: &fonts,
        encoders: &GifEncoderFactory,
        progress: Some(progress),
        status: Some(status),
    };
    info!(%size, background = background.name(), frames = settings.frame_count, "exporting banner");
    let artifact = export_banner(&composer, &settings, &ctx).await?;

    let mut session = GeneratorSession::new();
    let artifact = session.store(artifact);
    let mut body = ExportOutput::new(&composer, artifact);
    if let Some(dir) = &scene.save_dir {
        body.saved_to = session.save_to(dir)?;
    }
    Ok(WixoOutput::Banner(body))
}
