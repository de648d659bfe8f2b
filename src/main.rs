mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_avatar, run_banner, run_viewer, ViewerArgs};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

async fn run() -> ExitCode {
    let args = cli::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Commands::Banner {
            size,
            background,
            frames,
            delay_ms,
            scene,
        } => {
            run_banner(
                args.config,
                args.verbose,
                size,
                background,
                frames,
                delay_ms,
                scene,
                args.format,
                args.output,
            )
            .await
        }
        Commands::Avatar {
            character,
            video_base_url,
            no_clip,
            scene,
        } => {
            run_avatar(
                args.config,
                args.verbose,
                character,
                video_base_url,
                no_clip,
                scene,
                args.format,
                args.output,
            )
            .await
        }
        Commands::Viewer {
            file_url,
            file_type,
            width,
            height,
            title,
            placeholders,
            fetch_text,
        } => {
            let viewer_args = ViewerArgs {
                file_url,
                file_type,
                width,
                height,
                title,
                placeholders,
                fetch_text,
            };
            run_viewer(args.config, args.verbose, viewer_args, args.format, args.output).await
        }
    }
}
