use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wixo_lib::{BackgroundPreset, CanvasSize, Rgba8};

#[derive(Parser)]
#[command(name = "wixo")]
#[command(
    version,
    about = "wixo widgets - banner/avatar GIF generators and document embed planner",
    long_about = "wixo widgets\n\nModes:\n- banner: compose the dynamic-background banner/card and export an animated GIF.\n- avatar: compose the L-station avatar, prepend the character clip, and export a GIF (PNG if encoding fails).\n- viewer: turn document placeholders into embed plans with ranked preview URLs.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose (debug) logging")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with export, composer, font and viewer defaults; CLI flags override config"
    )]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value = "json", help = "Output format")]
    pub format: OutputFormat,

    #[arg(long, short, global = true, help = "Output file path (stdout if omitted)")]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose a banner or card over an animated background and export a GIF
    Banner {
        #[arg(
            long,
            default_value = "banner",
            help = "Canvas size: a preset (banner, card, avatar) or WIDTHxHEIGHT"
        )]
        size: CanvasSize,

        #[arg(
            long,
            default_value = "blank",
            help = "Background preset (blank, matrix, gradient, particles); ignored with --background-image"
        )]
        background: BackgroundPreset,

        #[arg(long, help = "Frames to render (overrides config)")]
        frames: Option<u32>,

        #[arg(long, value_name = "MS", help = "Delay per frame in milliseconds (overrides config)")]
        delay_ms: Option<u64>,

        #[command(flatten)]
        scene: SceneArgs,
    },

    /// Compose an L-station avatar and export a GIF
    Avatar {
        #[arg(long, help = "Character whose clip opens the animation")]
        character: String,

        #[arg(long, help = "Base URL serving /mp4/<character>.mp4 (overrides config)")]
        video_base_url: Option<String>,

        #[arg(long, help = "Skip the character clip and export only the fade-in")]
        no_clip: bool,

        #[command(flatten)]
        scene: SceneArgs,
    },

    /// Plan document embeds from placeholder attributes
    Viewer {
        #[arg(long, help = "Document URL (data-file-url)")]
        file_url: Option<String>,

        #[arg(long, help = "Declared file type (data-file-type); derived from the URL if omitted")]
        file_type: Option<String>,

        #[arg(long, help = "Container width (data-width)")]
        width: Option<String>,

        #[arg(long, help = "Container height (data-height)")]
        height: Option<String>,

        #[arg(long, help = "Container title (data-title)")]
        title: Option<String>,

        #[arg(
            long,
            value_name = "PATH",
            help = "JSON array of placeholder attribute maps (e.g., [{\"data-doc-viewer\":\"\",\"data-file-url\":\"/a.pdf\"}])"
        )]
        placeholders: Option<PathBuf>,

        #[arg(long, help = "Fetch the contents of txt embeds")]
        fetch_text: bool,
    },
}

/// Scene inputs shared by both generators.
#[derive(Args, Clone, Default)]
pub struct SceneArgs {
    #[arg(long, help = "Nickname text")]
    pub nickname: Option<String>,

    #[arg(long, help = "Nickname font family")]
    pub font: Option<String>,

    #[arg(long, value_name = "COLOR", help = "Nickname color (e.g., #25a5d0)")]
    pub color: Option<Rgba8>,

    #[arg(
        long,
        value_name = "COLOR",
        help = "Second gradient color; makes the nickname a gradient from --color"
    )]
    pub gradient_to: Option<Rgba8>,

    #[arg(long, default_value = "0", help = "Gradient angle in degrees")]
    pub gradient_angle: f32,

    #[arg(long, value_name = "SOURCE", help = "Custom background image (path or data: URL)")]
    pub background_image: Option<String>,

    #[arg(long, help = "Custom background opacity (0-1)")]
    pub opacity: Option<f32>,

    #[arg(long, value_name = "SOURCE", help = "Logo image (path, URL or data: URL; overrides config)")]
    pub logo: Option<String>,

    #[arg(long = "sticker", value_name = "SOURCE", help = "Sticker image (repeatable)")]
    pub stickers: Vec<String>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Interaction script: lines of `down x,y`, `move x,y`, `up x,y`, `click x,y`, `key K`"
    )]
    pub script: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Save the exported file into this directory")]
    pub save_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
