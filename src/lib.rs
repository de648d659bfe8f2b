//! wixo widgets library
//!
//! Two independent widget families for the wixo blog theme: a layered scene
//! composer that exports animated GIFs (the banner/card "dynamic background"
//! generator and the "L-station" avatar generator), and a document embed
//! planner that wraps third-party office preview services in a fallback chain.
//!
//! # Module Overview
//!
//! - [`canvas`] - Raster canvas with a save/restore transform stack and text
//! - [`backgrounds`] - Procedural background presets (matrix, gradient, particles)
//! - [`scene`] - Layers, hit testing, drag/key interaction and rendering
//! - [`export`] - Frame generation, GIF encoding and character clips
//! - [`viewer`] - Document embed planning, viewer fallback and chrome stripping
//! - [`image_loader`] - Upload decoding and fit rectangles
//! - [`config`] - Configuration file support
//! - [`types`] - Core data types and structures
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use wixo_lib::{
//!     export_banner, Config, ExportContext, FontBook, GifEncoderFactory, SceneComposer, Variant,
//! };
//!
//! # async fn example() -> wixo_lib::Result<()> {
//! let config = Config::default();
//! let mut composer = SceneComposer::for_variant(Variant::Banner, &config.composer)?;
//! composer.set_nickname("stone");
//! composer.apply_key("e");
//!
//! let fonts = FontBook::from_config(&config.fonts)?;
//! let ctx = ExportContext {
//!     fonts: &fonts,
//!     encoders: &GifEncoderFactory,
//!     progress: None,
//!     status: None,
//! };
//! let artifact = export_banner(&composer, &config.banner, &ctx).await?;
//! println!("{} ({} frames)", artifact.filename, artifact.frame_count);
//! # Ok(())
//! # }
//! ```

pub mod backgrounds;
pub mod canvas;
mod canvas_size;
pub mod config;
pub mod error;
pub mod export;
pub mod image_loader;
pub mod output;
pub mod progress;
pub mod scene;
pub mod types;
pub mod viewer;

pub use backgrounds::{render_background, BackgroundPreset, FramePhase};
pub use canvas::{Canvas, Fill, FontBook, TextAlign, TextBaseline, TextStyle};
pub use config::{
    AvatarExportConfig, BannerExportConfig, ComposerConfig, Config, DragBounds, FontConfig,
    LogoConfig, ViewerTimeouts,
};
pub use error::{ErrorCategory, ErrorPayload, Result, WidgetError};
pub use export::{
    export_avatar, export_banner, load_character_clip, ArtifactKind, EncoderFactory,
    ExportArtifact, ExportContext, FfmpegClip, FrameEncoder, GeneratorSession, GifEncoderFactory,
    VideoClip,
};
pub use image_loader::{fetch_image_source, load_image_source, ImageLoadError};
pub use output::{
    ArtifactSummary, EmbedOutput, ErrorOutput, ExportOutput, LayerSummary, ViewerOutput,
    WixoOutput, WIXO_OUTPUT_VERSION,
};
pub use progress::{ProgressCallback, StatusCallback};
pub use scene::{
    parse_script, EditAction, PointerOutcome, RenderMode, RenderOptions, SceneComposer,
    ScriptStep, Variant,
};
pub use types::{CanvasSize, ColorSpec, LayerId, Point, Rgba8, SizePreset};
pub use viewer::{
    initialize_viewers, plan_embed, EmbedContent, EmbedPlan, EmbedRequest, FileType, Placeholder,
    ViewerMachine, ViewerState,
};
