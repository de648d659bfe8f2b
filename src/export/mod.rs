//! Turning a composed scene into a GIF (or PNG) artifact.

pub mod artifact;
pub mod encoder;
pub mod frames;
pub mod video;

pub use artifact::{
    avatar_filename, banner_filename, sanitize_filename_part, ArtifactKind, ExportArtifact,
    GeneratorSession,
};
pub use encoder::{AbortHandle, EncoderFactory, FrameEncoder, GifEncoderFactory, GifFrameEncoder};
pub use frames::{export_avatar, export_banner, fade_alpha, ExportContext};
pub use video::{character_clip_url, load_character_clip, CharacterClip, FfmpegClip, VideoClip};
