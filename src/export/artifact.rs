use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::types::{CanvasSize, SizePreset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Gif,
    Png,
}

impl ArtifactKind {
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Gif => "gif",
            ArtifactKind::Png => "png",
        }
    }
}

/// An encoded export ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub bytes: Vec<u8>,
    pub kind: ArtifactKind,
    pub filename: String,
    pub frame_count: usize,
}

fn is_kept(unit: u16) -> bool {
    matches!(unit, 0x30..=0x39 | 0x41..=0x5a | 0x61..=0x7a | 0x4e00..=0x9fa5)
}

/// Replaces everything except ASCII alphanumerics and CJK ideographs
/// U+4E00..=U+9FA5 with `_`, one per UTF-16 code unit.
pub fn sanitize_filename_part(raw: &str) -> String {
    raw.encode_utf16()
        .map(|unit| if is_kept(unit) { char::from_u32(unit as u32).unwrap_or('_') } else { '_' })
        .collect()
}

fn size_label(size: CanvasSize) -> String {
    [SizePreset::Banner, SizePreset::Card, SizePreset::Avatar]
        .into_iter()
        .find(|preset| preset.size() == size)
        .map(|preset| preset.name().to_string())
        .unwrap_or_else(|| size.to_string())
}

pub fn banner_filename(size: CanvasSize, millis: u128) -> String {
    format!("banner_{}_{millis}.gif", size_label(size))
}

pub fn avatar_filename(nickname: &str, character: &str, millis: u128, kind: ArtifactKind) -> String {
    format!(
        "lstation_{}_{}_{millis}.{}",
        sanitize_filename_part(nickname),
        sanitize_filename_part(character),
        kind.extension()
    )
}

/// Milliseconds since the Unix epoch, for export filenames.
pub fn timestamp_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Holds the most recent export of a generator until it is saved or reset.
#[derive(Debug, Default)]
pub struct GeneratorSession {
    artifact: Option<ExportArtifact>,
}

impl GeneratorSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps `artifact`, releasing any previous one.
    pub fn store(&mut self, artifact: ExportArtifact) -> &ExportArtifact {
        self.artifact.insert(artifact)
    }

    pub fn artifact(&self) -> Option<&ExportArtifact> {
        self.artifact.as_ref()
    }

    /// Writes the held artifact into `dir` under its suggested filename.
    pub fn save_to(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let Some(artifact) = &self.artifact else {
            return Ok(None);
        };
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&artifact.filename);
        std::fs::write(&path, &artifact.bytes)?;
        info!(path = %path.display(), bytes = artifact.bytes.len(), "export saved");
        Ok(Some(path))
    }

    pub fn reset(&mut self) {
        self.artifact = None;
    }
}
