use crate::backgrounds::BackgroundPreset;
use crate::error::ErrorPayload;
use crate::export::{ArtifactKind, ExportArtifact};
use crate::scene::{SceneComposer, Variant};
use crate::types::{CanvasSize, LayerId};
use crate::viewer::{EmbedPlan, TextPanel};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Schema version for output payloads.
pub const WIXO_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum WixoOutput {
    Banner(ExportOutput),
    Avatar(ExportOutput),
    Viewer(ViewerOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOutput {
    pub version: String,
    pub variant: Variant,
    pub size: CanvasSize,
    pub background: BackgroundPreset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
    pub artifact: ArtifactSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_to: Option<PathBuf>,
    pub layers: Vec<LayerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<LayerId>,
}

impl ExportOutput {
    pub fn new(composer: &SceneComposer, artifact: &ExportArtifact) -> Self {
        let scene = composer.scene();
        Self {
            version: WIXO_OUTPUT_VERSION.to_string(),
            variant: composer.variant(),
            size: composer.size(),
            background: scene.background.preset,
            character: None,
            artifact: ArtifactSummary::from(artifact),
            saved_to: None,
            layers: scene.draw_order().map(|layer| LayerSummary {
                id: layer.id,
                x: layer.position.x,
                y: layer.position.y,
                scale: layer.scale(),
                rotation: layer.rotation,
            })
            .collect(),
            selected: composer.selected(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactSummary {
    pub kind: ArtifactKind,
    pub filename: String,
    pub frame_count: usize,
    pub bytes: usize,
}

impl From<&ExportArtifact> for ArtifactSummary {
    fn from(artifact: &ExportArtifact) -> Self {
        Self {
            kind: artifact.kind,
            filename: artifact.filename.clone(),
            frame_count: artifact.frame_count,
            bytes: artifact.bytes.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    pub id: LayerId,
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerOutput {
    pub version: String,
    pub embeds: Vec<EmbedOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedOutput {
    #[serde(flatten)]
    pub plan: EmbedPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextPanel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}
