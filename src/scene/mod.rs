//! Layered scene model shared by the banner and avatar generators.
//!
//! A [`Scene`] holds the canvas size, the background, three fixed layers
//! (logo, label, nickname) and any uploaded stickers. It is owned and
//! mutated by a [`SceneComposer`]; the draw functions in [`draw`] read it.

pub mod composer;
pub mod draw;
pub mod input;
mod layer;
mod profile;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;

use crate::backgrounds::BackgroundPreset;
use crate::types::{CanvasSize, ColorSpec, LayerId};

pub use composer::{PointerOutcome, RenderMode, RenderOptions, SceneComposer};
pub use input::{parse_script, EditAction, ScriptStep};
pub use layer::{Layer, MAX_FIXED_SCALE, MIN_FIXED_SCALE, MIN_STICKER_SCALE};
pub use profile::{SelectionStyle, TextLayout, Variant, STICKER_SIZE};

pub const NICKNAME_PLACEHOLDER: &str = "昵称";
pub const LABEL_TEXT: &str = "LINUX DO";
pub const DEFAULT_FONT: &str = "Microsoft YaHei";

#[derive(Debug, Clone)]
pub struct Background {
    /// Uploaded image; takes precedence over the preset.
    pub custom: Option<Arc<Pixmap>>,
    /// Opacity of the uploaded image, in [0, 1].
    pub opacity: f32,
    pub preset: BackgroundPreset,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            custom: None,
            opacity: 1.0,
            preset: BackgroundPreset::Blank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NicknameStyle {
    pub text: String,
    pub font: String,
    pub color: ColorSpec,
}

impl NicknameStyle {
    /// The text to draw: the trimmed nickname, or a placeholder when empty.
    pub fn display_text(&self) -> &str {
        match self.text.trim() {
            "" => NICKNAME_PLACEHOLDER,
            text => text,
        }
    }
}

impl Default for NicknameStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: DEFAULT_FONT.to_string(),
            color: ColorSpec::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub variant: Variant,
    pub size: CanvasSize,
    pub background: Background,
    pub nickname: NicknameStyle,
    pub logo: Option<Arc<Pixmap>>,
    pub(crate) layers: HashMap<LayerId, Layer>,
    pub(crate) sticker_order: Vec<LayerId>,
    pub(crate) sticker_counter: u32,
    pub(crate) selected: Option<LayerId>,
}

impl Scene {
    pub(crate) fn new(variant: Variant, size: CanvasSize) -> Self {
        let mut scene = Self {
            variant,
            size,
            background: Background::default(),
            nickname: NicknameStyle::default(),
            logo: None,
            layers: HashMap::new(),
            sticker_order: Vec::new(),
            sticker_counter: 0,
            selected: None,
        };
        scene.init_layout();
        scene
    }

    /// Places the fixed layers at their initial layout for the current size.
    pub(crate) fn init_layout(&mut self) {
        for layer in self.variant.fixed_layers(self.size) {
            self.layers.insert(layer.id, layer);
        }
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    pub fn stickers(&self) -> &[LayerId] {
        &self.sticker_order
    }

    /// Layers bottom to top: fixed layers, then stickers in upload order.
    pub fn draw_order(&self) -> impl Iterator<Item = &Layer> + '_ {
        LayerId::FIXED_DRAW_ORDER
            .into_iter()
            .chain(self.sticker_order.iter().copied())
            .filter_map(move |id| self.layers.get(&id))
    }

    /// Layers in hit-test priority: stickers, then nickname, label, logo.
    pub fn hit_order(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.sticker_order
            .iter()
            .copied()
            .chain(LayerId::FIXED_HIT_ORDER)
            .filter_map(move |id| self.layers.get(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SizePreset;

    #[test]
    fn nickname_placeholder_applies_to_blank_text() {
        let mut style = NicknameStyle::default();
        assert_eq!(style.display_text(), "昵称");
        style.text = "  Alice ".into();
        assert_eq!(style.display_text(), "Alice");
    }

    #[test]
    fn new_scene_has_three_fixed_layers() {
        let scene = Scene::new(Variant::Banner, SizePreset::Banner.size());
        assert_eq!(scene.draw_order().count(), 3);
        let ids: Vec<_> = scene.hit_order().map(|l| l.id).collect();
        assert_eq!(ids, vec![LayerId::Nickname, LayerId::Label, LayerId::Logo]);
        assert!(scene.selected().is_none());
    }
}
