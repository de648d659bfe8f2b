//! Scene editing: pointer gestures, keyboard edits and rendering.

use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, error};

use crate::backgrounds::{BackgroundPreset, FramePhase};
use crate::canvas::{Canvas, FontBook};
use crate::config::{ComposerConfig, DragBounds};
use crate::error::{Result, WidgetError};
use crate::image_loader::to_pixmap;
use crate::types::{CanvasSize, ColorSpec, LayerId, Point, SizePreset};

use super::draw::{draw_background, draw_layer, DrawContext};
use super::input::EditAction;
use super::{Layer, Scene, Variant, STICKER_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Interactive preview: selection outline and placeholders.
    #[default]
    Preview,
    /// Exported frame: no selection outline.
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Animation frame for preset backgrounds; `None` renders the static preview.
    pub phase: Option<FramePhase>,
    /// Global alpha applied to the layers, not the background.
    pub content_alpha: f32,
}

impl RenderOptions {
    pub fn preview() -> Self {
        Self {
            mode: RenderMode::Preview,
            phase: None,
            content_alpha: 1.0,
        }
    }

    pub fn export(phase: Option<FramePhase>) -> Self {
        Self {
            mode: RenderMode::Export,
            phase,
            content_alpha: 1.0,
        }
    }

    pub fn with_content_alpha(mut self, alpha: f32) -> Self {
        self.content_alpha = alpha;
        self
    }
}

/// What a completed pointer gesture did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Selected(LayerId),
    Dragged(LayerId),
    Cleared,
    Ignored,
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    layer: LayerId,
    origin: Point,
    offset: Point,
    moved: bool,
}

/// Owns a [`Scene`] and applies user input to it.
#[derive(Debug)]
pub struct SceneComposer {
    scene: Scene,
    rotation_step: f32,
    click_threshold: f32,
    drag_bounds: DragBounds,
    gesture: Option<Gesture>,
}

impl SceneComposer {
    pub fn new(variant: Variant, size: CanvasSize, config: &ComposerConfig) -> Result<Self> {
        if size.is_empty() {
            let err = WidgetError::config(format!("Cannot compose a {size} canvas: size must be non-zero"));
            error!(%variant, %size, "scene composer not created");
            return Err(err);
        }
        debug!(%variant, %size, "scene composer created");
        Ok(Self {
            scene: Scene::new(variant, size),
            rotation_step: config.rotation_step,
            click_threshold: config.click_threshold,
            drag_bounds: config.drag_bounds.unwrap_or_else(|| variant.drag_bounds()),
            gesture: None,
        })
    }

    pub fn for_variant(variant: Variant, config: &ComposerConfig) -> Result<Self> {
        Self::new(variant, variant.default_size_preset().size(), config)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn variant(&self) -> Variant {
        self.scene.variant
    }

    pub fn size(&self) -> CanvasSize {
        self.scene.size
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.scene.layer(id)
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.scene.selected
    }

    /// Selects a layer by id; unknown ids clear the selection.
    pub fn select(&mut self, id: Option<LayerId>) {
        self.scene.selected = id.filter(|id| self.scene.layers.contains_key(id));
    }

    /// Topmost layer whose unrotated, scaled box contains `(x, y)`.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<LayerId> {
        let p = Point::new(x, y);
        self.scene.hit_order().find(|layer| layer.contains(p)).map(|l| l.id)
    }

    /// Starts dragging `layer`, remembering where it was grabbed.
    pub fn begin_drag(&mut self, layer: LayerId, pointer: Point) -> bool {
        let Some(target) = self.scene.layers.get(&layer) else {
            return false;
        };
        self.gesture = Some(Gesture {
            layer,
            origin: pointer,
            offset: pointer - target.position,
            moved: false,
        });
        true
    }

    /// Moves the dragged layer so the grab point follows `pointer`.
    ///
    /// Travel below the click threshold does not move the layer.
    pub fn drag_to(&mut self, pointer: Point) {
        let Some(gesture) = self.gesture.as_mut() else {
            return;
        };
        if !gesture.moved && gesture.origin.distance_to(pointer) < self.click_threshold {
            return;
        }
        gesture.moved = true;
        let (id, offset) = (gesture.layer, gesture.offset);
        let (width, height) = (self.scene.size.width_f(), self.scene.size.height_f());
        if let Some(layer) = self.scene.layers.get_mut(&id) {
            layer.position = pointer - offset;
            if self.drag_bounds == DragBounds::Canvas {
                layer.clamp_into(width, height);
            }
        }
    }

    /// Ends the gesture. A gesture that never left the click threshold selects
    /// its layer; a real drag leaves the selection as it was.
    pub fn end_drag(&mut self) -> PointerOutcome {
        match self.gesture.take() {
            Some(gesture) if gesture.moved => PointerOutcome::Dragged(gesture.layer),
            Some(gesture) => {
                self.scene.selected = Some(gesture.layer);
                PointerOutcome::Selected(gesture.layer)
            }
            None => PointerOutcome::Ignored,
        }
    }

    pub fn dragging(&self) -> Option<LayerId> {
        self.gesture.map(|g| g.layer)
    }

    pub fn pointer_down(&mut self, p: Point) {
        match self.hit_test(p.x, p.y) {
            Some(id) => {
                self.begin_drag(id, p);
            }
            None => {
                self.gesture = None;
                self.scene.selected = None;
            }
        }
    }

    pub fn pointer_move(&mut self, p: Point) {
        self.drag_to(p);
    }

    pub fn pointer_up(&mut self, p: Point) -> PointerOutcome {
        if self.gesture.is_none() {
            return if self.scene.selected.is_none() {
                PointerOutcome::Cleared
            } else {
                PointerOutcome::Ignored
            };
        }
        self.drag_to(p);
        self.end_drag()
    }

    /// Applies a key press to the selected layer. Returns whether the scene changed.
    pub fn apply_key(&mut self, key: &str) -> bool {
        match EditAction::from_key(key) {
            Some(action) => self.apply_action(action),
            None => false,
        }
    }

    pub fn apply_action(&mut self, action: EditAction) -> bool {
        let Some(id) = self.scene.selected else {
            return false;
        };
        if action == EditAction::Delete && id.is_sticker() {
            return self.delete_sticker(id);
        }
        let default_scale = self.scene.variant.default_scale(self.scene.size);
        let step = self.rotation_step;
        let Some(layer) = self.scene.layers.get_mut(&id) else {
            return false;
        };
        match action {
            EditAction::RotateLeft => layer.rotation = (layer.rotation - step) % 360.0,
            EditAction::RotateRight => layer.rotation = (layer.rotation + step) % 360.0,
            EditAction::ScaleUp => layer.set_scale(layer.scale() * 1.1),
            EditAction::ScaleDown => layer.set_scale(layer.scale() * 0.9),
            EditAction::ResetTransform => {
                layer.rotation = 0.0;
                layer.set_scale(1.0);
            }
            EditAction::Delete => {
                layer.rotation = 0.0;
                layer.set_scale(default_scale);
            }
        }
        debug!(layer = %id, ?action, scale = layer.scale(), rotation = layer.rotation, "layer edited");
        true
    }

    /// Adds an uploaded sticker at the canvas centre and selects it.
    pub fn add_sticker(&mut self, image: &DynamicImage) -> Result<LayerId> {
        let pixmap = to_pixmap(image)
            .ok_or_else(|| WidgetError::config("Sticker image has zero size"))?;
        self.scene.sticker_counter += 1;
        let center = Point::new(self.scene.size.width_f() / 2.0, self.scene.size.height_f() / 2.0);
        let layer = Layer::sticker(self.scene.sticker_counter, center, STICKER_SIZE, Arc::new(pixmap));
        let id = layer.id;
        self.scene.layers.insert(id, layer);
        self.scene.sticker_order.push(id);
        self.scene.selected = Some(id);
        debug!(sticker = %id, "sticker added");
        Ok(id)
    }

    /// Removes a sticker from the scene. Fixed layers cannot be deleted.
    pub fn delete_sticker(&mut self, id: LayerId) -> bool {
        if !id.is_sticker() || self.scene.layers.remove(&id).is_none() {
            return false;
        }
        self.scene.sticker_order.retain(|s| *s != id);
        if self.scene.selected == Some(id) {
            self.scene.selected = None;
        }
        if self.gesture.is_some_and(|g| g.layer == id) {
            self.gesture = None;
        }
        debug!(sticker = %id, "sticker deleted");
        true
    }

    /// Uses an uploaded image as the background; the preset falls back to blank.
    pub fn set_background_image(&mut self, image: &DynamicImage) -> Result<()> {
        let pixmap = to_pixmap(image)
            .ok_or_else(|| WidgetError::config("Background image has zero size"))?;
        self.scene.background.custom = Some(Arc::new(pixmap));
        self.scene.background.preset = BackgroundPreset::Blank;
        Ok(())
    }

    pub fn clear_background(&mut self) {
        self.scene.background.custom = None;
    }

    pub fn set_background_opacity(&mut self, opacity: f32) {
        self.scene.background.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    pub fn set_background_preset(&mut self, preset: BackgroundPreset) {
        self.scene.background.preset = preset;
    }

    /// Switches canvas size and lays the fixed layers out again.
    pub fn set_size_preset(&mut self, preset: SizePreset) {
        self.scene.size = preset.size();
        self.scene.init_layout();
        self.gesture = None;
    }

    /// Restores the initial scene: no background image, no stickers, nothing selected.
    pub fn reset_layout(&mut self) {
        for id in self.scene.sticker_order.drain(..) {
            self.scene.layers.remove(&id);
        }
        self.scene.sticker_counter = 0;
        self.scene.selected = None;
        self.scene.background = Default::default();
        self.scene.init_layout();
        self.gesture = None;
    }

    pub fn set_nickname(&mut self, text: impl Into<String>) {
        self.scene.nickname.text = text.into();
    }

    pub fn set_nickname_font(&mut self, font: impl Into<String>) {
        self.scene.nickname.font = font.into();
    }

    pub fn set_nickname_color(&mut self, color: ColorSpec) {
        self.scene.nickname.color = color;
    }

    pub fn set_logo(&mut self, image: &DynamicImage) -> Result<()> {
        let pixmap = to_pixmap(image).ok_or_else(|| WidgetError::config("Logo image has zero size"))?;
        self.scene.logo = Some(Arc::new(pixmap));
        Ok(())
    }

    fn highlighted(&self, mode: RenderMode) -> Option<LayerId> {
        if mode == RenderMode::Export {
            return None;
        }
        match self.scene.variant {
            Variant::Banner => self.scene.selected,
            Variant::Avatar => self.dragging(),
        }
    }

    /// Draws the whole scene: background, then layers bottom to top.
    pub fn render(&self, canvas: &mut Canvas, options: RenderOptions, fonts: &FontBook) {
        let scene = &self.scene;
        draw_background(canvas, &scene.background, scene.size, options.phase, fonts);

        let ctx = DrawContext {
            fonts,
            nickname: &scene.nickname,
            logo: scene.logo.as_deref(),
            placeholders: scene.variant == Variant::Banner || options.mode == RenderMode::Preview,
        };
        let highlight = self.highlighted(options.mode);
        canvas.save();
        canvas.set_alpha(options.content_alpha);
        for layer in scene.draw_order() {
            draw_layer(canvas, scene.variant, layer, &ctx, highlight == Some(layer.id));
        }
        canvas.restore();
    }

    /// Renders into a fresh canvas of the scene's size.
    pub fn render_to_canvas(&self, options: RenderOptions, fonts: &FontBook) -> Result<Canvas> {
        let mut canvas = Canvas::new(self.scene.size)?;
        self.render(&mut canvas, options, fonts);
        Ok(canvas)
    }
}
