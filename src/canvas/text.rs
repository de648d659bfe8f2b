//! Text shaping-lite: per-character glyph outlines from TrueType/OpenType
//! faces, laid out left to right with horizontal advances.
//!
//! Families resolve through a `fontdb` database holding the installed fonts
//! and any configured files. A character missing from the chosen face falls
//! back to the first face that has it; only when no face does it render as a
//! solid placeholder block, so layouts stay measurable.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, RwLock};

use fontdb::{Database, Family, Query, ID};
use tiny_skia::{PathBuilder, Transform};
use tracing::{debug, warn};

use super::{Canvas, Fill};
use crate::config::FontConfig;
use crate::error::{Result, WidgetError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: Option<String>,
    pub size: f32,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl TextStyle {
    pub fn new(size: f32) -> Self {
        Self {
            family: None,
            size,
            align: TextAlign::Left,
            baseline: TextBaseline::Alphabetic,
        }
    }

    pub fn family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn baseline(mut self, baseline: TextBaseline) -> Self {
        self.baseline = baseline;
        self
    }
}

/// Raw bytes of one face, cached after the first lookup.
struct FaceData {
    data: Vec<u8>,
    index: u32,
}

impl FaceData {
    fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }
}

/// Converts ttf-parser outline callbacks into a tiny-skia path in font units.
struct GlyphOutlineBuilder {
    builder: PathBuilder,
}

impl ttf_parser::OutlineBuilder for GlyphOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

enum GlyphShape {
    Outline {
        face: Arc<FaceData>,
        glyph: ttf_parser::GlyphId,
        /// Font units to pixels.
        scale: f32,
    },
    Block,
    Blank,
}

struct PositionedGlyph {
    shape: GlyphShape,
    x: f32,
    advance: f32,
}

struct LineLayout {
    glyphs: Vec<PositionedGlyph>,
    width: f32,
    ascender: f32,
    descender: f32,
}

/// Font registry: installed and configured faces, looked up by family name.
#[derive(Clone)]
pub struct FontBook {
    db: Arc<Database>,
    /// Picker family name to the face loaded from its configured file.
    families: BTreeMap<String, ID>,
    default: Option<ID>,
    faces: Arc<RwLock<HashMap<ID, Option<Arc<FaceData>>>>>,
    fallbacks: Arc<RwLock<HashMap<char, Option<ID>>>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .field("families", &self.families.keys().collect::<Vec<_>>())
            .field("default", &self.default)
            .finish()
    }
}

impl FontBook {
    /// A book with no fonts; all text renders as placeholder blocks.
    pub fn empty() -> Self {
        Self::from_database(Database::new(), BTreeMap::new(), None)
    }

    /// Installed fonts (unless disabled), font directories, then the
    /// configured files.
    pub fn from_config(config: &FontConfig) -> Result<Self> {
        let mut db = Database::new();
        if config.system_fonts {
            db.load_system_fonts();
        }
        for dir in &config.dirs {
            db.load_fonts_dir(dir);
        }
        let default = match &config.default {
            Some(path) => Some(load_font_file(&mut db, path)?),
            None => None,
        };
        let mut families = BTreeMap::new();
        for (family, path) in &config.families {
            families.insert(family.clone(), load_font_file(&mut db, path)?);
        }
        debug!(
            faces = db.len(),
            families = families.len(),
            has_default = default.is_some(),
            "font book loaded"
        );
        Ok(Self::from_database(db, families, default))
    }

    fn from_database(db: Database, families: BTreeMap<String, ID>, default: Option<ID>) -> Self {
        Self {
            db: Arc::new(db),
            families,
            default,
            faces: Arc::default(),
            fallbacks: Arc::default(),
        }
    }

    pub fn has_fonts(&self) -> bool {
        !self.db.is_empty()
    }

    /// Families known to the book, configured names first.
    pub fn family_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let configured = self.families.keys().cloned();
        let installed = self
            .db
            .faces()
            .filter_map(|info| info.families.first().map(|(name, _)| name.clone()));
        configured
            .chain(installed)
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    fn query(&self, family: Family<'_>) -> Option<ID> {
        self.db.query(&Query {
            families: &[family],
            weight: fontdb::Weight::NORMAL,
            stretch: fontdb::Stretch::Normal,
            style: fontdb::Style::Normal,
        })
    }

    /// Face for `family`: a configured file, an installed family of that
    /// name, the configured default, a sans-serif face, then any face.
    fn resolve(&self, family: Option<&str>) -> Option<ID> {
        family
            .and_then(|name| {
                self.families
                    .get(name)
                    .copied()
                    .or_else(|| self.query(Family::Name(name)))
            })
            .or(self.default)
            .or_else(|| self.query(Family::SansSerif))
            .or_else(|| self.db.faces().next().map(|info| info.id))
    }

    fn face_data(&self, id: ID) -> Option<Arc<FaceData>> {
        if let Some(cached) = self.faces.read().ok().and_then(|faces| faces.get(&id).cloned()) {
            return cached;
        }
        let loaded = self
            .db
            .with_face_data(id, |data, index| FaceData {
                data: data.to_vec(),
                index,
            })
            .filter(|face| face.face().is_some())
            .map(Arc::new);
        if let Ok(mut faces) = self.faces.write() {
            faces.insert(id, loaded.clone());
        }
        loaded
    }

    /// First face in the database with a glyph for `ch`.
    fn fallback_for(&self, ch: char) -> Option<ID> {
        if let Some(hit) = self
            .fallbacks
            .read()
            .ok()
            .and_then(|fallbacks| fallbacks.get(&ch).copied())
        {
            return hit;
        }
        let found = self
            .db
            .faces()
            .map(|info| info.id)
            .find(|id| {
                self.db
                    .with_face_data(*id, |data, index| {
                        ttf_parser::Face::parse(data, index)
                            .ok()
                            .and_then(|face| face.glyph_index(ch))
                            .is_some()
                    })
                    .unwrap_or(false)
            });
        if found.is_none() {
            debug!(%ch, "no installed face has this character");
        }
        if let Ok(mut fallbacks) = self.fallbacks.write() {
            fallbacks.insert(ch, found);
        }
        found
    }

    fn glyph_for(&self, primary: Option<&Arc<FaceData>>, ch: char, size: f32) -> Option<(GlyphShape, f32)> {
        if let Some(found) = primary.and_then(|face| outline_glyph(face, ch, size)) {
            return Some(found);
        }
        let fallback = self.fallback_for(ch)?;
        outline_glyph(&self.face_data(fallback)?, ch, size)
    }

    fn layout(&self, text: &str, style: &TextStyle) -> LineLayout {
        let size = style.size.max(0.0);
        let primary = self
            .resolve(style.family.as_deref())
            .and_then(|id| self.face_data(id));

        let (ascender, descender) = match primary.as_ref().and_then(|data| data.face()) {
            Some(face) => {
                let scale = size / face.units_per_em() as f32;
                (face.ascender() as f32 * scale, face.descender() as f32 * scale)
            }
            None => (size * 0.8, -size * 0.2),
        };

        let mut glyphs = Vec::with_capacity(text.chars().count());
        let mut pen = 0.0;
        for ch in text.chars() {
            let (shape, advance) = match self.glyph_for(primary.as_ref(), ch, size) {
                Some(found) => found,
                None if ch.is_whitespace() => (GlyphShape::Blank, size * 0.3),
                None if ch.is_ascii() => (GlyphShape::Block, size * 0.6),
                None => (GlyphShape::Block, size),
            };
            glyphs.push(PositionedGlyph {
                shape,
                x: pen,
                advance,
            });
            pen += advance;
        }

        LineLayout {
            glyphs,
            width: pen,
            ascender,
            descender,
        }
    }

    /// Advance width of `text` in pixels.
    pub fn measure(&self, text: &str, style: &TextStyle) -> f32 {
        self.layout(text, style).width
    }

    /// Draws a single line of text anchored at (`x`, `y`) per the style's align/baseline.
    pub fn draw_text(
        &self,
        canvas: &mut Canvas,
        text: &str,
        x: f32,
        y: f32,
        style: &TextStyle,
        fill: &Fill,
    ) {
        if text.is_empty() || style.size <= 0.0 {
            return;
        }
        let layout = self.layout(text, style);
        let origin_x = match style.align {
            TextAlign::Left => x,
            TextAlign::Center => x - layout.width / 2.0,
        };
        let baseline_y = match style.baseline {
            TextBaseline::Alphabetic => y,
            TextBaseline::Middle => y + (layout.ascender + layout.descender) / 2.0,
        };
        for glyph in &layout.glyphs {
            let pen_x = origin_x + glyph.x;
            match &glyph.shape {
                GlyphShape::Outline { face, glyph: id, scale } => {
                    let Some(face) = face.face() else { continue };
                    let mut builder = GlyphOutlineBuilder {
                        builder: PathBuilder::new(),
                    };
                    if face.outline_glyph(*id, &mut builder).is_none() {
                        continue;
                    }
                    let placed = builder.builder.finish().and_then(|path| {
                        path.transform(Transform::from_row(
                            *scale, 0.0, 0.0, -*scale, pen_x, baseline_y,
                        ))
                    });
                    if let Some(path) = placed {
                        canvas.fill_path(&path, fill);
                    }
                }
                GlyphShape::Block => {
                    let height = style.size * 0.7;
                    canvas.fill_rect(
                        pen_x + glyph.advance * 0.1,
                        baseline_y - height,
                        glyph.advance * 0.8,
                        height,
                        fill,
                    );
                }
                GlyphShape::Blank => {}
            }
        }
    }
}

fn outline_glyph(data: &Arc<FaceData>, ch: char, size: f32) -> Option<(GlyphShape, f32)> {
    let face = data.face()?;
    let glyph = face.glyph_index(ch)?;
    let scale = size / face.units_per_em() as f32;
    let advance = face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * scale;
    let shape = GlyphShape::Outline {
        face: data.clone(),
        glyph,
        scale,
    };
    Some((shape, advance))
}

/// Adds a configured font file and returns the id of its first face.
fn load_font_file(db: &mut Database, path: &Path) -> Result<ID> {
    let data = std::fs::read(path).map_err(|e| {
        warn!(path = %path.display(), error = %e, "font file unreadable");
        WidgetError::config(format!("Font file {} could not be read: {e}", path.display()))
    })?;
    if let Err(e) = ttf_parser::Face::parse(&data, 0) {
        return Err(WidgetError::config(format!(
            "Font file {} could not be parsed: {e}",
            path.display()
        )));
    }
    let known: HashSet<ID> = db.faces().map(|info| info.id).collect();
    db.load_font_data(data);
    db.faces()
        .map(|info| info.id)
        .find(|id| !known.contains(id))
        .ok_or_else(|| {
            WidgetError::config(format!("Font file {} has no usable face", path.display()))
        })
}
