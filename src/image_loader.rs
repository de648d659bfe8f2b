use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView, ImageError, ImageOutputFormat, RgbaImage};
use thiserror::Error;
use tiny_skia::{ColorU8, Pixmap};

#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("Failed to load image: {0}")]
    Load(#[from] ImageError),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Invalid data URL: {0}")]
    DataUrl(String),
    #[error("Failed to save image: {0}")]
    Save(String),
}

/// Destination rectangle for drawing an image into a target area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

pub fn load_image(path: &str) -> Result<DynamicImage, ImageLoadError> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(ImageLoadError::NotFound(path.display().to_string()));
    }
    Ok(image::open(path)?)
}

pub fn decode_image_bytes(bytes: &[u8]) -> Result<DynamicImage, ImageLoadError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Decodes a `data:[<mime>][;base64],<payload>` URL as produced by a file picker.
pub fn decode_data_url(data_url: &str) -> Result<DynamicImage, ImageLoadError> {
    let rest = data_url
        .strip_prefix("data:")
        .ok_or_else(|| ImageLoadError::DataUrl("missing data: scheme".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImageLoadError::DataUrl("missing ',' separator".into()))?;
    if !meta.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        return Err(ImageLoadError::DataUrl(
            "only base64-encoded image payloads are supported".into(),
        ));
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| ImageLoadError::DataUrl(e.to_string()))?;
    decode_image_bytes(&bytes)
}

/// Loads an upload given either as a `data:` URL or a filesystem path.
pub fn load_image_source(source: &str) -> Result<DynamicImage, ImageLoadError> {
    if source.starts_with("data:") {
        decode_data_url(source)
    } else {
        load_image(source)
    }
}

/// Like [`load_image_source`], but also fetches `http(s)` URLs.
pub async fn fetch_image_source(
    client: &reqwest::Client,
    source: &str,
) -> crate::error::Result<DynamicImage> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let bytes = client
            .get(source)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        return Ok(decode_image_bytes(&bytes)?);
    }
    Ok(load_image_source(source)?)
}

/// Scale to fully cover the target, centered, cropping overflow.
pub fn cover_rect(src_w: u32, src_h: u32, dst_w: f32, dst_h: f32) -> FitRect {
    fit_rect(src_w, src_h, dst_w, dst_h, f32::max)
}

/// Scale to fit entirely inside the target, centered, letterboxed.
pub fn contain_rect(src_w: u32, src_h: u32, dst_w: f32, dst_h: f32) -> FitRect {
    fit_rect(src_w, src_h, dst_w, dst_h, f32::min)
}

fn fit_rect(
    src_w: u32,
    src_h: u32,
    dst_w: f32,
    dst_h: f32,
    pick: fn(f32, f32) -> f32,
) -> FitRect {
    if src_w == 0 || src_h == 0 {
        return FitRect {
            x: 0.0,
            y: 0.0,
            width: dst_w,
            height: dst_h,
        };
    }
    let scale = pick(dst_w / src_w as f32, dst_h / src_h as f32);
    let width = src_w as f32 * scale;
    let height = src_h as f32 * scale;
    FitRect {
        x: (dst_w - width) / 2.0,
        y: (dst_h - height) / 2.0,
        width,
        height,
    }
}

/// Converts a decoded image into a premultiplied pixmap for drawing.
pub fn to_pixmap(img: &DynamicImage) -> Option<Pixmap> {
    let (width, height) = img.dimensions();
    let rgba = img.to_rgba8();
    let mut pixmap = Pixmap::new(width, height)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Converts a pixmap back into a straight-alpha RGBA buffer.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        dst.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    out
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, ImageLoadError> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|e| ImageLoadError::Save(e.to_string()))?;
    Ok(bytes)
}
