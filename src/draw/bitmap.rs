//! PNG <-> Cairo surface helpers for captured bitmaps.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::io::Cursor;
use thiserror::Error;

/// Prefix some producers put in front of base64 PNG payloads.
pub const DATA_URL_PREFIX: &str = "data:image/png;base64,";

#[derive(Debug, Error)]
pub enum BitmapError {
    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("PNG codec error: {0}")]
    Png(#[from] cairo::IoError),

    #[error("cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("crop region {0}x{1} is empty")]
    EmptyCrop(i32, i32),
}

/// Decodes PNG bytes into an ARGB surface.
pub fn decode_png(bytes: &[u8]) -> Result<cairo::ImageSurface, BitmapError> {
    let mut cursor = Cursor::new(bytes);
    Ok(cairo::ImageSurface::create_from_png(&mut cursor)?)
}

/// Encodes a surface as PNG bytes.
pub fn encode_png(surface: &cairo::ImageSurface) -> Result<Vec<u8>, BitmapError> {
    let mut buffer = Vec::new();
    surface.write_to_png(&mut buffer)?;
    Ok(buffer)
}

/// Strips an optional data-URL prefix and decodes standard base64.
pub fn decode_base64_png(payload: &str) -> Result<Vec<u8>, BitmapError> {
    let trimmed = payload.strip_prefix(DATA_URL_PREFIX).unwrap_or(payload);
    Ok(BASE64.decode(trimmed.trim())?)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Copies a pixel rectangle out of `source`, clipped to its bounds.
pub fn crop(
    source: &cairo::ImageSurface,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
) -> Result<cairo::ImageSurface, BitmapError> {
    let left = x.clamp(0, source.width());
    let top = y.clamp(0, source.height());
    let right = x.saturating_add(width).clamp(0, source.width());
    let bottom = y.saturating_add(height).clamp(0, source.height());
    let (crop_width, crop_height) = (right - left, bottom - top);
    if crop_width <= 0 || crop_height <= 0 {
        return Err(BitmapError::EmptyCrop(crop_width, crop_height));
    }

    let target = cairo::ImageSurface::create(cairo::Format::ARgb32, crop_width, crop_height)?;
    let ctx = cairo::Context::new(&target)?;
    ctx.set_source_surface(source, -(left as f64), -(top as f64))?;
    ctx.set_operator(cairo::Operator::Source);
    ctx.paint()?;
    drop(ctx);
    target.flush();
    Ok(target)
}
