//! Overlay-local <-> monitor coordinate mapping.
//!
//! Three spaces are involved:
//! - overlay-local pixels, as reported by pointer events on the overlay viewport
//! - the monitor's logical space (global, device-independent units)
//! - the monitor's physical framebuffer pixels
//!
//! The mapping is monotonic and clamps at the monitor bounds; a selection
//! dragged past a screen edge is clipped, never extended onto a neighbour.

use super::metadata::OverlayMetadata;
use crate::util::{Rect, Size, clamp_f64};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geometry problems that are handled locally by resetting the selection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Selection {width:.0}x{height:.0} is smaller than the minimum of {min:.0} pixels")]
    SelectionTooSmall { width: f64, height: f64, min: f64 },

    #[error("Monitor metadata is missing '{0}'")]
    MissingMetadata(&'static str),

    #[error("Monitor metadata is invalid: {0}")]
    InvalidMetadata(String),

    #[error("Region {width:.1}x{height:.1} is empty after clipping to the monitor")]
    DegenerateRect { width: f64, height: f64 },
}

/// Integer pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Region handed to the capture backend.
///
/// `x/y/width/height` are integer global logical coordinates; the scale
/// fields convert them to physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_scale", alias = "scaleX")]
    pub scale_x: f64,
    #[serde(default = "default_scale", alias = "scaleY")]
    pub scale_y: f64,
    /// Physical origin of the monitor the region was mapped on
    #[serde(default)]
    pub monitor_origin_x: i32,
    #[serde(default)]
    pub monitor_origin_y: i32,
    /// Logical origin of that monitor
    #[serde(default)]
    pub monitor_logical_x: f64,
    #[serde(default)]
    pub monitor_logical_y: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl CaptureRegion {
    /// Physical width, never below one pixel.
    pub fn physical_width(&self) -> u32 {
        ((self.width as f64) * self.scale_x).round().max(1.0) as u32
    }

    /// Physical height, never below one pixel.
    pub fn physical_height(&self) -> u32 {
        ((self.height as f64) * self.scale_y).round().max(1.0) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The region in global physical framebuffer pixels.
    pub fn physical_rect(&self) -> PixelRect {
        let dx = self.x as f64 - self.monitor_logical_x;
        let dy = self.y as f64 - self.monitor_logical_y;
        PixelRect {
            x: self.monitor_origin_x + (dx * self.scale_x).round() as i32,
            y: self.monitor_origin_y + (dy * self.scale_y).round() as i32,
            width: self.physical_width(),
            height: self.physical_height(),
        }
    }
}

/// `(scale_x, scale_y)`: physical monitor pixels per overlay pixel.
///
/// Falls back to the metadata's scale factor (then 1.0) when either the
/// viewport or the monitor size is degenerate.
pub fn scale_for(metadata: &OverlayMetadata, viewport: Size) -> (f64, f64) {
    if viewport.is_degenerate() || metadata.physical_size().is_degenerate() {
        let fallback = if metadata.scale_factor.is_finite() && metadata.scale_factor > 0.0 {
            metadata.scale_factor
        } else {
            1.0
        };
        return (fallback, fallback);
    }
    (
        metadata.width as f64 / viewport.width,
        metadata.height as f64 / viewport.height,
    )
}

/// Maps between one overlay viewport and the monitor underneath it.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateTransform {
    metadata: OverlayMetadata,
    viewport: Size,
}

impl CoordinateTransform {
    /// `viewport` is the overlay's rendered size; a degenerate viewport means
    /// "same as the monitor's logical size".
    pub fn new(metadata: OverlayMetadata, viewport: Size) -> Self {
        let viewport = if viewport.is_degenerate() {
            metadata.logical_size()
        } else {
            viewport
        };
        Self { metadata, viewport }
    }

    pub fn metadata(&self) -> &OverlayMetadata {
        &self.metadata
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn scale(&self) -> (f64, f64) {
        scale_for(&self.metadata, self.viewport)
    }

    /// Logical units per overlay pixel.
    fn logical_per_overlay(&self) -> (f64, f64) {
        let logical = self.metadata.logical_size();
        if logical.is_degenerate() || self.viewport.is_degenerate() {
            return (1.0, 1.0);
        }
        (
            logical.width / self.viewport.width,
            logical.height / self.viewport.height,
        )
    }

    /// Translates an overlay-local rectangle into the capture region.
    ///
    /// Corners are clamped into the monitor's logical bounds and rounded to
    /// whole logical units; a result narrower or shorter than one unit is an
    /// error.
    pub fn to_monitor_rect(&self, rect: Rect) -> Result<CaptureRegion, GeometryError> {
        let bounds = self.metadata.logical_bounds();
        let (kx, ky) = self.logical_per_overlay();

        let left = clamp_f64(bounds.x + rect.x * kx, bounds.x, bounds.right());
        let top = clamp_f64(bounds.y + rect.y * ky, bounds.y, bounds.bottom());
        let right = clamp_f64(bounds.x + rect.right() * kx, bounds.x, bounds.right());
        let bottom = clamp_f64(bounds.y + rect.bottom() * ky, bounds.y, bounds.bottom());

        let width = (right - left).round();
        let height = (bottom - top).round();
        if width < 1.0 || height < 1.0 {
            return Err(GeometryError::DegenerateRect { width, height });
        }

        let logical = self.metadata.logical_size();
        let (scale_x, scale_y) = if logical.is_degenerate() {
            (self.metadata.scale_factor, self.metadata.scale_factor)
        } else {
            (
                self.metadata.width as f64 / logical.width,
                self.metadata.height as f64 / logical.height,
            )
        };

        Ok(CaptureRegion {
            x: left.round() as i32,
            y: top.round() as i32,
            width: width as u32,
            height: height as u32,
            scale_x,
            scale_y,
            monitor_origin_x: self.metadata.origin_x,
            monitor_origin_y: self.metadata.origin_y,
            monitor_logical_x: bounds.x,
            monitor_logical_y: bounds.y,
        })
    }

    /// Projects a rectangle in global physical pixels into overlay-local pixels.
    ///
    /// The result is not clipped; see [`CoordinateTransform::clip_to_viewport`].
    pub fn to_overlay_rect(&self, physical: Rect) -> Rect {
        let (sx, sy) = self.scale();
        Rect::new(
            (physical.x - self.metadata.origin_x as f64) / sx,
            (physical.y - self.metadata.origin_y as f64) / sy,
            physical.width / sx,
            physical.height / sy,
        )
    }

    /// Clips an overlay-local rectangle to the viewport.
    pub fn clip_to_viewport(&self, rect: Rect) -> Option<Rect> {
        rect.intersection(&Rect::new(0.0, 0.0, self.viewport.width, self.viewport.height))
    }
}
