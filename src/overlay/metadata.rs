//! Per-monitor overlay geometry.

use super::GeometryError;
use crate::util::{Rect, Size};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Geometry of the monitor an overlay session covers.
///
/// Physical values are framebuffer pixels in the global desktop space;
/// logical values are device-independent units. Logical size is always
/// physical size divided by `scale_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayMetadata {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
    pub logical_origin_x: f64,
    pub logical_origin_y: f64,
    pub logical_width: f64,
    pub logical_height: f64,
    /// Logical height of the primary monitor (used by hosts with a flipped Y axis)
    #[serde(default)]
    pub primary_height: f64,
}

impl OverlayMetadata {
    /// Builds metadata from physical geometry, deriving the logical values.
    pub fn from_physical(
        origin_x: i32,
        origin_y: i32,
        width: u32,
        height: u32,
        scale: f64,
    ) -> Self {
        let scale_factor = sanitize_scale(scale);
        Self {
            origin_x,
            origin_y,
            width,
            height,
            scale_factor,
            logical_origin_x: origin_x as f64 / scale_factor,
            logical_origin_y: origin_y as f64 / scale_factor,
            logical_width: width as f64 / scale_factor,
            logical_height: height as f64 / scale_factor,
            primary_height: height as f64 / scale_factor,
        }
    }

    /// Parses the overlay launch query, e.g.
    /// `origin_x=0&origin_y=0&width=2880&height=1800&scale=2`.
    ///
    /// A leading `?` or a full `path?query` string is accepted. Logical values
    /// that are absent are derived from the physical ones.
    pub fn from_query(query: &str) -> Result<Self, GeometryError> {
        let query = query.split_once('?').map(|(_, q)| q).unwrap_or(query);
        let params: HashMap<String, String> = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        let number = |key: &'static str| -> Result<Option<f64>, GeometryError> {
            match params.get(key) {
                None => Ok(None),
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(Some)
                    .ok_or_else(|| GeometryError::InvalidMetadata(format!("{key}={raw}"))),
            }
        };
        let required = |key: &'static str| -> Result<f64, GeometryError> {
            number(key)?.ok_or(GeometryError::MissingMetadata(key))
        };

        let width = required("width")?;
        let height = required("height")?;
        if width < 1.0 || height < 1.0 {
            return Err(GeometryError::DegenerateRect { width, height });
        }

        let mut metadata = Self::from_physical(
            number("origin_x")?.unwrap_or(0.0).round() as i32,
            number("origin_y")?.unwrap_or(0.0).round() as i32,
            width.round() as u32,
            height.round() as u32,
            number("scale")?.unwrap_or(1.0),
        );
        if let Some(value) = number("logical_origin_x")? {
            metadata.logical_origin_x = value;
        }
        if let Some(value) = number("logical_origin_y")? {
            metadata.logical_origin_y = value;
        }
        if let Some(value) = number("logical_width")?.filter(|v| *v > 0.0) {
            metadata.logical_width = value;
        }
        if let Some(value) = number("logical_height")?.filter(|v| *v > 0.0) {
            metadata.logical_height = value;
        }
        if let Some(value) = number("primary_height")? {
            metadata.primary_height = value;
        }
        Ok(metadata)
    }

    /// Logical bounds of the monitor in global logical coordinates.
    pub fn logical_bounds(&self) -> Rect {
        Rect::new(
            self.logical_origin_x,
            self.logical_origin_y,
            self.logical_width,
            self.logical_height,
        )
    }

    pub fn logical_size(&self) -> Size {
        Size::new(self.logical_width, self.logical_height)
    }

    pub fn physical_size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64)
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        warn!("Invalid monitor scale factor {scale}, assuming 1.0");
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn physical_geometry_derives_logical_values() {
        let metadata = OverlayMetadata::from_physical(2880, 0, 2880, 1800, 2.0);
        assert_eq!(metadata.logical_origin_x, 1440.0);
        assert_eq!(metadata.logical_width, 1440.0);
        assert_eq!(metadata.logical_height, 900.0);
    }

    #[test]
    fn query_with_only_physical_values() {
        let metadata = OverlayMetadata::from_query(
            "/index.html?window=overlay&width=1920&height=1080&scale=1.5",
        )
        .unwrap();
        assert_eq!(metadata.width, 1920);
        assert_eq!(metadata.scale_factor, 1.5);
        assert_eq!(metadata.logical_width, 1280.0);
        assert_eq!(metadata.logical_height, 720.0);
        assert_eq!(metadata.origin_x, 0);
    }

    #[test]
    fn explicit_logical_values_win() {
        let metadata = OverlayMetadata::from_query(
            "origin_x=-1920&origin_y=0&width=1920&height=1080&scale=1\
             &logical_origin_x=-1920&logical_origin_y=0&logical_width=1920\
             &logical_height=1080&primary_height=900",
        )
        .unwrap();
        assert_eq!(metadata.origin_x, -1920);
        assert_eq!(metadata.logical_origin_x, -1920.0);
        assert_eq!(metadata.primary_height, 900.0);
    }

    #[test]
    fn missing_size_is_reported() {
        assert!(matches!(
            OverlayMetadata::from_query("origin_x=0&height=100"),
            Err(GeometryError::MissingMetadata("width"))
        ));
    }

    #[test]
    fn garbage_numbers_are_rejected() {
        assert!(matches!(
            OverlayMetadata::from_query("width=abc&height=100"),
            Err(GeometryError::InvalidMetadata(_))
        ));
    }

    #[test]
    fn nonpositive_scale_falls_back_to_one() {
        let metadata = OverlayMetadata::from_physical(0, 0, 800, 600, 0.0);
        assert_eq!(metadata.scale_factor, 1.0);
        assert_eq!(metadata.logical_width, 800.0);
    }
}
