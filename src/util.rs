//! Geometry primitives and color-name helpers.
//!
//! This module provides:
//! - [`Point`], [`Size`] and [`Rect`] in overlay-local floating-point pixels
//! - Distance/intersection helpers shared by selection, snapping and drawing
//! - Color name mapping used by the configuration system

use crate::draw::{Color, color::*};
use serde::{Deserialize, Serialize};

// ============================================================================
// Geometry
// ============================================================================

/// A point in overlay-local (or bitmap) pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Width/height pair (viewport, toolbar, bitmap sizes).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Axis-aligned rectangle with a non-negative size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Creates a rectangle; negative sizes are clamped to zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Axis-aligned box spanned by two arbitrary corners.
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Builds a rectangle from edges, normalizing inverted edges.
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::from_points(Point::new(left, top), Point::new(right, bottom))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Overlapping region of two rectangles, if they overlap with positive area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(Rect::from_edges(left, top, right, bottom))
        } else {
            None
        }
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        self.intersection(other).map(|r| r.area()).unwrap_or(0.0)
    }

    /// Largest absolute difference between corresponding edges.
    pub fn max_edge_distance(&self, other: &Rect) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.right() - other.right()).abs())
            .max((self.bottom() - other.bottom()).abs())
    }

    /// Grows the rectangle in place so both dimensions are at least `min`.
    pub fn with_min_size(self, min: f64) -> Rect {
        Rect {
            width: self.width.max(min),
            height: self.height.max(min),
            ..self
        }
    }

    /// Moves (never resizes, unless larger than the bounds) so the rectangle fits in `bounds`.
    pub fn fit_within(self, bounds: Size) -> Rect {
        let width = self.width.min(bounds.width.max(0.0));
        let height = self.height.min(bounds.height.max(0.0));
        Rect {
            x: clamp_f64(self.x, 0.0, bounds.width - width),
            y: clamp_f64(self.y, 0.0, bounds.height - height),
            width,
            height,
        }
    }
}

/// Clamps without panicking when `max < min` (the lower bound wins).
pub fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

/// Appends `point` unless it lies within `min_distance` of the last stored point.
///
/// Returns `true` when the point was stored.
pub fn maybe_append_point(points: &mut Vec<Point>, point: Point, min_distance: f64) -> bool {
    match points.last() {
        Some(last) if last.distance_to(point) <= min_distance => false,
        _ => {
            points.push(point);
            true
        }
    }
}

// ============================================================================
// Color Mapping
// ============================================================================

/// Maps color name strings to Color values.
///
/// Used by the configuration system to parse color names from the config file.
/// Supported names (case-insensitive): red, green, blue, yellow, orange, pink,
/// white, black.
pub fn name_to_color(name: &str) -> Option<Color> {
    match name.to_lowercase().as_str() {
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "orange" => Some(ORANGE),
        "pink" => Some(PINK),
        "white" => Some(WHITE),
        "black" => Some(BLACK),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_points_normalizes_any_drag_direction() {
        let rect = Rect::from_points(Point::new(50.0, 40.0), Point::new(10.0, 90.0));
        assert_eq!(rect, Rect::new(10.0, 40.0, 40.0, 50.0));
    }

    #[test]
    fn intersection_area_of_partial_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersection_area(&b), 2500.0);
        assert_eq!(a.intersection_area(&Rect::new(200.0, 0.0, 10.0, 10.0)), 0.0);
    }

    #[test]
    fn max_edge_distance_uses_worst_edge() {
        let a = Rect::new(10.0, 10.0, 100.0, 100.0);
        let b = Rect::new(12.0, 5.0, 100.0, 130.0);
        // bottoms: 110 vs 135
        assert_eq!(a.max_edge_distance(&b), 25.0);
    }

    #[test]
    fn fit_within_clamps_position_not_size() {
        let rect = Rect::new(-20.0, 590.0, 100.0, 50.0).fit_within(Size::new(800.0, 600.0));
        assert_eq!(rect, Rect::new(0.0, 550.0, 100.0, 50.0));
    }

    #[test]
    fn maybe_append_point_skips_oversampled_moves() {
        let mut points = vec![Point::new(0.0, 0.0)];
        assert!(!maybe_append_point(&mut points, Point::new(1.0, 1.0), 2.0));
        assert!(maybe_append_point(&mut points, Point::new(3.0, 0.0), 2.0));
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn clamp_f64_prefers_lower_bound_when_inverted() {
        assert_eq!(clamp_f64(5.0, 10.0, 2.0), 10.0);
    }

    #[test]
    fn name_to_color_is_case_insensitive() {
        assert_eq!(name_to_color("White"), Some(WHITE));
        assert!(name_to_color("chartreuse").is_none());
    }
}
