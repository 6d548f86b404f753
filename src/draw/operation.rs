//! Annotation drawing operations.

use super::color::Color;
use crate::util::{Point, Rect};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Horizontal anchoring of a text annotation relative to its insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
}

/// One immutable entry of the annotation log.
///
/// Coordinates are bitmap pixels of the captured image. Every variant carries
/// its own style so that replaying the log needs no external state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawOperation {
    /// Straight stroke between two points
    Line {
        color: Color,
        width: f64,
        start: Point,
        end: Point,
    },
    /// Rectangle outline spanned by two drag corners
    Rectangle {
        color: Color,
        width: f64,
        start: Point,
        end: Point,
    },
    /// Ellipse inscribed in the box spanned by two drag corners
    Circle {
        color: Color,
        width: f64,
        start: Point,
        end: Point,
    },
    /// Filled tapered arrow pointing at `end`
    Arrow {
        color: Color,
        width: f64,
        start: Point,
        end: Point,
    },
    /// Freehand polyline
    Pen {
        color: Color,
        width: f64,
        points: Vec<Point>,
    },
    /// Pixelation brush; `size` is the brush edge length
    Mosaic { size: f64, points: Vec<Point> },
    /// Multi-line text anchored at `position` (top of the first line)
    Text {
        color: Color,
        font_size: f64,
        position: Point,
        text: String,
        #[serde(default)]
        align: TextAlign,
    },
}

impl DrawOperation {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            DrawOperation::Line { .. } => "line",
            DrawOperation::Rectangle { .. } => "rectangle",
            DrawOperation::Circle { .. } => "circle",
            DrawOperation::Arrow { .. } => "arrow",
            DrawOperation::Pen { .. } => "pen",
            DrawOperation::Mosaic { .. } => "mosaic",
            DrawOperation::Text { .. } => "text",
        }
    }

    /// Whether the operation would leave a visible mark.
    ///
    /// Zero-length drags and blank text are discarded instead of being logged,
    /// so that undo never has to remove an invisible entry.
    pub fn is_visible(&self) -> bool {
        match self {
            DrawOperation::Line { start, end, .. } | DrawOperation::Arrow { start, end, .. } => {
                start.distance_to(*end) >= 1.0
            }
            DrawOperation::Rectangle { start, end, .. }
            | DrawOperation::Circle { start, end, .. } => {
                let rect = Rect::from_points(*start, *end);
                rect.width >= 1.0 && rect.height >= 1.0
            }
            DrawOperation::Pen { points, .. } | DrawOperation::Mosaic { points, .. } => {
                !points.is_empty()
            }
            DrawOperation::Text { text, .. } => !text.trim().is_empty(),
        }
    }
}

/// Ellipse parameters `(center, rx, ry)` for a drag box.
///
/// The radii are half the box's width and height, so the drag defines a
/// bounding ellipse rather than a fixed-radius circle.
pub fn ellipse_from_drag(start: Point, end: Point) -> (Point, f64, f64) {
    let rect = Rect::from_points(start, end);
    (rect.center(), rect.width / 2.0, rect.height / 2.0)
}
