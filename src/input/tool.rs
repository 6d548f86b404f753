//! Annotation tool selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Annotation tool.
///
/// The active tool determines which [`crate::draw::DrawOperation`] a drag on
/// the captured image produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Straight line between press and release
    Line,
    /// Rectangle outline from corner to corner
    #[default]
    Rectangle,
    /// Ellipse inscribed in the dragged box
    Circle,
    /// Filled tapered arrow pointing at the release point
    Arrow,
    /// Freehand drawing, follows the pointer path
    Pen,
    /// Pixelation brush
    Mosaic,
    /// Click to place a text box, type, Enter to commit
    Text,
}

impl Tool {
    /// Tools that collect a point trail while dragging.
    pub fn is_trail(self) -> bool {
        matches!(self, Tool::Pen | Tool::Mosaic)
    }
}
