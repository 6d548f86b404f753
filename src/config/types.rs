//! Configuration type definitions.

use super::enums::ColorSpec;
use crate::draw::TextAlign;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Selection rectangle settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SelectionConfig {
    /// Smallest width/height a finalized selection may have, in overlay pixels
    /// (valid range: 1.0 - 64.0)
    #[serde(default = "default_min_selection_size")]
    pub min_selection_size: f64,

    /// Edge length of the square hit area around each resize handle
    /// (valid range: 4.0 - 40.0)
    #[serde(default = "default_handle_hit_size")]
    pub handle_hit_size: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_selection_size: default_min_selection_size(),
            handle_hit_size: default_handle_hit_size(),
        }
    }
}

/// Window snapping settings.
///
/// A drafted, moved or resized selection is replaced by a detected window's
/// bounds when the pointer is inside the window or the selection covers most
/// of it, and every edge is within the tolerance.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SnapConfig {
    /// Enable snapping to detected windows
    #[serde(default = "default_snap_enabled")]
    pub enabled: bool,

    /// Maximum edge distance in pixels for a snap (valid range: 0.0 - 100.0)
    #[serde(default = "default_edge_tolerance")]
    pub edge_tolerance: f64,

    /// Share of a window's area the selection must cover to be considered
    /// without the pointer inside it (valid range: 0.1 - 1.0)
    #[serde(default = "default_coverage_threshold")]
    pub coverage_threshold: f64,

    /// Tolerance multiplier applied while the pointer is inside the window
    /// (valid range: 1.0 - 4.0)
    #[serde(default = "default_pointer_tolerance_multiplier")]
    pub pointer_tolerance_multiplier: f64,

    /// How often the window list is refreshed, in milliseconds
    /// (valid range: 200 - 10000)
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Pointer travel below which a press/release counts as a click on the
    /// hovered window (valid range: 0.0 - 20.0)
    #[serde(default = "default_hover_move_threshold")]
    pub hover_move_threshold: f64,

    /// Enumerated windows smaller than this (physical pixels) are ignored
    #[serde(default = "default_min_target_size")]
    pub min_target_size: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: default_snap_enabled(),
            edge_tolerance: default_edge_tolerance(),
            coverage_threshold: default_coverage_threshold(),
            pointer_tolerance_multiplier: default_pointer_tolerance_multiplier(),
            refresh_interval_ms: default_refresh_interval_ms(),
            hover_move_threshold: default_hover_move_threshold(),
            min_target_size: default_min_target_size(),
        }
    }
}

/// Floating toolbar placement settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolbarConfig {
    /// Gap between the toolbar and the viewport/selection edges (valid range: 0.0 - 64.0)
    #[serde(default = "default_toolbar_margin")]
    pub margin: f64,

    /// Width assumed until the toolbar has been measured
    #[serde(default = "default_estimated_width")]
    pub estimated_width: f64,

    /// Height assumed until the toolbar has been measured
    #[serde(default = "default_estimated_height")]
    pub estimated_height: f64,

    /// Space reserved at the bottom of the viewport for a dock or taskbar
    #[serde(default)]
    pub dock_inset: f64,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            margin: default_toolbar_margin(),
            estimated_width: default_estimated_width(),
            estimated_height: default_estimated_height(),
            dock_inset: 0.0,
        }
    }
}

/// Annotation editor defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnnotationConfig {
    /// Default stroke color - a named color or an RGB array like `[255, 0, 0]`
    #[serde(default = "default_color")]
    pub default_color: ColorSpec,

    /// Default stroke width in pixels (valid range: 1.0 - 40.0)
    #[serde(default = "default_width")]
    pub default_width: f64,

    /// Default font size for text annotations (valid range: 8.0 - 96.0)
    #[serde(default = "default_font_size")]
    pub font_size: f64,

    /// Font family for text annotations
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Default alignment for text annotations
    #[serde(default)]
    pub text_align: TextAlign,

    /// Minimum distance between stored freehand points (valid range: 0.0 - 20.0)
    #[serde(default = "default_pen_min_distance")]
    pub pen_min_distance: f64,

    /// Default mosaic brush size (valid range: 6.0 - 120.0)
    #[serde(default = "default_mosaic_size")]
    pub mosaic_size: f64,

    /// Maximum number of operations per capture (0 = unlimited)
    #[serde(default)]
    pub max_operations: usize,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
            default_width: default_width(),
            font_size: default_font_size(),
            font_family: default_font_family(),
            text_align: TextAlign::default(),
            pen_min_distance: default_pen_min_distance(),
            mosaic_size: default_mosaic_size(),
            max_operations: 0,
        }
    }
}

fn default_min_selection_size() -> f64 {
    6.0
}

fn default_handle_hit_size() -> f64 {
    10.0
}

fn default_snap_enabled() -> bool {
    true
}

fn default_edge_tolerance() -> f64 {
    12.0
}

fn default_coverage_threshold() -> f64 {
    0.9
}

fn default_pointer_tolerance_multiplier() -> f64 {
    1.5
}

fn default_refresh_interval_ms() -> u64 {
    1200
}

fn default_hover_move_threshold() -> f64 {
    4.0
}

fn default_min_target_size() -> f64 {
    40.0
}

fn default_toolbar_margin() -> f64 {
    12.0
}

fn default_estimated_width() -> f64 {
    360.0
}

fn default_estimated_height() -> f64 {
    48.0
}

fn default_color() -> ColorSpec {
    ColorSpec::Name("red".to_string())
}

fn default_width() -> f64 {
    4.0
}

fn default_font_size() -> f64 {
    20.0
}

fn default_font_family() -> String {
    "Sans".to_string()
}

fn default_pen_min_distance() -> f64 {
    2.0
}

fn default_mosaic_size() -> f64 {
    24.0
}
