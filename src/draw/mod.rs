//! Rendering primitives and annotation operations (Cairo-based).
//!
//! This module defines the core drawing types used for annotating a capture:
//! - [`Color`]: RGBA color representation with palette constants
//! - [`DrawOperation`]: the annotation primitives (line, arrow, mosaic, text, ...)
//! - [`OperationLog`]: append-only list of operations for one edit session
//! - Replay rendering onto a copy of the captured bitmap

pub mod arrow;
pub mod bitmap;
pub mod color;
pub mod mosaic;
pub mod operation;
pub mod oplog;
pub mod render;

// Re-export commonly used types at module level
pub use bitmap::BitmapError;
pub use color::Color;
pub use oplog::OperationLog;
pub use operation::{DrawOperation, TextAlign};
pub use render::{RenderOptions, render_frame, render_operation};

pub use color::{BLACK, BLUE, GREEN, ORANGE, PINK, RED, TRANSPARENT, WHITE, YELLOW};
