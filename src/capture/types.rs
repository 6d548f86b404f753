//! Data types for region capture and finalization.

use crate::draw::BitmapError;
use crate::input::Tool;
use crate::overlay::GeometryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use crate::overlay::CaptureRegion;

/// Top-level phase of an overlay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No selection
    Idle,
    /// A selection draft is being dragged out
    Drawing,
    /// A selection exists and can be moved, resized or captured
    Selected,
    /// Waiting for the backend to grab the pixels
    Capturing,
    /// Annotating the captured bitmap
    Editing,
    /// Waiting for the backend to persist the result
    Finalizing,
}

impl Phase {
    /// Phases from which a new capture may be requested.
    pub fn accepts_capture(self) -> bool {
        matches!(self, Phase::Idle | Phase::Selected)
    }

    /// Phases with an external call in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, Phase::Capturing | Phase::Finalizing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Drawing => "drawing",
            Phase::Selected => "selected",
            Phase::Capturing => "capturing",
            Phase::Editing => "editing",
            Phase::Finalizing => "finalizing",
        };
        f.write_str(name)
    }
}

/// What to do once the pixels arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureIntent {
    /// Persist the raw capture immediately
    QuickFinalize,
    /// Open the annotation editor, optionally with a tool already armed
    Edit { tool: Option<Tool> },
}

/// A captured (or finalized) image as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureResult {
    /// Where the backend stored the image
    pub path: String,
    /// PNG bytes, standard base64 alphabet
    pub base64: String,
    /// Physical pixel size
    pub width: u32,
    pub height: u32,
    /// Logical size of the captured region
    pub logical_width: u32,
    pub logical_height: u32,
    /// Unix timestamp in milliseconds
    #[serde(default)]
    pub created_at: u64,
}

/// Payload handed to the backend for persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizeRequest {
    pub path: String,
    /// PNG bytes in base64; a `data:image/png;base64,` prefix is accepted
    pub base64: String,
    pub width: u32,
    pub height: u32,
    pub logical_width: u32,
    pub logical_height: u32,
}

impl FinalizeRequest {
    /// Finalizes a capture unchanged.
    pub fn from_capture(capture: &CaptureResult) -> Self {
        Self {
            path: capture.path.clone(),
            base64: capture.base64.clone(),
            width: capture.width,
            height: capture.height,
            logical_width: capture.logical_width,
            logical_height: capture.logical_height,
        }
    }
}

/// How the session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Finalized(CaptureResult),
    Cancelled,
}

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient message for the host to show (toast, status line, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Errors that can occur while capturing or finalizing a region.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("Saving the capture failed: {0}")]
    FinalizeFailed(String),

    #[error("Invalid capture payload: {0}")]
    InvalidPayload(String),

    #[error("Image processing error: {0}")]
    ImageError(#[from] BitmapError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Cannot {action} while {phase}")]
    InvalidPhase { phase: Phase, action: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
