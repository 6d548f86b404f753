//! Region capture and annotation overlay core.
//!
//! The overlay host feeds pointer and key events into a
//! [`capture::CaptureOrchestrator`], which owns the selection, window
//! snapping, toolbar layout and the annotation editor, and talks to the
//! platform through a [`capture::CaptureBackend`].

pub mod capture;
pub mod config;
pub mod draw;
pub mod input;
pub mod overlay;
pub mod util;

pub use config::Config;
