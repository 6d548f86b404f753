//! Capture and finalization for an overlay session.
//!
//! This module connects the overlay to the host:
//! - [`CaptureBackend`]: the external collaborators (pixel grab, persistence,
//!   window enumeration, stacking hints)
//! - [`CaptureOrchestrator`]: the phase machine driving one session
//! - [`SnapTargetPoller`]: periodic window list refresh
//! - [`StillImageBackend`]: a headless backend over a screenshot file

pub mod backend;
pub mod file;
pub mod orchestrator;
pub mod snap_feed;
pub mod still;
pub mod types;


pub use backend::CaptureBackend;
pub use file::FileSaveConfig;
pub use orchestrator::CaptureOrchestrator;
pub use snap_feed::SnapTargetPoller;
pub use still::StillImageBackend;
pub use types::{
    CaptureError, CaptureIntent, CaptureRegion, CaptureResult, FinalizeRequest, Notice,
    NoticeLevel, Phase, SessionOutcome,
};
