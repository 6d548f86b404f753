use async_trait::async_trait;

use crate::capture::types::{CaptureError, CaptureRegion, CaptureResult, FinalizeRequest};
use crate::input::RawSnapTarget;

/// The host-side collaborators of an overlay session.
///
/// Implementations grab pixels, persist results, enumerate windows and
/// adjust window stacking. Everything is async; the orchestrator runs each
/// call as a spawned task and never blocks on it.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Grabs the pixels of `region`.
    async fn capture_region(&self, region: CaptureRegion) -> Result<CaptureResult, CaptureError>;

    /// Persists the (possibly annotated) image.
    async fn finalize_region_capture(
        &self,
        request: FinalizeRequest,
    ) -> Result<CaptureResult, CaptureError>;

    /// Best-effort cleanup when the user cancels. Failures are ignored.
    async fn cancel_region_capture(&self) -> Result<(), CaptureError>;

    /// Current on-screen windows in global physical pixels.
    async fn list_window_snap_targets(&self) -> Result<Vec<RawSnapTarget>, CaptureError>;

    /// Stacking hint: `true` while a text input panel needs keyboard focus.
    async fn set_current_window_always_on_top(
        &self,
        allow_input_panel: bool,
    ) -> Result<(), CaptureError>;
}
