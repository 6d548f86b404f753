//! Pointer and keyboard handling for the overlay.
//!
//! This module turns pointer gestures into selection rectangles and
//! annotation operations:
//! - [`SelectionController`]: draft, move and resize of the selection
//! - [`WindowSnapEngine`]: snapping the selection to detected windows
//! - [`AnnotationEngine`]: tool state, text entry and the operation log

pub mod annotation;
pub mod events;
pub mod modifiers;
pub mod selection;
pub mod snap;
pub mod tool;


// Re-export commonly used types at module level
pub use annotation::{AnnotationEngine, AnnotationState, AnnotationStyle, CommitOutcome};
pub use events::{Key, PointerId};
pub use modifiers::Modifiers;
pub use selection::{Handle, Interaction, SelectionController, SelectionPhase};
pub use snap::{RawSnapTarget, SnapTarget, WindowSnapEngine, project_targets};
pub use tool::Tool;
