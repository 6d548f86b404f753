//! Phase state machine for one overlay session.
//!
//! The orchestrator is driven from the host's event loop. Pointer and key
//! events are handled synchronously; the two external calls (capture and
//! finalize) run as tasks on a tokio runtime and report back over a channel
//! that the host drains with [`CaptureOrchestrator::poll`] or awaits with
//! [`CaptureOrchestrator::next_completion`].
//!
//! Only one request is ever in flight. Every request carries a generation
//! number; cancelling bumps it so late completions are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::capture::backend::CaptureBackend;
use crate::capture::snap_feed::SnapTargetPoller;
use crate::capture::types::{
    CaptureError, CaptureIntent, CaptureResult, FinalizeRequest, Notice, Phase, SessionOutcome,
};
use crate::config::Config;
use crate::draw::{Color, TextAlign, bitmap};
use crate::input::{
    AnnotationEngine, CommitOutcome, Key, Modifiers, PointerId, RawSnapTarget,
    SelectionController, SelectionPhase, Tool, WindowSnapEngine, project_targets,
};
use crate::overlay::{
    CaptureRegion, CoordinateTransform, GeometryError, OverlayMetadata, ToolbarPlacement,
    ToolbarPlacer,
};
use crate::util::{Point, Rect, Size, clamp_f64};

/// Result of an external call, tagged with the generation that issued it.
#[derive(Debug)]
enum Completion {
    Captured {
        generation: u64,
        intent: CaptureIntent,
        result: Result<CaptureResult, CaptureError>,
    },
    Finalized {
        generation: u64,
        result: Result<CaptureResult, CaptureError>,
    },
}

/// The captured image being annotated.
struct EditSession {
    capture: CaptureResult,
    engine: AnnotationEngine,
}

/// Drives selection, capture, annotation and finalization for one overlay.
pub struct CaptureOrchestrator {
    config: Config,
    transform: CoordinateTransform,
    selection: SelectionController,
    snap: WindowSnapEngine,
    toolbar: ToolbarPlacer,
    phase: Phase,
    /// Overlay rect the current capture was taken from
    capture_rect: Option<Rect>,
    edit: Option<EditSession>,
    /// Phase to return to when finalization fails
    finalize_origin: Phase,
    backend: Arc<dyn CaptureBackend>,
    runtime_handle: tokio::runtime::Handle,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    /// Stacking hints, applied in order by a single task
    stacking_tx: mpsc::UnboundedSender<bool>,
    generation: u64,
    poller: Option<SnapTargetPoller>,
    raw_targets: Vec<RawSnapTarget>,
    press: Option<Point>,
    editor_pointer: Option<PointerId>,
    input_panel_active: bool,
    notices: Vec<Notice>,
    outcome: Option<SessionOutcome>,
}

impl CaptureOrchestrator {
    /// Creates an idle session for the monitor described by `metadata`.
    ///
    /// `viewport` is the overlay's own size; external calls are spawned on
    /// `runtime_handle`.
    pub fn new(
        config: &Config,
        metadata: OverlayMetadata,
        viewport: Size,
        backend: Arc<dyn CaptureBackend>,
        runtime_handle: &tokio::runtime::Handle,
    ) -> Self {
        let transform = CoordinateTransform::new(metadata, viewport);
        let viewport = transform.viewport();
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let stacking_tx = spawn_stacking_worker(runtime_handle, backend.clone());

        Self {
            config: config.clone(),
            selection: SelectionController::new(config.selection.clone(), viewport),
            snap: WindowSnapEngine::new(config.snap.clone()),
            toolbar: ToolbarPlacer::new(config.toolbar.clone(), viewport),
            transform,
            phase: Phase::Idle,
            capture_rect: None,
            edit: None,
            finalize_origin: Phase::Selected,
            backend,
            runtime_handle: runtime_handle.clone(),
            completion_tx,
            completion_rx,
            stacking_tx,
            generation: 0,
            poller: None,
            raw_targets: Vec::new(),
            press: None,
            editor_pointer: None,
            input_panel_active: false,
            notices: Vec::new(),
            outcome: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn snap(&self) -> &WindowSnapEngine {
        &self.snap
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    pub fn toolbar_placement(&self) -> Option<ToolbarPlacement> {
        self.toolbar.current()
    }

    /// The overlay rectangle the current capture was taken from.
    pub fn capture_rect(&self) -> Option<Rect> {
        self.capture_rect
    }

    pub fn editor(&self) -> Option<&AnnotationEngine> {
        self.edit.as_ref().map(|edit| &edit.engine)
    }

    /// The capture being annotated.
    pub fn capture(&self) -> Option<&CaptureResult> {
        self.edit.as_ref().map(|edit| &edit.capture)
    }

    /// Whether the text input panel currently owns the keyboard.
    pub fn input_panel_active(&self) -> bool {
        self.input_panel_active
    }

    /// Drains queued user-facing messages.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Returns how the session ended, once it has.
    pub fn take_outcome(&mut self) -> Option<SessionOutcome> {
        self.outcome.take()
    }

    // ------------------------------------------------------------------
    // Layout and snap targets
    // ------------------------------------------------------------------

    /// Returns `true` when the toolbar placement changed.
    pub fn set_viewport(&mut self, viewport: Size) -> bool {
        self.transform = CoordinateTransform::new(*self.transform.metadata(), viewport);
        let viewport = self.transform.viewport();
        self.selection.set_bounds(viewport);
        self.reproject_targets();
        let changed = self.toolbar.set_viewport(viewport);
        self.sync_toolbar_anchor() || changed
    }

    /// Records the toolbar's measured size; returns `true` when the placement changed.
    pub fn set_toolbar_size(&mut self, size: Size) -> bool {
        self.toolbar.set_measured_size(size)
    }

    /// Installs a fresh window list in global physical pixels.
    pub fn set_snap_targets(&mut self, raw: Vec<RawSnapTarget>) {
        self.raw_targets = raw;
        self.reproject_targets();
    }

    /// Starts refreshing window candidates every `refresh_interval_ms`.
    pub fn start_snap_polling(&mut self) {
        if self.poller.is_some() || !self.snap.is_enabled() {
            return;
        }
        let period = Duration::from_millis(self.config.snap.refresh_interval_ms);
        self.poller = Some(SnapTargetPoller::spawn(
            &self.runtime_handle,
            self.backend.clone(),
            period,
        ));
    }

    pub fn stop_snap_polling(&mut self) {
        self.poller = None;
    }

    fn reproject_targets(&mut self) {
        let targets = project_targets(
            &self.raw_targets,
            &self.transform,
            self.config.snap.min_target_size,
            self.config.selection.min_selection_size,
        );
        self.snap.set_targets(targets);
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    /// Handles a press in overlay coordinates. Returns `false` when ignored.
    pub fn pointer_down(&mut self, pointer: PointerId, point: Point) -> bool {
        match self.phase {
            Phase::Capturing | Phase::Finalizing => {
                log::debug!("Ignoring pointer press while {}", self.phase);
                false
            }
            Phase::Editing => self.editor_pointer_down(pointer, point),
            Phase::Idle | Phase::Drawing | Phase::Selected => {
                if !self.selection.pointer_down(pointer, point) {
                    return false;
                }
                self.press = Some(point);
                self.sync_selection_phase();
                true
            }
        }
    }

    pub fn pointer_move(&mut self, pointer: PointerId, point: Point) -> bool {
        match self.phase {
            Phase::Capturing | Phase::Finalizing => false,
            Phase::Editing => self.editor_pointer_move(pointer, point),
            Phase::Idle | Phase::Drawing | Phase::Selected => {
                if self.selection.interaction().is_none() {
                    // Hover highlight only when nothing is selected yet.
                    if self.phase == Phase::Idle {
                        return self.snap.hover(point).is_some();
                    }
                    return false;
                }
                let Some(proposed) = self.selection.pointer_move(pointer, point) else {
                    return false;
                };
                self.selection.apply_snap(self.snap.snap(proposed, point));
                self.sync_toolbar_anchor();
                true
            }
        }
    }

    pub fn pointer_up(&mut self, pointer: PointerId, point: Point) -> bool {
        match self.phase {
            Phase::Capturing | Phase::Finalizing => false,
            Phase::Editing => self.editor_pointer_up(pointer, point),
            Phase::Idle | Phase::Drawing | Phase::Selected => {
                if self
                    .selection
                    .interaction()
                    .is_none_or(|interaction| interaction.pointer() != pointer)
                {
                    return false;
                }
                self.pointer_move(pointer, point);
                let press = self.press.take();

                // A click on the highlighted window wins over the tiny draft it drew.
                let clicked = press
                    .filter(|_| self.phase == Phase::Drawing)
                    .and_then(|press| self.snap.click_target(press, point));
                if let Some(window) = clicked {
                    let rect = self.selection.set_selection(window);
                    log::debug!("Selected hovered window {:?}", rect);
                    self.snap.clear_highlight();
                    self.sync_selection_phase();
                    return true;
                }

                match self.selection.pointer_up(pointer) {
                    Some(Ok(rect)) => {
                        log::debug!("Selection committed: {:?}", rect);
                        self.snap.clear_highlight();
                    }
                    Some(Err(err)) => self.report_geometry(&err),
                    None => return false,
                }
                self.sync_selection_phase();
                true
            }
        }
    }

    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        match self.phase {
            Phase::Editing => {
                if self.editor_pointer == Some(pointer) {
                    self.editor_pointer = None;
                    if let Some(edit) = self.edit.as_mut() {
                        edit.engine.cancel_gesture();
                    }
                }
            }
            Phase::Idle | Phase::Drawing | Phase::Selected => {
                self.selection.pointer_cancel(pointer);
                self.press = None;
                self.sync_selection_phase();
            }
            Phase::Capturing | Phase::Finalizing => {}
        }
    }

    fn editor_pointer_down(&mut self, pointer: PointerId, point: Point) -> bool {
        if self.editor_pointer.is_some() {
            return false;
        }
        let Some(rect) = self.capture_rect else {
            return false;
        };
        if !rect.contains(point) {
            return false;
        }
        let Some(mapped) = self.editor_point(point) else {
            return false;
        };
        let Some(edit) = self.edit.as_mut() else {
            return false;
        };
        let outcome = edit.engine.pointer_down(mapped);
        self.editor_pointer = Some(pointer);
        self.report_commit(outcome);
        self.sync_input_panel();
        true
    }

    fn editor_pointer_move(&mut self, pointer: PointerId, point: Point) -> bool {
        if self.editor_pointer != Some(pointer) {
            return false;
        }
        let Some(mapped) = self.editor_point(point) else {
            return false;
        };
        match self.edit.as_mut() {
            Some(edit) => {
                edit.engine.pointer_move(mapped);
                true
            }
            None => false,
        }
    }

    fn editor_pointer_up(&mut self, pointer: PointerId, point: Point) -> bool {
        if self.editor_pointer != Some(pointer) {
            return false;
        }
        self.editor_pointer = None;
        let Some(mapped) = self.editor_point(point) else {
            return false;
        };
        let Some(edit) = self.edit.as_mut() else {
            return false;
        };
        let outcome = edit.engine.pointer_up(mapped);
        self.report_commit(outcome);
        true
    }

    /// Maps an overlay point into bitmap pixels of the capture being edited,
    /// clamped to the bitmap.
    fn editor_point(&self, point: Point) -> Option<Point> {
        let rect = self.capture_rect?;
        let engine = &self.edit.as_ref()?.engine;
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return None;
        }
        let (width, height) = (engine.width() as f64, engine.height() as f64);
        Some(Point::new(
            clamp_f64((point.x - rect.x) * width / rect.width, 0.0, width),
            clamp_f64((point.y - rect.y) * height / rect.height, 0.0, height),
        ))
    }

    // ------------------------------------------------------------------
    // Keyboard
    // ------------------------------------------------------------------

    /// Handles a key press. Returns `true` when the key was consumed.
    pub fn key_press(&mut self, key: Key, modifiers: Modifiers) -> bool {
        if self.phase == Phase::Editing && self.input_panel_active {
            return self.text_key_press(key, modifiers);
        }

        match key {
            Key::Escape => {
                self.cancel();
                true
            }
            Key::Return => match self.confirm() {
                Ok(()) => true,
                Err(err) => {
                    log::debug!("Confirm ignored: {}", err);
                    false
                }
            },
            _ if modifiers.is_undo(key) && self.phase == Phase::Editing => self.undo(),
            _ => false,
        }
    }

    fn text_key_press(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let Some(edit) = self.edit.as_mut() else {
            return false;
        };
        let engine = &mut edit.engine;
        let mut outcome = CommitOutcome::Ignored;
        let handled = match key {
            Key::Escape => engine.cancel_text(),
            Key::Return if modifiers.is_newline(key) => {
                engine.insert_newline();
                true
            }
            Key::Return => {
                outcome = engine.commit_text();
                true
            }
            Key::Backspace => {
                engine.backspace();
                true
            }
            Key::Space => {
                engine.insert_char(' ');
                true
            }
            Key::Char(c) if !modifiers.ctrl && !modifiers.alt => {
                engine.insert_char(c);
                true
            }
            _ => false,
        };
        self.report_commit(outcome);
        self.sync_input_panel();
        handled
    }

    // ------------------------------------------------------------------
    // Annotation controls
    // ------------------------------------------------------------------

    /// Arms `tool`. From the selection this captures immediately and opens the
    /// editor with the tool already active.
    pub fn select_tool(&mut self, tool: Tool) -> Result<(), CaptureError> {
        match self.phase {
            Phase::Selected => {
                let rect = self.current_selection()?;
                self.request_capture(rect, CaptureIntent::Edit { tool: Some(tool) })
            }
            Phase::Editing => {
                if let Some(edit) = self.edit.as_mut() {
                    let outcome = edit.engine.set_tool(tool);
                    self.report_commit(outcome);
                    self.sync_input_panel();
                }
                Ok(())
            }
            phase => Err(CaptureError::InvalidPhase {
                phase,
                action: "select a tool",
            }),
        }
    }

    /// Captures the selection and opens the editor.
    pub fn edit(&mut self) -> Result<(), CaptureError> {
        let rect = self.current_selection()?;
        self.request_capture(rect, CaptureIntent::Edit { tool: None })
    }

    pub fn undo(&mut self) -> bool {
        self.edit
            .as_mut()
            .is_some_and(|edit| edit.engine.undo().is_some())
    }

    pub fn set_color(&mut self, color: Color) {
        if let Some(edit) = self.edit.as_mut() {
            edit.engine.set_color(color);
        }
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        if let Some(edit) = self.edit.as_mut() {
            edit.engine.set_width(width);
        }
    }

    pub fn set_font_size(&mut self, size: f64) {
        if let Some(edit) = self.edit.as_mut() {
            edit.engine.set_font_size(size);
        }
    }

    pub fn set_mosaic_size(&mut self, size: f64) {
        if let Some(edit) = self.edit.as_mut() {
            edit.engine.set_mosaic_size(size);
        }
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        if let Some(edit) = self.edit.as_mut() {
            edit.engine.set_text_align(align);
        }
    }

    /// Renders the editor (base image, log and live draft) in bitmap pixels.
    pub fn render_editor(&self, ctx: &cairo::Context) -> Result<(), cairo::Error> {
        match self.edit.as_ref() {
            Some(edit) => edit.engine.render(ctx),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Capture and finalize
    // ------------------------------------------------------------------

    /// Confirms the current step: captures and saves the selection directly,
    /// or flattens and saves the annotated image.
    pub fn confirm(&mut self) -> Result<(), CaptureError> {
        match self.phase {
            Phase::Selected => {
                let rect = self.current_selection()?;
                self.request_capture(rect, CaptureIntent::QuickFinalize)
            }
            Phase::Editing => self.finalize_edit(),
            phase => Err(CaptureError::InvalidPhase {
                phase,
                action: "confirm",
            }),
        }
    }

    /// Issues the capture request for `rect` (overlay coordinates).
    ///
    /// Only allowed while idle or selected. A rectangle that cannot be mapped
    /// onto the monitor resets the selection and queues a notice.
    pub fn request_capture(
        &mut self,
        rect: Rect,
        intent: CaptureIntent,
    ) -> Result<(), CaptureError> {
        if !self.phase.accepts_capture() {
            return Err(CaptureError::InvalidPhase {
                phase: self.phase,
                action: "capture",
            });
        }

        let rect = self.selection.set_selection(rect);
        let region = match self.transform.to_monitor_rect(rect) {
            Ok(region) => region,
            Err(err) => {
                self.report_geometry(&err);
                self.selection.reset();
                self.sync_selection_phase();
                return Err(err.into());
            }
        };

        self.capture_rect = Some(rect);
        self.snap.clear_highlight();
        self.set_phase(Phase::Capturing);
        self.spawn_capture(region, intent);
        Ok(())
    }

    fn spawn_capture(&mut self, region: CaptureRegion, intent: CaptureIntent) {
        self.generation += 1;
        let generation = self.generation;
        let backend = self.backend.clone();
        let tx = self.completion_tx.clone();

        log::info!(
            "Capturing {}x{} at ({}, {}) [{:?}]",
            region.width,
            region.height,
            region.x,
            region.y,
            intent
        );
        self.runtime_handle.spawn(async move {
            let result = backend.capture_region(region).await;
            let _ = tx.send(Completion::Captured {
                generation,
                intent,
                result,
            });
        });
    }

    fn finalize_edit(&mut self) -> Result<(), CaptureError> {
        let Some(edit) = self.edit.as_mut() else {
            return Err(CaptureError::InvalidPhase {
                phase: self.phase,
                action: "confirm",
            });
        };
        let outcome = edit.engine.commit_text();
        let flattened = edit.engine.flatten_png();
        let width = edit.engine.width() as u32;
        let height = edit.engine.height() as u32;
        let capture = edit.capture.clone();
        self.report_commit(outcome);
        self.sync_input_panel();

        let png = match flattened {
            Ok(png) => png,
            Err(err) => {
                log::error!("Failed to flatten annotations: {}", err);
                self.notices
                    .push(Notice::error(format!("Could not render annotations: {err}")));
                return Err(err.into());
            }
        };

        let request = FinalizeRequest {
            path: capture.path,
            base64: bitmap::encode_base64(&png),
            width,
            height,
            logical_width: capture.logical_width,
            logical_height: capture.logical_height,
        };
        self.start_finalize(request, Phase::Editing);
        Ok(())
    }

    fn start_finalize(&mut self, request: FinalizeRequest, origin: Phase) {
        self.generation += 1;
        let generation = self.generation;
        self.finalize_origin = origin;
        self.set_phase(Phase::Finalizing);

        let backend = self.backend.clone();
        let tx = self.completion_tx.clone();
        self.runtime_handle.spawn(async move {
            let result = backend.finalize_region_capture(request).await;
            let _ = tx.send(Completion::Finalized { generation, result });
        });
    }

    /// Discards everything and returns to idle. Never fails.
    pub fn cancel(&mut self) {
        log::debug!("Cancelling session while {}", self.phase);
        self.generation += 1;
        self.teardown();
        self.set_phase(Phase::Idle);
        self.outcome = Some(SessionOutcome::Cancelled);

        let backend = self.backend.clone();
        self.runtime_handle.spawn(async move {
            if let Err(err) = backend.cancel_region_capture().await {
                log::warn!("Cancel notification failed: {}", err);
            }
        });
    }

    // ------------------------------------------------------------------
    // Completions
    // ------------------------------------------------------------------

    /// Applies every completion that has arrived. Also picks up refreshed
    /// snap targets. Returns `true` when anything changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        if let Some(targets) = self.poller.as_mut().and_then(|poller| poller.take_update()) {
            self.set_snap_targets(targets.as_ref().clone());
            changed = true;
        }

        while let Ok(completion) = self.completion_rx.try_recv() {
            changed |= self.handle_completion(completion);
        }
        changed
    }

    /// Waits for the in-flight request to complete and applies it.
    ///
    /// Returns `false` right away when nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        while self.phase.is_busy() {
            let Some(completion) = self.completion_rx.recv().await else {
                return false;
            };
            if self.handle_completion(completion) {
                return true;
            }
        }
        false
    }

    fn handle_completion(&mut self, completion: Completion) -> bool {
        match completion {
            Completion::Captured {
                generation,
                intent,
                result,
            } => {
                if generation != self.generation || self.phase != Phase::Capturing {
                    log::debug!("Discarding stale capture result (generation {generation})");
                    return false;
                }
                self.on_captured(intent, result);
                true
            }
            Completion::Finalized { generation, result } => {
                if generation != self.generation || self.phase != Phase::Finalizing {
                    log::debug!("Discarding stale finalize result (generation {generation})");
                    return false;
                }
                self.on_finalized(result);
                true
            }
        }
    }

    fn on_captured(&mut self, intent: CaptureIntent, result: Result<CaptureResult, CaptureError>) {
        let capture = match result {
            Ok(capture) => capture,
            Err(err) => {
                log::error!("Capture failed: {}", err);
                self.notices.push(Notice::error(err.to_string()));
                self.capture_rect = None;
                self.set_phase(Phase::Selected);
                return;
            }
        };
        log::info!(
            "Captured {}x{} into {}",
            capture.width,
            capture.height,
            capture.path
        );

        match intent {
            CaptureIntent::QuickFinalize => {
                let request = FinalizeRequest::from_capture(&capture);
                self.start_finalize(request, Phase::Selected);
            }
            CaptureIntent::Edit { tool } => {
                let surface = bitmap::decode_base64_png(&capture.base64)
                    .and_then(|png| bitmap::decode_png(&png));
                let surface = match surface {
                    Ok(surface) => surface,
                    Err(err) => {
                        log::error!("Captured image is unreadable: {}", err);
                        self.notices
                            .push(Notice::error(format!("Captured image is unreadable: {err}")));
                        self.capture_rect = None;
                        self.set_phase(Phase::Selected);
                        return;
                    }
                };

                let mut engine = AnnotationEngine::new(surface, &self.config.annotation);
                if let Some(tool) = tool {
                    engine.set_tool(tool);
                }
                self.edit = Some(EditSession { capture, engine });
                self.set_phase(Phase::Editing);
                self.sync_toolbar_anchor();
            }
        }
    }

    fn on_finalized(&mut self, result: Result<CaptureResult, CaptureError>) {
        match result {
            Ok(saved) => {
                log::info!("Capture saved to {}", saved.path);
                self.teardown();
                self.set_phase(Phase::Idle);
                self.outcome = Some(SessionOutcome::Finalized(saved));
            }
            Err(err) => {
                log::error!("Finalize failed: {}", err);
                self.notices.push(Notice::error(err.to_string()));
                let origin = self.finalize_origin;
                if origin == Phase::Selected {
                    self.capture_rect = None;
                }
                self.set_phase(origin);
            }
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn current_selection(&self) -> Result<Rect, CaptureError> {
        self.selection
            .selection()
            .filter(|_| self.phase == Phase::Selected)
            .ok_or(CaptureError::InvalidPhase {
                phase: self.phase,
                action: "capture without a selection",
            })
    }

    fn set_phase(&mut self, next: Phase) {
        if self.phase != next {
            log::debug!("Phase {} -> {}", self.phase, next);
            self.phase = next;
        }
        self.sync_toolbar_anchor();
    }

    fn sync_selection_phase(&mut self) {
        let next = match self.selection.phase() {
            SelectionPhase::Idle => Phase::Idle,
            SelectionPhase::Drawing => Phase::Drawing,
            SelectionPhase::Selected => Phase::Selected,
        };
        self.set_phase(next);
    }

    /// Anchors the toolbar to the selection, or to the capture while editing.
    fn sync_toolbar_anchor(&mut self) -> bool {
        let anchor = match self.phase {
            Phase::Selected => self.selection.rect(),
            Phase::Editing => self.capture_rect,
            _ => None,
        };
        self.toolbar.set_anchor(anchor)
    }

    /// Sends the stacking hint when text entry starts or ends.
    fn sync_input_panel(&mut self) {
        let active = self
            .edit
            .as_ref()
            .is_some_and(|edit| edit.engine.is_text_input());
        if active == self.input_panel_active {
            return;
        }
        self.input_panel_active = active;

        if self.stacking_tx.send(active).is_err() {
            log::warn!("Window stacking worker is gone, dropping hint ({active})");
        }
    }

    fn report_commit(&mut self, outcome: CommitOutcome) {
        if outcome == CommitOutcome::LimitReached {
            self.notices.push(Notice::warning(format!(
                "Annotation limit reached ({} operations)",
                self.config.annotation.max_operations
            )));
        }
    }

    fn report_geometry(&mut self, err: &GeometryError) {
        log::debug!("Selection rejected: {}", err);
        let message = match err {
            GeometryError::SelectionTooSmall { min, .. } => {
                format!("Selection is too small (minimum {min}px)")
            }
            other => other.to_string(),
        };
        self.notices.push(Notice::warning(message));
    }

    fn teardown(&mut self) {
        self.edit = None;
        self.capture_rect = None;
        self.editor_pointer = None;
        self.press = None;
        self.poller = None;
        self.selection.reset();
        self.snap.clear_highlight();
        self.sync_input_panel();
    }
}

/// Applies always-on-top hints one at a time so the last one sent wins.
fn spawn_stacking_worker(
    runtime_handle: &tokio::runtime::Handle,
    backend: Arc<dyn CaptureBackend>,
) -> mpsc::UnboundedSender<bool> {
    let (tx, mut rx) = mpsc::unbounded_channel::<bool>();
    runtime_handle.spawn(async move {
        while let Some(active) = rx.recv().await {
            if let Err(err) = backend.set_current_window_always_on_top(active).await {
                log::warn!("Failed to update window stacking: {}", err);
            }
        }
    });
    tx
}
