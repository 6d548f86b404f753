//! Annotation editing over a captured bitmap.
//!
//! The engine owns the base image, the operation log and the in-progress
//! gesture. All coordinates are bitmap pixels; the orchestrator converts
//! overlay positions before calling in.

use super::tool::Tool;
use crate::config::AnnotationConfig;
use crate::draw::{
    Color, DrawOperation, OperationLog, RenderOptions, TextAlign, bitmap, mosaic, render_frame,
};
use crate::util::{Point, maybe_append_point};
use log::{debug, warn};

/// Runtime-adjustable drawing style.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationStyle {
    pub tool: Tool,
    pub color: Color,
    pub width: f64,
    pub font_size: f64,
    pub mosaic_size: f64,
    pub text_align: TextAlign,
}

impl AnnotationStyle {
    pub fn from_config(config: &AnnotationConfig) -> Self {
        Self {
            tool: Tool::default(),
            color: config.default_color.to_color(),
            width: config.default_width,
            font_size: config.font_size,
            mosaic_size: config.mosaic_size,
            text_align: config.text_align,
        }
    }
}

/// Gesture state of the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationState {
    /// Waiting for input
    Idle,
    /// Pointer held with a drawing tool
    Drawing {
        tool: Tool,
        start: Point,
        current: Point,
        points: Vec<Point>,
    },
    /// Collecting text for a box anchored at `position`
    TextInput { position: Point, buffer: String },
}

/// What happened to a finished gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Appended to the log
    Added,
    /// Nothing visible was produced (zero-length drag, blank text)
    Discarded,
    /// The log is full
    LimitReached,
    /// No gesture was active
    Ignored,
}

/// Immediate-mode annotation editor for one captured image.
pub struct AnnotationEngine {
    base: cairo::ImageSurface,
    log: OperationLog,
    state: AnnotationState,
    style: AnnotationStyle,
    render_options: RenderOptions,
    pen_min_distance: f64,
    max_operations: usize,
    needs_redraw: bool,
}

impl AnnotationEngine {
    pub fn new(base: cairo::ImageSurface, config: &AnnotationConfig) -> Self {
        Self {
            base,
            log: OperationLog::new(),
            state: AnnotationState::Idle,
            style: AnnotationStyle::from_config(config),
            render_options: RenderOptions {
                font_family: config.font_family.clone(),
            },
            pen_min_distance: config.pen_min_distance,
            max_operations: config.max_operations,
            needs_redraw: true,
        }
    }

    pub fn base(&self) -> &cairo::ImageSurface {
        &self.base
    }

    pub fn width(&self) -> i32 {
        self.base.width()
    }

    pub fn height(&self) -> i32 {
        self.base.height()
    }

    pub fn state(&self) -> &AnnotationState {
        &self.state
    }

    pub fn style(&self) -> &AnnotationStyle {
        &self.style
    }

    pub fn operations(&self) -> &[DrawOperation] {
        self.log.operations()
    }

    pub fn is_text_input(&self) -> bool {
        matches!(self.state, AnnotationState::TextInput { .. })
    }

    /// Returns and clears the redraw flag.
    pub fn take_needs_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    // ------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------

    /// Switches tool. A pending text box is committed first.
    pub fn set_tool(&mut self, tool: Tool) -> CommitOutcome {
        let outcome = if tool != Tool::Text && self.is_text_input() {
            self.commit_text()
        } else {
            CommitOutcome::Ignored
        };
        self.style.tool = tool;
        outcome
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
        self.needs_redraw = true;
    }

    pub fn set_width(&mut self, width: f64) {
        self.style.width = width.clamp(1.0, 40.0);
        self.needs_redraw = true;
    }

    pub fn set_font_size(&mut self, size: f64) {
        self.style.font_size = size.clamp(8.0, 96.0);
        self.needs_redraw = true;
    }

    pub fn set_mosaic_size(&mut self, size: f64) {
        self.style.mosaic_size = size.clamp(6.0, 120.0);
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.style.text_align = align;
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------

    /// Starts a gesture with the current tool.
    ///
    /// With the text tool this opens a text box at `point`, committing any box
    /// that was already open.
    pub fn pointer_down(&mut self, point: Point) -> CommitOutcome {
        let mut outcome = CommitOutcome::Ignored;
        if self.is_text_input() {
            outcome = self.commit_text();
        }

        let tool = self.style.tool;
        self.state = if tool == Tool::Text {
            AnnotationState::TextInput {
                position: point,
                buffer: String::new(),
            }
        } else {
            AnnotationState::Drawing {
                tool,
                start: point,
                current: point,
                points: if tool.is_trail() {
                    vec![point]
                } else {
                    Vec::new()
                },
            }
        };
        self.needs_redraw = true;
        outcome
    }

    pub fn pointer_move(&mut self, point: Point) {
        if let AnnotationState::Drawing {
            tool,
            current,
            points,
            ..
        } = &mut self.state
        {
            *current = point;
            if tool.is_trail() {
                let spacing = match tool {
                    Tool::Mosaic => mosaic::point_spacing(self.style.mosaic_size),
                    _ => self.pen_min_distance,
                };
                maybe_append_point(points, point, spacing);
            }
            self.needs_redraw = true;
        }
    }

    /// Finishes a drawing gesture and appends the resulting operation.
    pub fn pointer_up(&mut self, point: Point) -> CommitOutcome {
        if !matches!(self.state, AnnotationState::Drawing { .. }) {
            return CommitOutcome::Ignored;
        }
        self.pointer_move(point);
        let operation = self.draft_operation();
        self.state = AnnotationState::Idle;
        self.needs_redraw = true;
        match operation {
            Some(operation) => self.push(operation),
            None => CommitOutcome::Discarded,
        }
    }

    /// Drops an in-progress drawing gesture without committing it.
    pub fn cancel_gesture(&mut self) -> bool {
        if !matches!(self.state, AnnotationState::Drawing { .. }) {
            return false;
        }
        self.state = AnnotationState::Idle;
        self.needs_redraw = true;
        true
    }

    // ------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------

    pub fn insert_char(&mut self, c: char) {
        if let AnnotationState::TextInput { buffer, .. } = &mut self.state {
            buffer.push(c);
            self.needs_redraw = true;
        }
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        if let AnnotationState::TextInput { buffer, .. } = &mut self.state {
            buffer.pop();
            self.needs_redraw = true;
        }
    }

    /// Appends the open text box to the log and leaves text entry.
    pub fn commit_text(&mut self) -> CommitOutcome {
        if !self.is_text_input() {
            return CommitOutcome::Ignored;
        }
        let operation = self.draft_operation();
        self.state = AnnotationState::Idle;
        self.needs_redraw = true;
        match operation {
            Some(operation) => self.push(operation),
            None => CommitOutcome::Discarded,
        }
    }

    /// Leaves text entry without keeping the text.
    pub fn cancel_text(&mut self) -> bool {
        if !self.is_text_input() {
            return false;
        }
        self.state = AnnotationState::Idle;
        self.needs_redraw = true;
        true
    }

    // ------------------------------------------------------------------
    // Log
    // ------------------------------------------------------------------

    /// Removes the last operation. A no-op on an empty log.
    pub fn undo(&mut self) -> Option<DrawOperation> {
        let removed = self.log.undo();
        if let Some(operation) = &removed {
            debug!("Undid {} ({} left)", operation.kind(), self.log.len());
            self.needs_redraw = true;
        }
        removed
    }

    /// Clears the log and any in-progress gesture or text box.
    pub fn reset(&mut self) {
        self.log.clear();
        self.state = AnnotationState::Idle;
        self.needs_redraw = true;
    }

    fn push(&mut self, operation: DrawOperation) -> CommitOutcome {
        if !operation.is_visible() {
            return CommitOutcome::Discarded;
        }
        let kind = operation.kind();
        if self.log.try_push(operation, self.max_operations) {
            debug!("Added {kind} ({} operations)", self.log.len());
            CommitOutcome::Added
        } else {
            warn!(
                "Operation limit reached ({} max), discarding {kind}",
                self.max_operations
            );
            CommitOutcome::LimitReached
        }
    }

    /// The operation the current gesture would produce, for live preview.
    pub fn draft_operation(&self) -> Option<DrawOperation> {
        let style = &self.style;
        match &self.state {
            AnnotationState::Idle => None,
            AnnotationState::Drawing {
                tool,
                start,
                current,
                points,
            } => {
                let (color, width, start, end) = (style.color, style.width, *start, *current);
                Some(match tool {
                    Tool::Line => DrawOperation::Line {
                        color,
                        width,
                        start,
                        end,
                    },
                    Tool::Rectangle => DrawOperation::Rectangle {
                        color,
                        width,
                        start,
                        end,
                    },
                    Tool::Circle => DrawOperation::Circle {
                        color,
                        width,
                        start,
                        end,
                    },
                    Tool::Arrow => DrawOperation::Arrow {
                        color,
                        width,
                        start,
                        end,
                    },
                    Tool::Pen => DrawOperation::Pen {
                        color,
                        width,
                        points: points.clone(),
                    },
                    Tool::Mosaic => DrawOperation::Mosaic {
                        size: style.mosaic_size,
                        points: points.clone(),
                    },
                    Tool::Text => return None,
                })
            }
            AnnotationState::TextInput { position, buffer } => Some(DrawOperation::Text {
                color: style.color,
                font_size: style.font_size,
                position: *position,
                text: buffer.clone(),
                align: style.text_align,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Replays base image, log and draft onto `ctx`.
    pub fn render(&self, ctx: &cairo::Context) -> Result<(), cairo::Error> {
        let draft = self.draft_operation();
        render_frame(
            ctx,
            &self.base,
            self.log.operations(),
            draft.as_ref(),
            &self.render_options,
        )
    }

    /// Flattens the base image and the committed log into a new surface.
    ///
    /// The draft (including an open text box) is not part of the result;
    /// callers commit text before flattening.
    pub fn flatten(&self) -> Result<cairo::ImageSurface, bitmap::BitmapError> {
        let surface =
            cairo::ImageSurface::create(cairo::Format::ARgb32, self.width(), self.height())?;
        {
            let ctx = cairo::Context::new(&surface)?;
            render_frame(
                &ctx,
                &self.base,
                self.log.operations(),
                None,
                &self.render_options,
            )?;
        }
        surface.flush();
        Ok(surface)
    }

    /// Flattens and encodes as PNG.
    pub fn flatten_png(&self) -> Result<Vec<u8>, bitmap::BitmapError> {
        bitmap::encode_png(&self.flatten()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED};

    fn blank(width: i32, height: i32) -> cairo::ImageSurface {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
        let ctx = cairo::Context::new(&surface).unwrap();
        ctx.set_source_rgb(1.0, 1.0, 1.0);
        ctx.paint().unwrap();
        drop(ctx);
        surface
    }

    fn engine() -> AnnotationEngine {
        AnnotationEngine::new(blank(200, 100), &AnnotationConfig::default())
    }

    fn draw(
        engine: &mut AnnotationEngine,
        tool: Tool,
        from: (f64, f64),
        to: (f64, f64),
    ) -> CommitOutcome {
        engine.set_tool(tool);
        engine.pointer_down(Point::new(from.0, from.1));
        engine.pointer_move(Point::new(to.0, to.1));
        engine.pointer_up(Point::new(to.0, to.1))
    }

    #[test]
    fn style_comes_from_config() {
        let engine = engine();
        assert_eq!(engine.style().color, RED);
        assert_eq!(engine.style().width, 4.0);
        assert_eq!(engine.style().tool, Tool::Rectangle);
    }

    #[test]
    fn drag_appends_shape_with_current_style() {
        let mut engine = engine();
        engine.set_color(BLUE);
        assert_eq!(
            draw(&mut engine, Tool::Arrow, (10.0, 10.0), (120.0, 60.0)),
            CommitOutcome::Added
        );
        match &engine.operations()[0] {
            DrawOperation::Arrow { color, start, end, .. } => {
                assert_eq!(*color, BLUE);
                assert_eq!(*start, Point::new(10.0, 10.0));
                assert_eq!(*end, Point::new(120.0, 60.0));
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn only_trail_tools_collect_points() {
        let mut engine = engine();
        engine.set_tool(Tool::Rectangle);
        engine.pointer_down(Point::new(10.0, 10.0));
        engine.pointer_move(Point::new(60.0, 40.0));
        match engine.state() {
            AnnotationState::Drawing { points, current, .. } => {
                assert!(points.is_empty());
                assert_eq!(*current, Point::new(60.0, 40.0));
            }
            other => panic!("unexpected state {other:?}"),
        }
        engine.cancel_gesture();

        engine.set_tool(Tool::Mosaic);
        engine.pointer_down(Point::new(10.0, 10.0));
        engine.pointer_move(Point::new(90.0, 10.0));
        match engine.state() {
            AnnotationState::Drawing { points, .. } => assert_eq!(points.len(), 2),
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn zero_length_drag_is_discarded() {
        let mut engine = engine();
        assert_eq!(
            draw(&mut engine, Tool::Line, (10.0, 10.0), (10.0, 10.0)),
            CommitOutcome::Discarded
        );
        assert!(engine.operations().is_empty());
    }

    #[test]
    fn pen_skips_oversampled_points() {
        let mut engine = engine();
        engine.set_tool(Tool::Pen);
        engine.pointer_down(Point::new(0.0, 0.0));
        engine.pointer_move(Point::new(0.5, 0.5));
        engine.pointer_move(Point::new(10.0, 0.0));
        engine.pointer_move(Point::new(10.5, 0.0));
        engine.pointer_up(Point::new(20.0, 0.0));
        match &engine.operations()[0] {
            DrawOperation::Pen { points, .. } => assert_eq!(points.len(), 3),
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn text_entry_commits_multiline_text() {
        let mut engine = engine();
        engine.set_tool(Tool::Text);
        engine.pointer_down(Point::new(20.0, 20.0));
        assert!(engine.is_text_input());
        for c in "hi".chars() {
            engine.insert_char(c);
        }
        engine.insert_newline();
        engine.insert_char('x');
        engine.backspace();
        engine.insert_char('y');
        assert_eq!(engine.commit_text(), CommitOutcome::Added);
        match &engine.operations()[0] {
            DrawOperation::Text { text, position, .. } => {
                assert_eq!(text, "hi\ny");
                assert_eq!(*position, Point::new(20.0, 20.0));
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn clicking_elsewhere_commits_open_text_box() {
        let mut engine = engine();
        engine.set_tool(Tool::Text);
        engine.pointer_down(Point::new(20.0, 20.0));
        engine.insert_char('a');
        assert_eq!(engine.pointer_down(Point::new(80.0, 40.0)), CommitOutcome::Added);
        assert!(engine.is_text_input());
        assert_eq!(engine.operations().len(), 1);
    }

    #[test]
    fn blank_text_is_discarded_and_cancel_drops_buffer() {
        let mut engine = engine();
        engine.set_tool(Tool::Text);
        engine.pointer_down(Point::new(20.0, 20.0));
        engine.insert_char(' ');
        assert_eq!(engine.commit_text(), CommitOutcome::Discarded);

        engine.pointer_down(Point::new(20.0, 20.0));
        engine.insert_char('a');
        assert!(engine.cancel_text());
        assert!(engine.operations().is_empty());
    }

    #[test]
    fn undo_on_empty_log_is_a_no_op() {
        let mut engine = engine();
        assert!(engine.undo().is_none());
        assert!(engine.undo().is_none());
        draw(&mut engine, Tool::Rectangle, (10.0, 10.0), (50.0, 50.0));
        assert!(engine.undo().is_some());
        assert!(engine.undo().is_none());
    }

    #[test]
    fn reset_clears_log_and_pending_text() {
        let mut engine = engine();
        draw(&mut engine, Tool::Circle, (10.0, 10.0), (50.0, 40.0));
        engine.set_tool(Tool::Text);
        engine.pointer_down(Point::new(5.0, 5.0));
        engine.insert_char('a');
        engine.reset();
        assert!(engine.operations().is_empty());
        assert_eq!(engine.state(), &AnnotationState::Idle);
    }

    #[test]
    fn operation_limit_is_enforced() {
        let config = AnnotationConfig {
            max_operations: 1,
            ..AnnotationConfig::default()
        };
        let mut engine = AnnotationEngine::new(blank(100, 100), &config);
        assert_eq!(draw(&mut engine, Tool::Line, (0.0, 0.0), (50.0, 50.0)), CommitOutcome::Added);
        assert_eq!(
            draw(&mut engine, Tool::Line, (0.0, 50.0), (50.0, 0.0)),
            CommitOutcome::LimitReached
        );
        assert_eq!(engine.operations().len(), 1);
    }

    #[test]
    fn flatten_matches_base_size() {
        let mut engine = engine();
        draw(&mut engine, Tool::Rectangle, (10.0, 10.0), (150.0, 80.0));
        let flat = engine.flatten().unwrap();
        assert_eq!((flat.width(), flat.height()), (200, 100));

        let png = engine.flatten_png().unwrap();
        let decoded = bitmap::decode_png(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
    }
}
