//! Selection rectangle lifecycle: draft, move, resize.

use super::events::PointerId;
use crate::config::SelectionConfig;
use crate::overlay::GeometryError;
use crate::util::{Point, Rect, Size, clamp_f64};
use log::debug;

/// One of the eight resize handles around a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Handle {
    /// Corners first, so they win over the adjacent edge handles.
    pub const ALL: [Handle; 8] = [
        Handle::NW,
        Handle::NE,
        Handle::SE,
        Handle::SW,
        Handle::N,
        Handle::E,
        Handle::S,
        Handle::W,
    ];

    /// Position of the handle on `rect`.
    pub fn position(self, rect: &Rect) -> Point {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        match self {
            Handle::N => Point::new(cx, rect.y),
            Handle::S => Point::new(cx, rect.bottom()),
            Handle::E => Point::new(rect.right(), cy),
            Handle::W => Point::new(rect.x, cy),
            Handle::NE => Point::new(rect.right(), rect.y),
            Handle::NW => Point::new(rect.x, rect.y),
            Handle::SE => Point::new(rect.right(), rect.bottom()),
            Handle::SW => Point::new(rect.x, rect.bottom()),
        }
    }

    fn moves_left(self) -> bool {
        matches!(self, Handle::W | Handle::NW | Handle::SW)
    }

    fn moves_right(self) -> bool {
        matches!(self, Handle::E | Handle::NE | Handle::SE)
    }

    fn moves_top(self) -> bool {
        matches!(self, Handle::N | Handle::NE | Handle::NW)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Handle::S | Handle::SE | Handle::SW)
    }
}

/// The gesture currently driven by a held pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Drawing a new rectangle from `anchor`
    Draft { pointer: PointerId, anchor: Point },
    /// Dragging the whole selection; `offset` is the grab point relative to its origin
    Move {
        pointer: PointerId,
        initial: Rect,
        offset: Point,
    },
    /// Dragging one handle; `origin` is where the pointer went down
    Resize {
        pointer: PointerId,
        initial: Rect,
        handle: Handle,
        origin: Point,
    },
}

impl Interaction {
    pub fn pointer(&self) -> PointerId {
        match self {
            Interaction::Draft { pointer, .. }
            | Interaction::Move { pointer, .. }
            | Interaction::Resize { pointer, .. } => *pointer,
        }
    }
}

/// Selection-level phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    Idle,
    Drawing,
    Selected,
}

/// Owns the selection rectangle and the single active pointer gesture.
///
/// Pointer events from any pointer other than the one that started the
/// current gesture are ignored until it is released.
#[derive(Debug, Clone)]
pub struct SelectionController {
    config: SelectionConfig,
    bounds: Size,
    rect: Option<Rect>,
    interaction: Option<Interaction>,
}

impl SelectionController {
    /// `bounds` is the overlay viewport the selection must stay within.
    pub fn new(config: SelectionConfig, bounds: Size) -> Self {
        Self {
            config,
            bounds,
            rect: None,
            interaction: None,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        match (&self.interaction, &self.rect) {
            (Some(Interaction::Draft { .. }), _) => SelectionPhase::Drawing,
            (_, Some(_)) => SelectionPhase::Selected,
            (_, None) => SelectionPhase::Idle,
        }
    }

    /// The draft or finalized rectangle, whichever is current.
    pub fn rect(&self) -> Option<Rect> {
        self.rect
    }

    /// The finalized selection (none while a draft is being drawn).
    pub fn selection(&self) -> Option<Rect> {
        match self.phase() {
            SelectionPhase::Selected => self.rect,
            _ => None,
        }
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.interaction.as_ref()
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn min_size(&self) -> f64 {
        self.config.min_selection_size
    }

    /// Finds the resize handle under `point`, if a selection exists.
    pub fn handle_at(&self, point: Point) -> Option<Handle> {
        let rect = self.selection()?;
        let reach = self.config.handle_hit_size / 2.0;
        Handle::ALL.into_iter().find(|handle| {
            let pos = handle.position(&rect);
            (point.x - pos.x).abs() <= reach && (point.y - pos.y).abs() <= reach
        })
    }

    /// Starts a gesture. Returns `false` when the event was ignored because
    /// another pointer already owns the interaction.
    pub fn pointer_down(&mut self, pointer: PointerId, point: Point) -> bool {
        if self.interaction.is_some() {
            return false;
        }
        let point = self.clamp_point(point);

        if let Some(rect) = self.selection() {
            if let Some(handle) = self.handle_at(point) {
                debug!("Resize via {:?} handle", handle);
                self.interaction = Some(Interaction::Resize {
                    pointer,
                    initial: rect,
                    handle,
                    origin: point,
                });
                return true;
            }
            if rect.contains(point) {
                self.interaction = Some(Interaction::Move {
                    pointer,
                    initial: rect,
                    offset: Point::new(point.x - rect.x, point.y - rect.y),
                });
                return true;
            }
        }

        self.interaction = Some(Interaction::Draft {
            pointer,
            anchor: point,
        });
        self.rect = Some(Rect::new(point.x, point.y, 0.0, 0.0));
        true
    }

    /// Recomputes the rectangle for the active gesture.
    ///
    /// Returns the proposed rectangle (for snapping), or `None` when the event
    /// does not belong to the active pointer.
    pub fn pointer_move(&mut self, pointer: PointerId, point: Point) -> Option<Rect> {
        let interaction = self.interaction.filter(|i| i.pointer() == pointer)?;
        let point = self.clamp_point(point);

        let rect = match interaction {
            Interaction::Draft { anchor, .. } => Rect::from_points(anchor, point),
            Interaction::Move { initial, offset, .. } => Rect {
                x: point.x - offset.x,
                y: point.y - offset.y,
                ..initial
            }
            .fit_within(self.bounds),
            Interaction::Resize {
                initial,
                handle,
                origin,
                ..
            } => self.resized(initial, handle, point.x - origin.x, point.y - origin.y),
        };

        self.rect = Some(rect);
        Some(rect)
    }

    /// Replaces the live rectangle with a snapped one.
    pub fn apply_snap(&mut self, rect: Rect) {
        if self.rect.is_some() {
            self.rect = Some(rect);
        }
    }

    /// Ends the active gesture.
    ///
    /// A draft below the minimum size is discarded and the controller returns
    /// to idle with [`GeometryError::SelectionTooSmall`]. Returns `None` for
    /// events from another pointer.
    pub fn pointer_up(&mut self, pointer: PointerId) -> Option<Result<Rect, GeometryError>> {
        let interaction = self.interaction.filter(|i| i.pointer() == pointer)?;
        self.interaction = None;
        let rect = self.rect?;

        if matches!(interaction, Interaction::Draft { .. }) {
            let min = self.config.min_selection_size;
            if rect.width < min || rect.height < min {
                debug!("Discarding {}x{} draft", rect.width, rect.height);
                self.rect = None;
                return Some(Err(GeometryError::SelectionTooSmall {
                    width: rect.width,
                    height: rect.height,
                    min,
                }));
            }
        }

        let rect = self.finalized(rect);
        self.rect = Some(rect);
        Some(Ok(rect))
    }

    /// Abandons the active gesture (pointer cancel). A draft is discarded; a
    /// move or resize reverts to the rectangle it started from.
    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        match self.interaction.filter(|i| i.pointer() == pointer) {
            Some(Interaction::Draft { .. }) => self.rect = None,
            Some(Interaction::Move { initial, .. }) | Some(Interaction::Resize { initial, .. }) => {
                self.rect = Some(initial)
            }
            None => return,
        }
        self.interaction = None;
    }

    /// Installs a finalized selection directly (hover-to-commit).
    pub fn set_selection(&mut self, rect: Rect) -> Rect {
        let rect = self.finalized(rect);
        self.interaction = None;
        self.rect = Some(rect);
        rect
    }

    /// Discards the selection and any gesture.
    pub fn reset(&mut self) {
        self.rect = None;
        self.interaction = None;
    }

    pub fn set_bounds(&mut self, bounds: Size) {
        self.bounds = bounds;
        if let Some(rect) = self.selection() {
            self.rect = Some(self.finalized(rect));
        }
    }

    fn clamp_point(&self, point: Point) -> Point {
        Point::new(
            clamp_f64(point.x, 0.0, self.bounds.width),
            clamp_f64(point.y, 0.0, self.bounds.height),
        )
    }

    fn finalized(&self, rect: Rect) -> Rect {
        rect.with_min_size(self.config.min_selection_size)
            .fit_within(self.bounds)
    }

    /// Moves the edges owned by `handle` by `(dx, dy)`. The opposite edges stay
    /// put; a moving edge stops `min` short of its opposite and at the bounds.
    fn resized(&self, initial: Rect, handle: Handle, dx: f64, dy: f64) -> Rect {
        let min = self.config.min_selection_size;
        let (mut left, mut top) = (initial.x, initial.y);
        let (mut right, mut bottom) = (initial.right(), initial.bottom());

        if handle.moves_left() {
            left = clamp_f64(initial.x + dx, 0.0, right - min);
        }
        if handle.moves_right() {
            right = clamp_f64(initial.right() + dx, left + min, self.bounds.width);
        }
        if handle.moves_top() {
            top = clamp_f64(initial.y + dy, 0.0, bottom - min);
        }
        if handle.moves_bottom() {
            bottom = clamp_f64(initial.bottom() + dy, top + min, self.bounds.height);
        }

        Rect::from_edges(left, top, right, bottom)
    }
}
