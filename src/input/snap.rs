//! Window snapping for the selection rectangle.
//!
//! A proposed rectangle (draft, moved or resized) is replaced by a detected
//! window's exact bounds when:
//! - the pointer is inside the window, or the rectangle covers at least
//!   `coverage_threshold` of the window's area, and
//! - every edge lies within the edge tolerance (widened by
//!   `pointer_tolerance_multiplier` while the pointer is inside).
//!
//! Among the matches the one with the smallest worst-edge distance wins.

use crate::config::SnapConfig;
use crate::overlay::CoordinateTransform;
use crate::util::{Point, Rect};
use log::debug;
use serde::{Deserialize, Serialize};

/// A window as reported by the host, in global physical pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSnapTarget {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A snap candidate in overlay-local pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapTarget {
    pub id: u32,
    pub name: String,
    pub rect: Rect,
}

/// Projects raw windows into overlay-local candidates.
///
/// Windows smaller than `min_target_size` (physical pixels) are dropped, the
/// rest are mapped into the overlay, clipped to the viewport, and dropped if
/// the visible part is smaller than `min_selection_size` in either dimension.
pub fn project_targets(
    raw: &[RawSnapTarget],
    transform: &CoordinateTransform,
    min_target_size: f64,
    min_selection_size: f64,
) -> Vec<SnapTarget> {
    raw.iter()
        .filter(|window| window.width >= min_target_size && window.height >= min_target_size)
        .filter_map(|window| {
            let physical = Rect::new(window.x, window.y, window.width, window.height);
            let rect = transform.clip_to_viewport(transform.to_overlay_rect(physical))?;
            if rect.width < min_selection_size || rect.height < min_selection_size {
                return None;
            }
            Some(SnapTarget {
                id: window.id,
                name: window.name.clone(),
                rect,
            })
        })
        .collect()
}

/// Snap candidate matching plus the hover-to-commit highlight.
#[derive(Debug, Clone)]
pub struct WindowSnapEngine {
    config: SnapConfig,
    targets: Vec<SnapTarget>,
    highlighted: Option<usize>,
}

impl WindowSnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self {
            config,
            targets: Vec::new(),
            highlighted: None,
        }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn targets(&self) -> &[SnapTarget] {
        &self.targets
    }

    /// Replaces the candidate list, keeping the highlight if its window survived.
    pub fn set_targets(&mut self, targets: Vec<SnapTarget>) {
        let highlighted_id = self.highlighted().map(|target| target.id);
        self.targets = targets;
        self.highlighted =
            highlighted_id.and_then(|id| self.targets.iter().position(|target| target.id == id));
    }

    /// Best matching candidate for `proposed`, if any.
    pub fn find_snap(&self, proposed: Rect, pointer: Point) -> Option<&SnapTarget> {
        if !self.config.enabled {
            return None;
        }

        self.targets
            .iter()
            .filter_map(|target| {
                let candidate_area = target.rect.area();
                if candidate_area <= 0.0 {
                    return None;
                }
                let coverage = proposed.intersection_area(&target.rect) / candidate_area;
                let pointer_inside = target.rect.contains(pointer);
                if !pointer_inside && coverage < self.config.coverage_threshold {
                    return None;
                }

                let tolerance = if pointer_inside {
                    self.config.edge_tolerance * self.config.pointer_tolerance_multiplier
                } else {
                    self.config.edge_tolerance
                };
                let score = proposed.max_edge_distance(&target.rect);
                (score <= tolerance).then_some((target, score))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(target, _)| target)
    }

    /// Returns the candidate's bounds when one matches, `proposed` otherwise.
    pub fn snap(&self, proposed: Rect, pointer: Point) -> Rect {
        match self.find_snap(proposed, pointer) {
            Some(target) => {
                debug!("Snapped selection to window {} '{}'", target.id, target.name);
                target.rect
            }
            None => proposed,
        }
    }

    /// Updates the hover highlight for an idle pointer.
    ///
    /// The smallest candidate containing the pointer is highlighted, so a
    /// dialog wins over the window behind it.
    pub fn hover(&mut self, pointer: Point) -> Option<&SnapTarget> {
        if !self.config.enabled {
            self.highlighted = None;
            return None;
        }
        self.highlighted = self
            .targets
            .iter()
            .enumerate()
            .filter(|(_, target)| target.rect.contains(pointer))
            .min_by(|a, b| a.1.rect.area().total_cmp(&b.1.rect.area()))
            .map(|(index, _)| index);
        self.highlighted()
    }

    pub fn highlighted(&self) -> Option<&SnapTarget> {
        self.highlighted.and_then(|index| self.targets.get(index))
    }

    pub fn clear_highlight(&mut self) {
        self.highlighted = None;
    }

    /// Resolves a press/release pair into a click on the highlighted window.
    ///
    /// Succeeds only when the pointer travelled less than the hover movement
    /// threshold and the release is still inside the highlighted candidate.
    pub fn click_target(&self, press: Point, release: Point) -> Option<Rect> {
        let target = self.highlighted()?;
        if press.distance_to(release) > self.config.hover_move_threshold {
            return None;
        }
        target.rect.contains(release).then_some(target.rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayMetadata;
    use crate::util::Size;

    fn engine_with(rects: &[Rect]) -> WindowSnapEngine {
        let mut engine = WindowSnapEngine::new(SnapConfig::default());
        engine.set_targets(
            rects
                .iter()
                .enumerate()
                .map(|(index, rect)| SnapTarget {
                    id: index as u32,
                    name: format!("window {index}"),
                    rect: *rect,
                })
                .collect(),
        );
        engine
    }

    #[test]
    fn covering_draft_snaps_to_exact_bounds() {
        let window = Rect::new(100.0, 100.0, 400.0, 300.0);
        let engine = engine_with(&[window]);
        // Pointer ends just outside the window, but the draft covers all of it.
        let draft = Rect::new(95.0, 96.0, 408.0, 306.0);
        assert_eq!(engine.snap(draft, Point::new(503.0, 402.0)), window);
    }

    #[test]
    fn distant_edges_do_not_snap() {
        let window = Rect::new(100.0, 100.0, 400.0, 300.0);
        let engine = engine_with(&[window]);
        let draft = Rect::new(50.0, 100.0, 450.0, 300.0);
        assert_eq!(engine.snap(draft, Point::new(300.0, 250.0)), draft);
    }

    #[test]
    fn pointer_inside_widens_tolerance() {
        let window = Rect::new(100.0, 100.0, 400.0, 300.0);
        let engine = engine_with(&[window]);
        // 15px off: over 12 but within 12 * 1.5.
        let draft = Rect::new(115.0, 100.0, 385.0, 300.0);
        assert_eq!(engine.snap(draft, Point::new(300.0, 250.0)), window);
        // With the pointer outside, only the normal tolerance applies.
        assert_eq!(engine.snap(draft, Point::new(20.0, 20.0)), draft);
    }

    #[test]
    fn closest_candidate_wins() {
        let outer = Rect::new(100.0, 100.0, 400.0, 300.0);
        let inner = Rect::new(104.0, 104.0, 392.0, 292.0);
        let engine = engine_with(&[outer, inner]);
        let draft = Rect::new(105.0, 105.0, 390.0, 290.0);
        assert_eq!(engine.snap(draft, Point::new(300.0, 250.0)), inner);
    }

    #[test]
    fn disabled_engine_passes_through() {
        let window = Rect::new(100.0, 100.0, 400.0, 300.0);
        let mut engine = engine_with(&[window]);
        engine.config.enabled = false;
        assert_eq!(engine.snap(window, Point::new(300.0, 250.0)), window);
        assert!(engine.hover(Point::new(300.0, 250.0)).is_none());
    }

    #[test]
    fn hover_highlights_innermost_window() {
        let outer = Rect::new(0.0, 0.0, 800.0, 600.0);
        let dialog = Rect::new(200.0, 200.0, 300.0, 200.0);
        let mut engine = engine_with(&[outer, dialog]);
        assert_eq!(engine.hover(Point::new(250.0, 250.0)).map(|t| t.rect), Some(dialog));
        assert_eq!(engine.hover(Point::new(50.0, 50.0)).map(|t| t.rect), Some(outer));
    }

    #[test]
    fn click_without_drag_resolves_target() {
        let window = Rect::new(100.0, 100.0, 400.0, 300.0);
        let mut engine = engine_with(&[window]);
        engine.hover(Point::new(200.0, 200.0));
        assert_eq!(
            engine.click_target(Point::new(200.0, 200.0), Point::new(202.0, 201.0)),
            Some(window)
        );
        assert_eq!(
            engine.click_target(Point::new(200.0, 200.0), Point::new(240.0, 200.0)),
            None
        );
    }

    #[test]
    fn highlight_survives_refresh_by_id() {
        let window = Rect::new(100.0, 100.0, 400.0, 300.0);
        let mut engine = engine_with(&[window]);
        engine.hover(Point::new(200.0, 200.0));
        engine.set_targets(vec![
            SnapTarget {
                id: 7,
                name: "other".into(),
                rect: Rect::new(0.0, 0.0, 50.0, 50.0),
            },
            SnapTarget {
                id: 0,
                name: "moved".into(),
                rect: Rect::new(110.0, 100.0, 400.0, 300.0),
            },
        ]);
        assert_eq!(engine.highlighted().map(|t| t.name.as_str()), Some("moved"));
    }

    #[test]
    fn projection_filters_and_clips() {
        let metadata = OverlayMetadata::from_physical(0, 0, 2880, 1800, 2.0);
        let transform = CoordinateTransform::new(metadata, Size::new(1440.0, 900.0));
        let raw = vec![
            RawSnapTarget {
                id: 1,
                name: "editor".into(),
                x: 200.0,
                y: 100.0,
                width: 1000.0,
                height: 800.0,
            },
            RawSnapTarget {
                id: 2,
                name: "tooltip".into(),
                x: 0.0,
                y: 0.0,
                width: 30.0,
                height: 200.0,
            },
            RawSnapTarget {
                id: 3,
                name: "mostly offscreen".into(),
                x: 2870.0,
                y: 0.0,
                width: 800.0,
                height: 600.0,
            },
            RawSnapTarget {
                id: 4,
                name: "other monitor".into(),
                x: 3000.0,
                y: 0.0,
                width: 800.0,
                height: 600.0,
            },
        ];

        let targets = project_targets(&raw, &transform, 40.0, 6.0);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].rect, Rect::new(100.0, 50.0, 500.0, 400.0));
    }
}
