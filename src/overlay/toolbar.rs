//! Floating toolbar placement relative to the selection or capture rect.

use crate::config::ToolbarConfig;
use crate::util::{Rect, Size, clamp_f64};
use log::debug;

/// Where the toolbar ended up relative to its anchor rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Below the anchor
    Outside,
    /// Overlapping the anchor's lower edge, because there is no room below
    Inside,
}

/// Top-left position of the toolbar in overlay pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolbarPlacement {
    pub x: f64,
    pub y: f64,
    pub mode: PlacementMode,
}

/// Computes the toolbar position for `anchor`.
pub fn compute_placement(
    anchor: Rect,
    viewport: Size,
    toolbar: Size,
    config: &ToolbarConfig,
) -> ToolbarPlacement {
    let margin = config.margin;

    let centered = anchor.center().x - toolbar.width / 2.0;
    let x = clamp_f64(centered, margin, viewport.width - toolbar.width - margin);

    let space_below = viewport.height - anchor.bottom() - margin - config.dock_inset;
    if space_below >= toolbar.height {
        return ToolbarPlacement {
            x,
            y: anchor.bottom() + margin,
            mode: PlacementMode::Outside,
        };
    }

    // Shift down by the overflow past the anchor's top edge.
    let y = (anchor.bottom() - margin - toolbar.height).max(anchor.y);
    ToolbarPlacement {
        x,
        y,
        mode: PlacementMode::Inside,
    }
}

/// Memoizing wrapper around [`compute_placement`].
///
/// Every setter returns `true` only when the placement differs from the last
/// one computed, so hosts can skip relayout otherwise.
#[derive(Debug, Clone)]
pub struct ToolbarPlacer {
    config: ToolbarConfig,
    anchor: Option<Rect>,
    viewport: Size,
    measured: Option<Size>,
    current: Option<ToolbarPlacement>,
}

impl ToolbarPlacer {
    pub fn new(config: ToolbarConfig, viewport: Size) -> Self {
        Self {
            config,
            anchor: None,
            viewport,
            measured: None,
            current: None,
        }
    }

    /// Size used for layout: the measured size, or the configured estimate.
    pub fn toolbar_size(&self) -> Size {
        self.measured.unwrap_or(Size::new(
            self.config.estimated_width,
            self.config.estimated_height,
        ))
    }

    pub fn current(&self) -> Option<ToolbarPlacement> {
        self.current
    }

    pub fn set_anchor(&mut self, anchor: Option<Rect>) -> bool {
        if self.anchor == anchor {
            return false;
        }
        self.anchor = anchor;
        self.recompute()
    }

    pub fn set_viewport(&mut self, viewport: Size) -> bool {
        if self.viewport == viewport {
            return false;
        }
        self.viewport = viewport;
        self.recompute()
    }

    /// Records the real toolbar size once the host has laid it out.
    pub fn set_measured_size(&mut self, size: Size) -> bool {
        if size.is_degenerate() || self.measured == Some(size) {
            return false;
        }
        self.measured = Some(size);
        self.recompute()
    }

    fn recompute(&mut self) -> bool {
        let toolbar = self.toolbar_size();
        let next = self
            .anchor
            .map(|anchor| compute_placement(anchor, self.viewport, toolbar, &self.config));
        if next == self.current {
            return false;
        }
        debug!("Toolbar placement changed: {:?}", next);
        self.current = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ToolbarConfig {
        ToolbarConfig {
            margin: 12.0,
            estimated_width: 300.0,
            estimated_height: 48.0,
            dock_inset: 0.0,
        }
    }

    #[test]
    fn prefers_space_below_the_anchor() {
        let placement = compute_placement(
            Rect::new(100.0, 100.0, 400.0, 200.0),
            Size::new(1440.0, 900.0),
            Size::new(300.0, 48.0),
            &config(),
        );
        assert_eq!(placement.mode, PlacementMode::Outside);
        assert_eq!(placement.x, 150.0);
        assert_eq!(placement.y, 312.0);
    }

    #[test]
    fn falls_back_inside_when_below_is_too_tight() {
        // 900 - 780 - 12 = 108 < 120
        let placement = compute_placement(
            Rect::new(100.0, 300.0, 400.0, 480.0),
            Size::new(1440.0, 900.0),
            Size::new(300.0, 120.0),
            &config(),
        );
        assert_eq!(placement.mode, PlacementMode::Inside);
        assert_eq!(placement.y, 780.0 - 12.0 - 120.0);
    }

    #[test]
    fn inside_placement_never_rises_above_the_anchor_top() {
        let placement = compute_placement(
            Rect::new(100.0, 850.0, 400.0, 40.0),
            Size::new(1440.0, 900.0),
            Size::new(300.0, 48.0),
            &config(),
        );
        assert_eq!(placement.mode, PlacementMode::Inside);
        assert_eq!(placement.y, 850.0);
    }

    #[test]
    fn dock_inset_reduces_space_below() {
        let mut config = config();
        config.dock_inset = 80.0;
        let placement = compute_placement(
            Rect::new(100.0, 100.0, 400.0, 700.0),
            Size::new(1440.0, 900.0),
            Size::new(300.0, 48.0),
            &config,
        );
        assert_eq!(placement.mode, PlacementMode::Inside);
    }

    #[test]
    fn horizontal_position_is_clamped_to_margins() {
        let left = compute_placement(
            Rect::new(0.0, 100.0, 40.0, 40.0),
            Size::new(1440.0, 900.0),
            Size::new(300.0, 48.0),
            &config(),
        );
        assert_eq!(left.x, 12.0);

        let right = compute_placement(
            Rect::new(1400.0, 100.0, 40.0, 40.0),
            Size::new(1440.0, 900.0),
            Size::new(300.0, 48.0),
            &config(),
        );
        assert_eq!(right.x, 1440.0 - 300.0 - 12.0);
    }

    #[test]
    fn placer_only_reports_changes() {
        let mut placer = ToolbarPlacer::new(config(), Size::new(1440.0, 900.0));
        let anchor = Rect::new(100.0, 100.0, 400.0, 200.0);

        assert!(placer.set_anchor(Some(anchor)));
        assert!(!placer.set_anchor(Some(anchor)));

        // Same size as the estimate: no visible change.
        assert!(!placer.set_measured_size(Size::new(300.0, 48.0)));

        assert!(placer.set_measured_size(Size::new(200.0, 48.0)));
        assert_eq!(placer.current().map(|p| p.x), Some(200.0));

        assert!(placer.set_anchor(None));
        assert!(placer.current().is_none());
    }
}
