//! Tapered arrow outline geometry.
//!
//! Arrows are filled polygons rather than a stroked line plus a triangle: the
//! body widens from a thin tail to a neck, then flares into the head. The
//! outline is expressed as path segments so it can be rendered by Cairo and
//! inspected in tests.

use crate::util::Point;

/// Head length never exceeds this share of the arrow's total length.
pub const MAX_HEAD_RATIO: f64 = 0.7;

/// Bodies shorter than this are drawn with straight sides instead of curves.
const MIN_CURVED_BODY: f64 = 4.0;

/// One segment of the arrow outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    /// Quadratic Bézier with a control point
    QuadTo { control: Point, to: Point },
}

/// Closed arrow outline plus the derived dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowOutline {
    pub segments: Vec<PathSegment>,
    pub tip: Point,
    pub head_length: f64,
    pub tail_half: f64,
    pub neck_half: f64,
    pub head_half: f64,
}

/// Computes the outline of an arrow from `start` (tail) to `end` (tip).
///
/// Returns `None` when the arrow is shorter than one pixel.
pub fn arrow_outline(start: Point, end: Point, width: f64) -> Option<ArrowOutline> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length < 1.0 {
        return None;
    }

    let width = width.max(1.0);
    let u = Point::new(dx / length, dy / length);
    let n = Point::new(-u.y, u.x);

    let tail_half = (width * 0.35).max(0.75);
    let neck_half = (width * 0.6).max(tail_half + 0.5);
    let head_half = (width * 2.2).max(neck_half + 3.0);
    let head_length = (width * 3.2).max(10.0).min(length * MAX_HEAD_RATIO);
    let body_length = length - head_length;

    let along = |distance: f64, offset: f64| {
        Point::new(
            start.x + u.x * distance + n.x * offset,
            start.y + u.y * distance + n.y * offset,
        )
    };

    let head_base = body_length;
    let neck = (body_length - head_length * 0.15).max(0.0);

    let tail_left = along(0.0, tail_half);
    let tail_right = along(0.0, -tail_half);
    let neck_left = along(neck, neck_half);
    let neck_right = along(neck, -neck_half);
    let head_left = along(head_base, head_half);
    let head_right = along(head_base, -head_half);

    let mut segments = vec![PathSegment::MoveTo(tail_left)];

    let curved_body = neck >= MIN_CURVED_BODY;
    if curved_body {
        segments.push(PathSegment::QuadTo {
            control: along(neck * 0.5, (tail_half + neck_half) * 0.5),
            to: neck_left,
        });
    } else {
        segments.push(PathSegment::LineTo(neck_left));
    }
    segments.push(PathSegment::QuadTo {
        control: along(head_base, neck_half),
        to: head_left,
    });
    segments.push(PathSegment::LineTo(end));
    segments.push(PathSegment::LineTo(head_right));
    segments.push(PathSegment::QuadTo {
        control: along(head_base, -neck_half),
        to: neck_right,
    });
    if curved_body {
        segments.push(PathSegment::QuadTo {
            control: along(neck * 0.5, -(tail_half + neck_half) * 0.5),
            to: tail_right,
        });
    } else {
        segments.push(PathSegment::LineTo(tail_right));
    }

    Some(ArrowOutline {
        segments,
        tip: end,
        head_length,
        tail_half,
        neck_half,
        head_half,
    })
}

/// Appends the outline to the current Cairo path and closes it.
///
/// Quadratic segments are raised to cubics since Cairo only has `curve_to`.
pub fn trace_outline(ctx: &cairo::Context, outline: &ArrowOutline) {
    let mut current = Point::default();
    for segment in &outline.segments {
        match *segment {
            PathSegment::MoveTo(p) => {
                ctx.move_to(p.x, p.y);
                current = p;
            }
            PathSegment::LineTo(p) => {
                ctx.line_to(p.x, p.y);
                current = p;
            }
            PathSegment::QuadTo { control, to } => {
                let c1 = Point::new(
                    current.x + 2.0 / 3.0 * (control.x - current.x),
                    current.y + 2.0 / 3.0 * (control.y - current.y),
                );
                let c2 = Point::new(
                    to.x + 2.0 / 3.0 * (control.x - to.x),
                    to.y + 2.0 / 3.0 * (control.y - to.y),
                );
                ctx.curve_to(c1.x, c1.y, c2.x, c2.y, to.x, to.y);
                current = to;
            }
        }
    }
    ctx.close_path();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(segment: &PathSegment) -> Point {
        match *segment {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => p,
            PathSegment::QuadTo { to, .. } => to,
        }
    }

    #[test]
    fn degenerate_arrow_has_no_outline() {
        let p = Point::new(5.0, 5.0);
        assert!(arrow_outline(p, p, 4.0).is_none());
    }

    #[test]
    fn head_shrinks_on_short_arrows() {
        let outline = arrow_outline(Point::new(0.0, 0.0), Point::new(10.0, 0.0), 8.0).unwrap();
        assert!(outline.head_length <= 10.0 * MAX_HEAD_RATIO + 1e-9);

        let long = arrow_outline(Point::new(0.0, 0.0), Point::new(400.0, 0.0), 8.0).unwrap();
        assert!((long.head_length - 25.6).abs() < 1e-9);
    }

    #[test]
    fn widths_taper_from_tail_to_head() {
        let outline = arrow_outline(Point::new(0.0, 0.0), Point::new(200.0, 0.0), 4.0).unwrap();
        assert!(outline.tail_half < outline.neck_half);
        assert!(outline.neck_half < outline.head_half);
    }

    #[test]
    fn outline_passes_through_tip_and_is_symmetric() {
        let outline = arrow_outline(Point::new(0.0, 0.0), Point::new(100.0, 0.0), 6.0).unwrap();
        let points: Vec<Point> = outline.segments.iter().map(endpoint).collect();
        assert!(points.contains(&Point::new(100.0, 0.0)));

        // Horizontal arrow: the left and right sides mirror each other around y = 0.
        let count = points.len();
        for i in 0..count / 2 {
            let left = points[i];
            let right = points[count - 1 - i];
            assert!((left.x - right.x).abs() < 1e-9);
            assert!((left.y + right.y).abs() < 1e-9);
        }
    }

    #[test]
    fn short_body_uses_straight_sides() {
        let outline = arrow_outline(Point::new(0.0, 0.0), Point::new(12.0, 0.0), 4.0).unwrap();
        assert!(matches!(outline.segments[1], PathSegment::LineTo(_)));
    }
}
