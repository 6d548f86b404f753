//! Cairo-based rendering of the annotation log.
//!
//! Rendering is replay-from-scratch: every frame clears the surface, paints the
//! untouched base bitmap, then draws each operation in log order followed by
//! the in-progress draft. Undo, reset and live preview therefore never need
//! incremental patching.

use super::arrow;
use super::color::{Color, TRANSPARENT};
use super::mosaic;
use super::operation::{DrawOperation, TextAlign, ellipse_from_drag};
use crate::util::{Point, Rect};

/// Line height as a multiple of the font size.
pub const TEXT_LINE_HEIGHT: f64 = 1.25;

/// Style inputs that are not stored per operation.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Font family used for text annotations (e.g. "Sans")
    pub font_family: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_family: "Sans".to_string(),
        }
    }
}

/// Clears `ctx`, paints `base`, then replays `operations` and the optional draft.
pub fn render_frame(
    ctx: &cairo::Context,
    base: &cairo::ImageSurface,
    operations: &[DrawOperation],
    draft: Option<&DrawOperation>,
    options: &RenderOptions,
) -> Result<(), cairo::Error> {
    ctx.save()?;
    ctx.set_operator(cairo::Operator::Source);
    TRANSPARENT.apply(ctx);
    ctx.paint()?;
    ctx.set_source_surface(base, 0.0, 0.0)?;
    ctx.paint()?;
    ctx.restore()?;

    for operation in operations.iter().chain(draft) {
        render_operation(ctx, base, operation, options)?;
    }
    Ok(())
}

/// Renders a single operation.
///
/// `base` is the original captured bitmap; only the mosaic brush samples it.
pub fn render_operation(
    ctx: &cairo::Context,
    base: &cairo::ImageSurface,
    operation: &DrawOperation,
    options: &RenderOptions,
) -> Result<(), cairo::Error> {
    match operation {
        DrawOperation::Line {
            color,
            width,
            start,
            end,
        } => render_line(ctx, *start, *end, *color, *width),
        DrawOperation::Rectangle {
            color,
            width,
            start,
            end,
        } => render_rectangle(ctx, Rect::from_points(*start, *end), *color, *width),
        DrawOperation::Circle {
            color,
            width,
            start,
            end,
        } => render_ellipse(ctx, *start, *end, *color, *width),
        DrawOperation::Arrow {
            color,
            width,
            start,
            end,
        } => render_arrow(ctx, *start, *end, *color, *width),
        DrawOperation::Pen {
            color,
            width,
            points,
        } => render_polyline(ctx, points, *color, *width),
        DrawOperation::Mosaic { size, points } => mosaic::render_mosaic(ctx, base, *size, points),
        DrawOperation::Text {
            color,
            font_size,
            position,
            text,
            align,
        } => render_text(ctx, *position, text, *color, *font_size, *align, options),
    }
}

fn render_line(
    ctx: &cairo::Context,
    start: Point,
    end: Point,
    color: Color,
    width: f64,
) -> Result<(), cairo::Error> {
    color.apply(ctx);
    ctx.set_line_width(width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.move_to(start.x, start.y);
    ctx.line_to(end.x, end.y);
    ctx.stroke()
}

fn render_rectangle(
    ctx: &cairo::Context,
    rect: Rect,
    color: Color,
    width: f64,
) -> Result<(), cairo::Error> {
    color.apply(ctx);
    ctx.set_line_width(width);
    ctx.set_line_join(cairo::LineJoin::Miter);
    ctx.rectangle(rect.x, rect.y, rect.width, rect.height);
    ctx.stroke()
}

fn render_ellipse(
    ctx: &cairo::Context,
    start: Point,
    end: Point,
    color: Color,
    width: f64,
) -> Result<(), cairo::Error> {
    let (center, rx, ry) = ellipse_from_drag(start, end);
    if rx <= 0.0 || ry <= 0.0 {
        return Ok(());
    }

    color.apply(ctx);
    ctx.set_line_width(width);

    // Scale only while building the path so the stroke width stays uniform.
    ctx.save()?;
    ctx.translate(center.x, center.y);
    ctx.scale(rx, ry);
    ctx.new_path();
    ctx.arc(0.0, 0.0, 1.0, 0.0, 2.0 * std::f64::consts::PI);
    ctx.restore()?;

    ctx.stroke()
}

fn render_arrow(
    ctx: &cairo::Context,
    start: Point,
    end: Point,
    color: Color,
    width: f64,
) -> Result<(), cairo::Error> {
    let Some(outline) = arrow::arrow_outline(start, end, width) else {
        return Ok(());
    };

    color.apply(ctx);
    ctx.new_path();
    arrow::trace_outline(ctx, &outline);
    ctx.fill_preserve()?;
    // Hairline stroke smooths the filled edge.
    ctx.set_line_width(1.0);
    ctx.set_line_join(cairo::LineJoin::Round);
    ctx.stroke()
}

/// Renders an open polyline with round joins and caps.
pub fn render_polyline(
    ctx: &cairo::Context,
    points: &[Point],
    color: Color,
    width: f64,
) -> Result<(), cairo::Error> {
    let Some((first, rest)) = points.split_first() else {
        return Ok(());
    };

    color.apply(ctx);
    ctx.set_line_width(width);
    ctx.set_line_cap(cairo::LineCap::Round);
    ctx.set_line_join(cairo::LineJoin::Round);

    ctx.move_to(first.x, first.y);
    if rest.is_empty() {
        // A single click still leaves a dot.
        ctx.line_to(first.x, first.y);
    }
    for point in rest {
        ctx.line_to(point.x, point.y);
    }
    ctx.stroke()
}

/// Splits text into display lines; blank lines become a single space so they
/// still occupy a line box.
pub fn text_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| {
            let line = line.trim_end_matches('\r');
            if line.is_empty() { " " } else { line }
        })
        .collect()
}

/// Renders multi-line text with Pango at a fixed line height.
///
/// `position` is the top of the first line; with [`TextAlign::Center`] each
/// line is centred on `position.x`.
pub fn render_text(
    ctx: &cairo::Context,
    position: Point,
    text: &str,
    color: Color,
    font_size: f64,
    align: TextAlign,
    options: &RenderOptions,
) -> Result<(), cairo::Error> {
    ctx.save()?;
    ctx.set_antialias(cairo::Antialias::Best);

    let layout = pangocairo::functions::create_layout(ctx);
    let mut font_desc = pango::FontDescription::new();
    font_desc.set_family(&options.font_family);
    font_desc.set_absolute_size(font_size * pango::SCALE as f64);
    layout.set_font_description(Some(&font_desc));

    color.apply(ctx);
    let line_height = font_size * TEXT_LINE_HEIGHT;

    for (index, line) in text_lines(text).into_iter().enumerate() {
        layout.set_text(line);
        let (line_width, _) = layout.pixel_size();
        let x = match align {
            TextAlign::Left => position.x,
            TextAlign::Center => position.x - line_width as f64 / 2.0,
        };
        ctx.move_to(x, position.y + index as f64 * line_height);
        pangocairo::functions::show_layout(ctx, &layout);
    }

    ctx.restore()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{RED, WHITE};

    fn blank(width: i32, height: i32) -> cairo::ImageSurface {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
        let ctx = cairo::Context::new(&surface).unwrap();
        WHITE.apply(&ctx);
        ctx.paint().unwrap();
        drop(ctx);
        surface
    }

    /// Returns (b, g, r, a) at a pixel of an ARGB32 surface.
    fn pixel(surface: &mut cairo::ImageSurface, x: i32, y: i32) -> [u8; 4] {
        surface.flush();
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let offset = y as usize * stride + x as usize * 4;
        [data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]
    }

    fn render_into(
        base: &cairo::ImageSurface,
        operations: &[DrawOperation],
    ) -> cairo::ImageSurface {
        let target = cairo::ImageSurface::create(cairo::Format::ARgb32, base.width(), base.height())
            .unwrap();
        let ctx = cairo::Context::new(&target).unwrap();
        render_frame(&ctx, base, operations, None, &RenderOptions::default()).unwrap();
        drop(ctx);
        target
    }

    #[test]
    fn text_lines_keep_blank_lines() {
        assert_eq!(text_lines("a\n\nb"), vec!["a", " ", "b"]);
        assert_eq!(text_lines(""), vec![" "]);
    }

    #[test]
    fn text_reports_context_errors() {
        let target = blank(40, 20);
        let ctx = cairo::Context::new(&target).unwrap();
        // Unbalanced restore leaves the context in an error state.
        assert!(ctx.restore().is_err());

        let result = render_text(
            &ctx,
            Point::new(2.0, 2.0),
            "hi",
            RED,
            12.0,
            TextAlign::Left,
            &RenderOptions::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_log_reproduces_base() {
        let base = blank(20, 20);
        let mut target = render_into(&base, &[]);
        assert_eq!(pixel(&mut target, 10, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn rectangle_strokes_its_edge_only() {
        let base = blank(50, 50);
        let rect = DrawOperation::Rectangle {
            color: RED,
            width: 4.0,
            start: Point::new(40.0, 40.0),
            end: Point::new(10.0, 10.0),
        };
        let mut target = render_into(&base, &[rect]);
        assert_eq!(pixel(&mut target, 10, 25), [0, 0, 255, 255]);
        assert_eq!(pixel(&mut target, 25, 25), [255, 255, 255, 255]);
    }

    #[test]
    fn arrow_fills_its_body() {
        let base = blank(120, 40);
        let arrow = DrawOperation::Arrow {
            color: RED,
            width: 8.0,
            start: Point::new(10.0, 20.0),
            end: Point::new(110.0, 20.0),
        };
        let mut target = render_into(&base, &[arrow]);
        // Inside the head, on the axis.
        assert_eq!(pixel(&mut target, 100, 20), [0, 0, 255, 255]);
        // Well outside the head's half-width.
        assert_eq!(pixel(&mut target, 60, 2), [255, 255, 255, 255]);
    }

    #[test]
    fn later_operations_draw_on_top() {
        let base = blank(30, 30);
        let under = DrawOperation::Line {
            color: WHITE,
            width: 10.0,
            start: Point::new(0.0, 15.0),
            end: Point::new(30.0, 15.0),
        };
        let over = DrawOperation::Line {
            color: RED,
            width: 10.0,
            start: Point::new(15.0, 0.0),
            end: Point::new(15.0, 30.0),
        };
        let mut target = render_into(&base, &[under, over]);
        assert_eq!(pixel(&mut target, 15, 15), [0, 0, 255, 255]);
    }
}
