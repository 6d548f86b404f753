//! Pixelation (mosaic) brush.
//!
//! Each brush point takes a square region of the *original* captured bitmap,
//! downsamples it onto a tiny helper surface with nearest-neighbour filtering,
//! then scales the helper back up over the same region. Sampling from the
//! original keeps repeated strokes over one spot stable instead of blurring
//! further each pass.

use crate::util::{Point, Rect};

/// Smallest block edge in pixels.
const MIN_BLOCK: f64 = 2.0;

/// Block edge for a brush size (`size / 3`, never below [`MIN_BLOCK`]).
pub fn block_size(size: f64) -> f64 {
    (size / 3.0).max(MIN_BLOCK)
}

/// Minimum spacing between stored brush points for a given brush size.
pub fn point_spacing(size: f64) -> f64 {
    block_size(size)
}

/// Square brush region centred on `point`, clipped to the image.
pub fn brush_region(point: Point, size: f64, image_width: f64, image_height: f64) -> Option<Rect> {
    let half = size.max(1.0) / 2.0;
    let left = (point.x - half).floor().max(0.0);
    let top = (point.y - half).floor().max(0.0);
    let right = (point.x + half).ceil().min(image_width);
    let bottom = (point.y + half).ceil().min(image_height);
    if right - left < 1.0 || bottom - top < 1.0 {
        return None;
    }
    Some(Rect::from_edges(left, top, right, bottom))
}

/// Paints the mosaic for every brush point onto `ctx`, sampling from `original`.
pub fn render_mosaic(
    ctx: &cairo::Context,
    original: &cairo::ImageSurface,
    size: f64,
    points: &[Point],
) -> Result<(), cairo::Error> {
    let image_width = original.width() as f64;
    let image_height = original.height() as f64;
    let block = block_size(size);

    for point in points {
        let Some(region) = brush_region(*point, size, image_width, image_height) else {
            continue;
        };
        let helper = downsample(original, region, block)?;
        paint_upscaled(ctx, &helper, region)?;
    }
    Ok(())
}

fn downsample(
    original: &cairo::ImageSurface,
    region: Rect,
    block: f64,
) -> Result<cairo::ImageSurface, cairo::Error> {
    let tiny_width = (region.width / block).ceil().max(1.0) as i32;
    let tiny_height = (region.height / block).ceil().max(1.0) as i32;

    let helper = cairo::ImageSurface::create(cairo::Format::ARgb32, tiny_width, tiny_height)?;
    let hctx = cairo::Context::new(&helper)?;
    hctx.scale(
        tiny_width as f64 / region.width,
        tiny_height as f64 / region.height,
    );
    hctx.set_source_surface(original, -region.x, -region.y)?;
    hctx.source().set_filter(cairo::Filter::Nearest);
    hctx.set_operator(cairo::Operator::Source);
    hctx.paint()?;
    drop(hctx);
    helper.flush();
    Ok(helper)
}

fn paint_upscaled(
    ctx: &cairo::Context,
    helper: &cairo::ImageSurface,
    region: Rect,
) -> Result<(), cairo::Error> {
    ctx.save()?;
    ctx.rectangle(region.x, region.y, region.width, region.height);
    ctx.clip();
    ctx.translate(region.x, region.y);
    ctx.scale(
        region.width / helper.width() as f64,
        region.height / helper.height() as f64,
    );
    ctx.set_source_surface(helper, 0.0, 0.0)?;
    ctx.source().set_filter(cairo::Filter::Nearest);
    ctx.set_operator(cairo::Operator::Source);
    ctx.paint()?;
    ctx.restore()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: i32, height: i32) -> cairo::ImageSurface {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height).unwrap();
        let ctx = cairo::Context::new(&surface).unwrap();
        let gradient = cairo::LinearGradient::new(0.0, 0.0, width as f64, height as f64);
        gradient.add_color_stop_rgb(0.0, 1.0, 0.0, 0.0);
        gradient.add_color_stop_rgb(1.0, 0.0, 0.0, 1.0);
        ctx.set_source(&gradient).unwrap();
        ctx.paint().unwrap();
        drop(ctx);
        surface
    }

    fn copy_of(original: &cairo::ImageSurface) -> cairo::ImageSurface {
        let surface = cairo::ImageSurface::create(
            cairo::Format::ARgb32,
            original.width(),
            original.height(),
        )
        .unwrap();
        let ctx = cairo::Context::new(&surface).unwrap();
        ctx.set_source_surface(original, 0.0, 0.0).unwrap();
        ctx.paint().unwrap();
        drop(ctx);
        surface
    }

    fn pixels(mut surface: cairo::ImageSurface) -> Vec<u8> {
        surface.flush();
        surface.data().unwrap().to_vec()
    }

    #[test]
    fn block_size_is_a_third_of_brush() {
        assert_eq!(block_size(24.0), 8.0);
        assert_eq!(block_size(3.0), MIN_BLOCK);
    }

    #[test]
    fn brush_region_is_clipped_to_image() {
        let region = brush_region(Point::new(2.0, 2.0), 20.0, 100.0, 100.0).unwrap();
        assert_eq!(region, Rect::new(0.0, 0.0, 12.0, 12.0));
        assert!(brush_region(Point::new(-50.0, -50.0), 20.0, 100.0, 100.0).is_none());
    }

    #[test]
    fn mosaic_changes_only_the_brush_region() {
        let original = gradient(64, 64);
        let before = pixels(copy_of(&original));

        let target = copy_of(&original);
        let ctx = cairo::Context::new(&target).unwrap();
        render_mosaic(&ctx, &original, 24.0, &[Point::new(32.0, 32.0)]).unwrap();
        drop(ctx);
        let after = pixels(target);

        assert_ne!(before, after);
        // Top-left corner lies outside the 24px brush centred at (32, 32).
        assert_eq!(&before[..16], &after[..16]);
    }

    #[test]
    fn mosaic_twice_over_same_points_is_stable() {
        let original = gradient(64, 64);
        let points = [Point::new(20.0, 20.0), Point::new(30.0, 24.0)];

        let once = copy_of(&original);
        let ctx = cairo::Context::new(&once).unwrap();
        render_mosaic(&ctx, &original, 18.0, &points).unwrap();
        drop(ctx);

        let twice = copy_of(&original);
        let ctx = cairo::Context::new(&twice).unwrap();
        render_mosaic(&ctx, &original, 18.0, &points).unwrap();
        render_mosaic(&ctx, &original, 18.0, &points).unwrap();
        drop(ctx);

        assert_eq!(pixels(once), pixels(twice));
    }
}
