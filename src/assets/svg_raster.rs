use crate::assets::drawable::VectorDrawable;
use crate::foundation::error::{RasterError, RasterResult};
use crate::raster::image::RasterImage;
use crate::raster::key::RasterKey;

/// Largest bitmap edge accepted when no explicit limit is configured.
pub const DEFAULT_MAX_DIMENSION: u32 = 16_384;

/// Rasterize `drawable` at the physical size described by `key`.
///
/// Degenerate keys (zero or negative logical size) produce an empty image rather than an
/// error. Keys larger than `max_dimension` on either axis are rejected to avoid pathological
/// allocations.
#[tracing::instrument(skip(drawable), fields(drawable = drawable.id().get()))]
pub fn rasterize_drawable(
    drawable: &VectorDrawable,
    key: &RasterKey,
    max_dimension: u32,
) -> RasterResult<RasterImage> {
    if key.drawable != drawable.id() {
        return Err(RasterError::rasterize(
            "raster key does not belong to the supplied drawable",
        ));
    }

    let (w, h) = key.pixel_size();
    if w == 0 || h == 0 {
        return Ok(RasterImage::empty());
    }
    if w > max_dimension || h > max_dimension {
        return Err(RasterError::rasterize(format!(
            "raster size too large: {w}x{h} (max {max_dimension}x{max_dimension})"
        )));
    }

    let rgba = rasterize_svg_to_premul_rgba8(drawable.tree(), w, h)?;
    RasterImage::from_premul_rgba8(&rgba, w, h)
}

/// Render a `usvg` tree scaled to fill a `width` x `height` premultiplied RGBA8 buffer.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> RasterResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RasterError::rasterize("failed to allocate svg pixmap"))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.data().to_vec())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/svg_raster.rs"]
mod tests;
