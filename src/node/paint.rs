use std::sync::Arc;

use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::{RasterError, RasterResult};
use crate::node::filter::ColorFilter;
use crate::raster::image::{RasterImage, pixmap_from_premul_bytes};

/// Paint-time effects applied when compositing a raster.
#[derive(Clone, Copy, Debug)]
pub struct ImagePaint<'a> {
    /// Optional color filter.
    pub color_filter: Option<&'a ColorFilter>,
    /// Alpha multiplier in `[0, 1]`.
    pub opacity: f32,
}

/// Drawing surface handed to [`crate::VectorGraphicNode::paint`].
pub trait PaintContext {
    /// Draw `image` stretched over `dst` (logical units).
    fn draw_image(
        &mut self,
        image: &RasterImage,
        dst: Rect,
        paint: &ImagePaint<'_>,
    ) -> RasterResult<()>;
}

/// One recorded [`PaintContext::draw_image`] call.
#[derive(Clone, Debug)]
pub struct DrawImageRecord {
    /// Handle to the drawn image (identity-comparable).
    pub image: RasterImage,
    /// Destination rectangle.
    pub dst: Rect,
    /// Color filter in effect.
    pub color_filter: Option<ColorFilter>,
    /// Alpha multiplier in effect.
    pub opacity: f32,
}

/// Paint context that only records draw calls.
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    records: Vec<DrawImageRecord>,
}

impl RecordingCanvas {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded so far.
    pub fn records(&self) -> &[DrawImageRecord] {
        &self.records
    }

    /// Drain recorded calls.
    pub fn take(&mut self) -> Vec<DrawImageRecord> {
        std::mem::take(&mut self.records)
    }
}

impl PaintContext for RecordingCanvas {
    fn draw_image(
        &mut self,
        image: &RasterImage,
        dst: Rect,
        paint: &ImagePaint<'_>,
    ) -> RasterResult<()> {
        if image.is_disposed() {
            return Err(RasterError::paint("cannot draw a disposed raster image"));
        }
        self.records.push(DrawImageRecord {
            image: image.clone(),
            dst,
            color_filter: paint.color_filter.cloned(),
            opacity: paint.opacity,
        });
        Ok(())
    }
}

/// Premultiplied RGBA8 output of a [`CpuCanvas`].
#[derive(Clone, Debug)]
pub struct CanvasFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub data: Vec<u8>,
}

/// Paint context compositing into a `vello_cpu` render target.
pub struct CpuCanvas {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
}

impl std::fmt::Debug for CpuCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuCanvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl CpuCanvas {
    /// Transparent canvas of `width` x `height` pixels (logical units map 1:1 to pixels).
    pub fn new(width: u32, height: u32) -> RasterResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| RasterError::validation("canvas width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| RasterError::validation("canvas height exceeds u16"))?;
        if w == 0 || h == 0 {
            return Err(RasterError::validation("canvas must be at least 1x1"));
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            width: w,
            height: h,
        })
    }

    /// Flush pending draws and read back the pixels.
    pub fn finish(mut self) -> CanvasFrame {
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        CanvasFrame {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
        }
    }
}

impl PaintContext for CpuCanvas {
    fn draw_image(
        &mut self,
        image: &RasterImage,
        dst: Rect,
        paint: &ImagePaint<'_>,
    ) -> RasterResult<()> {
        if image.is_disposed() {
            return Err(RasterError::paint("cannot draw a disposed raster image"));
        }
        let opacity = paint.opacity.clamp(0.0, 1.0);
        if image.is_empty() || dst.width() <= 0.0 || dst.height() <= 0.0 || opacity == 0.0 {
            return Ok(());
        }
        let pixmap = image
            .pixmap()
            .ok_or_else(|| RasterError::paint("raster image has no pixels"))?;

        let (w, h) = (image.width(), image.height());
        let pixmap = match paint.color_filter {
            Some(filter) => {
                let src = pixmap.data_as_u8_slice();
                let mut filtered = vec![0u8; src.len()];
                filter.apply_premul_rgba8(src, &mut filtered)?;
                Arc::new(pixmap_from_premul_bytes(&filtered, w, h)?)
            }
            None => pixmap,
        };
        let img = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(pixmap),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        // Bitmap pixels -> destination rect in logical units.
        let tr = Affine::translate(dst.origin().to_vec2())
            * Affine::scale_non_uniform(dst.width() / f64::from(w), dst.height() / f64::from(h));

        self.ctx
            .set_blend_mode(vello_cpu::peniko::BlendMode::default());
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(tr));
        self.ctx.set_paint(img);
        if opacity < 1.0 {
            self.ctx.push_opacity_layer(opacity);
        }
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));
        if opacity < 1.0 {
            self.ctx.pop_layer();
        }
        Ok(())
    }
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

#[cfg(test)]
#[path = "../../tests/unit/node/paint.rs"]
mod tests;
