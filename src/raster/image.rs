use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::foundation::error::{RasterError, RasterResult};

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

struct ImageInner {
    id: u64,
    width: u32,
    height: u32,
    pixmap: Mutex<Option<Arc<vello_cpu::Pixmap>>>,
    disposed: AtomicBool,
}

/// Handle to one rasterized bitmap.
///
/// Clones observe the same resource. The pixels are released when the owning
/// [`RasterCacheEntry`](crate::RasterCacheEntry) drops, or when a superseded result is discarded;
/// every handle then reports [`is_disposed`](Self::is_disposed). Disposal is synchronous and
/// idempotent.
#[derive(Clone)]
pub struct RasterImage {
    inner: Arc<ImageInner>,
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterImage")
            .field("id", &self.inner.id)
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl RasterImage {
    fn with_pixmap(width: u32, height: u32, pixmap: Option<vello_cpu::Pixmap>) -> Self {
        Self {
            inner: Arc::new(ImageInner {
                id: NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed),
                width,
                height,
                pixmap: Mutex::new(pixmap.map(Arc::new)),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// A zero-sized image, produced for degenerate raster keys.
    pub fn empty() -> Self {
        Self::with_pixmap(0, 0, None)
    }

    /// Wrap tightly packed, row-major premultiplied RGBA8 pixels.
    pub fn from_premul_rgba8(bytes: &[u8], width: u32, height: u32) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            if !bytes.is_empty() {
                return Err(RasterError::rasterize("pixmap byte len mismatch"));
            }
            return Ok(Self::empty());
        }
        let pixmap = pixmap_from_premul_bytes(bytes, width, height)?;
        Ok(Self::with_pixmap(width, height, Some(pixmap)))
    }

    /// Process-unique id of the underlying resource.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Width in physical pixels.
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Height in physical pixels.
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Return `true` for zero-sized images.
    pub fn is_empty(&self) -> bool {
        self.inner.width == 0 || self.inner.height == 0
    }

    /// Return `true` once the pixels have been released.
    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.load(Ordering::Acquire)
    }

    /// Release the pixel memory. Returns `true` when this call performed the release.
    pub(crate) fn dispose(&self) -> bool {
        if self.inner.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.inner
            .pixmap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        true
    }

    /// Return `true` when both handles refer to the same resource.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy of the premultiplied RGBA8 pixels, or `None` once disposed.
    ///
    /// Empty images return an empty buffer.
    pub fn to_premul_rgba8(&self) -> Option<Vec<u8>> {
        if self.is_disposed() {
            return None;
        }
        if self.is_empty() {
            return Some(Vec::new());
        }
        self.pixmap().map(|p| p.data_as_u8_slice().to_vec())
    }

    pub(crate) fn pixmap(&self) -> Option<Arc<vello_cpu::Pixmap>> {
        self.inner
            .pixmap
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> RasterResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| RasterError::rasterize("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RasterError::rasterize("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(RasterError::rasterize("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/image.rs"]
mod tests;
