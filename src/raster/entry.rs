use crate::raster::image::RasterImage;
use crate::raster::key::RasterKey;

/// The current raster of a node together with the key that produced it.
///
/// The entry owns its image: dropping the entry disposes the bitmap, so replacing a node's
/// entry or tearing the node down releases the previous pixels exactly once.
#[derive(Debug)]
pub struct RasterCacheEntry {
    key: RasterKey,
    image: RasterImage,
}

impl RasterCacheEntry {
    /// Take ownership of `image`, produced for `key`.
    pub(crate) fn new(key: RasterKey, image: RasterImage) -> Self {
        Self { key, image }
    }

    /// Key the image was rasterized for.
    pub fn key(&self) -> &RasterKey {
        &self.key
    }

    /// Observer handle to the owned image.
    pub fn image(&self) -> &RasterImage {
        &self.image
    }

    /// Return `true` when the entry can serve `key`.
    pub fn matches(&self, key: &RasterKey) -> bool {
        self.key == *key && !self.image.is_disposed()
    }
}

impl Drop for RasterCacheEntry {
    fn drop(&mut self) {
        if self.image.dispose() {
            tracing::trace!(image = self.image.id(), "disposed raster");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/entry.rs"]
mod tests;
