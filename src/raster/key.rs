use crate::assets::drawable::DrawableId;
use crate::foundation::core::Size;

/// Inputs that decide whether a previously produced raster can be reused.
///
/// Two keys are equal iff logical size, pixel density and drawable identity are all equal.
/// Color filters and opacity are not part of the key; they are applied while compositing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterKey {
    /// Logical layout size.
    pub size: Size,
    /// Physical pixels per logical unit.
    pub pixel_density: f64,
    /// Identity of the rasterized drawable.
    pub drawable: DrawableId,
}

impl RasterKey {
    /// Build a key from its three components.
    pub fn new(size: Size, pixel_density: f64, drawable: DrawableId) -> Self {
        Self {
            size,
            pixel_density,
            drawable,
        }
    }

    /// Physical bitmap size, `ceil(logical * density)` per axis.
    ///
    /// Zero, negative and non-finite logical extents map to `0`.
    pub fn pixel_size(&self) -> (u32, u32) {
        fn to_px(v: f64, density: f64) -> u32 {
            let px = (v * density).ceil();
            if px.is_finite() && px > 0.0 {
                px.min(f64::from(u32::MAX)) as u32
            } else {
                0
            }
        }

        (
            to_px(self.size.width, self.pixel_density),
            to_px(self.size.height, self.pixel_density),
        )
    }

    /// Return `true` when the key describes an empty raster.
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = self.pixel_size();
        w == 0 || h == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/key.rs"]
mod tests;
