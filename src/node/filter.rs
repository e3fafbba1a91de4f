use crate::foundation::core::Rgba8Premul;
use crate::foundation::error::{RasterError, RasterResult};

/// Color transform applied to a cached raster while compositing.
///
/// Filters never participate in the raster key: changing a node's filter reuses its bitmap.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorFilter {
    /// Source-in blend: every pixel takes `color`, scaled by the source alpha.
    Tint {
        /// Premultiplied tint color.
        color: Rgba8Premul,
    },
    /// Row-major 4x5 matrix applied to straight-alpha RGBA in `[0, 1]`.
    Matrix {
        /// Coefficients; the fifth column is an additive offset.
        m: [f32; 20],
    },
}

impl ColorFilter {
    /// Luminance-preserving grayscale matrix (Rec. 709 weights).
    pub fn grayscale() -> Self {
        const R: f32 = 0.2126;
        const G: f32 = 0.7152;
        const B: f32 = 0.0722;
        Self::Matrix {
            m: [
                R, G, B, 0.0, 0.0, //
                R, G, B, 0.0, 0.0, //
                R, G, B, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0, 0.0,
            ],
        }
    }

    /// Filter premultiplied RGBA8 `src` into `dst`.
    pub fn apply_premul_rgba8(&self, src: &[u8], dst: &mut [u8]) -> RasterResult<()> {
        if src.len() != dst.len() || !src.len().is_multiple_of(4) {
            return Err(RasterError::paint(
                "color filter expects equal-length rgba8 buffers",
            ));
        }
        match self {
            Self::Tint { color } => tint_rgba8_premul(src, dst, *color),
            Self::Matrix { m } => color_matrix_rgba8_premul(src, dst, *m),
        }
        Ok(())
    }
}

fn tint_rgba8_premul(src: &[u8], dst: &mut [u8], color: Rgba8Premul) {
    let c = color.to_array();
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let sa = u16::from(s[3]);
        for i in 0..4 {
            d[i] = ((u16::from(c[i]) * sa + 127) / 255) as u8;
        }
    }
}

fn color_matrix_rgba8_premul(src: &[u8], dst: &mut [u8], m: [f32; 20]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let pr = s[0] as f32 / 255.0;
        let pg = s[1] as f32 / 255.0;
        let pb = s[2] as f32 / 255.0;
        let pa = s[3] as f32 / 255.0;

        // Matrix operates on straight alpha.
        let inv_a = if pa > 0.0 { 1.0 / pa } else { 0.0 };
        let r = pr * inv_a;
        let g = pg * inv_a;
        let b = pb * inv_a;
        let a = pa;

        let out_r = (m[0] * r + m[1] * g + m[2] * b + m[3] * a + m[4]).clamp(0.0, 1.0);
        let out_g = (m[5] * r + m[6] * g + m[7] * b + m[8] * a + m[9]).clamp(0.0, 1.0);
        let out_b = (m[10] * r + m[11] * g + m[12] * b + m[13] * a + m[14]).clamp(0.0, 1.0);
        let out_a = (m[15] * r + m[16] * g + m[17] * b + m[18] * a + m[19]).clamp(0.0, 1.0);

        d[0] = (out_r * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[1] = (out_g * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[2] = (out_b * out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        d[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/filter.rs"]
mod tests;
