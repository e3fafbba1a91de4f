/// Effective-opacity check gating rasterization and compositing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityGate {
    opacity: f32,
}

impl VisibilityGate {
    /// Combine the node's own opacity with an observed external value.
    ///
    /// A missing observation counts as full opacity. Inputs are clamped to `[0, 1]`; NaN is
    /// treated as zero.
    pub fn new(own_opacity: f32, observed: Option<f32>) -> Self {
        fn unit(v: f32) -> f32 {
            if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
        }

        Self {
            opacity: unit(own_opacity) * unit(observed.unwrap_or(1.0)),
        }
    }

    /// Product of own and observed opacity.
    pub fn effective_opacity(self) -> f32 {
        self.opacity
    }

    /// Return `true` iff the effective opacity is exactly zero.
    pub fn is_invisible(self) -> bool {
        self.opacity == 0.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/visibility.rs"]
mod tests;
