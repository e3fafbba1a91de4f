use crate::foundation::core::Size;

/// Min/max size bounds handed down by the layout driver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxConstraints {
    /// Smallest allowed size.
    pub min: Size,
    /// Largest allowed size; components may be `f64::INFINITY`.
    pub max: Size,
}

impl BoxConstraints {
    /// Constraints forcing exactly `size`.
    pub fn tight(size: Size) -> Self {
        Self {
            min: size,
            max: size,
        }
    }

    /// Constraints allowing anything between zero and `size`.
    pub fn loose(size: Size) -> Self {
        Self {
            min: Size::ZERO,
            max: size,
        }
    }

    /// No bounds at all.
    pub fn unbounded() -> Self {
        Self::loose(Size::new(f64::INFINITY, f64::INFINITY))
    }

    /// Closest size to `preferred` satisfying the constraints.
    ///
    /// When `min > max` on an axis, `min` wins.
    pub fn constrain(&self, preferred: Size) -> Size {
        fn axis(v: f64, min: f64, max: f64) -> f64 {
            let v = if v.is_nan() { min } else { v };
            v.min(max).max(min)
        }

        Size::new(
            axis(preferred.width, self.min.width, self.max.width),
            axis(preferred.height, self.min.height, self.max.height),
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/layout.rs"]
mod tests;
