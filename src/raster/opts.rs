use crate::assets::svg_raster::DEFAULT_MAX_DIMENSION;
use crate::foundation::error::{RasterError, RasterResult};

/// Environment variable overriding [`RasterizerOpts::threads`].
pub const THREADS_ENV: &str = "VGRASTER_THREADS";
/// Environment variable overriding [`RasterizerOpts::max_dimension`].
pub const MAX_DIMENSION_ENV: &str = "VGRASTER_MAX_DIMENSION";

/// Rasterizer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RasterizerOpts {
    /// Worker thread count; `None` uses one per core.
    pub threads: Option<usize>,
    /// Largest accepted bitmap edge in pixels.
    pub max_dimension: u32,
}

impl Default for RasterizerOpts {
    fn default() -> Self {
        Self {
            threads: None,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl RasterizerOpts {
    /// Defaults overridden by `VGRASTER_THREADS` / `VGRASTER_MAX_DIMENSION` when set to
    /// positive integers. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut opts = Self::default();
        if let Some(n) = lookup(THREADS_ENV)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            opts.threads = Some(n);
        }
        if let Some(n) = lookup(MAX_DIMENSION_ENV)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            opts.max_dimension = n;
        }
        opts
    }

    /// Return options with an explicit worker count.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Return options with a different maximum bitmap edge.
    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub(crate) fn validate(&self) -> RasterResult<()> {
        if self.threads == Some(0) {
            return Err(RasterError::validation(
                "rasterizer 'threads' must be >= 1 when set",
            ));
        }
        if self.max_dimension == 0 {
            return Err(RasterError::validation(
                "rasterizer 'max_dimension' must be >= 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/opts.rs"]
mod tests;
