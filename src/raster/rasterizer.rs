use std::sync::Arc;

use crate::assets::drawable::VectorDrawable;
use crate::assets::svg_raster::{DEFAULT_MAX_DIMENSION, rasterize_drawable};
use crate::foundation::error::{RasterError, RasterResult};
use crate::raster::image::RasterImage;
use crate::raster::key::RasterKey;
use crate::raster::opts::RasterizerOpts;

/// One unit of rasterization work: a drawable plus the key describing the target bitmap.
#[derive(Clone, Debug)]
pub struct RasterRequest {
    drawable: Arc<VectorDrawable>,
    key: RasterKey,
}

impl RasterRequest {
    /// Build a request. Fails when `key` was computed for another drawable.
    pub fn new(drawable: Arc<VectorDrawable>, key: RasterKey) -> RasterResult<Self> {
        if key.drawable != drawable.id() {
            return Err(RasterError::validation(
                "raster key does not belong to the supplied drawable",
            ));
        }
        Ok(Self { drawable, key })
    }

    /// Scene to rasterize.
    pub fn drawable(&self) -> &Arc<VectorDrawable> {
        &self.drawable
    }

    /// Target key.
    pub fn key(&self) -> &RasterKey {
        &self.key
    }

    /// Rasterize on the calling thread.
    pub fn run(&self, max_dimension: u32) -> RasterResult<RasterImage> {
        rasterize_drawable(&self.drawable, &self.key, max_dimension)
    }
}

type CompletionFn = Box<dyn FnOnce(RasterResult<RasterImage>) + Send>;

/// Callback delivering the result of a [`RasterRequest`].
///
/// Call [`RasterCompletion::complete`] exactly once. A completion dropped without being
/// completed reports a rasterization error, so requesters never wait on a lost request.
pub struct RasterCompletion {
    callback: Option<CompletionFn>,
}

impl std::fmt::Debug for RasterCompletion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterCompletion")
            .field("completed", &self.callback.is_none())
            .finish()
    }
}

impl RasterCompletion {
    /// Wrap a result callback.
    pub fn new(callback: impl FnOnce(RasterResult<RasterImage>) + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
        }
    }

    /// Deliver the result.
    pub fn complete(mut self, result: RasterResult<RasterImage>) {
        if let Some(cb) = self.callback.take() {
            cb(result);
        }
    }
}

impl Drop for RasterCompletion {
    fn drop(&mut self) {
        if let Some(cb) = self.callback.take() {
            cb(Err(RasterError::rasterize(
                "rasterization request dropped without completing",
            )));
        }
    }
}

/// Asynchronous rasterization backend.
///
/// Implementations may run any number of requests concurrently and may complete them in
/// any order. Completing inside `rasterize` is allowed.
pub trait Rasterizer: Send + Sync {
    /// Start rasterizing `request`; deliver the bitmap (or error) through `completion`.
    fn rasterize(&self, request: RasterRequest, completion: RasterCompletion);
}

/// Rasterizer running requests on a dedicated `rayon` pool.
pub struct ThreadPoolRasterizer {
    pool: rayon::ThreadPool,
    opts: RasterizerOpts,
}

impl std::fmt::Debug for ThreadPoolRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadPoolRasterizer")
            .field("threads", &self.pool.current_num_threads())
            .field("opts", &self.opts)
            .finish()
    }
}

impl ThreadPoolRasterizer {
    /// Build the worker pool described by `opts`.
    pub fn new(opts: RasterizerOpts) -> RasterResult<Self> {
        opts.validate()?;
        let pool = build_thread_pool(opts.threads)?;
        Ok(Self { pool, opts })
    }

    /// Options the pool was built with.
    pub fn opts(&self) -> RasterizerOpts {
        self.opts
    }
}

impl Rasterizer for ThreadPoolRasterizer {
    fn rasterize(&self, request: RasterRequest, completion: RasterCompletion) {
        let max_dimension = self.opts.max_dimension;
        self.pool.spawn(move || {
            completion.complete(request.run(max_dimension));
        });
    }
}

/// Rasterizer completing every request synchronously inside `rasterize`.
#[derive(Clone, Copy, Debug)]
pub struct InlineRasterizer {
    max_dimension: u32,
}

impl Default for InlineRasterizer {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }
}

impl InlineRasterizer {
    /// Inline rasterizer honoring `opts.max_dimension`.
    pub fn new(opts: RasterizerOpts) -> Self {
        Self {
            max_dimension: opts.max_dimension,
        }
    }
}

impl Rasterizer for InlineRasterizer {
    fn rasterize(&self, request: RasterRequest, completion: RasterCompletion) {
        completion.complete(request.run(self.max_dimension));
    }
}

fn build_thread_pool(threads: Option<usize>) -> RasterResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("vgraster-raster-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| RasterError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/rasterizer.rs"]
mod tests;
