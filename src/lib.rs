//! vgraster caches rasterized vector graphics for a retained-mode compositor.
//!
//! A [`VectorGraphicNode`] displays a [`VectorDrawable`] by compositing a cached bitmap
//! instead of re-rendering vector paths every frame:
//!
//! - The cache is keyed by [`RasterKey`] (logical size, pixel density, drawable identity).
//! - Misses schedule work on a [`Rasterizer`] and never block paint.
//! - Results that arrive after the key changed are discarded and disposed.
//! - Color filters and opacity are applied while compositing, so they never re-rasterize.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod foundation;
mod node;
mod raster;

pub use crate::foundation::core::{
    Affine, Point, Rect, Rgba8Premul, Size, unpremultiply_rgba8_in_place,
};
pub use crate::foundation::error::{RasterError, RasterResult};

pub use crate::assets::drawable::{DrawableId, VectorDrawable};
pub use crate::assets::svg_raster::{DEFAULT_MAX_DIMENSION, rasterize_drawable};

pub use crate::raster::entry::RasterCacheEntry;
pub use crate::raster::image::RasterImage;
pub use crate::raster::key::RasterKey;
pub use crate::raster::opts::{MAX_DIMENSION_ENV, RasterizerOpts, THREADS_ENV};
pub use crate::raster::pending::{PendingRaster, RasterOutcome};
pub use crate::raster::rasterizer::{
    InlineRasterizer, RasterCompletion, RasterRequest, Rasterizer, ThreadPoolRasterizer,
};

pub use crate::node::filter::ColorFilter;
pub use crate::node::layout::BoxConstraints;
pub use crate::node::opacity::{OpacityController, OpacityListener, OpacitySource, SubscriptionId};
pub use crate::node::paint::{
    CanvasFrame, CpuCanvas, DrawImageRecord, ImagePaint, PaintContext, RecordingCanvas,
};
pub use crate::node::vector_graphic::{RenderHost, VectorGraphicNode};
pub use crate::node::visibility::VisibilityGate;
