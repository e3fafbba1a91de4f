//! Render-tree node compositing a cached raster of a vector drawable.
//!
//! The node keeps at most one [`RasterCacheEntry`] and at most one in-flight
//! [`PendingRaster`]. Paint never waits for rasterization: a miss issues a request and
//! draws nothing; the resolution installs the bitmap and asks the host for another paint.
//! Resolutions are validated against the key that is current *when they resolve*, so a
//! slow, superseded request can never overwrite a newer raster.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::assets::drawable::VectorDrawable;
use crate::foundation::core::{Point, Rect, Size};
use crate::foundation::error::{RasterError, RasterResult};
use crate::node::filter::ColorFilter;
use crate::node::layout::BoxConstraints;
use crate::node::opacity::{OpacitySource, SubscriptionId};
use crate::node::paint::{ImagePaint, PaintContext};
use crate::node::visibility::VisibilityGate;
use crate::raster::entry::RasterCacheEntry;
use crate::raster::image::RasterImage;
use crate::raster::key::RasterKey;
use crate::raster::pending::{PendingRaster, PendingResolver, RasterOutcome};
use crate::raster::rasterizer::{RasterCompletion, RasterRequest, Rasterizer};

/// Render-tree driver the node reports to while attached.
pub trait RenderHost: Send + Sync {
    /// Schedule another paint of the node.
    fn mark_needs_paint(&self);
}

struct RepaintSignal {
    dirty: AtomicBool,
    host: Mutex<Option<Arc<dyn RenderHost>>>,
}

impl RepaintSignal {
    fn mark(&self) {
        self.dirty.store(true, Ordering::Release);
        let host = self
            .host
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(host) = host {
            host.mark_needs_paint();
        }
    }

    fn set_host(&self, host: Option<Arc<dyn RenderHost>>) {
        *self.host.lock().unwrap_or_else(PoisonError::into_inner) = host;
    }
}

struct RasterState {
    drawable: Arc<VectorDrawable>,
    size: Size,
    pixel_density: f64,
    entry: Option<RasterCacheEntry>,
    pending: Option<PendingRaster>,
    disposed: bool,
}

impl RasterState {
    fn candidate_key(&self) -> RasterKey {
        RasterKey::new(self.size, self.pixel_density, self.drawable.id())
    }
}

// Shared with rasterizer completions and opacity listeners.
struct NodeShared {
    state: Mutex<RasterState>,
    repaint: RepaintSignal,
}

impl NodeShared {
    fn state(&self) -> MutexGuard<'_, RasterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct OpacityBinding {
    source: Weak<dyn OpacitySource>,
    subscription: Option<SubscriptionId>,
}

enum PaintStep {
    Draw(RasterImage, Size),
    Wait,
    Issue(RasterRequest, PendingResolver),
}

/// Render-tree node displaying a [`VectorDrawable`] through a raster cache.
///
/// Lifecycle, driven by the host: [`attach`](Self::attach), [`layout`](Self::layout),
/// [`paint`](Self::paint) (any number of times), [`detach`](Self::detach),
/// [`dispose`](Self::dispose). Dropping the node disposes it.
///
/// The opacity source is observed only while attached; the node never owns it.
pub struct VectorGraphicNode {
    shared: Arc<NodeShared>,
    rasterizer: Arc<dyn Rasterizer>,
    color_filter: Option<ColorFilter>,
    opacity: f32,
    opacity_source: Option<OpacityBinding>,
    last_request: Option<PendingRaster>,
    attached: bool,
}

impl std::fmt::Debug for VectorGraphicNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state();
        f.debug_struct("VectorGraphicNode")
            .field("drawable", &state.drawable.id())
            .field("size", &state.size)
            .field("pixel_density", &state.pixel_density)
            .field("cached", &state.entry.as_ref().map(|e| *e.key()))
            .field("pending", &state.pending.as_ref().map(PendingRaster::id))
            .field("attached", &self.attached)
            .field("disposed", &state.disposed)
            .finish()
    }
}

impl VectorGraphicNode {
    /// Detached node with zero size and a pixel density of `1.0`.
    pub fn new(drawable: Arc<VectorDrawable>, rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self {
            shared: Arc::new(NodeShared {
                state: Mutex::new(RasterState {
                    drawable,
                    size: Size::ZERO,
                    pixel_density: 1.0,
                    entry: None,
                    pending: None,
                    disposed: false,
                }),
                repaint: RepaintSignal {
                    dirty: AtomicBool::new(true),
                    host: Mutex::new(None),
                },
            }),
            rasterizer,
            color_filter: None,
            opacity: 1.0,
            opacity_source: None,
            last_request: None,
            attached: false,
        }
    }

    /// Drawable currently displayed.
    pub fn drawable(&self) -> Arc<VectorDrawable> {
        self.shared.state().drawable.clone()
    }

    /// Swap the drawable. A different drawable identity invalidates the raster key.
    pub fn set_drawable(&mut self, drawable: Arc<VectorDrawable>) {
        {
            let mut state = self.shared.state();
            if Arc::ptr_eq(&state.drawable, &drawable) {
                return;
            }
            state.drawable = drawable;
        }
        self.shared.repaint.mark();
    }

    /// Physical pixels per logical unit.
    pub fn pixel_density(&self) -> f64 {
        self.shared.state().pixel_density
    }

    /// Change the pixel density. Must be finite and positive.
    pub fn set_pixel_density(&mut self, pixel_density: f64) -> RasterResult<()> {
        if !pixel_density.is_finite() || pixel_density <= 0.0 {
            return Err(RasterError::validation(format!(
                "pixel density must be finite and > 0, got {pixel_density}"
            )));
        }
        {
            let mut state = self.shared.state();
            if state.pixel_density == pixel_density {
                return Ok(());
            }
            state.pixel_density = pixel_density;
        }
        self.shared.repaint.mark();
        Ok(())
    }

    /// Color filter applied while compositing.
    pub fn color_filter(&self) -> Option<&ColorFilter> {
        self.color_filter.as_ref()
    }

    /// Replace the color filter. Never causes re-rasterization.
    pub fn set_color_filter(&mut self, color_filter: Option<ColorFilter>) {
        if self.color_filter == color_filter {
            return;
        }
        self.color_filter = color_filter;
        self.shared.repaint.mark();
    }

    /// The node's own opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Set the node's own opacity (clamped to `[0, 1]` when evaluated).
    pub fn set_opacity(&mut self, opacity: f32) {
        if self.opacity == opacity {
            return;
        }
        self.opacity = opacity;
        self.shared.repaint.mark();
    }

    /// Observe an external opacity source, or stop observing with `None`.
    ///
    /// The node keeps only a weak reference; a dropped source counts as full opacity.
    pub fn set_opacity_source(&mut self, source: Option<Arc<dyn OpacitySource>>) {
        let unchanged = match (&self.opacity_source, &source) {
            (None, None) => true,
            (Some(binding), Some(source)) => {
                Weak::ptr_eq(&binding.source, &Arc::downgrade(source))
            }
            _ => false,
        };
        if unchanged {
            return;
        }

        self.unsubscribe_opacity();
        self.opacity_source = source.map(|s| OpacityBinding {
            source: Arc::downgrade(&s),
            subscription: None,
        });
        if self.attached {
            self.subscribe_opacity();
        }
        self.shared.repaint.mark();
    }

    /// Product of own and observed opacity.
    pub fn effective_opacity(&self) -> f32 {
        self.visibility().effective_opacity()
    }

    fn visibility(&self) -> VisibilityGate {
        let observed = self
            .opacity_source
            .as_ref()
            .and_then(|b| b.source.upgrade())
            .map(|s| s.value());
        VisibilityGate::new(self.opacity, observed)
    }

    /// Size from the last layout.
    pub fn size(&self) -> Size {
        self.shared.state().size
    }

    /// Size the node within `constraints`, preferring the drawable's intrinsic size.
    pub fn layout(&mut self, constraints: BoxConstraints) -> Size {
        let size = {
            let mut state = self.shared.state();
            let size = constraints.constrain(state.drawable.intrinsic_size());
            if state.size == size {
                return size;
            }
            state.size = size;
            size
        };
        self.shared.repaint.mark();
        size
    }

    /// Start reporting to `host` and observing the opacity source.
    ///
    /// Attaching an attached node only swaps the host.
    pub fn attach(&mut self, host: Arc<dyn RenderHost>) -> RasterResult<()> {
        if self.is_disposed() {
            return Err(RasterError::validation(
                "cannot attach a disposed vector graphic node",
            ));
        }
        self.shared.repaint.set_host(Some(host));
        if !self.attached {
            self.attached = true;
            self.subscribe_opacity();
        }
        Ok(())
    }

    /// Stop observing the opacity source and forget the host. No-op when detached.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.unsubscribe_opacity();
        self.shared.repaint.set_host(None);
        self.attached = false;
    }

    /// Return `true` between [`attach`](Self::attach) and [`detach`](Self::detach).
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Tear the node down: detach, and dispose the current raster synchronously.
    ///
    /// In-flight requests are not awaited; they resolve later as
    /// [`RasterOutcome::Discarded`]. Idempotent.
    pub fn dispose(&mut self) {
        self.detach();
        let entry = {
            let mut state = self.shared.state();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.entry.take()
        };
        if let Some(entry) = entry {
            tracing::debug!(image = entry.image().id(), "disposing node raster");
            drop(entry);
        }
    }

    /// Return `true` once [`dispose`](Self::dispose) ran.
    pub fn is_disposed(&self) -> bool {
        self.shared.state().disposed
    }

    /// Return `true` when something changed since the last paint.
    pub fn needs_paint(&self) -> bool {
        self.shared.repaint.dirty.load(Ordering::Acquire)
    }

    /// In-flight request, if any.
    pub fn pending(&self) -> Option<PendingRaster> {
        self.shared.state().pending.clone()
    }

    /// Most recently issued request, kept after it resolves.
    ///
    /// Unlike [`pending`](Self::pending) this survives a resolution that races the caller,
    /// so the outcome of the request issued by the last missing paint stays observable.
    pub fn last_request(&self) -> Option<PendingRaster> {
        self.last_request.clone()
    }

    /// Image of the current cache entry, whether or not it matches the current key.
    pub fn cached_image(&self) -> Option<RasterImage> {
        self.shared
            .state()
            .entry
            .as_ref()
            .map(|e| e.image().clone())
    }

    /// Key of the current cache entry.
    pub fn cached_key(&self) -> Option<RasterKey> {
        self.shared.state().entry.as_ref().map(|e| *e.key())
    }

    /// Key a paint would look up right now.
    pub fn candidate_key(&self) -> RasterKey {
        self.shared.state().candidate_key()
    }

    /// Composite the cached raster at `offset`, or schedule rasterization on a miss.
    ///
    /// - effective opacity zero: draws nothing and issues nothing
    /// - cache hit: draws the cached bitmap with the color filter and opacity
    /// - miss: draws nothing; issues one request unless one for the same key is in flight
    pub fn paint(&mut self, ctx: &mut dyn PaintContext, offset: Point) -> RasterResult<()> {
        let gate = self.visibility();
        let step = {
            let mut state = self.shared.state();
            if state.disposed {
                return Err(RasterError::validation(
                    "cannot paint a disposed vector graphic node",
                ));
            }
            self.shared.repaint.dirty.store(false, Ordering::Release);
            if gate.is_invisible() {
                tracing::trace!("skipping paint of fully transparent node");
                return Ok(());
            }

            let key = state.candidate_key();
            if let Some(entry) = state.entry.as_ref()
                && entry.matches(&key)
            {
                tracing::trace!(image = entry.image().id(), "raster cache hit");
                PaintStep::Draw(entry.image().clone(), state.size)
            } else if state.pending.as_ref().is_some_and(|p| *p.key() == key) {
                PaintStep::Wait
            } else {
                let request = RasterRequest::new(state.drawable.clone(), key)?;
                let (handle, resolver) = PendingRaster::new(key);
                self.last_request = Some(handle.clone());
                if let Some(stale) = state.pending.replace(handle) {
                    tracing::debug!(request = stale.id(), "superseding in-flight raster request");
                }
                PaintStep::Issue(request, resolver)
            }
        };

        match step {
            PaintStep::Draw(image, size) => ctx.draw_image(
                &image,
                Rect::from_origin_size(offset, size),
                &ImagePaint {
                    color_filter: self.color_filter.as_ref(),
                    opacity: gate.effective_opacity(),
                },
            ),
            PaintStep::Wait => Ok(()),
            PaintStep::Issue(request, resolver) => {
                let (w, h) = request.key().pixel_size();
                tracing::debug!(request = resolver.id(), w, h, "issuing raster request");
                let shared = Arc::downgrade(&self.shared);
                // Issued without holding the state lock: rasterizers may complete inline.
                self.rasterizer.rasterize(
                    request,
                    RasterCompletion::new(move |result| resolve_request(&shared, resolver, result)),
                );
                Ok(())
            }
        }
    }

    fn subscribe_opacity(&mut self) {
        let Some(binding) = self.opacity_source.as_mut() else {
            return;
        };
        if binding.subscription.is_some() {
            return;
        }
        let Some(source) = binding.source.upgrade() else {
            return;
        };
        let shared = Arc::downgrade(&self.shared);
        binding.subscription = Some(source.subscribe(Arc::new(move |_: f32| {
            if let Some(shared) = shared.upgrade() {
                shared.repaint.mark();
            }
        })));
    }

    fn unsubscribe_opacity(&mut self) {
        let Some(binding) = self.opacity_source.as_mut() else {
            return;
        };
        let Some(id) = binding.subscription.take() else {
            return;
        };
        if let Some(source) = binding.source.upgrade() {
            source.unsubscribe(id);
        }
    }
}

impl Drop for VectorGraphicNode {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn resolve_request(
    shared: &Weak<NodeShared>,
    resolver: PendingResolver,
    result: RasterResult<RasterImage>,
) {
    let Some(shared) = shared.upgrade() else {
        if let Ok(image) = result {
            image.dispose();
        }
        tracing::debug!(request = resolver.id(), "node dropped before raster resolved");
        resolver.resolve(RasterOutcome::Discarded);
        return;
    };

    let outcome = {
        let mut state = shared.state();
        if state
            .pending
            .as_ref()
            .is_some_and(|p| p.id() == resolver.id())
        {
            state.pending = None;
        }

        match result {
            Err(err) => {
                tracing::warn!(request = resolver.id(), error = %err, "rasterization failed");
                RasterOutcome::Failed(err.to_string())
            }
            Ok(image) => {
                let wanted = !state.disposed && state.candidate_key() == *resolver.key();
                // Key A -> B -> A can leave an older A request resolving after the newer
                // one was installed; the installed bitmap stays.
                let cached = state
                    .entry
                    .as_ref()
                    .is_some_and(|e| e.matches(resolver.key()));
                if wanted && !cached {
                    tracing::debug!(
                        request = resolver.id(),
                        image = image.id(),
                        "applying raster"
                    );
                    // Dropping the previous entry disposes its bitmap.
                    drop(
                        state
                            .entry
                            .replace(RasterCacheEntry::new(*resolver.key(), image)),
                    );
                    RasterOutcome::Applied
                } else {
                    tracing::debug!(request = resolver.id(), "discarding superseded raster");
                    image.dispose();
                    RasterOutcome::Discarded
                }
            }
        }
    };

    if outcome == RasterOutcome::Applied {
        shared.repaint.mark();
    }
    resolver.resolve(outcome);
}

#[cfg(test)]
#[path = "../../tests/unit/node/vector_graphic.rs"]
mod tests;
