use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{BoxFuture, Shared};

use crate::raster::key::RasterKey;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// How an in-flight rasterization request ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RasterOutcome {
    /// The bitmap became the node's current cache entry.
    Applied,
    /// The bitmap was superseded (or the node went away) and was disposed unused.
    Discarded,
    /// The rasterizer reported an error.
    Failed(String),
}

struct PendingInner {
    id: u64,
    key: RasterKey,
    outcome: Mutex<Option<RasterOutcome>>,
    resolved: Shared<BoxFuture<'static, RasterOutcome>>,
}

/// Observable handle to one in-flight rasterization request.
///
/// Resolved exactly once. Clones share the same request; use [`PendingRaster::ptr_eq`] to
/// check whether two paints observed the same request.
#[derive(Clone)]
pub struct PendingRaster {
    inner: Arc<PendingInner>,
}

impl std::fmt::Debug for PendingRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRaster")
            .field("id", &self.inner.id)
            .field("key", &self.inner.key)
            .field("outcome", &self.outcome())
            .finish()
    }
}

impl PendingRaster {
    pub(crate) fn new(key: RasterKey) -> (Self, PendingResolver) {
        let (tx, rx) = oneshot::channel::<RasterOutcome>();
        let resolved = rx
            .map(|r| {
                r.unwrap_or_else(|_| {
                    RasterOutcome::Failed("pending raster dropped before resolution".to_string())
                })
            })
            .boxed()
            .shared();
        let handle = Self {
            inner: Arc::new(PendingInner {
                id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
                key,
                outcome: Mutex::new(None),
                resolved,
            }),
        };
        let resolver = PendingResolver {
            handle: handle.clone(),
            tx,
        };
        (handle, resolver)
    }

    /// Process-unique request id.
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Key that was current when the request was issued.
    pub fn key(&self) -> &RasterKey {
        &self.inner.key
    }

    /// Return `true` once the request has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.outcome().is_some()
    }

    /// Outcome, if already resolved.
    pub fn outcome(&self) -> Option<RasterOutcome> {
        self.inner
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Future completing with the outcome.
    ///
    /// By the time it completes the node has already applied or discarded the result.
    pub fn resolved(&self) -> impl Future<Output = RasterOutcome> + Send + 'static {
        self.inner.resolved.clone()
    }

    /// Block the calling thread until the request resolves.
    ///
    /// Never call this from the thread that is expected to run the rasterization.
    pub fn wait(&self) -> RasterOutcome {
        futures::executor::block_on(self.resolved())
    }

    /// Return `true` when both handles refer to the same request.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Write side of a [`PendingRaster`]; consumed by resolution.
pub(crate) struct PendingResolver {
    handle: PendingRaster,
    tx: oneshot::Sender<RasterOutcome>,
}

impl PendingResolver {
    pub(crate) fn id(&self) -> u64 {
        self.handle.id()
    }

    pub(crate) fn key(&self) -> &RasterKey {
        self.handle.key()
    }

    pub(crate) fn resolve(self, outcome: RasterOutcome) {
        *self
            .handle
            .inner
            .outcome
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(outcome.clone());
        // Nobody awaiting is fine.
        let _ = self.tx.send(outcome);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/pending.rs"]
mod tests;
