use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Token returned by [`OpacitySource::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Listener invoked synchronously with the new value whenever the source changes.
pub type OpacityListener = Arc<dyn Fn(f32) + Send + Sync>;

/// Externally owned, observable opacity value (an animation, a fade controller, ...).
pub trait OpacitySource: Send + Sync {
    /// Current value in `[0, 1]`.
    fn value(&self) -> f32;

    /// Register `listener`; the returned id removes it again.
    fn subscribe(&self, listener: OpacityListener) -> SubscriptionId;

    /// Remove a listener. Returns `false` when `id` was not subscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// Value-notifier implementation of [`OpacitySource`].
pub struct OpacityController {
    bits: AtomicU32,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, OpacityListener)>>,
}

impl std::fmt::Debug for OpacityController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpacityController")
            .field("value", &self.value())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl OpacityController {
    /// Controller starting at `value` (clamped to `[0, 1]`).
    pub fn new(value: f32) -> Self {
        Self {
            bits: AtomicU32::new(clamp_unit(value).to_bits()),
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Update the value and notify listeners if it changed.
    ///
    /// Listeners run on the calling thread after the internal lock is released, so they may
    /// subscribe or unsubscribe re-entrantly.
    pub fn set(&self, value: f32) {
        let value = clamp_unit(value);
        let prev = f32::from_bits(self.bits.swap(value.to_bits(), Ordering::AcqRel));
        if prev == value {
            return;
        }
        let listeners: Vec<OpacityListener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for l in listeners {
            l(value);
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl OpacitySource for OpacityController {
    fn value(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Acquire))
    }

    fn subscribe(&self, listener: OpacityListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
#[path = "../../tests/unit/node/opacity.rs"]
mod tests;
