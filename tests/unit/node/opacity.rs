use std::sync::atomic::AtomicUsize;

use super::*;

#[test]
fn subscribe_and_unsubscribe_track_count() {
    let c = OpacityController::new(1.0);
    let a = c.subscribe(Arc::new(|_: f32| {}));
    let b = c.subscribe(Arc::new(|_: f32| {}));
    assert_ne!(a, b);
    assert_eq!(c.listener_count(), 2);

    assert!(c.unsubscribe(a));
    assert!(!c.unsubscribe(a));
    assert_eq!(c.listener_count(), 1);
    assert!(c.unsubscribe(b));
    assert_eq!(c.listener_count(), 0);
}

#[test]
fn listeners_fire_only_on_change() {
    let c = OpacityController::new(0.5);
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::new(AtomicU32::new(0));
    {
        let calls = calls.clone();
        let seen = seen.clone();
        c.subscribe(Arc::new(move |v: f32| {
            calls.fetch_add(1, Ordering::SeqCst);
            seen.store(v.to_bits(), Ordering::SeqCst);
        }));
    }

    c.set(0.5);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    c.set(0.25);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(f32::from_bits(seen.load(Ordering::SeqCst)), 0.25);
    assert_eq!(c.value(), 0.25);
}

#[test]
fn values_are_clamped() {
    let c = OpacityController::new(3.0);
    assert_eq!(c.value(), 1.0);
    c.set(-2.0);
    assert_eq!(c.value(), 0.0);
}

#[test]
fn listener_may_unsubscribe_itself() {
    let c = Arc::new(OpacityController::new(1.0));
    let slot: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));
    let id = {
        let c2 = Arc::downgrade(&c);
        let slot = slot.clone();
        c.subscribe(Arc::new(move |_: f32| {
            if let (Some(c), Some(id)) = (c2.upgrade(), *slot.lock().unwrap()) {
                c.unsubscribe(id);
            }
        }))
    };
    *slot.lock().unwrap() = Some(id);

    c.set(0.0);
    assert_eq!(c.listener_count(), 0);
}
