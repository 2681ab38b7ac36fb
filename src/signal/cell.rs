//! `Signal<T>` and `AnySignal<T>`.
//!
//! Each cell guards its value and subscriber set with its own lock, so any
//! thread may read or mutate it while a frame is being built.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::observer::{Observer, ObserverId, Tracker};
use super::scheduler::RenderScheduler;

// =============================================================================
// Shared cell state
// =============================================================================

struct Inner<T> {
    value: T,
    subscribers: HashMap<ObserverId, Weak<Observer>>,
}

impl<T> Inner<T> {
    fn subscribe(&mut self, tracker: &(impl Tracker + ?Sized)) {
        if let Some(observer) = tracker.observer() {
            self.subscribers
                .entry(observer.id())
                .or_insert_with(|| Arc::downgrade(observer));
        }
    }

    /// Live subscribers. Dead entries are pruned on the way.
    fn live_subscribers(&mut self) -> Vec<Arc<Observer>> {
        let mut live = Vec::with_capacity(self.subscribers.len());
        self.subscribers.retain(|_, weak| match weak.upgrade() {
            Some(observer) => {
                live.push(observer);
                true
            }
            None => false,
        });
        live
    }
}

struct Shared<T> {
    inner: Mutex<Inner<T>>,
    scheduler: RenderScheduler,
}

impl<T> Shared<T> {
    fn new(value: T, scheduler: &RenderScheduler) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                value,
                subscribers: HashMap::new(),
            }),
            scheduler: scheduler.clone(),
        })
    }

    fn get(&self, tracker: &(impl Tracker + ?Sized)) -> T
    where
        T: Clone,
    {
        let mut inner = self.inner.lock();
        inner.subscribe(tracker);
        inner.value.clone()
    }

    fn notify(&self, subscribers: Vec<Arc<Observer>>) {
        for observer in &subscribers {
            observer.mark_dirty();
        }
        self.scheduler.schedule();
    }

    fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .subscribers
            .values()
            .filter(|w| w.strong_count() > 0)
            .count()
    }
}

// =============================================================================
// Signal
// =============================================================================

/// Reactive cell for values with decidable equality.
///
/// Setting a value equal to the current one does nothing: no observer is
/// marked and no frame is scheduled.
pub struct Signal<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + PartialEq + Send> Signal<T> {
    pub fn new(value: T, scheduler: &RenderScheduler) -> Self {
        Self {
            shared: Shared::new(value, scheduler),
        }
    }

    /// Current value. Subscribes the tracker's observer, if any.
    pub fn get(&self, tracker: &(impl Tracker + ?Sized)) -> T {
        self.shared.get(tracker)
    }

    /// Current value without subscribing.
    pub fn peek(&self) -> T {
        self.shared.inner.lock().value.clone()
    }

    /// Borrow the current value without cloning or subscribing.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.inner.lock().value)
    }

    /// Store `value` if it differs. Returns whether anything changed.
    pub fn set(&self, value: T) -> bool {
        let subscribers = {
            let mut inner = self.shared.inner.lock();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.live_subscribers()
        };
        self.shared.notify(subscribers);
        true
    }

    /// Read-modify-write under the cell's lock, with `set` semantics.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        let subscribers = {
            let mut inner = self.shared.inner.lock();
            let next = f(&inner.value);
            if inner.value == next {
                return false;
            }
            inner.value = next;
            inner.live_subscribers()
        };
        self.shared.notify(subscribers);
        true
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscriber_count()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal")
            .field(&self.shared.inner.lock().value)
            .finish()
    }
}

// =============================================================================
// AnySignal
// =============================================================================

/// Reactive cell for values without usable equality. Every set notifies.
pub struct AnySignal<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone + Send> AnySignal<T> {
    pub fn new(value: T, scheduler: &RenderScheduler) -> Self {
        Self {
            shared: Shared::new(value, scheduler),
        }
    }

    pub fn get(&self, tracker: &(impl Tracker + ?Sized)) -> T {
        self.shared.get(tracker)
    }

    pub fn peek(&self) -> T {
        self.shared.inner.lock().value.clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.inner.lock().value)
    }

    pub fn set(&self, value: T) {
        let subscribers = {
            let mut inner = self.shared.inner.lock();
            inner.value = value;
            inner.live_subscribers()
        };
        self.shared.notify(subscribers);
    }

    /// Mutate in place under the cell's lock, then notify.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let subscribers = {
            let mut inner = self.shared.inner.lock();
            f(&mut inner.value);
            inner.live_subscribers()
        };
        self.shared.notify(subscribers);
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.subscriber_count()
    }
}

impl<T> Clone for AnySignal<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for AnySignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AnySignal(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::Untracked;
    use std::thread;

    fn observer(label: &str) -> Arc<Observer> {
        Arc::new(Observer::new(label))
    }

    #[test]
    fn test_get_subscribes_once() {
        let sched = RenderScheduler::new();
        let sig = Signal::new(1, &sched);
        let o = observer("0");
        sig.get(&o);
        sig.get(&o);
        assert_eq!(sig.subscriber_count(), 1);
    }

    #[test]
    fn test_peek_and_untracked_do_not_subscribe() {
        let sched = RenderScheduler::new();
        let sig = Signal::new("a".to_string(), &sched);
        assert_eq!(sig.peek(), "a");
        assert_eq!(sig.get(&Untracked), "a");
        assert_eq!(sig.with(|s| s.len()), 1);
        assert_eq!(sig.subscriber_count(), 0);
    }

    #[test]
    fn test_set_equal_is_silent() {
        let sched = RenderScheduler::new();
        let sig = Signal::new(5, &sched);
        let o = observer("0");
        sig.get(&o);

        assert!(!sig.set(5));
        assert!(!o.is_dirty());
        assert!(!sched.is_pending());
        assert_eq!(sched.requested_frames(), 0);
    }

    #[test]
    fn test_set_changed_marks_and_schedules() {
        let sched = RenderScheduler::new();
        let sig = Signal::new(5, &sched);
        let o = observer("0");
        sig.get(&o);

        assert!(sig.set(6));
        assert!(o.is_dirty());
        assert!(sched.is_pending());
        assert_eq!(sig.peek(), 6);
    }

    #[test]
    fn test_any_signal_always_notifies() {
        let sched = RenderScheduler::new();
        let sig = AnySignal::new(vec![1], &sched);
        let o = observer("0");
        sig.get(&o);

        sig.set(vec![1]);
        assert!(o.take_dirty());
        assert!(sched.take_pending());

        sig.update(|v| v.push(2));
        assert!(o.is_dirty());
        assert!(sched.is_pending());
        assert_eq!(sig.peek(), vec![1, 2]);
    }

    #[test]
    fn test_update_with_equal_result_is_silent() {
        let sched = RenderScheduler::new();
        let sig = Signal::new(3, &sched);
        assert!(!sig.update(|v| *v));
        assert!(!sched.is_pending());
        assert!(sig.update(|v| v + 1));
        assert_eq!(sig.peek(), 4);
    }

    #[test]
    fn test_dead_observers_are_pruned() {
        let sched = RenderScheduler::new();
        let sig = Signal::new(0, &sched);
        {
            let o = observer("gone");
            sig.get(&o);
            assert_eq!(sig.subscriber_count(), 1);
        }
        assert_eq!(sig.subscriber_count(), 0);
        assert!(sig.set(1));
    }

    #[test]
    fn test_concurrent_updates_are_atomic() {
        let sched = RenderScheduler::new();
        let sig = Signal::new(0u32, &sched);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sig = sig.clone();
                thread::spawn(move || {
                    for _ in 0..1000 {
                        sig.update(|v| v + 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(sig.peek(), 8000);
    }
}
