//! Build-phase observers.
//!
//! Every widget node built during a frame owns one [`Observer`], keyed by the
//! node's id. Signals hold weak references to the observers that read them.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

/// Unique identity of an observer, used as the subscription key.
pub type ObserverId = u64;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// A subscriber identity plus its dirty flag.
#[derive(Debug)]
pub struct Observer {
    id: ObserverId,
    label: String,
    dirty: AtomicBool,
}

impl Observer {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: NEXT_OBSERVER_ID.fetch_add(1, Ordering::Relaxed),
            label: label.into(),
            dirty: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// The node id this observer belongs to.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Flag this observer as needing a rebuild.
    pub fn mark_dirty(&self) {
        if !self.dirty.swap(true, Ordering::AcqRel) {
            log::trace!("render cause: {}", self.label);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Clear the dirty flag, returning its previous value.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

// =============================================================================
// Tracker
// =============================================================================

/// Anything that can name the observer currently reading a signal.
pub trait Tracker {
    fn observer(&self) -> Option<&Arc<Observer>>;
}

/// Reads outside a build: never subscribes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Untracked;

impl Tracker for Untracked {
    fn observer(&self) -> Option<&Arc<Observer>> {
        None
    }
}

impl Tracker for Arc<Observer> {
    fn observer(&self) -> Option<&Arc<Observer>> {
        Some(self)
    }
}

// =============================================================================
// ObserverPool
// =============================================================================

/// Observers keyed by node id, kept alive across frames.
///
/// A node that keeps its id keeps its observer, so subscriptions made in one
/// frame still report dirtiness before the next.
#[derive(Debug, Default)]
pub struct ObserverPool {
    observers: Mutex<HashMap<String, Arc<Observer>>>,
}

impl ObserverPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// The observer for `id`, created on first use.
    pub fn get_or_create(&self, id: &str) -> Arc<Observer> {
        let mut observers = self.observers.lock();
        if let Some(existing) = observers.get(id) {
            return Arc::clone(existing);
        }
        let observer = Arc::new(Observer::new(id));
        observers.insert(id.to_string(), Arc::clone(&observer));
        observer
    }

    /// Drop observers for ids not built this frame. Their weak subscriptions die with them.
    pub fn retain(&self, seen: &HashSet<String>) {
        self.observers.lock().retain(|id, _| seen.contains(id));
    }

    /// Ids of every dirty observer, clearing their flags. Sorted for stable output.
    pub fn drain_dirty(&self) -> Vec<String> {
        let observers = self.observers.lock();
        let mut dirty: Vec<String> = observers
            .iter()
            .filter(|(_, o)| o.take_dirty())
            .map(|(id, _)| id.clone())
            .collect();
        dirty.sort();
        dirty
    }

    pub fn len(&self) -> usize {
        self.observers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
