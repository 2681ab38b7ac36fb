//! Focus State
//!
//! Each frame the builder collects focusable widgets in traversal order; that
//! list is the tab order. The focused id lives in a signal so any widget that
//! asks "am I focused?" during build is re-rendered when it changes.
//!
//! Focus traps: when the tab order contains trapped entries, navigation is
//! restricted to the entries of the last trap collected (the topmost modal).

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::signal::{RenderScheduler, Signal, Tracker, Untracked};
use crate::widget::WidgetRef;

// =============================================================================
// Focusable
// =============================================================================

/// One entry in a frame's tab order.
#[derive(Clone)]
pub struct Focusable {
    pub id: String,
    /// Path of the enclosing focus-trap scope, if any.
    pub trap: Option<String>,
    /// Ancestors that handle bubbling key events, innermost first.
    pub handlers: Vec<WidgetRef>,
}

impl fmt::Debug for Focusable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Focusable")
            .field("id", &self.id)
            .field("trap", &self.trap)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

// =============================================================================
// FocusManager
// =============================================================================

/// Consumer of the per-frame tab order.
pub trait FocusManager: Send + Sync {
    /// Whether `id` holds focus. Subscribes the tracker to focus changes.
    fn is_focused(&self, id: &str, tracker: &dyn Tracker) -> bool;

    /// Replace the tab order with this frame's list. `auto_focus` names the
    /// first focusable inside the first modal opened this frame.
    fn update_focusables(&self, focusables: Vec<Focusable>, auto_focus: Option<String>);

    /// Focus `id` if it is reachable. Returns whether it now holds focus.
    fn focus(&self, id: &str) -> bool;

    fn focused(&self) -> Option<String>;
}

// =============================================================================
// FocusState
// =============================================================================

/// Default [`FocusManager`]: tab cycling, traps, modal auto-focus.
pub struct FocusState {
    focused: Signal<Option<String>>,
    order: Mutex<Vec<Focusable>>,
    last_auto: Mutex<Option<String>>,
}

impl FocusState {
    pub fn new(scheduler: &RenderScheduler) -> Self {
        Self {
            focused: Signal::new(None, scheduler),
            order: Mutex::new(Vec::new()),
            last_auto: Mutex::new(None),
        }
    }

    /// Ids focus may move between right now.
    pub fn candidates(&self) -> Vec<String> {
        let order = self.order.lock();
        let active_trap = order.iter().rev().find_map(|f| f.trap.clone());
        order
            .iter()
            .filter(|f| f.trap == active_trap)
            .map(|f| f.id.clone())
            .collect()
    }

    /// The tab-order entry for `id`.
    pub fn entry(&self, id: &str) -> Option<Focusable> {
        self.order.lock().iter().find(|f| f.id == id).cloned()
    }

    fn step(&self, forward: bool) -> bool {
        let candidates = self.candidates();
        if candidates.is_empty() {
            return false;
        }

        let current = self.focused.peek();
        let len = candidates.len() as isize;
        let pos = current
            .as_deref()
            .and_then(|id| candidates.iter().position(|c| c == id));

        let next = match (pos, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(p), true) => (p as isize + 1).rem_euclid(len),
            (Some(p), false) => (p as isize - 1).rem_euclid(len),
        };

        self.focused.set(Some(candidates[next as usize].clone()))
    }

    /// Move to the next candidate, wrapping around.
    pub fn focus_next(&self) -> bool {
        self.step(true)
    }

    /// Move to the previous candidate, wrapping around.
    pub fn focus_previous(&self) -> bool {
        self.step(false)
    }

    pub fn focus_first(&self) -> bool {
        match self.candidates().first() {
            Some(id) => self.focus(id),
            None => false,
        }
    }

    pub fn focus_last(&self) -> bool {
        match self.candidates().last() {
            Some(id) => self.focus(id),
            None => false,
        }
    }

    /// Clear focus. Returns whether anything was focused.
    pub fn blur(&self) -> bool {
        self.focused.set(None)
    }
}

impl FocusManager for FocusState {
    fn is_focused(&self, id: &str, tracker: &dyn Tracker) -> bool {
        self.focused.get(tracker).as_deref() == Some(id)
    }

    fn update_focusables(&self, focusables: Vec<Focusable>, auto_focus: Option<String>) {
        *self.order.lock() = focusables;

        let newly_opened = {
            let mut last = self.last_auto.lock();
            let changed = *last != auto_focus;
            *last = auto_focus.clone();
            changed
        };

        if let (true, Some(id)) = (newly_opened, auto_focus) {
            log::debug!("modal auto-focus: {id}");
            self.focused.set(Some(id));
            return;
        }

        let current = self.focused.get(&Untracked);
        if let Some(id) = current {
            if self.entry(&id).is_none() {
                self.focused.set(None);
            }
        }
    }

    fn focus(&self, id: &str) -> bool {
        if !self.candidates().iter().any(|c| c == id) {
            return false;
        }
        self.focused.set(Some(id.to_string()));
        true
    }

    fn focused(&self) -> Option<String> {
        self.focused.peek()
    }
}

impl fmt::Debug for FocusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusState")
            .field("focused", &self.focused.peek())
            .field("order", &self.order.lock().len())
            .finish()
    }
}

/// Shared handle used by the pipeline.
pub type SharedFocus = Arc<dyn FocusManager>;
