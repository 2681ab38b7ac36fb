//! BuildContext - what a widget knows while it builds.
//!
//! The context is threaded explicitly through every build call. It carries the
//! node's tree path (its fallback identity), the observer that signal reads
//! subscribe, the enclosing focus-trap and disabled scopes, and the chain of
//! ancestors that handle bubbling key events.

use std::sync::Arc;

use crate::signal::{Observer, ObserverPool, Tracker};
use crate::state::SharedFocus;
use crate::widget::{ScopeKind, WidgetRef};

/// Per-node build state. Cheap to clone.
#[derive(Clone)]
pub struct BuildContext {
    path: String,
    observer: Arc<Observer>,
    observers: Arc<ObserverPool>,
    trap: Option<String>,
    disabled: bool,
    handlers: Vec<WidgetRef>,
    screen: (i32, i32),
    focus: Option<SharedFocus>,
}

impl BuildContext {
    /// Context for the root of a frame. The root's path is `"0"`.
    pub fn root(
        observers: Arc<ObserverPool>,
        focus: Option<SharedFocus>,
        screen: (i32, i32),
    ) -> Self {
        let path = String::from("0");
        Self {
            observer: observers.get_or_create(&path),
            path,
            observers,
            trap: None,
            disabled: false,
            handlers: Vec::new(),
            screen,
            focus,
        }
    }

    /// Root context with its own observer pool and no focus manager.
    pub fn detached() -> Self {
        Self::root(Arc::new(ObserverPool::new()), None, (0, 0))
    }

    /// Context for child `index`: path `"{path}.{index}"`.
    pub fn child(&self, index: usize) -> Self {
        let path = format!("{}.{}", self.path, index);
        Self {
            observer: self.observers.get_or_create(&path),
            path,
            ..self.clone()
        }
    }

    /// Same node, inside a transparent scope.
    pub fn scoped(&self, kind: ScopeKind) -> Self {
        let mut cx = self.clone();
        match kind {
            ScopeKind::FocusTrap => cx.trap = Some(self.path.clone()),
            ScopeKind::Disabled => cx.disabled = true,
        }
        cx
    }

    /// Same node, with `widget` prepended to the key-handler chain.
    pub fn with_handler(&self, widget: WidgetRef) -> Self {
        let mut cx = self.clone();
        cx.handlers.insert(0, widget);
        cx
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path of the innermost enclosing focus trap.
    pub fn trap(&self) -> Option<&str> {
        self.trap.as_deref()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Ancestors handling bubbling keys, innermost first.
    pub fn handlers(&self) -> &[WidgetRef] {
        &self.handlers
    }

    /// Screen size in cells.
    pub fn screen(&self) -> (i32, i32) {
        self.screen
    }

    /// Whether `id` holds focus. Without a focus manager nothing does.
    pub fn is_focused(&self, id: &str) -> bool {
        self.focus
            .as_ref()
            .is_some_and(|focus| focus.is_focused(id, self))
    }
}

impl Tracker for BuildContext {
    fn observer(&self) -> Option<&Arc<Observer>> {
        Some(&self.observer)
    }
}
