//! WidgetRegistry - painted widgets and their screen bounds for one frame.
//!
//! Entries are recorded in paint order with parents before children, so a
//! back-to-front scan finds the most deeply nested (and the topmost float's)
//! widget first.

use crate::types::Rect;
use crate::widget::WidgetRef;

/// One painted widget.
#[derive(Clone)]
pub struct RegistryEntry {
    pub widget: WidgetRef,
    pub id: String,
    /// Tree path, `0.2.1` style.
    pub path: String,
    /// Absolute border-box bounds.
    pub bounds: Rect,
    /// The part of `bounds` inside the clip it was painted with.
    pub visible: Rect,
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("bounds", &self.bounds)
            .field("visible", &self.visible)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    entries: Vec<RegistryEntry>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        widget: WidgetRef,
        id: impl Into<String>,
        path: impl Into<String>,
        bounds: Rect,
        clip: Rect,
    ) {
        self.entries.push(RegistryEntry {
            widget,
            id: id.into(),
            path: path.into(),
            bounds,
            visible: bounds.intersect(&clip),
        });
    }

    /// Bounds of the most recently painted widget with `id`.
    pub fn bounds_of(&self, id: &str) -> Option<Rect> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.id == id)
            .map(|e| e.bounds)
    }

    /// Topmost, innermost widget visible at `(x, y)`.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&RegistryEntry> {
        self.entries.iter().rev().find(|e| e.visible.contains(x, y))
    }

    /// The widget hit at `(x, y)`, then each painted ancestor that also
    /// contains the point, innermost first.
    pub fn hit_chain(&self, x: i32, y: i32) -> Vec<&RegistryEntry> {
        let Some(hit) = self.hit_test(x, y) else {
            return Vec::new();
        };
        self.entries
            .iter()
            .rev()
            .filter(|e| e.visible.contains(x, y) && path_within(&hit.path, &e.path))
            .collect()
    }

    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// True when `path` is `ancestor` or lies below it.
pub fn path_within(path: &str, ancestor: &str) -> bool {
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
}
