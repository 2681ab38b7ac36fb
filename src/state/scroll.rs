//! Scroll State
//!
//! An externally held scroll position for one scrollable container:
//! - the offset is a signal (user state, survives across frames)
//! - viewport/content heights are written by the compositor every frame
//! - every operation clamps to `0..=max_offset()`

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::signal::{RenderScheduler, Signal, Tracker};

// =============================================================================
// SCROLL CONSTANTS
// =============================================================================

/// Default scroll amount for arrow keys (lines).
pub const LINE_SCROLL: i32 = 1;

/// Default scroll amount for mouse wheel.
pub const WHEEL_SCROLL: i32 = 3;

/// Default scroll amount for Page Up/Down (90% of viewport).
pub const PAGE_SCROLL_FACTOR: f32 = 0.9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Metrics {
    viewport: i32,
    content: i32,
}

/// Vertical scroll position of one container. Clones share state.
#[derive(Clone)]
pub struct ScrollState {
    offset: Signal<i32>,
    metrics: Arc<Mutex<Metrics>>,
}

impl ScrollState {
    pub fn new(scheduler: &RenderScheduler) -> Self {
        Self {
            offset: Signal::new(0, scheduler),
            metrics: Arc::new(Mutex::new(Metrics::default())),
        }
    }

    /// Current offset, subscribing the tracker.
    pub fn offset(&self, tracker: &(impl Tracker + ?Sized)) -> i32 {
        self.offset.get(tracker)
    }

    pub fn peek_offset(&self) -> i32 {
        self.offset.peek()
    }

    pub fn viewport_height(&self) -> i32 {
        self.metrics.lock().viewport
    }

    pub fn content_height(&self) -> i32 {
        self.metrics.lock().content
    }

    pub fn max_offset(&self) -> i32 {
        let m = *self.metrics.lock();
        (m.content - m.viewport).max(0)
    }

    /// Record the resolved viewport and content heights, re-clamping the offset.
    pub fn set_metrics(&self, viewport: i32, content: i32) {
        *self.metrics.lock() = Metrics {
            viewport: viewport.max(0),
            content: content.max(0),
        };
        let max = self.max_offset();
        self.offset.update(|y| (*y).clamp(0, max));
    }

    /// Jump to `y`, clamped. Returns whether the offset moved.
    pub fn scroll_to(&self, y: i32) -> bool {
        let max = self.max_offset();
        self.offset.set(y.clamp(0, max))
    }

    /// Scroll by a delta. Returns `false` if already at the boundary.
    pub fn scroll_by(&self, delta: i32) -> bool {
        let max = self.max_offset();
        self.offset.update(|y| (y + delta).clamp(0, max))
    }

    pub fn scroll_to_top(&self) -> bool {
        self.scroll_to(0)
    }

    pub fn scroll_to_bottom(&self) -> bool {
        self.scroll_to(self.max_offset())
    }

    fn page(&self) -> i32 {
        ((self.viewport_height() as f32 * PAGE_SCROLL_FACTOR) as i32).max(1)
    }

    pub fn page_down(&self) -> bool {
        self.scroll_by(self.page())
    }

    pub fn page_up(&self) -> bool {
        self.scroll_by(-self.page())
    }

    pub fn line_down(&self) -> bool {
        self.scroll_by(LINE_SCROLL)
    }

    pub fn line_up(&self) -> bool {
        self.scroll_by(-LINE_SCROLL)
    }

    /// Apply a mouse-wheel notch (`direction` > 0 scrolls down).
    pub fn wheel(&self, direction: i32) -> bool {
        self.scroll_by(direction.signum() * WHEEL_SCROLL)
    }
}

impl fmt::Debug for ScrollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = *self.metrics.lock();
        f.debug_struct("ScrollState")
            .field("offset", &self.offset.peek())
            .field("viewport", &m.viewport)
            .field("content", &m.content)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scroll(viewport: i32, content: i32) -> ScrollState {
        let s = ScrollState::new(&RenderScheduler::new());
        s.set_metrics(viewport, content);
        s
    }

    #[test]
    fn test_scroll_by_clamps() {
        let s = scroll(10, 25);
        assert_eq!(s.max_offset(), 15);
        assert!(s.scroll_by(100));
        assert_eq!(s.peek_offset(), 15);
        assert!(!s.scroll_by(1));
        assert!(s.scroll_by(-100));
        assert_eq!(s.peek_offset(), 0);
        assert!(!s.line_up());
    }

    #[test]
    fn test_pages() {
        let s = scroll(10, 100);
        assert!(s.page_down());
        assert_eq!(s.peek_offset(), 9);
        s.page_up();
        assert_eq!(s.peek_offset(), 0);
        s.wheel(1);
        assert_eq!(s.peek_offset(), WHEEL_SCROLL);
    }

    #[test]
    fn test_top_and_bottom() {
        let s = scroll(5, 12);
        assert!(s.scroll_to_bottom());
        assert_eq!(s.peek_offset(), 7);
        assert!(s.scroll_to_top());
        assert_eq!(s.peek_offset(), 0);
    }

    #[test]
    fn test_shrinking_content_reclamps() {
        let s = scroll(5, 20);
        s.scroll_to_bottom();
        s.set_metrics(5, 8);
        assert_eq!(s.peek_offset(), 3);
        s.set_metrics(10, 8);
        assert_eq!(s.peek_offset(), 0);
    }

    #[test]
    fn test_no_overflow_cannot_scroll() {
        let s = scroll(10, 4);
        assert!(!s.scroll_by(3));
        assert!(!s.page_down());
    }

    #[test]
    fn test_unchanged_metrics_do_not_schedule() {
        let sched = RenderScheduler::new();
        let s = ScrollState::new(&sched);
        s.set_metrics(10, 20);
        s.set_metrics(10, 20);
        assert!(!sched.is_pending());
    }
}
