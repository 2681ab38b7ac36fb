//! Floats - overlays painted after the main tree.
//!
//! A float moves through four stages in one frame:
//!
//! 1. **Queued** - a visible [`Floating`](crate::widget::Floating) widget
//!    pushes a [`FloatEntry`] while the main tree builds and leaves an empty
//!    placeholder behind.
//! 2. **Sized** - the entry's child is built against loose screen constraints;
//!    its margin box is the float's size.
//! 3. **Positioned** - placed against an anchor widget's painted bounds or the
//!    screen, offset, then clamped fully on screen ([`resolve_rect`]).
//! 4. **Painted** - in queue order, later on top. Modals paint a backdrop first.
//!
//! The positioned entries form the frame's [`FloatLayer`], which answers
//! topmost-first hit tests and applies dismiss rules.

use std::fmt;
use std::sync::Arc;

use super::context::BuildContext;
use crate::types::{Rect, Rgba};
use crate::widget::WidgetRef;

// =============================================================================
// Placement
// =============================================================================

/// Where a float sits relative to its anchor's bounds.
///
/// The first word is the anchor side the float is placed against, the second
/// the alignment along that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorPoint {
    TopLeft,
    TopCenter,
    TopRight,
    #[default]
    BottomLeft,
    BottomCenter,
    BottomRight,
    LeftTop,
    LeftCenter,
    LeftBottom,
    RightTop,
    RightCenter,
    RightBottom,
}

#[derive(Clone, Copy)]
enum Align {
    Start,
    Center,
    End,
}

fn align(start: i32, anchor_len: i32, len: i32, align: Align) -> i32 {
    match align {
        Align::Start => start,
        Align::Center => start + (anchor_len - len) / 2,
        Align::End => start + anchor_len - len,
    }
}

impl AnchorPoint {
    /// Top-left corner for a `width` x `height` float against `anchor`.
    pub fn place(self, anchor: Rect, width: i32, height: i32) -> (i32, i32) {
        use AnchorPoint::*;

        let horizontal = |a| align(anchor.x, anchor.width, width, a);
        let vertical = |a| align(anchor.y, anchor.height, height, a);
        let above = anchor.y - height;
        let below = anchor.bottom();
        let left = anchor.x - width;
        let right = anchor.right();

        match self {
            TopLeft => (horizontal(Align::Start), above),
            TopCenter => (horizontal(Align::Center), above),
            TopRight => (horizontal(Align::End), above),
            BottomLeft => (horizontal(Align::Start), below),
            BottomCenter => (horizontal(Align::Center), below),
            BottomRight => (horizontal(Align::End), below),
            LeftTop => (left, vertical(Align::Start)),
            LeftCenter => (left, vertical(Align::Center)),
            LeftBottom => (left, vertical(Align::End)),
            RightTop => (right, vertical(Align::Start)),
            RightCenter => (right, vertical(Align::Center)),
            RightBottom => (right, vertical(Align::End)),
        }
    }
}

/// Screen-relative placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsolutePosition {
    #[default]
    Center,
    TopCenter,
    BottomCenter,
    /// At the screen origin; position it with the config offset.
    Offset,
}

impl AbsolutePosition {
    pub fn place(self, screen: (i32, i32), width: i32, height: i32) -> (i32, i32) {
        let screen_rect = Rect::new(0, 0, screen.0, screen.1);
        let x = align(0, screen.0, width, Align::Center);
        match self {
            AbsolutePosition::Center => (x, align(0, screen.1, height, Align::Center)),
            AbsolutePosition::TopCenter => (x, screen_rect.y),
            AbsolutePosition::BottomCenter => (x, screen_rect.bottom() - height),
            AbsolutePosition::Offset => (0, 0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Anchored { id: String, point: AnchorPoint },
    Absolute(AbsolutePosition),
}

// =============================================================================
// FloatConfig
// =============================================================================

/// When a float dismisses itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DismissRules {
    pub on_escape: bool,
    pub on_click_outside: bool,
}

pub type DismissFn = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct FloatConfig {
    pub placement: Placement,
    pub offset: (i32, i32),
    pub modal: bool,
    pub dismiss: DismissRules,
    /// Modal backdrop color. `None` uses the configured default.
    pub backdrop: Option<Rgba>,
    pub on_dismiss: Option<DismissFn>,
}

impl FloatConfig {
    /// Float placed against the painted bounds of widget `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is empty.
    pub fn anchored(id: impl Into<String>, point: AnchorPoint) -> Self {
        let id = id.into();
        assert!(!id.is_empty(), "anchored float needs a non-empty anchor id");
        Self::with_placement(Placement::Anchored { id, point })
    }

    pub fn absolute(position: AbsolutePosition) -> Self {
        Self::with_placement(Placement::Absolute(position))
    }

    pub fn centered() -> Self {
        Self::absolute(AbsolutePosition::Center)
    }

    fn with_placement(placement: Placement) -> Self {
        Self {
            placement,
            offset: (0, 0),
            modal: false,
            dismiss: DismissRules::default(),
            backdrop: None,
            on_dismiss: None,
        }
    }

    pub fn offset(mut self, dx: i32, dy: i32) -> Self {
        self.offset = (dx, dy);
        self
    }

    /// Paint a backdrop first and trap focus inside.
    pub fn modal(mut self) -> Self {
        self.modal = true;
        self
    }

    pub fn backdrop(mut self, color: Rgba) -> Self {
        self.backdrop = Some(color);
        self
    }

    pub fn dismiss_on_escape(mut self) -> Self {
        self.dismiss.on_escape = true;
        self
    }

    pub fn dismiss_on_click_outside(mut self) -> Self {
        self.dismiss.on_click_outside = true;
        self
    }

    pub fn on_dismiss(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_dismiss = Some(Arc::new(f));
        self
    }

    /// The anchor id, for anchored floats.
    pub fn anchor_id(&self) -> Option<&str> {
        match &self.placement {
            Placement::Anchored { id, .. } => Some(id),
            Placement::Absolute(_) => None,
        }
    }
}

impl fmt::Debug for FloatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatConfig")
            .field("placement", &self.placement)
            .field("offset", &self.offset)
            .field("modal", &self.modal)
            .field("dismiss", &self.dismiss)
            .field("backdrop", &self.backdrop)
            .field("on_dismiss", &self.on_dismiss.is_some())
            .finish()
    }
}

// =============================================================================
// Positioning
// =============================================================================

/// Shrink and shift `rect` until it lies within a `width` x `height` screen.
pub fn clamp_to_screen(rect: Rect, width: i32, height: i32) -> Rect {
    let (sw, sh) = (width.max(0), height.max(0));
    let w = rect.width.clamp(0, sw);
    let h = rect.height.clamp(0, sh);
    Rect::new(rect.x.clamp(0, sw - w), rect.y.clamp(0, sh - h), w, h)
}

/// Final on-screen rectangle for a float of `size`.
///
/// `anchor` is the anchor widget's painted bounds; a missing anchor centers
/// the float on screen.
pub fn resolve_rect(
    config: &FloatConfig,
    size: (i32, i32),
    anchor: Option<Rect>,
    screen: (i32, i32),
) -> Rect {
    let (w, h) = (size.0.max(0), size.1.max(0));
    let (x, y) = match (&config.placement, anchor) {
        (Placement::Anchored { point, .. }, Some(anchor)) => point.place(anchor, w, h),
        (Placement::Anchored { .. }, None) => AbsolutePosition::Center.place(screen, w, h),
        (Placement::Absolute(position), _) => position.place(screen, w, h),
    };
    let (dx, dy) = config.offset;
    clamp_to_screen(Rect::new(x + dx, y + dy, w, h), screen.0, screen.1)
}

// =============================================================================
// FloatEntry / FloatCollector
// =============================================================================

/// One float for the current frame.
#[derive(Clone)]
pub struct FloatEntry {
    pub config: FloatConfig,
    pub child: WidgetRef,
    /// Context of the `Floating` widget that queued this entry.
    pub(crate) cx: BuildContext,
    /// Unset until positioned.
    pub rect: Option<Rect>,
}

impl FloatEntry {
    /// Path of the `Floating` widget that queued this entry.
    pub fn path(&self) -> &str {
        self.cx.path()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.rect.is_some_and(|r| r.contains(x, y))
    }

    fn dismiss(&self) {
        log::debug!("float {} dismissed", self.path());
        if let Some(f) = &self.config.on_dismiss {
            f();
        }
    }
}

impl fmt::Debug for FloatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatEntry")
            .field("path", &self.cx.path())
            .field("config", &self.config)
            .field("rect", &self.rect)
            .finish()
    }
}

/// Floats queued while building, in registration order.
#[derive(Debug, Default)]
pub struct FloatCollector {
    entries: Vec<FloatEntry>,
}

impl FloatCollector {
    pub fn push(&mut self, config: FloatConfig, child: WidgetRef, cx: BuildContext) {
        self.entries.push(FloatEntry {
            config,
            child,
            cx,
            rect: None,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain everything queued so far.
    pub fn take(&mut self) -> Vec<FloatEntry> {
        std::mem::take(&mut self.entries)
    }
}

// =============================================================================
// FloatLayer
// =============================================================================

/// Positioned floats of one frame, bottom to top.
#[derive(Debug, Default, Clone)]
pub struct FloatLayer {
    entries: Vec<FloatEntry>,
}

impl FloatLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: FloatEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[FloatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The float painted last.
    pub fn top_float(&self) -> Option<&FloatEntry> {
        self.entries.last()
    }

    /// Topmost float containing `(x, y)`.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&FloatEntry> {
        self.entries.iter().rev().find(|e| e.contains(x, y))
    }

    pub fn has_modal(&self) -> bool {
        self.entries.iter().any(|e| e.config.modal)
    }

    /// Dismiss the topmost float if it closes on Escape.
    pub fn dismiss_on_escape(&self) -> bool {
        match self.top_float() {
            Some(top) if top.config.dismiss.on_escape => {
                top.dismiss();
                true
            }
            _ => false,
        }
    }

    /// Dismiss the topmost float if it closes on outside clicks and `(x, y)`
    /// is outside it.
    pub fn dismiss_on_click(&self, x: i32, y: i32) -> bool {
        match self.top_float() {
            Some(top) if top.config.dismiss.on_click_outside && !top.contains(x, y) => {
                top.dismiss();
                true
            }
            _ => false,
        }
    }
}
