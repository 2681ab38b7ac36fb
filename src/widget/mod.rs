//! Widgets
//!
//! A [`Widget`] is a description that builds, once per frame, into a concrete
//! [`Node`]: visual style, a layout description, optional content painter and
//! child widgets. What a widget *is* to the builder is resolved once through
//! [`Widget::kind`]:
//!
//! - [`WidgetKind::Element`] - builds into a node with geometry
//! - [`WidgetKind::Scope`] - transparent wrapper (focus trap, disabled)
//! - [`WidgetKind::Floating`] - overlay queued for the float pass
//!
//! The built-in widgets in [`basic`] are deliberately small; a real catalogue
//! lives outside this crate.

pub mod basic;

use std::fmt;
use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::color::Paint;
use crate::layout::{BoxModel, Edges, LayoutStyle, MeasureFn};
use crate::pipeline::{BuildContext, FloatConfig, RenderContext};
use crate::signal::Signal;
use crate::state::ScrollState;
use crate::types::{Attr, BorderStyle, Rgba};

pub use basic::{Block, Disabled, Floating, FocusTrap, Text};

/// Shared widget handle.
pub type WidgetRef = Arc<dyn Widget>;

/// Key handler. Returns `true` when the event is consumed.
pub type KeyCallback = Arc<dyn Fn(&KeyEvent) -> bool + Send + Sync>;

/// Receives a node's resolved geometry before its children are built.
pub type LayoutCallback = Arc<dyn Fn(&BoxModel) + Send + Sync>;

// =============================================================================
// Widget
// =============================================================================

/// Something that builds into a [`Node`] every frame.
pub trait Widget: Send + Sync {
    fn build(&self, cx: &BuildContext) -> Node;

    /// Explicit identity. Empty or missing ids fall back to the tree path.
    fn id(&self) -> Option<&str> {
        None
    }

    fn kind(&self) -> WidgetKind<'_> {
        WidgetKind::Element
    }

    fn is_focusable(&self) -> bool {
        false
    }

    fn handles_keys(&self) -> bool {
        false
    }

    /// Handle a key bubbling up from the focused widget.
    fn on_key(&self, _key: &KeyEvent) -> bool {
        false
    }
}

/// Transparent wrapper flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Tab navigation stays inside while any entry of the trap exists.
    FocusTrap,
    /// Descendants are painted as disabled and are not focusable.
    Disabled,
}

/// Capability set of a widget, resolved once per build.
pub enum WidgetKind<'a> {
    Element,
    Scope(ScopeKind, &'a WidgetRef),
    Floating {
        config: &'a FloatConfig,
        child: &'a WidgetRef,
        /// `None` means always visible.
        visible: Option<&'a Signal<bool>>,
    },
}

// =============================================================================
// Node - the built form
// =============================================================================

/// Visual properties of a node.
#[derive(Debug, Clone, Default)]
pub struct Style {
    pub background: Option<Paint>,
    pub foreground: Option<Paint>,
    pub border: BorderStyle,
    pub border_color: Option<Paint>,
    /// Border color while focused.
    pub focus_border_color: Option<Rgba>,
    pub attrs: Attr,
}

/// How children are arranged and clipped.
#[derive(Debug, Clone, Default)]
pub enum Container {
    /// Children clipped to their own and every ancestor's bounds.
    #[default]
    Plain,
    /// Layered children that may paint outside their own box.
    Stack,
    /// Vertically scrollable viewport.
    ScrollV(ScrollState),
}

/// Paints a node's own content inside its content box.
pub trait Content: Send + Sync {
    fn paint(&self, ctx: &mut RenderContext<'_>, info: &PaintInfo<'_>);
}

/// Per-node facts handed to a [`Content`] painter.
#[derive(Debug, Clone, Copy)]
pub struct PaintInfo<'a> {
    pub id: &'a str,
    pub focused: bool,
    pub disabled: bool,
    pub foreground: Option<&'a Paint>,
    pub attrs: Attr,
}

/// What a widget builds into.
#[derive(Clone, Default)]
pub struct Node {
    pub style: Style,
    pub layout: LayoutStyle,
    /// Content-box measurement for nodes without a native layout description.
    pub measure: Option<MeasureFn>,
    pub container: Container,
    pub content: Option<Arc<dyn Content>>,
    pub children: Vec<WidgetRef>,
    pub on_layout: Option<LayoutCallback>,
}

impl Node {
    /// Layout style with the border thickness folded in.
    pub fn effective_layout(&self) -> LayoutStyle {
        let mut layout = self.layout.clone();
        let t = self.style.border.thickness();
        if t > 0 && layout.border == Edges::ZERO {
            layout.border = Edges::all(t);
        }
        layout
    }

    /// Uses the measurement fallback instead of the layout engine.
    pub fn is_measured_leaf(&self) -> bool {
        self.children.is_empty() && self.measure.is_some()
    }

    pub fn is_scrollable(&self) -> bool {
        matches!(self.container, Container::ScrollV(_))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("measured", &self.measure.is_some())
            .field("container", &self.container)
            .field("content", &self.content.is_some())
            .field("children", &self.children.len())
            .finish()
    }
}
