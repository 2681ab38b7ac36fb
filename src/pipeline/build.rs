//! Build -> layout phase.
//!
//! [`Builder::build`] turns a widget into a [`RenderTree`] in two passes.
//! The build pass builds every element once, gives it an identity and
//! collects it for focus if focusable. The layout pass describes the built
//! subtree to the engine once and hands every node its border box, so each
//! child ends up sized exactly as a tight layout at that size would give.
//!
//! Scopes are invisible here: they neither take geometry nor an identity, and
//! only change the context their child builds with. `Floating` widgets queue
//! an entry for the float pass and stand in the tree as empty placeholders.

use std::collections::HashSet;

use super::context::BuildContext;
use super::float::{FloatCollector, FloatEntry};
use crate::layout::{
    BoxModel, ComputedLayout, Constraints, LayoutEngine, LayoutNode, LayoutStyle, MeasureFn,
    NodeKind,
};
use crate::state::Focusable;
use crate::widget::{Container, Node, WidgetKind, WidgetRef};

// =============================================================================
// RenderTree
// =============================================================================

/// A built widget paired with its geometry, for one frame.
#[derive(Clone)]
pub struct RenderTree {
    pub widget: WidgetRef,
    /// Explicit id, or the tree path when the widget has none.
    pub id: String,
    pub path: String,
    /// `None` for float placeholders.
    pub node: Option<Node>,
    /// Own geometry. Each child carries its own.
    pub layout: ComputedLayout,
    pub children: Vec<RenderTree>,
    pub focused: bool,
    pub disabled: bool,
}

impl RenderTree {
    fn placeholder(widget: WidgetRef, cx: &BuildContext) -> Self {
        Self {
            widget,
            id: cx.path().to_string(),
            path: cx.path().to_string(),
            node: None,
            layout: ComputedLayout::default(),
            children: Vec::new(),
            focused: false,
            disabled: cx.is_disabled(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.node.is_none()
    }

    pub fn box_model(&self) -> &BoxModel {
        &self.layout.box_model
    }

    /// Number of built (non-placeholder) nodes in this subtree.
    pub fn node_count(&self) -> usize {
        let own = usize::from(!self.is_placeholder());
        own + self.children.iter().map(RenderTree::node_count).sum::<usize>()
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&RenderTree> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

impl std::fmt::Debug for RenderTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTree")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("placeholder", &self.is_placeholder())
            .field("box_model", &self.layout.box_model)
            .field("focused", &self.focused)
            .field("children", &self.children)
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

#[derive(Debug, Default)]
struct FocusCollector {
    list: Vec<Focusable>,
    /// Set while the first modal of the frame builds.
    capturing: bool,
    auto: Option<String>,
    modal_seen: bool,
}

/// What one frame's builds collected besides the trees.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Tab order, in traversal order.
    pub focusables: Vec<Focusable>,
    /// First focusable inside the first modal built.
    pub auto_focus: Option<String>,
    /// Paths of every node built, placeholders included.
    pub seen: HashSet<String>,
    pub built: usize,
}

/// Frame-scoped build state: the layout engine, focus list and float queue.
pub struct Builder<'e> {
    engine: &'e dyn LayoutEngine,
    focus: FocusCollector,
    floats: FloatCollector,
    seen: HashSet<String>,
    built: usize,
}

impl<'e> Builder<'e> {
    pub fn new(engine: &'e dyn LayoutEngine) -> Self {
        Self {
            engine,
            focus: FocusCollector::default(),
            floats: FloatCollector::default(),
            seen: HashSet::new(),
            built: 0,
        }
    }

    /// Build `widget` and its descendants, then lay the result out once.
    ///
    /// Every element builds exactly once. The engine solves the whole subtree
    /// in one pass, so each child already holds the geometry a tight re-layout
    /// at its own size would produce.
    pub fn build(
        &mut self,
        widget: &WidgetRef,
        cx: &BuildContext,
        constraints: Constraints,
    ) -> RenderTree {
        let mut tree = self.grow(widget, cx);
        let layout = match &tree.node {
            None => ComputedLayout::default(),
            Some(node) => match &node.measure {
                Some(measure) if node.is_measured_leaf() => {
                    measured_leaf(&node.effective_layout(), measure, constraints)
                }
                _ => self.engine.layout(&describe(&tree), constraints),
            },
        };
        place(&mut tree, layout);
        tree
    }

    /// Build pass: identity, built node, focus and floats for the subtree.
    /// Geometry is left empty apart from the requested scroll offset.
    fn grow(&mut self, widget: &WidgetRef, cx: &BuildContext) -> RenderTree {
        self.seen.insert(cx.path().to_string());

        match widget.kind() {
            WidgetKind::Element => {}
            WidgetKind::Scope(kind, child) => {
                return self.grow(child, &cx.scoped(kind));
            }
            WidgetKind::Floating {
                config,
                child,
                visible,
            } => {
                if visible.is_none_or(|v| v.get(cx)) {
                    self.floats.push(config.clone(), child.clone(), cx.clone());
                }
                return RenderTree::placeholder(widget.clone(), cx);
            }
        }

        self.built += 1;

        let id = widget
            .id()
            .filter(|id| !id.is_empty())
            .map_or_else(|| cx.path().to_string(), str::to_string);
        let node = widget.build(cx);

        let focusable = widget.is_focusable() && !cx.is_disabled();
        let focused = focusable && cx.is_focused(&id);
        if focusable {
            self.collect_focus(widget, &id, cx);
        }

        let mut layout = ComputedLayout::default();
        if let Container::ScrollV(state) = &node.container {
            layout.box_model.scroll_y = state.offset(cx);
        }

        let parent_cx = if widget.handles_keys() {
            cx.with_handler(widget.clone())
        } else {
            cx.clone()
        };

        let mut children = Vec::with_capacity(node.children.len());
        for (i, child) in node.children.iter().enumerate() {
            children.push(self.grow(child, &parent_cx.child(i)));
        }

        RenderTree {
            widget: widget.clone(),
            id,
            path: cx.path().to_string(),
            node: Some(node),
            layout,
            children,
            focused,
            disabled: cx.is_disabled(),
        }
    }

    fn collect_focus(&mut self, widget: &WidgetRef, id: &str, cx: &BuildContext) {
        let mut handlers = Vec::with_capacity(cx.handlers().len() + 1);
        if widget.handles_keys() {
            handlers.push(widget.clone());
        }
        handlers.extend(cx.handlers().iter().cloned());

        if self.focus.capturing && self.focus.auto.is_none() {
            self.focus.auto = Some(id.to_string());
        }
        self.focus.list.push(Focusable {
            id: id.to_string(),
            trap: cx.trap().map(str::to_string),
            handlers,
        });
    }

    /// Start building a modal. Only the first modal of a frame captures an
    /// auto-focus target; returns whether this one does.
    pub fn begin_modal(&mut self) -> bool {
        if self.focus.modal_seen {
            return false;
        }
        self.focus.modal_seen = true;
        self.focus.capturing = true;
        true
    }

    pub fn end_modal(&mut self) {
        self.focus.capturing = false;
    }

    /// Floats queued since the last call.
    pub fn take_floats(&mut self) -> Vec<FloatEntry> {
        self.floats.take()
    }

    pub fn focusables(&self) -> &[Focusable] {
        &self.focus.list
    }

    pub fn finish(self) -> BuildSummary {
        BuildSummary {
            focusables: self.focus.list,
            auto_focus: self.focus.auto,
            seen: self.seen,
            built: self.built,
        }
    }
}

// =============================================================================
// Layout description
// =============================================================================

/// Content-box measurement plus border and padding, as a border box.
fn measured_leaf(style: &LayoutStyle, measure: &MeasureFn, constraints: Constraints) -> ComputedLayout {
    let insets = style.border.add(&style.padding);
    let (content_w, content_h) = measure(constraints.deflate(&insets));
    let (width, height) = constraints.constrain(
        content_w + insets.horizontal(),
        content_h + insets.vertical(),
    );

    ComputedLayout::leaf(BoxModel {
        x: style.margin.left,
        y: style.margin.top,
        width,
        height,
        margin: style.margin,
        border: style.border,
        padding: style.padding,
        scroll_y: 0,
        virtual_height: content_h,
    })
}

/// Layout description of a built subtree. Float placeholders take no space.
fn describe(tree: &RenderTree) -> LayoutNode {
    let Some(node) = &tree.node else {
        return LayoutNode::hidden();
    };
    let kind = match node.container {
        Container::Plain => NodeKind::Plain,
        Container::Stack => NodeKind::Stack,
        Container::ScrollV(_) => NodeKind::Scroll,
    };

    let mut described = LayoutNode::new(node.effective_layout()).with_kind(kind);
    if let (true, Some(measure)) = (node.is_measured_leaf(), &node.measure) {
        described = described.with_measure(measure.clone());
    }
    described.with_children(tree.children.iter().map(describe).collect())
}

/// Hand each node its geometry, parents before children. Widget children
/// without a matching layout child are dropped, and extra layout children
/// are ignored.
fn place(tree: &mut RenderTree, layout: ComputedLayout) {
    let ComputedLayout {
        mut box_model,
        children: child_layouts,
    } = layout;

    if let Some(node) = &tree.node {
        if node.is_scrollable() {
            let requested = tree.layout.box_model.scroll_y;
            box_model.scroll_y = requested.clamp(0, box_model.max_scroll());
        }
        if let Some(on_layout) = &node.on_layout {
            on_layout(&box_model);
        }
    }
    tree.layout = ComputedLayout::leaf(box_model);

    tree.children.truncate(child_layouts.len());
    for (child, geometry) in tree.children.iter_mut().zip(child_layouts) {
        place(child, geometry);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    use super::*;
    use crate::layout::{Dimension, Edges, TaffyEngine};
    use crate::pipeline::FloatConfig;
    use crate::signal::{ObserverPool, RenderScheduler, Signal};
    use crate::state::{FocusManager, FocusState, ScrollState, SharedFocus};
    use crate::widget::{Block, Disabled, Floating, FocusTrap, Text, Widget};

    fn build(widget: impl Widget + 'static, w: i32, h: i32) -> (RenderTree, BuildSummary) {
        let engine = TaffyEngine;
        let mut builder = Builder::new(&engine);
        let root: WidgetRef = Arc::new(widget);
        let tree = builder.build(&root, &BuildContext::detached(), Constraints::tight(w, h));
        (tree, builder.finish())
    }

    #[test]
    fn test_measured_leaf_adds_padding_and_border() {
        let style = LayoutStyle {
            padding: Edges::all(1),
            border: Edges::all(1),
            margin: Edges::new(2, 0, 0, 3),
            ..LayoutStyle::default()
        };
        let measure: MeasureFn = Arc::new(|c: Constraints| (5.min(c.max_width), 1));
        let layout = measured_leaf(&style, &measure, Constraints::loose(40, 10));
        let bm = layout.box_model;
        assert_eq!((bm.width, bm.height), (9, 5));
        assert_eq!((bm.x, bm.y), (3, 2));
        assert_eq!(bm.content_box().width, 5);
    }

    struct Counted {
        builds: Arc<AtomicUsize>,
        inner: Text,
    }

    impl Widget for Counted {
        fn build(&self, cx: &BuildContext) -> Node {
            self.builds.fetch_add(1, Ordering::SeqCst);
            self.inner.build(cx)
        }
    }

    struct CountingEngine {
        calls: AtomicUsize,
    }

    impl LayoutEngine for CountingEngine {
        fn layout(&self, node: &LayoutNode, constraints: Constraints) -> ComputedLayout {
            self.calls.fetch_add(1, Ordering::SeqCst);
            TaffyEngine.layout(node, constraints)
        }
    }

    /// Answers every layout with a fixed number of leaf children.
    struct FixedChildren(usize);

    impl LayoutEngine for FixedChildren {
        fn layout(&self, _node: &LayoutNode, constraints: Constraints) -> ComputedLayout {
            ComputedLayout {
                box_model: BoxModel::sized(constraints.max_width, constraints.max_height),
                children: vec![ComputedLayout::leaf(BoxModel::sized(1, 1)); self.0],
            }
        }
    }

    fn build_with(engine: &dyn LayoutEngine, widget: impl Widget + 'static) -> RenderTree {
        let mut builder = Builder::new(engine);
        let root: WidgetRef = Arc::new(widget);
        builder.build(&root, &BuildContext::detached(), Constraints::tight(20, 5))
    }

    #[test]
    fn test_each_widget_builds_once_per_frame() {
        for depth in [1, 5, 10, 20] {
            let builds = Arc::new(AtomicUsize::new(0));
            let mut widget: WidgetRef = Arc::new(Counted {
                builds: builds.clone(),
                inner: Text::new("leaf"),
            });
            for _ in 0..depth {
                widget = Block::new().child_ref(widget).into_ref();
            }

            let engine = CountingEngine {
                calls: AtomicUsize::new(0),
            };
            let mut builder = Builder::new(&engine);
            let tree = builder.build(&widget, &BuildContext::detached(), Constraints::tight(20, 5));

            assert_eq!(builds.load(Ordering::SeqCst), 1, "depth {depth}");
            assert_eq!(engine.calls.load(Ordering::SeqCst), 1, "depth {depth}");
            assert_eq!(builder.finish().built, depth + 1);
            assert_eq!(tree.node_count(), depth + 1);
        }
    }

    #[test]
    fn test_nested_geometry_from_one_layout_pass() {
        let root = Block::new()
            .padding(Edges::all(1))
            .child(Block::row().gap(1).child(Block::new().size(2, 1)).child(Text::new("abc")));
        let (tree, _) = build(root, 12, 4);

        let row = &tree.children[0];
        assert_eq!((row.box_model().x, row.box_model().y), (0, 0));
        assert_eq!(row.box_model().width, 10);
        let text = row.children[1].box_model();
        assert_eq!((text.x, text.width, text.height), (3, 3, 1));
    }

    #[test]
    fn test_fewer_layout_children_truncate_tree() {
        let root = Block::new()
            .child(Block::new().size(2, 1))
            .child(Block::new().size(2, 1))
            .child(Block::new().size(2, 1));
        let tree = build_with(&FixedChildren(1), root);
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].box_model().width, 1);
    }

    #[test]
    fn test_extra_layout_children_are_ignored() {
        let root = Block::new()
            .child(Block::new().size(2, 1))
            .child(Block::new().size(2, 1))
            .child(Block::new().size(2, 1));
        let tree = build_with(&FixedChildren(5), root);
        assert_eq!(tree.children.len(), 3);

        let tree = build_with(&FixedChildren(2), Block::new().size(4, 4));
        assert!(tree.children.is_empty());
        assert_eq!(tree.box_model().width, 20);
    }

    #[test]
    fn test_paths_and_explicit_ids() {
        let root = Block::new()
            .child(Text::new("a"))
            .child(Block::new().id("named").child(Text::new("b")));
        let (tree, summary) = build(root, 20, 5);

        assert_eq!(tree.id, "0");
        assert_eq!(tree.children[0].id, "0.0");
        assert_eq!(tree.children[1].id, "named");
        assert_eq!(tree.children[1].path, "0.1");
        assert_eq!(tree.children[1].children[0].id, "0.1.0");
        assert_eq!(tree.node_count(), 4);
        assert_eq!(summary.built, 4);
        assert!(summary.seen.contains("0.1.0"));
    }

    #[test]
    fn test_children_get_parent_geometry() {
        let root = Block::row()
            .gap(1)
            .child(Block::new().size(4, 2))
            .child(Block::new().size(3, 1));
        let (tree, _) = build(root, 20, 5);

        let a = tree.children[0].box_model();
        let b = tree.children[1].box_model();
        assert_eq!((a.x, a.width, a.height), (0, 4, 2));
        assert_eq!((b.x, b.width), (5, 3));
    }

    #[test]
    fn test_scopes_are_transparent() {
        let root = Block::new().child(FocusTrap::new(Disabled::new(Block::new().size(2, 2))));
        let (tree, summary) = build(root, 10, 10);

        assert_eq!(tree.children.len(), 1);
        let inner = &tree.children[0];
        assert_eq!(inner.path, "0.0");
        assert!(inner.disabled);
        assert_eq!(inner.box_model().width, 2);
        assert_eq!(summary.built, 2);
    }

    #[test]
    fn test_focus_collection_and_disabled() {
        let root = Block::new()
            .child(Block::new().id("a").focusable())
            .child(Disabled::new(Block::new().id("b").focusable()))
            .child(FocusTrap::new(Block::new().id("c").focusable()));
        let (_, summary) = build(root, 10, 10);

        let ids: Vec<_> = summary.focusables.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(summary.focusables[0].trap, None);
        assert_eq!(summary.focusables[1].trap.as_deref(), Some("0.2"));
    }

    #[test]
    fn test_handlers_chain() {
        let root = Block::new()
            .on_key(|_| true)
            .child(Block::new().id("leaf").focusable().on_key(|_| false));
        let (_, summary) = build(root, 10, 10);
        assert_eq!(summary.focusables[0].handlers.len(), 2);
    }

    #[test]
    fn test_floats_queue_and_leave_placeholder() {
        let scheduler = RenderScheduler::new();
        let shown = Signal::new(false, &scheduler);
        let root = Block::new()
            .child(Block::new().size(5, 1))
            .child(
                Floating::new(FloatConfig::centered(), Text::new("popup"))
                    .visible_when(shown.clone()),
            )
            .child(Floating::new(FloatConfig::centered(), Text::new("always")));

        let engine = TaffyEngine;
        let mut builder = Builder::new(&engine);
        let root: WidgetRef = Arc::new(root);
        let tree = builder.build(&root, &BuildContext::detached(), Constraints::tight(20, 10));

        assert!(tree.children[1].is_placeholder());
        assert_eq!(tree.children[1].box_model().height, 0);
        assert_eq!(builder.take_floats().len(), 1);
        assert_eq!(tree.node_count(), 2);

        shown.set(true);
        let _ = builder.build(&root, &BuildContext::detached(), Constraints::tight(20, 10));
        let floats = builder.take_floats();
        assert_eq!(floats.len(), 2);
        assert_eq!(floats[0].path(), "0.1");
    }

    #[test]
    fn test_modal_captures_first_focusable() {
        let engine = TaffyEngine;
        let mut builder = Builder::new(&engine);
        let modal: WidgetRef = Arc::new(
            Block::new()
                .child(Text::new("title"))
                .child(Block::new().id("ok").focusable())
                .child(Block::new().id("cancel").focusable()),
        );

        assert!(builder.begin_modal());
        let _ = builder.build(&modal, &BuildContext::detached(), Constraints::loose(40, 10));
        builder.end_modal();
        assert!(!builder.begin_modal());

        assert_eq!(builder.finish().auto_focus.as_deref(), Some("ok"));
    }

    #[test]
    fn test_layout_callback_sees_size() {
        let seen = Arc::new(AtomicI32::new(-1));
        let sink = seen.clone();
        let root = Block::new().on_layout(move |bm| sink.store(bm.width, Ordering::SeqCst));
        let _ = build(root, 33, 4);
        assert_eq!(seen.load(Ordering::SeqCst), 33);
    }

    #[test]
    fn test_scroll_offset_clamped_to_content() {
        let scheduler = RenderScheduler::new();
        let scroll = ScrollState::new(&scheduler);
        let rows = (0..6).map(|i| {
            Block::new()
                .id(format!("row{i}"))
                .height(Dimension::Cells(1))
                .into_ref()
        });
        let root = Block::scroll(scroll.clone()).size(10, 3).children(rows);

        let (tree, _) = build(root, 10, 3);
        let bm = tree.box_model();
        assert_eq!(bm.virtual_height, 6);
        assert_eq!(bm.max_scroll(), 3);
        assert_eq!(bm.scroll_y, 0);
        assert_eq!(tree.find("row5").map(|t| t.box_model().y), Some(5));
    }

    #[test]
    fn test_focused_flag_from_manager() {
        let scheduler = RenderScheduler::new();
        let focus = Arc::new(FocusState::new(&scheduler));
        focus.update_focusables(
            vec![Focusable {
                id: "btn".into(),
                trap: None,
                handlers: Vec::new(),
            }],
            None,
        );
        assert!(focus.focus("btn"));

        let shared: SharedFocus = focus.clone();
        let cx = BuildContext::root(Arc::new(ObserverPool::new()), Some(shared), (10, 10));
        let engine = TaffyEngine;
        let mut builder = Builder::new(&engine);
        let root: WidgetRef = Arc::new(Block::new().child(Block::new().id("btn").focusable()));
        let tree = builder.build(&root, &cx, Constraints::tight(10, 10));

        assert!(tree.children[0].focused);
        assert!(!tree.focused);
    }
}
