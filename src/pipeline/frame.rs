//! Pipeline - one frame, end to end.
//!
//! ```text
//! take pending request -> drain render causes
//!   -> build + layout the root          (Builder)
//!   -> paint the main tree              (Compositor)
//!   -> size, place and paint each float (float pass)
//!   -> hand the tab order to the focus manager
//! ```
//!
//! Every frame rebuilds from the root. Dirty observers only explain why a
//! frame ran; they do not narrow what is rebuilt.

use std::collections::VecDeque;
use std::sync::Arc;

use super::build::Builder;
use super::compositor::Compositor;
use super::context::BuildContext;
use super::float::{FloatLayer, resolve_rect};
use super::registry::WidgetRegistry;
use super::render_context::RenderContext;
use crate::config::RenderConfig;
use crate::layout::{Constraints, LayoutEngine, TaffyEngine};
use crate::renderer::FrameBuffer;
use crate::signal::{ObserverPool, RenderScheduler};
use crate::state::{Focusable, SharedFocus};
use crate::widget::{ScopeKind, WidgetRef};

/// Everything one frame produced.
#[derive(Debug)]
pub struct Frame {
    pub buffer: FrameBuffer,
    pub registry: WidgetRegistry,
    pub floats: FloatLayer,
    /// Tab order, main tree first, then floats in paint order.
    pub focusables: Vec<Focusable>,
    pub auto_focus: Option<String>,
    /// Paths whose signal reads changed since the previous frame.
    pub dirty: Vec<String>,
    /// Elements built, main tree and floats.
    pub nodes: usize,
}

/// Long-lived frame driver.
pub struct Pipeline {
    engine: Arc<dyn LayoutEngine>,
    scheduler: RenderScheduler,
    observers: Arc<ObserverPool>,
    focus: Option<SharedFocus>,
    config: RenderConfig,
}

impl Pipeline {
    pub fn new(scheduler: &RenderScheduler) -> Self {
        Self {
            engine: Arc::new(TaffyEngine),
            scheduler: scheduler.clone(),
            observers: Arc::new(ObserverPool::new()),
            focus: None,
            config: RenderConfig::default(),
        }
    }

    pub fn with_engine(mut self, engine: impl LayoutEngine + 'static) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    pub fn with_focus(mut self, focus: SharedFocus) -> Self {
        self.focus = Some(focus);
        self
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scheduler(&self) -> &RenderScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn observers(&self) -> &ObserverPool {
        &self.observers
    }

    pub fn focus(&self) -> Option<&SharedFocus> {
        self.focus.as_ref()
    }

    /// Build, lay out and paint `root` onto a fresh `width` x `height` buffer.
    pub fn render(&self, root: &WidgetRef, width: u16, height: u16) -> Frame {
        self.scheduler.take_pending();
        let dirty = self.observers.drain_dirty();
        if !dirty.is_empty() {
            log::trace!("render causes: {}", dirty.join(", "));
        }

        let screen = (i32::from(width), i32::from(height));
        let cx = BuildContext::root(self.observers.clone(), self.focus.clone(), screen);
        let mut builder = Builder::new(self.engine.as_ref());
        let tree = builder.build(root, &cx, Constraints::tight(screen.0, screen.1));

        let mut buffer = FrameBuffer::new(width, height);
        let mut compositor = Compositor::new(&self.config);
        let floats = {
            let mut ctx = RenderContext::root(&mut buffer);
            compositor.paint(&tree, &mut ctx);
            self.paint_floats(&mut builder, &mut compositor, &mut ctx, screen)
        };

        let summary = builder.finish();
        self.observers.retain(&summary.seen);

        log::debug!(
            "frame {}x{}: {} nodes, {} floats, {} focusables, {} dirty",
            width,
            height,
            summary.built,
            floats.len(),
            summary.focusables.len(),
            dirty.len()
        );

        if let Some(focus) = &self.focus {
            focus.update_focusables(summary.focusables.clone(), summary.auto_focus.clone());
        }

        Frame {
            buffer,
            registry: compositor.into_registry(),
            floats,
            focusables: summary.focusables,
            auto_focus: summary.auto_focus,
            dirty,
            nodes: summary.built,
        }
    }

    /// Size, place and paint queued floats in order. Floats queued while a
    /// float builds join the end of the queue.
    fn paint_floats(
        &self,
        builder: &mut Builder<'_>,
        compositor: &mut Compositor,
        ctx: &mut RenderContext<'_>,
        screen: (i32, i32),
    ) -> FloatLayer {
        let mut layer = FloatLayer::new();
        let mut queue: VecDeque<_> = builder.take_floats().into();

        while let Some(mut entry) = queue.pop_front() {
            let modal = entry.config.modal;
            let cx = if modal {
                entry.cx.child(0).scoped(ScopeKind::FocusTrap)
            } else {
                entry.cx.child(0)
            };

            let capturing = modal && builder.begin_modal();
            let tree = builder.build(
                &entry.child,
                &cx,
                Constraints::loose(screen.0, screen.1),
            );
            if capturing {
                builder.end_modal();
            }
            queue.extend(builder.take_floats());

            let size = tree.box_model().margin_box();
            let anchor = entry.config.anchor_id().and_then(|id| {
                let bounds = compositor.registry().bounds_of(id);
                if bounds.is_none() {
                    log::warn!("float {}: anchor {id:?} not painted, centering", entry.path());
                }
                bounds
            });
            let rect = resolve_rect(&entry.config, (size.width, size.height), anchor, screen);

            if modal {
                ctx.draw_backdrop(entry.config.backdrop.unwrap_or(self.config.modal_backdrop));
            }
            compositor.paint_at(&tree, ctx, rect.x, rect.y);

            entry.rect = Some(rect);
            layer.push(entry);
        }

        layer
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("observers", &self.observers.len())
            .field("focus", &self.focus.is_some())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Edges;
    use crate::pipeline::{AnchorPoint, FloatConfig};
    use crate::signal::Signal;
    use crate::state::{FocusManager, FocusState};
    use crate::types::{Rect, Rgba};
    use crate::widget::{Block, Floating, Text};

    #[test]
    fn test_render_paints_root() {
        let scheduler = RenderScheduler::new();
        let pipeline = Pipeline::new(&scheduler);
        let root = Block::new()
            .background(Rgba::BLUE)
            .child(Text::new("hello"))
            .into_ref();

        let frame = pipeline.render(&root, 10, 2);
        assert_eq!(&frame.buffer.row_text(0)[..5], "hello");
        assert_eq!(frame.buffer.get(9, 1).map(|c| c.bg), Some(Rgba::BLUE));
        assert_eq!(frame.nodes, 2);
        assert!(frame.floats.is_empty());
    }

    #[test]
    fn test_render_clears_pending_and_reports_causes() {
        let scheduler = RenderScheduler::new();
        let pipeline = Pipeline::new(&scheduler);
        let label = Signal::new(String::from("a"), &scheduler);
        let root = Block::new().child(Text::dynamic(label.clone())).into_ref();

        let first = pipeline.render(&root, 4, 1);
        assert!(first.dirty.is_empty());

        label.set(String::from("b"));
        assert!(scheduler.is_pending());
        let second = pipeline.render(&root, 4, 1);
        assert!(!scheduler.is_pending());
        assert_eq!(second.dirty, vec![String::from("0.0")]);
        assert_eq!(&second.buffer.row_text(0)[..1], "b");
    }

    #[test]
    fn test_anchored_float_sits_below_anchor() {
        let scheduler = RenderScheduler::new();
        let pipeline = Pipeline::new(&scheduler);
        let menu = Floating::new(
            FloatConfig::anchored("button", AnchorPoint::BottomLeft),
            Text::new("item"),
        );
        let root = Block::new()
            .child(Block::new().id("button").size(6, 1).margin(Edges::new(1, 0, 0, 2)))
            .child(menu)
            .into_ref();

        let frame = pipeline.render(&root, 20, 6);
        let top = frame.floats.top_float().and_then(|f| f.rect);
        assert_eq!(top, Some(Rect::new(2, 2, 4, 1)));
        assert_eq!(&frame.buffer.row_text(2)[2..6], "item");
    }

    #[test]
    fn test_missing_anchor_centers_float() {
        let scheduler = RenderScheduler::new();
        let pipeline = Pipeline::new(&scheduler);
        let root = Block::new()
            .child(Floating::new(
                FloatConfig::anchored("nowhere", AnchorPoint::TopLeft),
                Text::new("ab"),
            ))
            .into_ref();

        let frame = pipeline.render(&root, 10, 5);
        let rect = frame.floats.top_float().and_then(|f| f.rect);
        assert_eq!(rect, Some(Rect::new(4, 2, 2, 1)));
    }

    #[test]
    fn test_modal_auto_focus_reaches_manager() {
        let scheduler = RenderScheduler::new();
        let focus = Arc::new(FocusState::new(&scheduler));
        let pipeline = Pipeline::new(&scheduler).with_focus(focus.clone());

        let dialog = Block::new()
            .child(Block::new().id("yes").size(3, 1).focusable())
            .child(Block::new().id("no").size(3, 1).focusable());
        let root = Block::new()
            .child(Block::new().id("behind").size(3, 1).focusable())
            .child(Floating::new(FloatConfig::centered().modal(), dialog))
            .into_ref();

        let frame = pipeline.render(&root, 20, 10);
        assert_eq!(frame.auto_focus.as_deref(), Some("yes"));
        assert_eq!(frame.focusables.len(), 3);
        assert_eq!(focus.focused().as_deref(), Some("yes"));
        assert_eq!(focus.candidates(), vec!["yes".to_string(), "no".to_string()]);
        assert!(frame.floats.has_modal());
    }
}
