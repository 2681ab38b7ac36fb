//! Compositor - the paint phase.
//!
//! Walks a [`RenderTree`] and writes cells through [`RenderContext`]s. Per
//! node, in order:
//!
//! 1. record `{widget, id, bounds}` in the registry (parents before children)
//! 2. fill the border box with the background (solid or blended)
//! 3. install a background sampler so text and borders blend against it
//! 4. draw the border
//! 5. paint the node's own content in its content box
//! 6. paint children with the clip rule of the container kind
//! 7. for scroll containers, publish viewport metrics and draw a scrollbar

use std::rc::Rc;

use super::build::RenderTree;
use super::registry::WidgetRegistry;
use super::render_context::{BgSampler, RenderContext};
use crate::color::Paint;
use crate::config::RenderConfig;
use crate::types::{BorderStyle, Rgba};
use crate::widget::{Container, PaintInfo};

/// Paints render trees and records what it painted.
#[derive(Debug)]
pub struct Compositor {
    track: Rgba,
    thumb: Rgba,
    registry: WidgetRegistry,
}

impl Compositor {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            track: config.scrollbar_track,
            thumb: config.scrollbar_thumb,
            registry: WidgetRegistry::new(),
        }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> WidgetRegistry {
        self.registry
    }

    /// Paint a tree whose root sits at its own layout position in `ctx`.
    pub fn paint(&mut self, tree: &RenderTree, ctx: &mut RenderContext<'_>) {
        self.paint_at(tree, ctx, 0, 0);
    }

    /// Paint a tree whose margin box starts at `(dx, dy)` in `ctx`.
    pub fn paint_at(&mut self, tree: &RenderTree, ctx: &mut RenderContext<'_>, dx: i32, dy: i32) {
        let bm = tree.box_model();
        let mut sub = ctx.sub_context(dx + bm.x, dy + bm.y, bm.width, bm.height);
        self.paint_node(tree, &mut sub, None);
    }

    /// `ctx` is the node's border box.
    fn paint_node(&mut self, tree: &RenderTree, ctx: &mut RenderContext<'_>, inherited_fg: Option<&Paint>) {
        let Some(node) = &tree.node else {
            return;
        };
        let bm = *tree.box_model();
        let (w, h) = (ctx.width(), ctx.height());

        self.registry.record(
            tree.widget.clone(),
            tree.id.clone(),
            tree.path.clone(),
            ctx.bounds(),
            ctx.clip(),
        );

        if let Some(bg) = &node.style.background {
            ctx.fill_rect(0, 0, w, h, bg);
            let sampler = background_sampler(bg, ctx);
            ctx.set_inherited_bg(Some(sampler));
        }

        let fg = node.style.foreground.as_ref().or(inherited_fg);

        if node.style.border != BorderStyle::None {
            let focus_color = node
                .style
                .focus_border_color
                .filter(|_| tree.focused)
                .map(Paint::Solid);
            let default = Paint::Solid(Rgba::TERMINAL_DEFAULT);
            let color = focus_color
                .as_ref()
                .or(node.style.border_color.as_ref())
                .or(fg)
                .unwrap_or(&default);
            ctx.draw_border(0, 0, w, h, node.style.border, color);
        }

        let (cx, cy) = bm.content_offset();
        let content = bm.content_box();
        let (cw, ch) = (content.width, content.height);

        if let Some(painter) = &node.content {
            let mut inner = ctx.sub_context(cx, cy, cw, ch);
            let info = PaintInfo {
                id: &tree.id,
                focused: tree.focused,
                disabled: tree.disabled,
                foreground: fg,
                attrs: node.style.attrs,
            };
            painter.paint(&mut inner, &info);
        }

        match &node.container {
            Container::Plain => {
                let mut inner = ctx.sub_context(cx, cy, cw, ch);
                for child in &tree.children {
                    let cb = child.box_model();
                    let mut sub = inner.sub_context(cb.x, cb.y, cb.width, cb.height);
                    self.paint_node(child, &mut sub, fg);
                }
            }
            Container::Stack => {
                let mut inner = ctx.overflow_sub_context(cx, cy, cw, ch);
                for child in &tree.children {
                    let cb = child.box_model();
                    let mut sub = inner.overflow_sub_context(cb.x, cb.y, cb.width, cb.height);
                    self.paint_node(child, &mut sub, fg);
                }
            }
            Container::ScrollV(state) => {
                {
                    let mut view = ctx.scrolled_sub_context(cx, cy, cw, ch, bm.scroll_y);
                    for child in &tree.children {
                        let cb = child.box_model();
                        let mut sub = view.sub_context(cb.x, cb.y, cb.width, cb.height);
                        self.paint_node(child, &mut sub, fg);
                    }
                }

                state.set_metrics(ch, bm.virtual_height);
                if bm.overflows() && cw > 0 {
                    ctx.draw_scrollbar_v(
                        cx + cw - 1,
                        cy,
                        ch,
                        bm.scroll_y,
                        ch,
                        bm.virtual_height,
                        self.track,
                        self.thumb,
                    );
                }
            }
        }
    }
}

/// Background beneath each cell of the box `ctx` covers, once `bg` is painted.
///
/// A solid opaque fill reports its color. Anything else reports the colors
/// the fill actually left in the buffer, so text over a translucent box
/// matches the blank cells around it whatever was painted there before.
/// Cells outside the painted area defer to the enclosing sampler.
fn background_sampler(bg: &Paint, ctx: &RenderContext<'_>) -> BgSampler {
    let below = ctx.inherited_bg();
    let area = ctx.bounds().intersect(&ctx.clip());
    let fallback = move |ax: i32, ay: i32| below.as_ref().and_then(|f| f(ax, ay));

    if let Some(color) = bg.solid().filter(Rgba::is_opaque) {
        return Rc::new(move |ax: i32, ay: i32| {
            if area.contains(ax, ay) {
                Some(color)
            } else {
                fallback(ax, ay)
            }
        });
    }

    let buffer = ctx.buffer();
    let mut painted = Vec::with_capacity((area.width.max(0) * area.height.max(0)) as usize);
    for ay in area.y..area.bottom() {
        for ax in area.x..area.right() {
            painted.push(buffer.get(ax, ay).map(|c| c.bg));
        }
    }

    Rc::new(move |ax: i32, ay: i32| {
        if !area.contains(ax, ay) {
            return fallback(ax, ay);
        }
        let idx = ((ay - area.y) * area.width + (ax - area.x)) as usize;
        painted.get(idx).copied().flatten().or_else(|| fallback(ax, ay))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::layout::{Constraints, Edges, TaffyEngine};
    use crate::pipeline::{BuildContext, Builder};
    use crate::renderer::FrameBuffer;
    use crate::signal::RenderScheduler;
    use crate::state::ScrollState;
    use crate::widget::{Block, Text, Widget, WidgetRef};

    fn render(widget: impl Widget + 'static, w: u16, h: u16) -> (FrameBuffer, WidgetRegistry) {
        let engine = TaffyEngine;
        let mut builder = Builder::new(&engine);
        let root: WidgetRef = Arc::new(widget);
        let tree = builder.build(
            &root,
            &BuildContext::detached(),
            Constraints::tight(w as i32, h as i32),
        );

        let mut buffer = FrameBuffer::new(w, h);
        let mut compositor = Compositor::new(&RenderConfig::default());
        {
            let mut ctx = RenderContext::root(&mut buffer);
            compositor.paint(&tree, &mut ctx);
        }
        (buffer, compositor.into_registry())
    }

    #[test]
    fn test_child_text_inherits_root_background() {
        let root = Block::new()
            .background(Rgba::BLUE)
            .padding(Edges::all(1))
            .child(Text::new("hi").color(Rgba::WHITE));
        let (buf, _) = render(root, 6, 3);

        let cell = buf.get(1, 1).copied().unwrap_or_default();
        assert_eq!(cell.symbol, 'h');
        assert_eq!(cell.bg, Rgba::BLUE);
        assert_eq!(cell.fg, Rgba::WHITE);
    }

    #[test]
    fn test_registry_parent_before_child() {
        let root = Block::new().id("root").child(Block::new().id("leaf").size(2, 1));
        let (_, registry) = render(root, 10, 4);

        let ids: Vec<_> = registry.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "leaf"]);
        assert_eq!(registry.hit_test(0, 0).map(|e| e.id.as_str()), Some("leaf"));
        assert_eq!(registry.hit_test(5, 3).map(|e| e.id.as_str()), Some("root"));
    }

    #[test]
    fn test_border_and_inherited_foreground() {
        let root = Block::new()
            .border(BorderStyle::Single)
            .foreground(Rgba::GREEN)
            .child(Text::new("x"));
        let (buf, _) = render(root, 4, 3);

        assert_eq!(buf.to_lines(), vec!["┌──┐", "│x │", "└──┘"]);
        assert_eq!(buf.get(0, 0).map(|c| c.fg), Some(Rgba::GREEN));
        assert_eq!(buf.get(1, 1).map(|c| c.fg), Some(Rgba::GREEN));
    }

    #[test]
    fn test_translucent_child_blends_over_parent() {
        let root = Block::new()
            .background(Rgba::WHITE)
            .child(
                Block::new()
                    .size(2, 1)
                    .background(Rgba::new(0, 0, 0, 128))
                    .child(Text::new("a")),
            );
        let (buf, _) = render(root, 4, 2);

        let child_bg = buf.get(0, 0).map(|c| c.bg).unwrap_or_default();
        assert_eq!(child_bg, Rgba::rgb(127, 127, 127));
        assert_eq!(buf.get(3, 0).map(|c| c.bg), Some(Rgba::WHITE));
        assert_eq!(buf.get(0, 0).map(|c| c.symbol), Some('a'));
    }

    #[test]
    fn test_stack_children_overflow_their_box() {
        let badge = Block::new().size(1, 1).offset(-2, -1).background(Rgba::RED);
        let root = Block::stack().child(Block::stack().size(4, 2).offset(2, 1).child(badge));
        let (buf, _) = render(root, 8, 4);
        assert_eq!(buf.get(0, 0).map(|c| c.bg), Some(Rgba::RED));
    }

    #[test]
    fn test_translucent_sibling_blends_over_what_lies_beneath() {
        let shade = Block::new()
            .size(6, 1)
            .background(Rgba::new(0, 0, 0, 128))
            .child(Text::new("ab").color(Rgba::WHITE));
        let root = Block::stack()
            .background(Rgba::WHITE)
            .child(Block::new().size(6, 1).background(Rgba::RED))
            .child(shade);
        let (buf, _) = render(root, 8, 2);

        let glyph = buf.get(0, 0).copied().unwrap_or_default();
        let blank = buf.get(4, 0).copied().unwrap_or_default();
        assert_eq!(glyph.symbol, 'a');
        assert_eq!(blank.bg, Rgba::rgb(127, 0, 0));
        assert_eq!(glyph.bg, blank.bg);
        assert_eq!(buf.get(7, 0).map(|c| c.bg), Some(Rgba::WHITE));
    }

    #[test]
    fn test_text_is_clipped_to_its_box() {
        let root = Block::new().child(Block::new().size(3, 1).child(Text::new("abcdef").no_wrap()));
        let (buf, _) = render(root, 8, 2);
        assert_eq!(buf.row_text(0), "abc     ");
    }

    #[test]
    fn test_scroll_container_clips_and_draws_scrollbar() {
        let scheduler = RenderScheduler::new();
        let scroll = ScrollState::new(&scheduler);
        let rows = (0..6).map(|i| Text::new(format!("row{i}")).into_ref());
        let root = Block::scroll(scroll.clone()).size(6, 3).children(rows);
        let (buf, _) = render(root, 6, 3);

        assert_eq!(scroll.viewport_height(), 3);
        assert_eq!(scroll.content_height(), 6);
        assert_eq!(&buf.row_text(0)[..4], "row0");
        assert_eq!(&buf.row_text(2)[..4], "row2");
        assert_eq!(buf.get(5, 0).map(|c| c.symbol), Some('█'));

        assert!(scroll.scroll_by(2));
        let rows = (0..6).map(|i| Text::new(format!("row{i}")).into_ref());
        let root = Block::scroll(scroll.clone()).size(6, 3).children(rows);
        let (buf, _) = render(root, 6, 3);
        assert_eq!(&buf.row_text(0)[..4], "row2");
        assert_eq!(&buf.row_text(2)[..4], "row4");
    }
}
