//! RenderContext - a clipped cursor over the frame buffer.
//!
//! A context carries an absolute origin, an available size, an absolute clip
//! rectangle and a sampler for the background beneath each cell. Drawing
//! coordinates are local to the origin; every write checks the clip and is
//! silently dropped outside it.
//!
//! Child contexts come in three flavors:
//! - [`RenderContext::sub_context`] clips to the child's own box and every ancestor's
//! - [`RenderContext::overflow_sub_context`] keeps the parent's clip
//! - [`RenderContext::scrolled_sub_context`] clips to a viewport and shifts content up

use std::rc::Rc;

use crate::color::{Paint, blend};
use crate::layout::char_width;
use crate::renderer::FrameBuffer;
use crate::types::{Attr, BorderStyle, Cell, Rect, Rgba};

/// Background beneath an absolute cell, if known.
pub type BgSampler = Rc<dyn Fn(i32, i32) -> Option<Rgba>>;

/// Clipped drawing surface for one subtree.
pub struct RenderContext<'a> {
    buffer: &'a mut FrameBuffer,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    clip: Rect,
    inherited_bg: Option<BgSampler>,
}

impl<'a> RenderContext<'a> {
    /// Whole-buffer context at the origin.
    pub fn root(buffer: &'a mut FrameBuffer) -> Self {
        let bounds = buffer.bounds();
        Self {
            buffer,
            x: 0,
            y: 0,
            width: bounds.width,
            height: bounds.height,
            clip: bounds,
            inherited_bg: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Absolute `{origin, size}`.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn buffer(&self) -> &FrameBuffer {
        self.buffer
    }

    pub fn inherited_bg(&self) -> Option<BgSampler> {
        self.inherited_bg.clone()
    }

    pub fn set_inherited_bg(&mut self, sampler: Option<BgSampler>) {
        self.inherited_bg = sampler;
    }

    /// Background beneath absolute cell `(ax, ay)`, if any ancestor knows it.
    pub fn inherited_bg_at(&self, ax: i32, ay: i32) -> Option<Rgba> {
        self.inherited_bg.as_ref().and_then(|f| f(ax, ay))
    }

    // =========================================================================
    // Child contexts
    // =========================================================================

    fn derive(&mut self, x: i32, y: i32, width: i32, height: i32, clip: Rect) -> RenderContext<'_> {
        RenderContext {
            buffer: &mut *self.buffer,
            x,
            y,
            width,
            height,
            clip,
            inherited_bg: self.inherited_bg.clone(),
        }
    }

    /// Child at `(dx, dy)`, clipped to its own box and this context's clip.
    pub fn sub_context(&mut self, dx: i32, dy: i32, width: i32, height: i32) -> RenderContext<'_> {
        let (width, height) = (width.max(0), height.max(0));
        let (x, y) = (self.x + dx, self.y + dy);
        let clip = self.clip.intersect(&Rect::new(x, y, width, height));
        self.derive(x, y, width, height, clip)
    }

    /// Child at `(dx, dy)` that may paint anywhere this context may.
    pub fn overflow_sub_context(
        &mut self,
        dx: i32,
        dy: i32,
        width: i32,
        height: i32,
    ) -> RenderContext<'_> {
        let (width, height) = (width.max(0), height.max(0));
        let (x, y) = (self.x + dx, self.y + dy);
        let clip = self.clip;
        self.derive(x, y, width, height, clip)
    }

    /// Viewport at `(dx, dy)` whose content origin is shifted up by `scroll_y`.
    ///
    /// The clip is the unshifted viewport, so content scrolled past either edge
    /// is dropped.
    pub fn scrolled_sub_context(
        &mut self,
        dx: i32,
        dy: i32,
        width: i32,
        height: i32,
        scroll_y: i32,
    ) -> RenderContext<'_> {
        let (width, height) = (width.max(0), height.max(0));
        let viewport = Rect::new(self.x + dx, self.y + dy, width, height);
        let clip = self.clip.intersect(&viewport);
        self.derive(viewport.x, viewport.y - scroll_y, width, height, clip)
    }

    // =========================================================================
    // Cell access
    // =========================================================================

    /// The cell at absolute `(ax, ay)` if it is inside the clip and the buffer.
    fn cell_mut(&mut self, ax: i32, ay: i32) -> Option<&mut Cell> {
        if !self.clip.contains(ax, ay) {
            return None;
        }
        self.buffer.get_mut(ax, ay)
    }

    /// Write one glyph at absolute `(ax, ay)` over the inherited background.
    fn put_glyph(&mut self, ax: i32, ay: i32, symbol: char, fg: Rgba, attrs: Attr) -> bool {
        let inherited = self.inherited_bg_at(ax, ay);
        let Some(cell) = self.cell_mut(ax, ay) else {
            return false;
        };
        let bg = inherited.unwrap_or(cell.bg);
        let fg = blend(Some(fg), Some(bg), None).unwrap_or(fg);
        *cell = Cell {
            symbol,
            fg,
            bg,
            attrs,
        };
        true
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Fill a local rectangle with a background.
    ///
    /// Opaque colors replace the cells. Translucent colors blend over what is
    /// already there and leave glyphs visible.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, paint: &Paint) {
        let area = Rect::new(self.x + x, self.y + y, width.max(0), height.max(0));
        let visible = area.intersect(&self.clip);
        if visible.is_empty() {
            return;
        }

        for ay in visible.y..visible.bottom() {
            for ax in visible.x..visible.right() {
                let color = paint.sample(area.width, area.height, ax - area.x, ay - area.y);
                let Some(cell) = self.buffer.get_mut(ax, ay) else {
                    continue;
                };
                if color.is_opaque() {
                    *cell = Cell {
                        symbol: ' ',
                        fg: cell.fg,
                        bg: color,
                        attrs: Attr::NONE,
                    };
                } else if !color.is_transparent() {
                    cell.bg = blend(Some(color), None, Some(cell.bg)).unwrap_or(color);
                    if !cell.fg.is_terminal_default() {
                        cell.fg = Rgba::blend(color, cell.fg);
                    }
                }
            }
        }
    }

    /// Blend `overlay` over every cell in the clip, dimming existing text.
    pub fn draw_backdrop(&mut self, overlay: Rgba) {
        let clip = self.clip;
        for ay in clip.y..clip.bottom() {
            for ax in clip.x..clip.right() {
                let Some(cell) = self.buffer.get_mut(ax, ay) else {
                    continue;
                };
                cell.bg = blend(Some(overlay), None, Some(cell.bg)).unwrap_or(overlay);
                let fg = if cell.fg.is_terminal_default() {
                    Rgba::GRAY
                } else {
                    cell.fg
                };
                cell.fg = Rgba::blend(overlay, fg);
            }
        }
    }

    /// Draw flat-colored text at local `(x, y)`. Returns columns advanced.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, fg: Rgba, attrs: Attr) -> i32 {
        self.draw_glyphs(x, y, text, attrs, |_| fg)
    }

    /// Draw text colored by `paint`, sampled per column over an `extent`
    /// (`(width, height)` of the whole text block) at line `row`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_span(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        paint: &Paint,
        extent: (i32, i32),
        row: i32,
        attrs: Attr,
    ) -> i32 {
        self.draw_glyphs(x, y, text, attrs, |col| {
            paint.sample(extent.0, extent.1, x + col, row)
        })
    }

    fn draw_glyphs(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        attrs: Attr,
        color_at: impl Fn(i32) -> Rgba,
    ) -> i32 {
        let ay = self.y + y;
        let mut col = 0;

        for ch in text.chars() {
            let w = char_width(ch);
            if w == 0 {
                continue;
            }
            let ax = self.x + x + col;
            let fg = color_at(col);

            if w == 2 {
                // A wide glyph whose right half is clipped becomes a blank.
                if self.clip.contains(ax + 1, ay) {
                    if self.put_glyph(ax, ay, ch, fg, attrs) {
                        self.put_glyph(ax + 1, ay, Cell::CONTINUATION, fg, attrs);
                    }
                } else {
                    self.put_glyph(ax, ay, ' ', fg, attrs);
                }
            } else {
                self.put_glyph(ax, ay, ch, fg, attrs);
            }
            col += w;
        }

        col
    }

    /// Draw a border around a local rectangle. Needs at least 2x2 cells.
    pub fn draw_border(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        style: BorderStyle,
        paint: &Paint,
    ) {
        let Some(g) = style.glyphs() else {
            return;
        };
        if width < 2 || height < 2 {
            return;
        }

        let (x0, y0) = (self.x + x, self.y + y);
        let (x2, y2) = (width - 1, height - 1);
        let put = |ctx: &mut Self, col: i32, row: i32, symbol: char| {
            let fg = paint.sample(width, height, col, row);
            ctx.put_glyph(x0 + col, y0 + row, symbol, fg, Attr::NONE);
        };

        put(self, 0, 0, g.top_left);
        put(self, x2, 0, g.top_right);
        put(self, x2, y2, g.bottom_right);
        put(self, 0, y2, g.bottom_left);

        for col in 1..x2 {
            put(self, col, 0, g.horizontal);
            put(self, col, y2, g.horizontal);
        }
        for row in 1..y2 {
            put(self, 0, row, g.vertical);
            put(self, x2, row, g.vertical);
        }
    }

    /// Draw a vertical scrollbar of `height` cells in local column `x`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_scrollbar_v(
        &mut self,
        x: i32,
        y: i32,
        height: i32,
        offset: i32,
        viewport: i32,
        content: i32,
        track: Rgba,
        thumb: Rgba,
    ) {
        if height <= 0 || content <= 0 {
            return;
        }

        let ratio = (viewport as f32 / content as f32).clamp(0.0, 1.0);
        let thumb_height = ((height as f32 * ratio) as i32).clamp(1, height);
        let max_offset = (content - viewport).max(1);
        let position = (offset as f32 / max_offset as f32).clamp(0.0, 1.0);
        let thumb_start = ((height - thumb_height) as f32 * position).round() as i32;

        for row in 0..height {
            let is_thumb = row >= thumb_start && row < thumb_start + thumb_height;
            let (symbol, fg) = if is_thumb { ('█', thumb) } else { ('░', track) };
            self.put_glyph(self.x + x, self.y + y + row, symbol, fg, Attr::NONE);
        }
    }
}
