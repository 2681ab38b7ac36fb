//! Differential renderer.
//!
//! Compares the current frame to the previous one and only writes cells that
//! changed, inside a synchronized update so the terminal never shows a
//! half-drawn frame.
//!
//! # Algorithm
//!
//! 1. Begin synchronized update
//! 2. For each cell in the new frame:
//!    - If the previous frame has the same size and the cell is unchanged: skip
//!    - Otherwise: move the cursor if needed, update colors/attributes that
//!      differ from the last emitted state, print the glyph
//! 3. End synchronized update and flush once
//! 4. Keep the frame for the next comparison

use std::io::Write;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate};

use super::buffer::FrameBuffer;
use crate::layout::char_width;
use crate::types::{Attr, Cell, Rgba};

/// Differential renderer over any writer.
pub struct DiffRenderer<W: Write> {
    out: W,
    previous: Option<FrameBuffer>,
    cursor: Option<(u16, u16)>,
    fg: Option<Rgba>,
    bg: Option<Rgba>,
    attrs: Attr,
}

impl<W: Write> DiffRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous: None,
            cursor: None,
            fg: None,
            bg: None,
            attrs: Attr::NONE,
        }
    }

    /// Write the cells that differ from the last presented frame.
    ///
    /// Returns how many cells were written.
    pub fn present(&mut self, buffer: &FrameBuffer) -> crate::Result<usize> {
        let previous = self
            .previous
            .take()
            .filter(|p| p.width() == buffer.width() && p.height() == buffer.height());

        self.cursor = None;
        self.fg = None;
        self.bg = None;
        self.attrs = Attr::NONE;

        queue!(self.out, BeginSynchronizedUpdate, SetAttribute(Attribute::Reset))?;

        let mut written = 0;
        for (x, y, cell) in buffer.iter() {
            if cell.is_continuation() {
                continue;
            }
            let unchanged = previous
                .as_ref()
                .and_then(|p| p.get(x as i32, y as i32))
                .is_some_and(|prev| prev == cell);
            if unchanged {
                continue;
            }
            self.write_cell(x, y, cell)?;
            written += 1;
        }

        queue!(self.out, SetAttribute(Attribute::Reset), EndSynchronizedUpdate)?;
        self.out.flush()?;

        self.previous = Some(buffer.clone());
        Ok(written)
    }

    fn write_cell(&mut self, x: u16, y: u16, cell: &Cell) -> crate::Result<()> {
        if self.cursor != Some((x, y)) {
            queue!(self.out, MoveTo(x, y))?;
        }

        if cell.attrs != self.attrs {
            queue!(self.out, SetAttribute(Attribute::Reset))?;
            for attribute in attributes(cell.attrs) {
                queue!(self.out, SetAttribute(attribute))?;
            }
            self.attrs = cell.attrs;
            self.fg = None;
            self.bg = None;
        }
        if self.fg != Some(cell.fg) {
            queue!(self.out, SetForegroundColor(to_color(cell.fg)))?;
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            queue!(self.out, SetBackgroundColor(to_color(cell.bg)))?;
            self.bg = Some(cell.bg);
        }

        queue!(self.out, Print(cell.symbol))?;
        let advance = char_width(cell.symbol).max(1) as u16;
        self.cursor = Some((x.saturating_add(advance), y));
        Ok(())
    }

    /// Forget the previous frame; the next present redraws everything.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }
}

/// Terminal color for a cell color. Translucent leftovers are flattened onto black.
fn to_color(c: Rgba) -> Color {
    if c.is_terminal_default() {
        return Color::Reset;
    }
    let c = if c.is_opaque() { c } else { Rgba::blend(c, Rgba::BLACK) };
    Color::Rgb {
        r: c.r.clamp(0, 255) as u8,
        g: c.g.clamp(0, 255) as u8,
        b: c.b.clamp(0, 255) as u8,
    }
}

fn attributes(attrs: Attr) -> impl Iterator<Item = Attribute> {
    const MAP: [(Attr, Attribute); 8] = [
        (Attr::BOLD, Attribute::Bold),
        (Attr::DIM, Attribute::Dim),
        (Attr::ITALIC, Attribute::Italic),
        (Attr::UNDERLINE, Attribute::Underlined),
        (Attr::BLINK, Attribute::SlowBlink),
        (Attr::INVERSE, Attribute::Reverse),
        (Attr::HIDDEN, Attribute::Hidden),
        (Attr::STRIKETHROUGH, Attribute::CrossedOut),
    ];
    MAP.into_iter()
        .filter(move |(flag, _)| attrs.contains(*flag))
        .map(|(_, attribute)| attribute)
}
