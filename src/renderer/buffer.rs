//! FrameBuffer - the cell grid a frame paints into.
//!
//! Flat `Vec<Cell>` with row-major indexing (`index = y * width + x`).
//! Coordinates are signed so callers can address off-screen positions; anything
//! outside the grid reads as `None`. Clipped drawing lives in
//! [`RenderContext`](crate::pipeline::RenderContext).

use crate::types::{Attr, Cell, Rect, Rgba};

/// A 2D buffer of terminal cells.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a new buffer filled with default cells.
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_background(width, height, Rgba::TERMINAL_DEFAULT)
    }

    /// Create a new buffer with a specific background color.
    pub fn with_background(width: u16, height: u16, bg: Rgba) -> Self {
        let cell = Cell {
            bg,
            ..Cell::default()
        };
        Self {
            width,
            height,
            cells: vec![cell; width as usize * height as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The whole grid as a rect.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    #[inline]
    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let i = self.index(x, y)?;
        Some(&mut self.cells[i])
    }

    /// Raw cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate over cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Cell)> {
        let width = self.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| ((i % width) as u16, (i / width) as u16, cell))
    }

    /// Reset every cell to the default.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    /// Resize the buffer (clears content).
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(width as usize * height as usize, Cell::default());
    }

    /// Glyphs of row `y` as a string, continuation cells skipped.
    pub fn row_text(&self, y: i32) -> String {
        (0..self.width as i32)
            .filter_map(|x| self.get(x, y))
            .filter(|c| !c.is_continuation())
            .map(|c| c.symbol)
            .collect()
    }

    /// Every row as text.
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height as i32).map(|y| self.row_text(y)).collect()
    }

    /// Number of cells whose attributes contain `attr`.
    pub fn count_attr(&self, attr: Attr) -> usize {
        self.cells.iter().filter(|c| c.attrs.contains(attr)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buf = FrameBuffer::new(10, 5);
        assert_eq!(buf.width(), 10);
        assert_eq!(buf.height(), 5);
        assert_eq!(buf.cells().len(), 50);
        assert_eq!(buf.bounds(), Rect::new(0, 0, 10, 5));
    }

    #[test]
    fn test_out_of_bounds_is_none() {
        let mut buf = FrameBuffer::new(4, 4);
        assert!(buf.get(-1, 0).is_none());
        assert!(buf.get(4, 0).is_none());
        assert!(buf.get_mut(0, 4).is_none());
        assert!(buf.get(3, 3).is_some());
    }

    #[test]
    fn test_row_text_skips_continuations() {
        let mut buf = FrameBuffer::new(4, 1);
        if let Some(c) = buf.get_mut(0, 0) {
            c.symbol = '日';
        }
        if let Some(c) = buf.get_mut(1, 0) {
            c.symbol = Cell::CONTINUATION;
        }
        if let Some(c) = buf.get_mut(2, 0) {
            c.symbol = 'x';
        }
        assert_eq!(buf.row_text(0), "日x ");
    }

    #[test]
    fn test_resize_clears() {
        let mut buf = FrameBuffer::with_background(2, 2, Rgba::RED);
        buf.resize(3, 1);
        assert_eq!(buf.cells().len(), 3);
        assert!(buf.cells().iter().all(|c| c.bg.is_terminal_default()));
    }
}
