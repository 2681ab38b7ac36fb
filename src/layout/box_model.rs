//! Box model geometry.
//!
//! A [`BoxModel`] locates a widget's border box relative to its parent's
//! content origin (the screen origin for a root) and carries the margin,
//! border and padding edges around it. All sub-rectangles saturate at zero
//! size rather than going negative.

use crate::types::Rect;

// =============================================================================
// Edges
// =============================================================================

/// Per-side thickness in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Edges {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Edges {
    pub const ZERO: Edges = Edges::all(0);

    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn all(n: i32) -> Self {
        Self::new(n, n, n, n)
    }

    /// `vertical` on top and bottom, `horizontal` on left and right.
    pub const fn symmetric(vertical: i32, horizontal: i32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    #[inline]
    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    #[inline]
    pub const fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    pub const fn add(&self, other: &Edges) -> Edges {
        Edges::new(
            self.top + other.top,
            self.right + other.right,
            self.bottom + other.bottom,
            self.left + other.left,
        )
    }
}

// =============================================================================
// Constraints
// =============================================================================

/// Size bounds handed to a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constraints {
    pub min_width: i32,
    pub max_width: i32,
    pub min_height: i32,
    pub max_height: i32,
}

impl Constraints {
    /// Exactly `width` x `height`.
    pub fn tight(width: i32, height: i32) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        Self {
            min_width: width,
            max_width: width,
            min_height: height,
            max_height: height,
        }
    }

    /// Anything up to `width` x `height`.
    pub fn loose(width: i32, height: i32) -> Self {
        Self {
            min_width: 0,
            max_width: width.max(0),
            min_height: 0,
            max_height: height.max(0),
        }
    }

    pub fn is_tight(&self) -> bool {
        self.min_width == self.max_width && self.min_height == self.max_height
    }

    /// Shrink every bound by `edges`, flooring at zero.
    pub fn deflate(&self, edges: &Edges) -> Self {
        let h = edges.horizontal();
        let v = edges.vertical();
        Self {
            min_width: (self.min_width - h).max(0),
            max_width: (self.max_width - h).max(0),
            min_height: (self.min_height - v).max(0),
            max_height: (self.max_height - v).max(0),
        }
    }

    /// Clamp a size into these bounds.
    pub fn constrain(&self, width: i32, height: i32) -> (i32, i32) {
        (
            width.min(self.max_width).max(self.min_width),
            height.min(self.max_height).max(self.min_height),
        )
    }
}

// =============================================================================
// BoxModel
// =============================================================================

/// Resolved geometry of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxModel {
    /// Border-box origin, relative to the parent's content origin.
    pub x: i32,
    pub y: i32,
    /// Border-box size.
    pub width: i32,
    pub height: i32,
    pub margin: Edges,
    pub border: Edges,
    pub padding: Edges,
    /// Vertical scroll offset, clamped to `0..=max_scroll()`.
    pub scroll_y: i32,
    /// Height of the content before clipping.
    pub virtual_height: i32,
}

fn inset(r: Rect, e: &Edges) -> Rect {
    Rect::new(
        r.x + e.left,
        r.y + e.top,
        (r.width - e.horizontal()).max(0),
        (r.height - e.vertical()).max(0),
    )
}

impl BoxModel {
    pub fn sized(width: i32, height: i32) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            ..Self::default()
        }
    }

    pub fn border_box(&self) -> Rect {
        Rect::new(self.x, self.y, self.width.max(0), self.height.max(0))
    }

    pub fn margin_box(&self) -> Rect {
        let m = &self.margin;
        Rect::new(
            self.x - m.left,
            self.y - m.top,
            (self.width + m.horizontal()).max(0),
            (self.height + m.vertical()).max(0),
        )
    }

    pub fn padding_box(&self) -> Rect {
        inset(self.border_box(), &self.border)
    }

    pub fn content_box(&self) -> Rect {
        inset(self.padding_box(), &self.padding)
    }

    /// Content origin relative to the border-box origin.
    pub fn content_offset(&self) -> (i32, i32) {
        (
            self.border.left + self.padding.left,
            self.border.top + self.padding.top,
        )
    }

    /// Viewport width available to content.
    pub fn usable_width(&self) -> i32 {
        self.content_box().width
    }

    /// Viewport height available to content.
    pub fn usable_height(&self) -> i32 {
        self.content_box().height
    }

    pub fn max_scroll(&self) -> i32 {
        (self.virtual_height - self.usable_height()).max(0)
    }

    pub fn overflows(&self) -> bool {
        self.virtual_height > self.usable_height()
    }
}

/// A box model plus the geometry of each layout child, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputedLayout {
    pub box_model: BoxModel,
    pub children: Vec<ComputedLayout>,
}

impl ComputedLayout {
    pub fn leaf(box_model: BoxModel) -> Self {
        Self {
            box_model,
            children: Vec::new(),
        }
    }
}
