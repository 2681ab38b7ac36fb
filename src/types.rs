//! Core types for ember-tui.
//!
//! These are the values every pipeline stage agrees on: colors, cell
//! attributes, the cell itself, border glyph sets, and the absolute-coordinate
//! rectangle used for bounds and clipping.

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Alpha 255 = fully opaque, 0 = fully transparent.
/// Special value: r=-1 means "terminal default" (let terminal pick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba {
    pub r: i16,
    pub g: i16,
    pub b: i16,
    pub a: i16,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as i16,
            g: g as i16,
            b: b as i16,
            a: a as i16,
        }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Terminal default color (let terminal decide).
    pub const TERMINAL_DEFAULT: Self = Self {
        r: -1,
        g: -1,
        b: -1,
        a: -1,
    };

    /// Transparent color.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const GRAY: Self = Self::rgb(128, 128, 128);

    /// Check if this is the terminal default color.
    #[inline]
    pub const fn is_terminal_default(&self) -> bool {
        self.r == -1
    }

    /// Check if color is fully opaque. The terminal default counts as opaque.
    #[inline]
    pub const fn is_opaque(&self) -> bool {
        self.a == 255 || self.is_terminal_default()
    }

    /// Check if color is fully transparent.
    #[inline]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Same color with a different alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        if self.is_terminal_default() {
            return self;
        }
        Self {
            a: a as i16,
            ..self
        }
    }

    /// Alpha blend src over dst (Porter-Duff "over" operation).
    ///
    /// A terminal-default destination is treated as opaque black.
    #[inline]
    pub fn blend(src: Self, dst: Self) -> Self {
        if src.is_opaque() {
            return src;
        }
        if src.is_transparent() {
            return dst;
        }

        let (dr, dg, db, da) = if dst.is_terminal_default() {
            (0i32, 0i32, 0i32, 255i32)
        } else {
            (dst.r as i32, dst.g as i32, dst.b as i32, dst.a as i32)
        };

        let sa = src.a as i32;
        let inv_sa = 255 - sa;

        // out_a = src_a + dst_a * (1 - src_a)
        let out_a = sa + (da * inv_sa) / 255;
        if out_a == 0 {
            return Self::TRANSPARENT;
        }

        let channel = |s: i16, d: i32| ((s as i32 * sa) + (d * da * inv_sa / 255)) / out_a;

        Self {
            r: channel(src.r, dr).clamp(0, 255) as i16,
            g: channel(src.g, dg).clamp(0, 255) as i16,
            b: channel(src.b, db).clamp(0, 255) as i16,
            a: out_a.clamp(0, 255) as i16,
        }
    }

    /// Linear interpolation between two colors.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;
        let mix = |x: i16, y: i16| ((x as f32 * inv_t) + (y as f32 * t)).round() as i16;

        Self {
            r: mix(a.r, b.r),
            g: mix(a.g, b.g),
            b: mix(a.b, b.b),
            a: mix(a.a, b.a),
        }
    }

    /// Dim the color by a factor (0.0 = black, 1.0 = unchanged).
    #[inline]
    pub fn dim(self, factor: f32) -> Self {
        if self.is_terminal_default() {
            return Self::GRAY;
        }
        let scale = |c: i16| (c as f32 * factor).clamp(0.0, 255.0) as i16;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let s = hex.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if !s.is_ascii() {
            return None;
        }

        let byte = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        let nibble = |i: usize| u8::from_str_radix(&s[i..i + 1], 16).ok().map(|n| n * 17);

        match s.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Parse a hex literal known at development time.
    ///
    /// # Panics
    ///
    /// Panics if `hex` is not a valid color literal.
    pub fn hex(hex: &str) -> Self {
        match Self::from_hex(hex) {
            Some(color) => color,
            None => panic!("invalid color literal {hex:?}"),
        }
    }
}

// =============================================================================
// Cell Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield for efficient storage and comparison.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const BLINK = 1 << 4;
        const INVERSE = 1 << 5;
        const HIDDEN = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

// =============================================================================
// Cell - The atomic unit of terminal rendering
// =============================================================================

/// A single terminal cell.
///
/// The whole pipeline exists to fill a grid of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Glyph. `'\0'` marks the right half of a wide glyph.
    pub symbol: char,
    /// Foreground color.
    pub fg: Rgba,
    /// Background color.
    pub bg: Rgba,
    /// Attribute flags (bold, italic, etc.).
    pub attrs: Attr,
}

impl Cell {
    /// Continuation marker for the second column of a wide glyph.
    pub const CONTINUATION: char = '\0';

    /// True when this cell is the right half of a wide glyph.
    #[inline]
    pub fn is_continuation(&self) -> bool {
        self.symbol == Self::CONTINUATION
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: ' ',
            fg: Rgba::TERMINAL_DEFAULT,
            bg: Rgba::TERMINAL_DEFAULT,
            attrs: Attr::NONE,
        }
    }
}

// =============================================================================
// Rect - Absolute screen rectangle
// =============================================================================

/// A rectangle in absolute screen coordinates.
///
/// Coordinates are signed: content scrolled above the viewport or offset to
/// the left of its parent has a negative origin until it is clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const EMPTY: Rect = Rect::new(0, 0, 0, 0);

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside this rect.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        !self.is_empty() && x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// True if `other` lies entirely inside `self`. Empty rects are inside anything.
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Overlapping area of two rects, or [`Rect::EMPTY`] when they are
    /// disjoint or merely touch.
    pub fn intersect(&self, other: &Rect) -> Rect {
        if self.is_empty() || other.is_empty() {
            return Rect::EMPTY;
        }

        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        if x2 > x1 && y2 > y1 {
            Rect::new(x1, y1, x2 - x1, y2 - y1)
        } else {
            Rect::EMPTY
        }
    }

    /// Move by a delta.
    #[inline]
    pub const fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

// =============================================================================
// Border Styles
// =============================================================================

/// Border glyph sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderStyle {
    #[default]
    None,
    /// ─ │ ┌ ┐ └ ┘
    Single,
    /// ═ ║ ╔ ╗ ╚ ╝
    Double,
    /// ─ │ ╭ ╮ ╰ ╯
    Rounded,
    /// ━ ┃ ┏ ┓ ┗ ┛
    Bold,
    /// ┄ ┆ ┌ ┐ └ ┘
    Dashed,
    /// - | + + + +
    Ascii,
}

/// Glyphs for one border style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderGlyphs {
    pub horizontal: char,
    pub vertical: char,
    pub top_left: char,
    pub top_right: char,
    pub bottom_right: char,
    pub bottom_left: char,
}

impl BorderStyle {
    /// Glyphs for this style, `None` for [`BorderStyle::None`].
    pub const fn glyphs(&self) -> Option<BorderGlyphs> {
        let (horizontal, vertical, top_left, top_right, bottom_right, bottom_left) = match self {
            Self::None => return None,
            Self::Single => ('─', '│', '┌', '┐', '┘', '└'),
            Self::Double => ('═', '║', '╔', '╗', '╝', '╚'),
            Self::Rounded => ('─', '│', '╭', '╮', '╯', '╰'),
            Self::Bold => ('━', '┃', '┏', '┓', '┛', '┗'),
            Self::Dashed => ('┄', '┆', '┌', '┐', '┘', '└'),
            Self::Ascii => ('-', '|', '+', '+', '+', '+'),
        };
        Some(BorderGlyphs {
            horizontal,
            vertical,
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        })
    }

    /// Cells taken on each side.
    #[inline]
    pub const fn thickness(&self) -> i32 {
        match self {
            Self::None => 0,
            _ => 1,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
