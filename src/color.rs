//! Color sources and the compositing rule.
//!
//! A widget's background or foreground is a [`Paint`]: either a flat [`Rgba`]
//! or a provider sampled per cell as `(box_width, box_height, col, row)`.
//! [`blend`] resolves a translucent source against whatever lies beneath it.

use std::fmt;
use std::sync::Arc;

use crate::types::Rgba;

/// Per-cell color provider: `(box_width, box_height, col, row) -> Rgba`.
pub type ColorFn = dyn Fn(i32, i32, i32, i32) -> Rgba + Send + Sync;

// =============================================================================
// Paint
// =============================================================================

/// A flat color or a per-cell color provider.
#[derive(Clone)]
pub enum Paint {
    Solid(Rgba),
    Provider(Arc<ColorFn>),
}

impl Paint {
    /// Wrap a provider closure.
    pub fn provider(f: impl Fn(i32, i32, i32, i32) -> Rgba + Send + Sync + 'static) -> Self {
        Paint::Provider(Arc::new(f))
    }

    /// Left-to-right linear gradient across the box width.
    pub fn horizontal_gradient(from: Rgba, to: Rgba) -> Self {
        Self::provider(move |w, _h, col, _row| Rgba::lerp(from, to, fraction(col, w)))
    }

    /// Top-to-bottom linear gradient across the box height.
    pub fn vertical_gradient(from: Rgba, to: Rgba) -> Self {
        Self::provider(move |_w, h, _col, row| Rgba::lerp(from, to, fraction(row, h)))
    }

    /// Sample the color for cell `(col, row)` of a `width` x `height` box.
    #[inline]
    pub fn sample(&self, width: i32, height: i32, col: i32, row: i32) -> Rgba {
        match self {
            Paint::Solid(c) => *c,
            Paint::Provider(f) => f(width, height, col, row),
        }
    }

    /// The flat color, if this is not a provider.
    pub fn solid(&self) -> Option<Rgba> {
        match self {
            Paint::Solid(c) => Some(*c),
            Paint::Provider(_) => None,
        }
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, Paint::Provider(_))
    }
}

/// Position of `i` along a span of `len` cells in `[0, 1]`.
fn fraction(i: i32, len: i32) -> f32 {
    if len <= 1 {
        0.0
    } else {
        i.clamp(0, len - 1) as f32 / (len - 1) as f32
    }
}

impl From<Rgba> for Paint {
    fn from(c: Rgba) -> Self {
        Paint::Solid(c)
    }
}

impl fmt::Debug for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paint::Solid(c) => f.debug_tuple("Solid").field(c).finish(),
            Paint::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

// =============================================================================
// Blending
// =============================================================================

/// Composite `source` over what lies beneath a cell.
///
/// Unset or opaque sources come back unchanged. Otherwise the destination is
/// the inherited background sample, else the cell's existing color (unless it
/// is the terminal default), else opaque black.
pub fn blend(source: Option<Rgba>, inherited: Option<Rgba>, existing: Option<Rgba>) -> Option<Rgba> {
    let src = source?;
    if src.is_opaque() {
        return Some(src);
    }

    let dest = inherited
        .or(existing.filter(|c| !c.is_terminal_default()))
        .unwrap_or(Rgba::BLACK);

    Some(Rgba::blend(src, dest))
}

// =============================================================================
// Tests
// =============================================================================
