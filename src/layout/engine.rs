//! The layout-engine seam.

use super::box_model::{ComputedLayout, Constraints};
use super::style::LayoutNode;

/// Turns a declarative layout tree into concrete geometry.
///
/// The returned root `BoxModel` is positioned at its own margin offset; each
/// child's origin is relative to its parent's content origin. Engines never
/// fail: unsolvable input degrades to zero geometry.
pub trait LayoutEngine: Send + Sync {
    fn layout(&self, node: &LayoutNode, constraints: Constraints) -> ComputedLayout;
}
