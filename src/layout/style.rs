//! Declarative layout description handed to a [`LayoutEngine`](super::LayoutEngine).

use std::fmt;
use std::sync::Arc;

use super::box_model::{Constraints, Edges};

/// Content-box measurement: `(constraints) -> (width, height)`.
pub type MeasureFn = Arc<dyn Fn(Constraints) -> (i32, i32) + Send + Sync>;

// =============================================================================
// Enums
// =============================================================================

/// Dimension value: auto, fixed cells, or percentage of the parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Cells(i32),
    /// 0.0 - 100.0
    Percent(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    #[default]
    Stretch,
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Position {
    #[default]
    Relative,
    /// Taken out of flow and placed at `offset` inside the parent's content box.
    Absolute,
}

// =============================================================================
// LayoutStyle
// =============================================================================

/// Sizing and flex properties of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutStyle {
    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub min_height: Dimension,
    pub max_width: Dimension,
    pub max_height: Dimension,
    pub margin: Edges,
    pub border: Edges,
    pub padding: Edges,
    pub direction: FlexDirection,
    pub justify: Justify,
    pub align: Align,
    pub gap: i32,
    pub grow: f32,
    pub shrink: f32,
    pub position: Position,
    /// `(x, y)` inside the parent's content box for absolute and stacked nodes.
    /// May be negative.
    pub offset: (i32, i32),
}

impl Default for LayoutStyle {
    fn default() -> Self {
        Self {
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_width: Dimension::Auto,
            min_height: Dimension::Auto,
            max_width: Dimension::Auto,
            max_height: Dimension::Auto,
            margin: Edges::ZERO,
            border: Edges::ZERO,
            padding: Edges::ZERO,
            direction: FlexDirection::Column,
            justify: Justify::Start,
            align: Align::Stretch,
            gap: 0,
            grow: 0.0,
            shrink: 1.0,
            position: Position::Relative,
            offset: (0, 0),
        }
    }
}

// =============================================================================
// LayoutNode
// =============================================================================

/// How a node arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NodeKind {
    /// Flex flow.
    #[default]
    Plain,
    /// Children layered at their offsets.
    Stack,
    /// Flex column whose children keep their natural height and may overflow.
    Scroll,
    /// Takes no space.
    Hidden,
}

/// A node in the declarative layout tree.
#[derive(Clone, Default)]
pub struct LayoutNode {
    pub style: LayoutStyle,
    pub kind: NodeKind,
    pub measure: Option<MeasureFn>,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn new(style: LayoutStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn hidden() -> Self {
        Self {
            kind: NodeKind::Hidden,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_measure(mut self, measure: MeasureFn) -> Self {
        self.measure = Some(measure);
        self
    }

    pub fn with_children(mut self, children: Vec<LayoutNode>) -> Self {
        self.children = children;
        self
    }
}

impl fmt::Debug for LayoutNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutNode")
            .field("style", &self.style)
            .field("kind", &self.kind)
            .field("measured", &self.measure.is_some())
            .field("children", &self.children)
            .finish()
    }
}
