//! Taffy Bridge - Integration with Taffy layout engine
//!
//! Converts a [`LayoutNode`] tree to a Taffy tree, runs the flexbox solver,
//! and reads the results back as nested [`ComputedLayout`]s.

use taffy::{
    AlignItems as TaffyAlignItems, AvailableSpace, Dimension as TaffyDimension, Display,
    FlexDirection as TaffyFlexDirection, JustifyContent as TaffyJustifyContent, LengthPercentage,
    LengthPercentageAuto, NodeId, Overflow, Point, Position as TaffyPosition, Size, Style,
    TaffyTree,
};
use taffy::prelude::TaffyMaxContent;

use super::box_model::{BoxModel, ComputedLayout, Constraints, Edges};
use super::engine::LayoutEngine;
use super::style::{
    Align, Dimension, FlexDirection, Justify, LayoutNode, LayoutStyle, MeasureFn, NodeKind,
    Position,
};

/// Stand-in for "no bound" when handing constraints to a measure function.
const UNBOUNDED: i32 = i32::MAX / 4;

// =============================================================================
// CONVERSIONS
// =============================================================================

fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Cells(n) => TaffyDimension::Length(n as f32),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn to_taffy_edges(e: &Edges) -> taffy::Rect<LengthPercentage> {
    taffy::Rect {
        left: LengthPercentage::Length(e.left as f32),
        right: LengthPercentage::Length(e.right as f32),
        top: LengthPercentage::Length(e.top as f32),
        bottom: LengthPercentage::Length(e.bottom as f32),
    }
}

fn to_taffy_margin(e: &Edges) -> taffy::Rect<LengthPercentageAuto> {
    taffy::Rect {
        left: LengthPercentageAuto::Length(e.left as f32),
        right: LengthPercentageAuto::Length(e.right as f32),
        top: LengthPercentageAuto::Length(e.top as f32),
        bottom: LengthPercentageAuto::Length(e.bottom as f32),
    }
}

fn to_taffy_justify(justify: Justify) -> Option<TaffyJustifyContent> {
    Some(match justify {
        Justify::Start => TaffyJustifyContent::FlexStart,
        Justify::Center => TaffyJustifyContent::Center,
        Justify::End => TaffyJustifyContent::FlexEnd,
        Justify::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        Justify::SpaceAround => TaffyJustifyContent::SpaceAround,
        Justify::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

fn to_taffy_align(align: Align) -> Option<TaffyAlignItems> {
    Some(match align {
        Align::Stretch => TaffyAlignItems::Stretch,
        Align::Start => TaffyAlignItems::FlexStart,
        Align::Center => TaffyAlignItems::Center,
        Align::End => TaffyAlignItems::FlexEnd,
    })
}

/// Inset placing a node at `offset` inside the parent's content box.
fn offset_inset(offset: (i32, i32), parent_padding: &Edges) -> taffy::Rect<LengthPercentageAuto> {
    taffy::Rect {
        left: LengthPercentageAuto::Length((offset.0 + parent_padding.left) as f32),
        top: LengthPercentageAuto::Length((offset.1 + parent_padding.top) as f32),
        right: LengthPercentageAuto::Auto,
        bottom: LengthPercentageAuto::Auto,
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

/// How the parent influences a child's style.
#[derive(Clone, Copy)]
struct ParentInfo<'a> {
    kind: NodeKind,
    padding: &'a Edges,
}

fn build_style(node: &LayoutNode, parent: Option<ParentInfo<'_>>) -> Style {
    let s: &LayoutStyle = &node.style;

    let mut style = Style {
        display: Display::Flex,
        flex_direction: match (node.kind, s.direction) {
            (NodeKind::Scroll, _) | (_, FlexDirection::Column) => TaffyFlexDirection::Column,
            (_, FlexDirection::Row) => TaffyFlexDirection::Row,
        },
        justify_content: to_taffy_justify(s.justify),
        align_items: to_taffy_align(s.align),
        flex_grow: s.grow,
        flex_shrink: s.shrink,
        size: Size {
            width: to_taffy_dimension(s.width),
            height: to_taffy_dimension(s.height),
        },
        min_size: Size {
            width: to_taffy_dimension(s.min_width),
            height: to_taffy_dimension(s.min_height),
        },
        max_size: Size {
            width: to_taffy_dimension(s.max_width),
            height: to_taffy_dimension(s.max_height),
        },
        margin: to_taffy_margin(&s.margin),
        padding: to_taffy_edges(&s.padding),
        border: to_taffy_edges(&s.border),
        gap: Size {
            width: LengthPercentage::Length(s.gap as f32),
            height: LengthPercentage::Length(s.gap as f32),
        },
        ..Default::default()
    };

    match node.kind {
        NodeKind::Hidden => style.display = Display::None,
        NodeKind::Scroll => {
            style.overflow = Point {
                x: Overflow::Visible,
                y: Overflow::Scroll,
            };
        }
        NodeKind::Plain | NodeKind::Stack => {}
    }

    let parent_padding = parent.map(|p| *p.padding).unwrap_or_default();
    let stacked = matches!(parent, Some(p) if p.kind == NodeKind::Stack);

    if stacked || s.position == Position::Absolute {
        style.position = TaffyPosition::Absolute;
        style.inset = offset_inset(s.offset, &parent_padding);
    }

    // Scroll content keeps its natural height and overflows the viewport.
    if matches!(parent, Some(p) if p.kind == NodeKind::Scroll) {
        style.flex_shrink = 0.0;
    }

    style
}

// =============================================================================
// MEASUREMENT
// =============================================================================

fn axis_bound(known: Option<f32>, available: AvailableSpace) -> (i32, i32) {
    match (known, available) {
        (Some(v), _) => (v.round() as i32, v.round() as i32),
        (None, AvailableSpace::Definite(v)) => (0, v.floor().max(0.0) as i32),
        (None, AvailableSpace::MinContent | AvailableSpace::MaxContent) => (0, UNBOUNDED),
    }
}

fn measure_leaf(
    measure: &MeasureFn,
    known: Size<Option<f32>>,
    available: Size<AvailableSpace>,
) -> Size<f32> {
    let (min_width, max_width) = axis_bound(known.width, available.width);
    let (min_height, max_height) = axis_bound(known.height, available.height);
    let (w, h) = measure(Constraints {
        min_width,
        max_width,
        min_height,
        max_height,
    });

    Size {
        width: known.width.unwrap_or(w.max(0) as f32),
        height: known.height.unwrap_or(h.max(0) as f32),
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// [`LayoutEngine`] backed by Taffy's flexbox implementation.
///
/// Builds a fresh Taffy tree per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaffyEngine;

impl TaffyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Layout that reports solver failures instead of degrading.
    pub fn try_layout(
        &self,
        node: &LayoutNode,
        constraints: Constraints,
    ) -> crate::Result<ComputedLayout> {
        let mut tree: TaffyTree<MeasureFn> = TaffyTree::new();
        let root = insert(&mut tree, node, None)?;

        // Constraints win over the root's own size.
        let mut root_style = tree.style(root)?.clone();
        if constraints.is_tight() {
            root_style.size = Size {
                width: TaffyDimension::Length(constraints.max_width as f32),
                height: TaffyDimension::Length(constraints.max_height as f32),
            };
        } else {
            root_style.min_size = Size {
                width: TaffyDimension::Length(constraints.min_width as f32),
                height: TaffyDimension::Length(constraints.min_height as f32),
            };
            root_style.max_size = Size {
                width: TaffyDimension::Length(constraints.max_width as f32),
                height: TaffyDimension::Length(constraints.max_height as f32),
            };
        }
        tree.set_style(root, root_style)?;

        tree.compute_layout_with_measure(
            root,
            Size::MAX_CONTENT,
            |known, available, _id: NodeId, context: Option<&mut MeasureFn>, _style: &Style| {
                match context {
                    Some(measure) => measure_leaf(measure, known, available),
                    None => Size::ZERO,
                }
            },
        )?;

        let mut computed = collect(&tree, root, node, &Edges::ZERO)?;

        let bm = &mut computed.box_model;
        let (w, h) = constraints.constrain(bm.width, bm.height);
        bm.width = w;
        bm.height = h;
        bm.x = node.style.margin.left;
        bm.y = node.style.margin.top;

        Ok(computed)
    }
}

impl LayoutEngine for TaffyEngine {
    fn layout(&self, node: &LayoutNode, constraints: Constraints) -> ComputedLayout {
        match self.try_layout(node, constraints) {
            Ok(layout) => layout,
            Err(err) => {
                log::warn!("layout failed, degrading to zero geometry: {err}");
                zero_geometry(node)
            }
        }
    }
}

fn insert(
    tree: &mut TaffyTree<MeasureFn>,
    node: &LayoutNode,
    parent: Option<ParentInfo<'_>>,
) -> Result<NodeId, taffy::TaffyError> {
    let style = build_style(node, parent);

    if node.children.is_empty() {
        return match &node.measure {
            Some(measure) => tree.new_leaf_with_context(style, measure.clone()),
            None => tree.new_leaf(style),
        };
    }

    let info = ParentInfo {
        kind: node.kind,
        padding: &node.style.padding,
    };
    let children = node
        .children
        .iter()
        .map(|child| insert(tree, child, Some(info)))
        .collect::<Result<Vec<_>, _>>()?;

    tree.new_with_children(style, &children)
}

/// Read back geometry. `parent_inset` is the parent's border plus padding,
/// so origins come out relative to the parent's content box.
fn collect(
    tree: &TaffyTree<MeasureFn>,
    id: NodeId,
    node: &LayoutNode,
    parent_inset: &Edges,
) -> Result<ComputedLayout, taffy::TaffyError> {
    let layout = tree.layout(id)?;
    let s = &node.style;

    let mut box_model = BoxModel {
        x: layout.location.x.round() as i32 - parent_inset.left,
        y: layout.location.y.round() as i32 - parent_inset.top,
        width: layout.size.width.round() as i32,
        height: layout.size.height.round() as i32,
        margin: s.margin,
        border: s.border,
        padding: s.padding,
        scroll_y: 0,
        virtual_height: 0,
    };

    if node.kind == NodeKind::Hidden {
        box_model.width = 0;
        box_model.height = 0;
    }

    let inset = s.border.add(&s.padding);
    let child_ids = tree.children(id)?;
    let children = child_ids
        .iter()
        .zip(&node.children)
        .map(|(&child_id, child)| collect(tree, child_id, child, &inset))
        .collect::<Result<Vec<_>, _>>()?;

    box_model.virtual_height = children
        .iter()
        .zip(&node.children)
        .filter(|(_, n)| n.kind != NodeKind::Hidden)
        .map(|(c, _)| c.box_model.margin_box().bottom())
        .max()
        .unwrap_or(0)
        .max(0);

    Ok(ComputedLayout {
        box_model,
        children,
    })
}

fn zero_geometry(node: &LayoutNode) -> ComputedLayout {
    ComputedLayout {
        box_model: BoxModel::default(),
        children: node.children.iter().map(zero_geometry).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fixed(w: i32, h: i32) -> LayoutNode {
        LayoutNode::new(LayoutStyle {
            width: Dimension::Cells(w),
            height: Dimension::Cells(h),
            ..LayoutStyle::default()
        })
    }

    #[test]
    fn test_tight_root_takes_constraint_size() {
        let root = LayoutNode::new(LayoutStyle::default()).with_children(vec![fixed(20, 5)]);
        let out = TaffyEngine.layout(&root, Constraints::tight(40, 10));

        assert_eq!(out.box_model.width, 40);
        assert_eq!(out.box_model.height, 10);
        let child = &out.children[0].box_model;
        assert_eq!((child.x, child.y, child.width, child.height), (0, 0, 20, 5));
    }

    #[test]
    fn test_row_with_gap() {
        let root = LayoutNode::new(LayoutStyle {
            direction: FlexDirection::Row,
            gap: 2,
            ..LayoutStyle::default()
        })
        .with_children(vec![fixed(10, 1), fixed(10, 1)]);
        let out = TaffyEngine.layout(&root, Constraints::tight(40, 3));

        assert_eq!(out.children[0].box_model.x, 0);
        assert_eq!(out.children[1].box_model.x, 12);
    }

    #[test]
    fn test_child_origin_is_content_relative() {
        let root = LayoutNode::new(LayoutStyle {
            border: Edges::all(1),
            padding: Edges::all(1),
            ..LayoutStyle::default()
        })
        .with_children(vec![fixed(5, 1), fixed(5, 1)]);
        let out = TaffyEngine.layout(&root, Constraints::tight(20, 10));

        assert_eq!((out.children[0].box_model.x, out.children[0].box_model.y), (0, 0));
        assert_eq!(out.children[1].box_model.y, 1);
        assert_eq!(out.box_model.content_box().width, 16);
    }

    #[test]
    fn test_measured_root_under_loose_constraints() {
        let measure: MeasureFn = Arc::new(|c: Constraints| (5.min(c.max_width), 1));
        let root = LayoutNode::default().with_measure(measure);
        let out = TaffyEngine.layout(&root, Constraints::loose(80, 24));

        assert_eq!((out.box_model.width, out.box_model.height), (5, 1));
    }

    #[test]
    fn test_scroll_children_keep_height() {
        let root = LayoutNode::default()
            .with_kind(NodeKind::Scroll)
            .with_children(vec![fixed(10, 3), fixed(10, 3), fixed(10, 3)]);
        let out = TaffyEngine.layout(&root, Constraints::tight(20, 5));

        let ys: Vec<i32> = out.children.iter().map(|c| c.box_model.y).collect();
        assert_eq!(ys, vec![0, 3, 6]);
        assert!(out.children.iter().all(|c| c.box_model.height == 3));
        assert_eq!(out.box_model.virtual_height, 9);
        assert!(out.box_model.overflows());
    }

    #[test]
    fn test_hidden_child_takes_no_space() {
        let root = LayoutNode::default().with_children(vec![LayoutNode::hidden(), fixed(4, 2)]);
        let out = TaffyEngine.layout(&root, Constraints::tight(10, 10));

        assert_eq!(out.children[0].box_model.height, 0);
        assert_eq!(out.children[1].box_model.y, 0);
        assert_eq!(out.box_model.virtual_height, 2);
    }

    #[test]
    fn test_stack_children_sit_at_offsets() {
        let mut badge = fixed(4, 2);
        badge.style.offset = (-2, 1);
        let root = LayoutNode::default()
            .with_kind(NodeKind::Stack)
            .with_children(vec![fixed(10, 10), badge]);
        let out = TaffyEngine.layout(&root, Constraints::tight(10, 10));

        let b = &out.children[1].box_model;
        assert_eq!((b.x, b.y, b.width, b.height), (-2, 1, 4, 2));
    }

    #[test]
    fn test_children_count_mirrors_tree() {
        let root = LayoutNode::default().with_children(vec![fixed(1, 1), fixed(1, 1), fixed(1, 1)]);
        let out = TaffyEngine.layout(&root, Constraints::tight(5, 5));
        assert_eq!(out.children.len(), 3);
    }
}
