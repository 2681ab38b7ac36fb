//! Layout
//!
//! Box model geometry, the declarative layout tree, the [`LayoutEngine`]
//! seam and its taffy-backed implementation, and text measurement.

mod box_model;
mod engine;
mod style;
mod taffy_bridge;
mod text_measure;

pub use box_model::{BoxModel, ComputedLayout, Constraints, Edges};
pub use engine::LayoutEngine;
pub use style::{
    Align, Dimension, FlexDirection, Justify, LayoutNode, LayoutStyle, MeasureFn, NodeKind,
    Position,
};
pub use taffy_bridge::TaffyEngine;
pub use text_measure::{
    char_width, measure_text_height, string_width, trimmed_width, truncate_text, wrap_text,
};
