//! # ember-tui
//!
//! Reactive Terminal UI Framework for Rust.
//!
//! ## Architecture
//!
//! Widgets describe what they want to look like. Reactive [`Signal`]s remember
//! which widgets read them, and every change requests a frame. A frame runs
//! the whole pipeline from the root:
//! ```text
//! Signal::set → RenderScheduler → Builder (build + layout) → Compositor → floats → Terminal
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Rgba, Attr, Cell, Rect, BorderStyle)
//! - [`color`] - Paint (flat or per-cell providers) and alpha blending
//! - [`signal`] - Signals, observers, render scheduler, background tasks
//! - [`layout`] - Box model, layout tree, Taffy engine, text measurement
//! - [`widget`] - Widget trait, built nodes, built-in widgets
//! - [`state`] - Focus and scroll state
//! - [`pipeline`] - Build, clip, composite and float passes
//! - [`renderer`] - Frame buffer, diff renderer, terminal session
//! - [`app`] - The frame loop

pub mod app;
pub mod color;
pub mod config;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod renderer;
pub mod signal;
pub mod state;
pub mod types;
pub mod widget;

// Re-export commonly used items
pub use types::*;

pub use app::{App, Flow};
pub use color::{Paint, blend};
pub use config::RenderConfig;
pub use error::{Error, Result};

pub use signal::{AnySignal, RenderScheduler, Signal, TaskQueue, Tracker, Untracked};

pub use layout::{
    BoxModel, ComputedLayout, Constraints, Dimension, Edges, LayoutEngine, TaffyEngine,
};

pub use widget::{
    Block, Disabled, Floating, FocusTrap, Node, Text, Widget, WidgetKind, WidgetRef,
};

pub use state::{FocusManager, FocusState, ScrollState};

pub use pipeline::{
    AbsolutePosition, AnchorPoint, BuildContext, Builder, Compositor, FloatConfig, FloatLayer,
    Frame, Pipeline, RenderContext, RenderTree, WidgetRegistry,
};

pub use renderer::{DiffRenderer, FrameBuffer, Terminal};
