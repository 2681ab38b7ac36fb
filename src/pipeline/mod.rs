//! Rendering Pipeline
//!
//! Turns a widget tree into painted cells, once per frame.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Widget tree → Builder (build + layout) → RenderTree → Compositor → FrameBuffer
//!                     ↓                                      ↓
//!               FloatCollector  ───────────────→  float pass (size, place, paint)
//! ```
//!
//! ## Data Flow
//!
//! 1. **Builder** - builds each widget with a [`BuildContext`], resolves its
//!    identity, collects focusables, asks the layout engine for geometry and
//!    recurses into children with tight constraints
//! 2. **Compositor** - walks the [`RenderTree`] painting backgrounds, borders,
//!    content and children through clipped [`RenderContext`]s, recording every
//!    painted widget in the [`WidgetRegistry`]
//! 3. **Float pass** - sizes each queued float, places it against its anchor
//!    or the screen, clamps it on screen and paints it on top
//!
//! ## Key Design Principles
//!
//! - **Frame-scoped**: trees, contexts, registry and float queue live for one frame
//! - **Explicit tracking**: the build context is the signal subscriber; there is no
//!   global "current node"
//! - **Clip only shrinks**: every derived context's clip lies inside its parent's

pub mod build;
pub mod compositor;
pub mod context;
pub mod float;
pub mod frame;
pub mod registry;
pub mod render_context;

// Re-exports
pub use build::{BuildSummary, Builder, RenderTree};
pub use compositor::Compositor;
pub use context::BuildContext;
pub use float::{
    AbsolutePosition, AnchorPoint, DismissFn, DismissRules, FloatCollector, FloatConfig,
    FloatEntry, FloatLayer, Placement, clamp_to_screen, resolve_rect,
};
pub use frame::{Frame, Pipeline};
pub use registry::{RegistryEntry, WidgetRegistry, path_within};
pub use render_context::{BgSampler, RenderContext};
