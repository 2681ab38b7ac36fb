//! Renderer
//!
//! The cell grid a frame paints into and the terminal output side:
//! - [`FrameBuffer`] - 2D grid of cells
//! - [`DiffRenderer`] - writes only changed cells
//! - [`Terminal`] - raw-mode session guard

mod buffer;
mod diff;
mod terminal;

pub use buffer::FrameBuffer;
pub use diff::DiffRenderer;
pub use terminal::Terminal;
