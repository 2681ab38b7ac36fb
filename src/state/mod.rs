//! State
//!
//! Externally held interaction state the pipeline reads and updates:
//! - [`focus`] - tab order, focus traps, modal auto-focus
//! - [`scroll`] - per-container scroll offsets

pub mod focus;
pub mod scroll;

pub use focus::{FocusManager, FocusState, Focusable, SharedFocus};
pub use scroll::{LINE_SCROLL, PAGE_SCROLL_FACTOR, ScrollState, WHEEL_SCROLL};
