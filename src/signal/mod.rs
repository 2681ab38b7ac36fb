//! Reactive state cells and frame scheduling.
//!
//! A [`Signal`] remembers which build-phase [`Observer`]s read it. Setting a
//! new value marks those observers dirty and asks the [`RenderScheduler`] for
//! a frame. Bursts of mutations coalesce into a single pending request.
//!
//! Dependency tracking is explicit: `get` takes a [`Tracker`] (the build
//! context during a frame, [`Untracked`] elsewhere) instead of consulting a
//! global "currently building" pointer.

mod cell;
mod observer;
mod scheduler;
mod task;

pub use cell::{AnySignal, Signal};
pub use observer::{Observer, ObserverId, ObserverPool, Tracker, Untracked};
pub use scheduler::RenderScheduler;
pub use task::{Settable, TaskQueue};
