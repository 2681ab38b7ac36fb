//! Crate error type.
//!
//! The frame pipeline itself never fails; only terminal presentation and
//! explicit layout-engine calls surface errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("layout engine failed: {0}")]
    Layout(#[from] taffy::TaffyError),
}

pub type Result<T> = std::result::Result<T, Error>;
