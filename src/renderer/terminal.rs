//! Terminal session guard.
//!
//! Entering raw mode (and optionally the alternate screen and mouse capture)
//! on open, restoring everything on drop.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};

use super::diff::DiffRenderer;
use super::buffer::FrameBuffer;
use crate::config::RenderConfig;

/// An open terminal session. Restores the terminal when dropped.
pub struct Terminal {
    renderer: DiffRenderer<Stdout>,
    alt_screen: bool,
    mouse_capture: bool,
    restored: bool,
}

impl Terminal {
    pub fn open(config: &RenderConfig) -> crate::Result<Self> {
        terminal::enable_raw_mode()?;

        // From here on, dropping `session` undoes whatever was entered.
        let mut session = Self {
            renderer: DiffRenderer::new(io::stdout()),
            alt_screen: false,
            mouse_capture: false,
            restored: false,
        };
        let out = session.renderer.writer_mut();
        if config.alt_screen {
            execute!(out, EnterAlternateScreen)?;
            session.alt_screen = true;
        }
        if config.mouse_capture {
            execute!(out, EnableMouseCapture)?;
            session.mouse_capture = true;
        }
        execute!(out, Hide, Clear(ClearType::All))?;

        let (width, height) = terminal::size()?;
        log::info!(
            "terminal session started at {width}x{height} (alt_screen={}, mouse={})",
            config.alt_screen,
            config.mouse_capture
        );
        Ok(session)
    }

    /// Current size in cells.
    pub fn size(&self) -> crate::Result<(u16, u16)> {
        Ok(terminal::size()?)
    }

    /// Wait up to `timeout` for an input event.
    pub fn poll_event(&self, timeout: Duration) -> crate::Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }

    /// Present a frame, writing only changed cells.
    pub fn present(&mut self, buffer: &FrameBuffer) -> crate::Result<usize> {
        self.renderer.present(buffer)
    }

    /// Force the next present to redraw everything.
    pub fn invalidate(&mut self) {
        self.renderer.invalidate();
    }

    /// Leave the session early, reporting failures.
    pub fn restore(&mut self) -> crate::Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;

        let out = self.renderer.writer_mut();
        if self.mouse_capture {
            execute!(out, DisableMouseCapture)?;
        }
        execute!(out, Show)?;
        if self.alt_screen {
            execute!(out, LeaveAlternateScreen)?;
        }
        terminal::disable_raw_mode()?;
        out.flush()?;

        log::info!("terminal session ended");
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            log::warn!("failed to restore terminal: {err}");
        }
    }
}
