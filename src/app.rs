//! App - the cooperative frame loop.
//!
//! One thread runs everything: apply finished background work, render when a
//! frame was requested (or the terminal resized), present, then wait up to one
//! frame interval for an event and route it.
//!
//! # Example
//!
//! ```ignore
//! use ember_tui::app::{App, Flow};
//! use ember_tui::signal::RenderScheduler;
//! use ember_tui::widget::{Block, Text};
//! use crossterm::event::{Event, KeyCode};
//!
//! let scheduler = RenderScheduler::new();
//! let root = Block::new().child(Text::new("hello")).into_ref();
//! App::new(root, &scheduler).run(|event, _frame| match event {
//!     Event::Key(key) if key.code == KeyCode::Char('q') => Flow::Exit,
//!     _ => Flow::Continue,
//! })?;
//! ```

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};

use crate::config::RenderConfig;
use crate::pipeline::{Frame, Pipeline, path_within};
use crate::renderer::Terminal;
use crate::signal::{RenderScheduler, TaskQueue};
use crate::state::{FocusManager, FocusState};
use crate::widget::WidgetRef;

/// What the user handler wants after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A root widget wired to a pipeline, focus state and task queue.
pub struct App {
    root: WidgetRef,
    pipeline: Pipeline,
    focus: Arc<FocusState>,
    tasks: Option<TaskQueue>,
}

impl App {
    pub fn new(root: WidgetRef, scheduler: &RenderScheduler) -> Self {
        let focus = Arc::new(FocusState::new(scheduler));
        Self {
            root,
            pipeline: Pipeline::new(scheduler).with_focus(focus.clone()),
            focus,
            tasks: None,
        }
    }

    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.pipeline = self.pipeline.with_config(config);
        self
    }

    /// Apply this queue's finished work before every frame.
    pub fn with_tasks(mut self, tasks: TaskQueue) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn focus(&self) -> &Arc<FocusState> {
        &self.focus
    }

    /// Apply finished background work. Returns how many results were applied.
    pub fn apply_tasks(&self) -> usize {
        self.tasks.as_ref().map_or(0, TaskQueue::apply_completed)
    }

    pub fn render(&self, width: u16, height: u16) -> Frame {
        self.pipeline.render(&self.root, width, height)
    }

    /// Built-in routing: float dismissal, key bubbling, tab navigation and
    /// click-to-focus. Returns whether the event was consumed.
    pub fn dispatch(&self, event: &Event, frame: &Frame) -> bool {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.code == KeyCode::Esc && frame.floats.dismiss_on_escape() {
                    return true;
                }

                let handlers = self
                    .focus
                    .focused()
                    .and_then(|id| frame.focusables.iter().find(|f| f.id == id))
                    .map(|f| f.handlers.as_slice())
                    .unwrap_or_default();
                if handlers.iter().any(|w| w.on_key(key)) {
                    return true;
                }

                match key.code {
                    KeyCode::Tab => self.focus.focus_next(),
                    KeyCode::BackTab => self.focus.focus_previous(),
                    _ => false,
                }
            }
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
                let (x, y) = (i32::from(mouse.column), i32::from(mouse.row));
                if frame.floats.dismiss_on_click(x, y) {
                    return true;
                }
                // Nearest focusable under the pointer, without leaving the
                // float that was hit.
                let scope = frame.floats.hit_test(x, y).map(|f| f.path());
                frame
                    .registry
                    .hit_chain(x, y)
                    .into_iter()
                    .filter(|hit| scope.is_none_or(|p| path_within(&hit.path, p)))
                    .any(|hit| self.focus.focus(&hit.id))
            }
            _ => false,
        }
    }

    /// Run until `handler` returns [`Flow::Exit`]. Every event reaches the
    /// handler after built-in routing.
    pub fn run(self, mut handler: impl FnMut(&Event, &Frame) -> Flow) -> crate::Result<()> {
        let config = self.pipeline.config().clone();
        let scheduler = self.pipeline.scheduler().clone();
        let mut terminal = Terminal::open(&config)?;

        let mut size = terminal.size()?;

        self.apply_tasks();
        let mut frame = self.render(size.0, size.1);
        terminal.present(&frame.buffer)?;

        loop {
            self.apply_tasks();

            let current = terminal.size()?;
            if current != size {
                size = current;
                terminal.invalidate();
                scheduler.schedule();
            }
            if scheduler.is_pending() {
                frame = self.render(size.0, size.1);
                terminal.present(&frame.buffer)?;
            }

            let Some(event) = terminal.poll_event(config.frame_interval)? else {
                continue;
            };
            if let Event::Resize(..) = event {
                scheduler.schedule();
            }

            self.dispatch(&event, &frame);
            if handler(&event, &frame) == Flow::Exit {
                break;
            }
        }

        terminal.restore()
    }
}
