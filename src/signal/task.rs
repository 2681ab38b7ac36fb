//! Background work that lands in a signal.
//!
//! A loader runs on its own thread and hands its result back through a
//! channel. The frame loop is the single consumer: it applies completed
//! results with `Signal::set`, so state only ever changes through the signal
//! layer.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use super::cell::{AnySignal, Signal};
use super::scheduler::RenderScheduler;

type Completion = Box<dyn FnOnce() + Send>;

/// A destination for a background result.
pub trait Settable<T>: Send + 'static {
    fn apply(&self, value: T);
}

impl<T: Clone + PartialEq + Send + 'static> Settable<T> for Signal<T> {
    fn apply(&self, value: T) {
        self.set(value);
    }
}

impl<T: Clone + Send + 'static> Settable<T> for AnySignal<T> {
    fn apply(&self, value: T) {
        self.set(value);
    }
}

/// Channel of completed background tasks.
pub struct TaskQueue {
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    scheduler: RenderScheduler,
}

impl TaskQueue {
    pub fn new(scheduler: &RenderScheduler) -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx,
            scheduler: scheduler.clone(),
        }
    }

    /// Run `work` on a named thread and deliver its result to `target`.
    ///
    /// The result is not visible until [`TaskQueue::apply_completed`] runs.
    pub fn spawn<T, W>(
        &self,
        name: &str,
        target: impl Settable<T>,
        work: W,
    ) -> crate::Result<JoinHandle<()>>
    where
        T: Send + 'static,
        W: FnOnce() -> T + Send + 'static,
    {
        let tx = self.tx.clone();
        let scheduler = self.scheduler.clone();
        let task_name = name.to_string();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let value = work();
                let completion: Completion = Box::new(move || target.apply(value));
                if tx.send(completion).is_ok() {
                    scheduler.schedule();
                } else {
                    log::debug!("task {task_name} finished after its queue was dropped");
                }
            })?;
        Ok(handle)
    }

    /// Apply every completed result. Returns how many were applied.
    pub fn apply_completed(&self) -> usize {
        let mut applied = 0;
        for completion in self.rx.try_iter() {
            completion();
            applied += 1;
        }
        applied
    }
}
