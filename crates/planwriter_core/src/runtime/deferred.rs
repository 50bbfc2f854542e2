//! Single-slot deferred work: debounce timers and superseding frame tasks.
//!
//! # Invariants
//! - At most one pending timer per `Debouncer` and one pending frame per
//!   `FrameSlot`; arming again cancels the previous one in the scheduler.
//! - `complete` only accepts the handle that is currently pending.

use crate::runtime::scheduler::{FrameHandle, Scheduler, TimerHandle};
use std::time::Duration;

/// Cancel-and-reschedule timer with a fixed quiet period.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<TimerHandle>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arms the timer, cancelling any pending one.
    pub fn arm<T>(&mut self, scheduler: &mut Scheduler<T>, task: T) -> TimerHandle {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel_timer(previous);
        }
        let handle = scheduler.schedule_after(self.delay, task);
        self.pending = Some(handle);
        handle
    }

    /// Cancels the pending timer, if any.
    pub fn cancel<T>(&mut self, scheduler: &mut Scheduler<T>) -> bool {
        match self.pending.take() {
            Some(handle) => scheduler.cancel_timer(handle),
            None => false,
        }
    }

    /// Marks `handle` as fired. Returns `false` for a superseded handle.
    pub fn complete(&mut self, handle: TimerHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Latest-wins animation-frame task.
#[derive(Debug, Default)]
pub struct FrameSlot {
    pending: Option<FrameHandle>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a frame task, cancelling the previously requested one.
    pub fn replace<T>(&mut self, scheduler: &mut Scheduler<T>, task: T) -> FrameHandle {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel_frame(previous);
        }
        let handle = scheduler.request_frame(task);
        self.pending = Some(handle);
        handle
    }

    pub fn cancel<T>(&mut self, scheduler: &mut Scheduler<T>) -> bool {
        match self.pending.take() {
            Some(handle) => scheduler.cancel_frame(handle),
            None => false,
        }
    }

    /// Marks `handle` as run. Returns `false` for a superseded handle.
    pub fn complete(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
