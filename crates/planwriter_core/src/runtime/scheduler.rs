//! Cooperative task scheduler with a virtual clock.
//!
//! # Responsibility
//! - Hold one-shot timers and animation-frame tasks for a single-threaded host.
//! - Hand due work back to the owner instead of running callbacks itself.
//!
//! # Invariants
//! - Timers fire in deadline order; equal deadlines fire in scheduling order.
//! - A cancelled timer or frame task is removed and can never be returned.
//! - Frame tasks requested while a frame is being drained run on the next frame.
//! - The clock never moves backwards.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle of a scheduled one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Handle of a requested animation-frame task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Timer that came due, with the handle it was scheduled under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueTimer<T> {
    pub handle: TimerHandle,
    pub task: T,
}

/// Frame task ready to run, with the handle it was requested under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueFrame<T> {
    pub handle: FrameHandle,
    pub task: T,
}

/// Virtual-time scheduler driven by the host event loop.
#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<(u64, u64), T>,
    timer_deadlines: HashMap<u64, u64>,
    frames: Vec<(u64, T)>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            timers: BTreeMap::new(),
            timer_deadlines: HashMap::new(),
            frames: Vec::new(),
        }
    }

    /// Current virtual time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedules `task` to come due `delay` after now.
    pub fn schedule_after(&mut self, delay: Duration, task: T) -> TimerHandle {
        let id = self.allocate_id();
        let delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        let deadline = self.now_ms.saturating_add(delay_ms);
        self.timers.insert((deadline, id), task);
        self.timer_deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    /// Cancels a pending timer. Returns `false` when it already fired or was cancelled.
    pub fn cancel_timer(&mut self, handle: TimerHandle) -> bool {
        match self.timer_deadlines.remove(&handle.0) {
            Some(deadline) => self.timers.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }

    pub fn is_timer_pending(&self, handle: TimerHandle) -> bool {
        self.timer_deadlines.contains_key(&handle.0)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its deadline.
    pub fn pop_due(&mut self, until: u64) -> Option<DueTimer<T>> {
        let (&(deadline, id), _) = self.timers.iter().next()?;
        if deadline > until {
            return None;
        }
        let task = self.timers.remove(&(deadline, id))?;
        self.timer_deadlines.remove(&id);
        self.now_ms = self.now_ms.max(deadline);
        Some(DueTimer {
            handle: TimerHandle(id),
            task,
        })
    }

    /// Moves the clock forward to `now_ms` once all due timers are drained.
    pub fn settle(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Requests `task` to run on the next animation frame.
    pub fn request_frame(&mut self, task: T) -> FrameHandle {
        let id = self.allocate_id();
        self.frames.push((id, task));
        FrameHandle(id)
    }

    /// Cancels a requested frame task. Returns `false` when it already ran.
    pub fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        let before = self.frames.len();
        self.frames.retain(|(id, _)| *id != handle.0);
        self.frames.len() != before
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    /// Takes every task requested for the current frame, in request order.
    pub fn take_frame(&mut self) -> Vec<DueFrame<T>> {
        std::mem::take(&mut self.frames)
            .into_iter()
            .map(|(id, task)| DueFrame {
                handle: FrameHandle(id),
                task,
            })
            .collect()
    }

    /// Drops every pending timer and frame task.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.timer_deadlines.clear();
        self.frames.clear();
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
