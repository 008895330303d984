//! Auto-skip timer: advances to the next media after a per-item delay.
//!
//! A single pending slot per player. Every arm bumps a generation counter and
//! the fire callback receives the generation it was armed with, so a firing
//! that races with a newer `arm`/`cancel` can be recognised as stale by the
//! owner with [`AutoSkipTimer::is_current`].

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::warn;

#[derive(Debug)]
struct ArmedTimer {
    generation: u64,
    deadline: Instant,
    task: JoinHandle<()>,
}

/// One-shot, cancellable, pausable auto-skip timer.
#[derive(Debug, Default)]
pub struct AutoSkipTimer {
    generation: u64,
    armed: Option<ArmedTimer>,
    /// Remaining delay kept while playback is paused.
    suspended: Option<Duration>,
}

impl AutoSkipTimer {
    /// Creates a new inactive timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer, cancelling any previously armed one.
    ///
    /// Must be called from within a tokio runtime. Returns the generation
    /// passed to `on_fire`.
    pub fn arm<F>(&mut self, delay: Duration, on_fire: F) -> u64
    where
        F: FnOnce(u64) + Send + 'static,
    {
        self.cancel();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let Some(deadline) = Instant::now().checked_add(delay) else {
            warn!(?delay, generation, "Auto-skip delay out of clock range, timer not armed");
            return generation;
        };

        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            on_fire(generation);
        });

        self.armed = Some(ArmedTimer {
            generation,
            deadline,
            task,
        });
        generation
    }

    /// Cancels the pending timer, if any. A firing already queued by the
    /// old generation will be reported stale by `is_current`.
    pub fn cancel(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.task.abort();
        }
        self.suspended = None;
    }

    /// True if `generation` belongs to the timer that is still armed.
    pub fn is_current(&self, generation: u64) -> bool {
        self.armed
            .as_ref()
            .is_some_and(|armed| armed.generation == generation)
    }

    /// Acknowledges a firing; returns false (and changes nothing) when the
    /// generation is stale.
    pub fn acknowledge(&mut self, generation: u64) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        self.armed = None;
        true
    }

    /// Stops the countdown and remembers the remaining delay.
    pub fn suspend(&mut self) {
        if let Some(remaining) = self.remaining() {
            self.cancel();
            self.suspended = Some(remaining);
        }
    }

    /// Re-arms a suspended countdown with its remaining delay.
    ///
    /// Returns `None` when nothing was suspended.
    pub fn resume<F>(&mut self, on_fire: F) -> Option<u64>
    where
        F: FnOnce(u64) + Send + 'static,
    {
        let remaining = self.suspended.take()?;
        Some(self.arm(remaining, on_fire))
    }

    /// Returns true if a countdown is running.
    pub fn is_active(&self) -> bool {
        self.armed.is_some()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended.is_some()
    }

    /// Remaining delay kept by `suspend`, if any.
    pub fn suspended_remaining(&self) -> Option<Duration> {
        self.suspended
    }

    /// Returns the remaining delay, or None if no countdown is running.
    pub fn remaining(&self) -> Option<Duration> {
        self.armed
            .as_ref()
            .map(|armed| armed.deadline.saturating_duration_since(Instant::now()))
    }
}

impl Drop for AutoSkipTimer {
    fn drop(&mut self) {
        if let Some(armed) = self.armed.take() {
            armed.task.abort();
        }
    }
}
