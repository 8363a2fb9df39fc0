//! Keyed countdown timers with pause/resume.
//!
//! # Responsibility
//!
//! Tracks one countdown per string key (toast auto-dismiss uses the toast id)
//! and reports which keys have expired when polled. The registry never
//! spawns threads or sleeps; callers pass the current [`Instant`] into every
//! operation, which keeps expiry deterministic under test.
//!
//! # Invariants
//!
//! - At most one timer exists per key. Scheduling an already-tracked key is
//!   a no-op; the original deadline stands.
//! - Pausing freezes the remaining duration. Resuming continues from exactly
//!   that remainder, so time spent paused never counts against the timer.
//! - A fired or cancelled key is forgotten and can be scheduled again.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
enum TimerState {
    /// Counting down; fires once `started_at + remaining` passes.
    Running { started_at: Instant, remaining: Duration },
    /// Frozen with `remaining` still on the clock.
    Paused { remaining: Duration },
}

/// Registry of keyed countdowns, polled via [`TimerRegistry::due`].
#[derive(Debug, Default)]
pub struct TimerRegistry {
    timers: HashMap<String, TimerState>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a countdown for `key`. If the key already has a timer (running
    /// or paused) the call is a no-op.
    pub fn schedule(&mut self, key: &str, duration: Duration, now: Instant) {
        if self.timers.contains_key(key) {
            return;
        }
        self.timers.insert(
            key.to_string(),
            TimerState::Running { started_at: now, remaining: duration },
        );
    }

    /// Freezes the countdown for `key`, keeping the time left. No-op if the
    /// key is untracked or already paused.
    pub fn pause(&mut self, key: &str, now: Instant) {
        if let Some(state) = self.timers.get_mut(key) {
            if let TimerState::Running { started_at, remaining } = *state {
                let elapsed = now.saturating_duration_since(started_at);
                *state = TimerState::Paused { remaining: remaining.saturating_sub(elapsed) };
            }
        }
    }

    /// Restarts a paused countdown from its frozen remainder. No-op if the
    /// key is untracked or already running.
    pub fn resume(&mut self, key: &str, now: Instant) {
        if let Some(state) = self.timers.get_mut(key) {
            if let TimerState::Paused { remaining } = *state {
                *state = TimerState::Running { started_at: now, remaining };
            }
        }
    }

    /// Drops the timer for `key`, if any.
    pub fn cancel(&mut self, key: &str) {
        self.timers.remove(key);
    }

    /// Drops every timer.
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Whether `key` has a timer, running or paused.
    pub fn is_scheduled(&self, key: &str) -> bool {
        self.timers.contains_key(key)
    }

    pub fn is_paused(&self, key: &str) -> bool {
        matches!(self.timers.get(key), Some(TimerState::Paused { .. }))
    }

    /// Time left for `key` as of `now`, or `None` if untracked.
    pub fn remaining(&self, key: &str, now: Instant) -> Option<Duration> {
        match self.timers.get(key)? {
            TimerState::Running { started_at, remaining } => {
                let elapsed = now.saturating_duration_since(*started_at);
                Some(remaining.saturating_sub(elapsed))
            }
            TimerState::Paused { remaining } => Some(*remaining),
        }
    }

    /// Removes and returns every key whose countdown has expired as of
    /// `now`, ordered by deadline (earliest first). Paused timers never
    /// expire.
    pub fn due(&mut self, now: Instant) -> Vec<String> {
        let mut expired: Vec<(Instant, String)> = self
            .timers
            .iter()
            .filter_map(|(key, state)| match state {
                TimerState::Running { started_at, remaining } => {
                    let deadline = *started_at + *remaining;
                    (deadline <= now).then(|| (deadline, key.clone()))
                }
                TimerState::Paused { .. } => None,
            })
            .collect();
        expired.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        for (_, key) in &expired {
            self.timers.remove(key);
        }
        expired.into_iter().map(|(_, key)| key).collect()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
