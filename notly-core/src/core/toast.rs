//! In-app notification toasts with pausable auto-dismiss.
//!
//! # Responsibility
//!
//! Holds the visible toast list (newest first, capped at [`TOAST_LIMIT`])
//! and drives their lifecycle through two [`TimerRegistry`] instances: one
//! for auto-dismiss countdowns, one for the short post-dismiss linger that
//! lets the exit animation play before a toast leaves the list.
//!
//! # Invariants
//!
//! - At most [`TOAST_LIMIT`] toasts are held; pushing beyond that evicts the
//!   oldest and cancels its timers.
//! - Hovering pauses the dismiss countdown without losing progress, so a
//!   toast's live time equals its duration plus any paused intervals.
//! - A dismissed toast stays in the list (closed) for
//!   [`TOAST_REMOVE_DELAY`] before removal.
//!
//! Nothing here is persisted; toasts are session-only.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::timer::TimerRegistry;

/// Maximum number of simultaneously held toasts.
pub const TOAST_LIMIT: usize = 5;

/// How long a dismissed toast lingers (closed) before removal, covering the
/// exit animation.
pub const TOAST_REMOVE_DELAY: Duration = Duration::from_millis(300);

/// Visual style of a toast, each with its own auto-dismiss duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
    Success,
    Error,
    Warning,
    Info,
}

impl ToastVariant {
    /// Auto-dismiss duration used when the toast does not override it.
    /// Errors linger longest; success confirmations go quickly.
    pub fn default_duration(self) -> Duration {
        let millis = match self {
            Self::Default => 5_000,
            Self::Destructive => 6_000,
            Self::Success => 3_000,
            Self::Error => 6_000,
            Self::Warning => 5_000,
            Self::Info => 4_000,
        };
        Duration::from_millis(millis)
    }
}

/// A toast currently held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
    pub duration_ms: u64,
    /// `false` once dismissed; the toast then lingers briefly for its exit
    /// animation.
    pub open: bool,
}

/// Payload for [`ToastStore::push`]. The store assigns the id and fills the
/// duration from the variant when not overridden.
#[derive(Debug, Clone)]
pub struct NewToast {
    pub title: String,
    pub description: Option<String>,
    pub variant: ToastVariant,
    pub duration_ms: Option<u64>,
}

impl NewToast {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            variant: ToastVariant::Default,
            duration_ms: None,
        }
    }

    pub fn success(title: impl Into<String>) -> Self {
        Self { variant: ToastVariant::Success, ..Self::new(title) }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self { variant: ToastVariant::Error, ..Self::new(title) }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self { variant: ToastVariant::Info, ..Self::new(title) }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn duration_ms(mut self, millis: u64) -> Self {
        self.duration_ms = Some(millis);
        self
    }
}

/// Session store for toasts. Callers pass the current [`Instant`] into every
/// operation and poll [`ToastStore::tick`] to advance timers.
#[derive(Debug, Default)]
pub struct ToastStore {
    toasts: Vec<Toast>,
    dismiss_timers: TimerRegistry,
    removal_timers: TimerRegistry,
}

impl ToastStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a toast at the front of the list and starts its auto-dismiss
    /// countdown. Toasts beyond [`TOAST_LIMIT`] are evicted oldest-first,
    /// their timers cancelled. Returns the stored toast.
    pub fn push(&mut self, new: NewToast, now: Instant) -> Toast {
        let duration_ms = new
            .duration_ms
            .unwrap_or_else(|| new.variant.default_duration().as_millis() as u64);
        let toast = Toast {
            id: Uuid::new_v4().to_string(),
            title: new.title,
            description: new.description,
            variant: new.variant,
            duration_ms,
            open: true,
        };

        self.dismiss_timers
            .schedule(&toast.id, Duration::from_millis(duration_ms), now);
        self.toasts.insert(0, toast.clone());

        while self.toasts.len() > TOAST_LIMIT {
            if let Some(evicted) = self.toasts.pop() {
                self.dismiss_timers.cancel(&evicted.id);
                self.removal_timers.cancel(&evicted.id);
            }
        }
        toast
    }

    /// Closes the toast and schedules its removal after
    /// [`TOAST_REMOVE_DELAY`]. No-op for unknown or already-closed ids.
    pub fn dismiss(&mut self, id: &str, now: Instant) {
        let Some(toast) = self.toasts.iter_mut().find(|t| t.id == id) else {
            return;
        };
        if !toast.open {
            return;
        }
        toast.open = false;
        self.dismiss_timers.cancel(id);
        self.removal_timers.schedule(id, TOAST_REMOVE_DELAY, now);
    }

    /// Freezes the auto-dismiss countdown (e.g. while hovered).
    pub fn pause(&mut self, id: &str, now: Instant) {
        self.dismiss_timers.pause(id, now);
    }

    /// Resumes a paused countdown from its frozen remainder.
    pub fn resume(&mut self, id: &str, now: Instant) {
        self.dismiss_timers.resume(id, now);
    }

    /// Advances both timer sets: due dismiss timers close their toasts (and
    /// start removal timers), due removal timers drop theirs from the list.
    /// Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;

        for id in self.dismiss_timers.due(now) {
            self.dismiss(&id, now);
            changed = true;
        }
        for id in self.removal_timers.due(now) {
            self.toasts.retain(|t| t.id != id);
            changed = true;
        }
        changed
    }

    /// Drops the toast immediately, skipping the linger.
    pub fn remove(&mut self, id: &str) {
        self.dismiss_timers.cancel(id);
        self.removal_timers.cancel(id);
        self.toasts.retain(|t| t.id != id);
    }

    /// Drops every toast and all timers.
    pub fn clear(&mut self) {
        self.toasts.clear();
        self.dismiss_timers.clear();
        self.removal_timers.clear();
    }

    /// Toasts newest-first.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn get(&self, id: &str) -> Option<&Toast> {
        self.toasts.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_push_fills_duration_from_variant() {
        let t0 = Instant::now();
        let mut store = ToastStore::new();

        let success = store.push(NewToast::success("Saved"), t0);
        assert_eq!(success.duration_ms, 3_000);
        assert!(success.open);

        let overridden = store.push(NewToast::error("Boom").duration_ms(10_000), t0);
        assert_eq!(overridden.duration_ms, 10_000);
        assert_eq!(overridden.variant, ToastVariant::Error);
    }

    #[test]
    fn test_newest_first_and_eviction_at_limit() {
        let t0 = Instant::now();
        let mut store = ToastStore::new();

        let first = store.push(NewToast::new("toast 1"), t0);
        for i in 2..=6 {
            store.push(NewToast::new(format!("toast {i}")), t0);
        }

        assert_eq!(store.len(), TOAST_LIMIT);
        assert_eq!(store.toasts()[0].title, "toast 6");
        assert!(store.get(&first.id).is_none());
    }

    #[test]
    fn test_auto_dismiss_then_removal() {
        let t0 = Instant::now();
        let mut store = ToastStore::new();
        let toast = store.push(NewToast::success("Saved"), t0);

        assert!(!store.tick(t0 + 2_999 * MS));

        // Countdown expires: closed but still listed for the exit animation.
        assert!(store.tick(t0 + 3_000 * MS));
        let lingering = store.get(&toast.id).unwrap();
        assert!(!lingering.open);

        assert!(store.tick(t0 + 3_000 * MS + TOAST_REMOVE_DELAY));
        assert!(store.get(&toast.id).is_none());
    }

    #[test]
    fn test_pause_extends_live_time_by_paused_interval() {
        let t0 = Instant::now();
        let mut store = ToastStore::new();
        let toast = store.push(NewToast::success("Saved"), t0);

        // Hover at 1s with 2s left; unhover at 5s.
        store.pause(&toast.id, t0 + 1_000 * MS);
        assert!(!store.tick(t0 + 4_000 * MS));
        store.resume(&toast.id, t0 + 5_000 * MS);

        assert!(!store.tick(t0 + 6_999 * MS));
        assert!(store.tick(t0 + 7_000 * MS));
        assert!(!store.get(&toast.id).unwrap().open);
    }

    #[test]
    fn test_manual_dismiss_lingers_before_removal() {
        let t0 = Instant::now();
        let mut store = ToastStore::new();
        let toast = store.push(NewToast::new("Heads up"), t0);

        store.dismiss(&toast.id, t0 + 500 * MS);
        assert!(!store.get(&toast.id).unwrap().open);

        assert!(!store.tick(t0 + 500 * MS + TOAST_REMOVE_DELAY - MS));
        assert!(store.tick(t0 + 500 * MS + TOAST_REMOVE_DELAY));
        assert!(store.is_empty());
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let t0 = Instant::now();
        let mut store = ToastStore::new();
        let toast = store.push(NewToast::new("Once"), t0);

        store.dismiss(&toast.id, t0);
        // A later second dismiss must not push the removal deadline out.
        store.dismiss(&toast.id, t0 + 200 * MS);

        assert!(store.tick(t0 + TOAST_REMOVE_DELAY));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_skips_linger() {
        let t0 = Instant::now();
        let mut store = ToastStore::new();
        let toast = store.push(NewToast::new("Gone"), t0);

        store.remove(&toast.id);
        assert!(store.is_empty());
        assert!(!store.tick(t0 + 60_000 * MS));
    }
}
