//! Quiet-interval buffering of free-text value edits.
//!
//! Keystrokes update a per-rule draft immediately; the draft is committed
//! only once no further keystroke arrived for the configured interval. Time
//! is passed in by the caller, so the debouncer never sleeps or spawns.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::types::NodeId;

/// Default quiet interval before a typed value is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(600);

/// A draft waiting for its quiet interval to elapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    pub rule: NodeId,
    /// Field the draft was typed against.
    pub field: String,
    /// Operator the draft was typed against.
    pub operator: String,
    pub draft: String,
    pub deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    pending: HashMap<NodeId, PendingCommit>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: HashMap::new(),
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a keystroke, replacing any earlier draft for `rule` and
    /// restarting its timer.
    pub fn input(&mut self, rule: NodeId, field: &str, operator: &str, text: &str, now: Instant) {
        let deadline = now + self.interval;
        trace!(%rule, ?deadline, "debounce scheduled");
        self.pending.insert(
            rule,
            PendingCommit {
                rule,
                field: field.to_owned(),
                operator: operator.to_owned(),
                draft: text.to_owned(),
                deadline,
            },
        );
    }

    /// The uncommitted text for `rule`, if any.
    #[must_use]
    pub fn draft(&self, rule: NodeId) -> Option<&str> {
        self.pending.get(&rule).map(|p| p.draft.as_str())
    }

    /// Drop the pending commit for `rule`.
    pub fn cancel(&mut self, rule: NodeId) -> Option<PendingCommit> {
        let dropped = self.pending.remove(&rule);
        if dropped.is_some() {
            trace!(%rule, "debounce cancelled");
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// The earliest pending deadline, for hosts that schedule their own wakeup.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Remove and return every commit whose deadline is at or before `now`,
    /// earliest first.
    pub fn due(&mut self, now: Instant) -> Vec<PendingCommit> {
        let ready: Vec<NodeId> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        let mut out: Vec<PendingCommit> = ready
            .into_iter()
            .filter_map(|id| self.pending.remove(&id))
            .collect();
        out.sort_by_key(|p| (p.deadline, p.rule));
        out
    }

    /// Remove and return every pending commit regardless of its deadline.
    pub fn drain(&mut self) -> Vec<PendingCommit> {
        let mut out: Vec<PendingCommit> = self.pending.drain().map(|(_, p)| p).collect();
        out.sort_by_key(|p| (p.deadline, p.rule));
        out
    }
}
