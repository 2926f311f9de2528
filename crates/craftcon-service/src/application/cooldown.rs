//! Per-caller cooldown gate for rate-limited operations.
//!
//! Purely a local in-memory check – no I/O, no timers.  The gate records the
//! last accepted request per key and rejects anything inside the window,
//! reporting how long the caller still has to wait.
//!
//! Entries are garbage-collected opportunistically: only once the table
//! grows past a size threshold, and only entries older than a fixed horizon.
//! Eager collection would put an extra scan on the hot path for no benefit –
//! stale entries are harmless until the table is large.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Table size above which a garbage-collection pass runs on insert.
const GC_THRESHOLD: usize = 1000;

/// Entries older than this are dropped during a collection pass.
const GC_HORIZON: Duration = Duration::from_secs(60 * 60);

/// Outcome of a [`CooldownGate::try_admit`] check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request is admitted; the caller's timestamp was updated.
    Accepted,
    /// The request is rejected; the caller must wait this long.
    RejectedFor(Duration),
}

impl Admission {
    /// `true` for the [`Admission::Accepted`] variant.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted)
    }
}

/// Per-key rate limiter admitting at most one accepted request per window.
///
/// Shared between worker tasks behind an `Arc`; the mutex makes the
/// check-and-record step atomic per call, so two concurrent requests with
/// the same key cannot both be admitted inside one window.
#[derive(Default)]
pub struct CooldownGate {
    entries: Mutex<HashMap<String, Instant>>,
}

impl CooldownGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits or rejects a request for `key` under the given window.
    ///
    /// On acceptance the current time is recorded for the key.  On rejection
    /// the recorded timestamp is left untouched – only *accepted* requests
    /// start a new window.
    pub fn try_admit(&self, key: &str, window: Duration) -> Admission {
        let mut entries = self.entries.lock().expect("cooldown table poisoned");
        let now = Instant::now();

        if let Some(last) = entries.get(key) {
            let elapsed = now.duration_since(*last);
            if elapsed < window {
                return Admission::RejectedFor(window - elapsed);
            }
        }

        entries.insert(key.to_string(), now);

        if entries.len() > GC_THRESHOLD {
            entries.retain(|_, last| now.duration_since(*last) < GC_HORIZON);
        }

        Admission::Accepted
    }

    /// Number of tracked keys.  Diagnostic only.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cooldown table poisoned").len()
    }

    /// `true` when no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
