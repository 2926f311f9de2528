//! Periodic status refresh for registered subscriptions.
//!
//! A subscription pairs an opaque key with a delivery sink.  On every tick
//! the scheduler takes a fresh [`ServerSnapshot`] per subscription and hands
//! it to the sink.  The sink – not the scheduler – knows whether its
//! delivery target still exists:
//!
//! - [`DeliveryOutcome::Delivered`] keeps the subscription and stamps its
//!   refresh time.
//! - [`DeliveryOutcome::TargetGone`] removes the subscription permanently.
//!
//! A *snapshot* failure (server unreachable, protocol error) is neither: the
//! subscription is retained and retried on the next tick.  Transient server
//! downtime must never silently drop a subscriber; only an explicit
//! "the delivery target is gone" signal does.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use craftcon_core::domain::status::ServerSnapshot;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::command_service::RconCommandService;

/// Result of handing a snapshot to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The snapshot reached its target.
    Delivered,
    /// The target no longer exists; the subscription should be removed.
    TargetGone,
}

/// Capability for delivering snapshots to wherever a subscriber lives
/// (a status page, a log, a message channel owned by some front end).
///
/// Modelled as a trait with two outcomes instead of a concrete handle so the
/// scheduler's removal logic is testable without any presentation layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Delivers one snapshot, reporting whether the target still exists.
    async fn deliver(&self, snapshot: &ServerSnapshot) -> DeliveryOutcome;
}

struct Subscription {
    sink: Arc<dyn SnapshotSink>,
    last_refreshed: Option<Instant>,
}

/// Fixed-interval refresh driver over a registry of subscriptions.
pub struct RefreshScheduler {
    service: Arc<RconCommandService>,
    subscriptions: Mutex<HashMap<String, Subscription>>,
}

impl RefreshScheduler {
    /// Creates a scheduler over the given command service.
    pub fn new(service: Arc<RconCommandService>) -> Self {
        Self {
            service,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Registers (or replaces) the subscription for `key`.
    pub async fn register(&self, key: impl Into<String>, sink: Arc<dyn SnapshotSink>) {
        let key = key.into();
        info!("registered status subscription {key}");
        self.subscriptions.lock().await.insert(
            key,
            Subscription {
                sink,
                last_refreshed: None,
            },
        );
    }

    /// Removes the subscription for `key`.  Returns `false` when no such
    /// subscription existed.
    pub async fn unregister(&self, key: &str) -> bool {
        let removed = self.subscriptions.lock().await.remove(key).is_some();
        if removed {
            info!("unregistered status subscription {key}");
        }
        removed
    }

    /// Number of live subscriptions.
    pub async fn subscription_count(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    /// When the subscription for `key` last received a snapshot.
    pub async fn last_refreshed(&self, key: &str) -> Option<Instant> {
        self.subscriptions
            .lock()
            .await
            .get(key)
            .and_then(|sub| sub.last_refreshed)
    }

    /// Runs one refresh pass over every registered subscription.
    ///
    /// Snapshots are taken per subscription on independent connections; one
    /// subscriber's failure cannot corrupt another's request/response
    /// correlation.
    pub async fn refresh_all(&self) {
        // Collect targets first so the registry lock is not held across the
        // network round trips.
        let targets: Vec<(String, Arc<dyn SnapshotSink>)> = self
            .subscriptions
            .lock()
            .await
            .iter()
            .map(|(key, sub)| (key.clone(), Arc::clone(&sub.sink)))
            .collect();

        if targets.is_empty() {
            return;
        }
        debug!("refreshing {} status subscription(s)", targets.len());

        for (key, sink) in targets {
            match self.service.snapshot().await {
                Ok(snapshot) => match sink.deliver(&snapshot).await {
                    DeliveryOutcome::Delivered => {
                        if let Some(sub) = self.subscriptions.lock().await.get_mut(&key) {
                            sub.last_refreshed = Some(Instant::now());
                        }
                    }
                    DeliveryOutcome::TargetGone => {
                        self.subscriptions.lock().await.remove(&key);
                        info!("removed unreachable status subscription {key}");
                    }
                },
                Err(e) => {
                    // Retained: the next tick retries naturally.
                    warn!("status refresh for {key} failed, retrying next tick: {e}");
                }
            }
        }
    }

    /// Spawns the fixed-interval refresh loop.
    ///
    /// The first refresh runs one full interval after the call, then every
    /// interval until `running` is cleared.
    pub fn spawn(
        self: Arc<Self>,
        interval: Duration,
        running: Arc<AtomicBool>,
    ) -> tokio::task::JoinHandle<()> {
        info!("starting status refresh loop (every {interval:?})");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                self.refresh_all().await;
            }
            info!("status refresh loop stopped");
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
//
// Delivery and removal against a live fake server are covered in
// `tests/rcon_integration.rs`; these tests pin the registry behaviour and
// the failure-retention rule.
