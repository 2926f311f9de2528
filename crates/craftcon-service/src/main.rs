//! Craftcon service entry point.
//!
//! Wires together configuration, the RCON command service, and the periodic
//! status refresh loop, then parks until a shutdown signal arrives.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- TOML from the platform config dir
//!  └─ RconCommandService     -- one ephemeral connection per operation
//!  └─ RefreshScheduler       -- periodic snapshot → LogSink
//!  └─ Ctrl-C handler         -- clears the shared running flag
//! ```
//!
//! The daemon has no interactive surface of its own; front ends (chat bots,
//! dashboards) link against `craftcon_service` as a library and register
//! their own snapshot sinks.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use craftcon_core::domain::status::ServerSnapshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use craftcon_service::application::command_service::RconCommandService;
use craftcon_service::application::refresh::{DeliveryOutcome, RefreshScheduler, SnapshotSink};
use craftcon_service::infrastructure::storage::load_config;

/// Sink that writes each snapshot to the log.  Its target is the process's
/// own log stream, which cannot go away, so it never reports `TargetGone`.
struct LogSink;

#[async_trait]
impl SnapshotSink for LogSink {
    async fn deliver(&self, snapshot: &ServerSnapshot) -> DeliveryOutcome {
        info!(
            "server status: {}/{} online {:?}, TPS {:.1}, version {}",
            snapshot.online_players,
            snapshot.max_players,
            snapshot.players,
            snapshot.ticks_per_second,
            snapshot.version
        );
        DeliveryOutcome::Delivered
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    // Initialise structured logging.  `RUST_LOG` overrides the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.daemon.log_level)),
        )
        .init();

    info!("Craftcon service starting");
    info!(
        "rcon endpoint {}:{} (timeout {}s)",
        config.server.host, config.server.port, config.server.timeout_secs
    );

    let service = Arc::new(RconCommandService::new(config.server.connection_settings()));

    // Startup probe.  Failure is not fatal – the server may simply not be up
    // yet, and every operation reconnects from scratch anyway.
    if service.test_connectivity().await {
        info!("rcon connectivity check passed");
    } else {
        warn!("rcon server unreachable at startup, continuing anyway");
    }

    // Shutdown flag shared across all background tasks.
    let running = Arc::new(AtomicBool::new(true));

    // ── Status refresh loop ───────────────────────────────────────────────────
    let scheduler = Arc::new(RefreshScheduler::new(Arc::clone(&service)));
    scheduler.register("status-log", Arc::new(LogSink)).await;
    let refresh_handle = Arc::clone(&scheduler).spawn(
        Duration::from_secs(config.refresh.interval_secs),
        Arc::clone(&running),
    );

    // ── Ctrl-C / SIGTERM handler ──────────────────────────────────────────────
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    info!("Craftcon service ready.  Press Ctrl-C to exit.");

    loop {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if !running.load(Ordering::Relaxed) {
            break;
        }
    }

    refresh_handle.abort();
    info!("Craftcon service stopped");
    Ok(())
}
