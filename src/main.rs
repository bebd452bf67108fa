use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};

mod config;
mod error;
mod logging;
mod metrics;
mod middleware;
mod netdata;
mod poller;
mod server;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    /// Latest frame and poll statistics; the poller publishes, the
    /// dashboard endpoints read.
    pub dashboard: Arc<metrics::DashboardStore>,

    /// Cleared on shutdown; the poll loop checks it on every tick.
    pub running: Arc<AtomicBool>,

    /// How often the SSE stream pushes a snapshot.
    pub refresh_period: Duration,
}

// Everything runs on one thread: the poll loop and the dashboard server
// take turns, and fetches inside a cycle never overlap.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration & logging ───────────────────────────────
    let cfg = config::MonitorConfig::from_env()?;
    let _log_guard = logging::init(cfg.log_dir.as_deref());

    info!(
        netdata = %format!("{}:{}", cfg.host, cfg.port),
        poll_ms = cfg.poll_interval.as_millis() as u64,
        "router monitor starting"
    );

    // ── 2. Build shared state ────────────────────────────────────
    let state = Arc::new(AppState {
        dashboard: Arc::new(metrics::DashboardStore::new()),
        running: Arc::new(AtomicBool::new(true)),
        refresh_period: cfg.poll_interval,
    });

    // ── 3. Spawn the poll loop ───────────────────────────────────
    let fetcher = netdata::HttpFetcher::new(&cfg.host, &cfg.port, cfg.body_limit);
    let cycle = poller::PollCycle::new(fetcher, cfg.charts.clone());
    let poll_handle = tokio::spawn(poller::run(
        cycle,
        state.dashboard.clone(),
        cfg.poll_interval,
        state.running.clone(),
    ));

    // ── 4. Bind & serve the dashboard ────────────────────────────
    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind dashboard on {}", cfg.listen_addr))?;
    info!(addr = %cfg.listen_addr, "dashboard → /api/dashboard, /api/dashboard/stream");

    let running = state.running.clone();
    let served = server::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        info!("shutdown requested");
    })
    .await;

    // ── 5. Drain ─────────────────────────────────────────────────
    // Already cleared on ctrl-c; this covers the server failing on its own.
    // The poll loop notices the flag on its next tick.
    running.store(false, Ordering::SeqCst);
    let _ = poll_handle.await;
    served.context("dashboard server exited with error")
}
