use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use std::convert::Infallible;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;

use super::collector::DashboardSnapshot;
use crate::AppState;

// ─── GET /api/dashboard ──────────────────────────────────────────
/// Returns a single JSON snapshot, handy for curl.

pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardSnapshot> {
    Json(state.dashboard.snapshot())
}

// ─── GET /api/dashboard/stream ───────────────────────────────────
/// Server-Sent Events endpoint.
/// Pushes a full `DashboardSnapshot` as JSON once per poll period, so a
/// browser display refreshes in step with the poller. The stream ends on the
/// first tick after shutdown clears `running`, which lets graceful shutdown
/// finish.

pub async fn dashboard_stream(
    State(state): State<Arc<AppState>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let interval = tokio::time::interval(state.refresh_period);
    let running = state.running.clone();

    let stream = IntervalStream::new(interval)
        .take_while(move |_| running.load(Ordering::SeqCst))
        .map(move |_| {
            let snapshot = state.dashboard.snapshot();
            let json = serde_json::to_string(&snapshot).unwrap_or_default();
            Ok(Event::default().data(json))
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
