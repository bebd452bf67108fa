use axum::{middleware as axum_mw, routing::get, Router};
use std::future::Future;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::metrics::stream;
use crate::middleware::timing;
use crate::AppState;

/// Builds the dashboard `Router`: snapshot, SSE stream and health check.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // ── Dashboard ───────────────────────────────────────────
        .route("/api/dashboard", get(stream::get_dashboard))
        .route("/api/dashboard/stream", get(stream::dashboard_stream))
        // ── Health ──────────────────────────────────────────────
        .route("/health", get(health_check))
        .with_state(state)
        // ── Global middleware (applied bottom-up) ───────────────
        .layer(axum_mw::from_fn(timing::timing_middleware))
        .layer(CorsLayer::permissive())
}

/// Serve the dashboard until `signal` resolves.
///
/// When it does, `running` is cleared before axum starts draining, so open
/// SSE streams and the poll loop wind down instead of holding shutdown open.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    signal: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let running = state.running.clone();
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move {
            signal.await;
            running.store(false, Ordering::SeqCst);
        })
        .await
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::DashboardStore;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn test_state(refresh_period: Duration) -> Arc<AppState> {
        Arc::new(AppState {
            dashboard: Arc::new(DashboardStore::new()),
            running: Arc::new(AtomicBool::new(true)),
            refresh_period,
        })
    }

    async fn spawn_server() -> String {
        let state = test_state(Duration::from_secs(1));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });
        addr.to_string()
    }

    /// Minimal HTTP/1.0 GET so the test needs no client crate.
    async fn get(addr: &str, path: &str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        let mut socket = tokio::net::TcpStream::connect(addr).await.unwrap();
        socket
            .write_all(format!("GET {path} HTTP/1.0\r\nHost: test\r\n\r\n").as_bytes())
            .await
            .unwrap();
        let mut out = String::new();
        socket.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn health_and_empty_dashboard() {
        let addr = spawn_server().await;

        let health = get(&addr, "/health").await;
        assert!(health.contains(" 200 "));
        assert!(health.ends_with("OK"));

        let dash = get(&addr, "/api/dashboard").await;
        assert!(dash.contains(" 200 "));
        assert!(dash.to_ascii_lowercase().contains("x-response-time-us:"));
        let body = dash.split("\r\n\r\n").nth(1).unwrap();
        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert!(json["frame"].is_null());
        assert_eq!(json["stats"]["cycles"], 0);
    }

    #[tokio::test]
    async fn shutdown_ends_open_dashboard_stream() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let state = test_state(Duration::from_millis(50));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, state.clone(), async move {
            let _ = stop_rx.await;
        }));

        let mut socket = tokio::net::TcpStream::connect(addr).await.unwrap();
        socket
            .write_all(b"GET /api/dashboard/stream HTTP/1.1\r\nHost: test\r\n\r\n")
            .await
            .unwrap();
        let mut buf = vec![0u8; 4096];
        let n = socket.read(&mut buf).await.unwrap();
        assert!(String::from_utf8_lossy(&buf[..n]).contains(" 200 "));

        stop_tx.send(()).unwrap();
        let finished = tokio::time::timeout(Duration::from_secs(3), server).await;
        assert!(matches!(finished, Ok(Ok(Ok(())))));
        assert!(!state.running.load(Ordering::SeqCst));
        drop(socket);
    }
}
