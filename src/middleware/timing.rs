use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::debug;

/// Adds `X-Response-Time-Us` to every response and logs API calls at
/// debug level. The SSE stream is skipped: its "response time" is only the
/// time to open the stream.
pub async fn timing_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let start = Instant::now();
    let mut response = next.run(req).await;
    let us = start.elapsed().as_micros();

    if let Ok(val) = us.to_string().parse() {
        response.headers_mut().insert("X-Response-Time-Us", val);
    }

    if path.starts_with("/api/") && !path.ends_with("/stream") {
        debug!(
            status = response.status().as_u16(),
            %method,
            path = %path,
            us = us as u64,
            "dashboard request"
        );
    }

    response
}
