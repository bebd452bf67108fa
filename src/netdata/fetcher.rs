use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;

use super::envelope::{parse_envelope, MetricEnvelope};
use super::query::MetricQuery;
use crate::error::MonitorError;

// ─── MetricSource ────────────────────────────────────────────────

/// Anything that can answer a chart query with a decoded envelope.
///
/// The poll cycle only depends on this seam, so tests can script replies
/// without a socket.
#[async_trait]
pub trait MetricSource: Send + Sync {
    async fn fetch(&self, query: &MetricQuery) -> Result<MetricEnvelope, MonitorError>;
}

#[async_trait]
impl<T: MetricSource + ?Sized> MetricSource for Arc<T> {
    async fn fetch(&self, query: &MetricQuery) -> Result<MetricEnvelope, MonitorError> {
        (**self).fetch(query).await
    }
}

// ─── HttpFetcher ─────────────────────────────────────────────────

/// Plain-TCP client for the NetData data endpoint.
///
/// Opens a fresh connection per query (`Connection: close`); the socket is
/// owned by `fetch` and dropped on every return path.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    host: String,
    port: String,
    body_limit: usize,
}

impl HttpFetcher {
    /// `host` and `port` are taken as-is. A malformed port is reported as
    /// `ConnectionFailed` on the first fetch, not here.
    pub fn new(host: impl Into<String>, port: impl Into<String>, body_limit: usize) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            body_limit,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl MetricSource for HttpFetcher {
    async fn fetch(&self, query: &MetricQuery) -> Result<MetricEnvelope, MonitorError> {
        let addr = self.addr();
        let io_err = |source: std::io::Error| MonitorError::Io {
            addr: addr.clone(),
            source,
        };

        let stream = TcpStream::connect(addr.as_str()).await.map_err(|source| {
            MonitorError::ConnectionFailed {
                addr: addr.clone(),
                source,
            }
        })?;
        let mut reader = BufReader::new(stream);

        let request = query.request(&self.host);
        debug!(
            chart = query.chart(),
            dimensions = query.dimensions(),
            %addr,
            "sending request:\n{request}"
        );
        reader
            .get_mut()
            .write_all(request.as_bytes())
            .await
            .map_err(io_err)?;

        // ── Status line ─────────────────────────────────────────
        // Raw bytes: a garbled status or header line is skipped, never an
        // I/O error. Only the body decides whether the reply is usable.
        let mut line = Vec::new();
        reader.read_until(b'\n', &mut line).await.map_err(io_err)?;
        let status = String::from_utf8_lossy(&line);
        debug!(chart = query.chart(), status = status.trim_end(), "response status");

        // ── Header block ────────────────────────────────────────
        skip_headers(&mut reader).await.map_err(io_err)?;

        // ── Body (bounded) ──────────────────────────────────────
        // One byte past the budget is enough to tell "fits" from "too big".
        let mut body = Vec::with_capacity(self.body_limit.min(16 * 1024));
        (&mut reader)
            .take(self.body_limit as u64 + 1)
            .read_to_end(&mut body)
            .await
            .map_err(io_err)?;

        let envelope = parse_envelope(&body, self.body_limit)?;
        debug!(
            chart = query.chart(),
            api = envelope.api,
            dimensions = envelope.dimensions,
            options = ?(envelope.primary_option(), envelope.secondary_option()),
            "decoded envelope"
        );
        Ok(envelope)
    }
}

/// Consume header lines up to and including the blank line.
///
/// A stream that ends before the blank line leaves nothing for the parser,
/// which then reports the response as malformed.
async fn skip_headers<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            return Ok(());
        }
        if line == b"\r\n" || line == b"\n" {
            return Ok(());
        }
    }
}
