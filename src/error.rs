use thiserror::Error;

// ─── Unified error type ──────────────────────────────────────────

/// Everything that can go wrong between "build a query" and "derive a value".
///
/// None of these escalate past the poll cycle: a failed metric keeps its
/// previous reading until the next cycle succeeds.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The TCP connection to the monitoring agent could not be opened.
    /// Malformed host/port strings end up here too.
    #[error("connection to {addr} failed: {source}")]
    ConnectionFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The connection opened but writing the request or reading the
    /// response failed part-way.
    #[error("I/O error while talking to {addr}: {source}")]
    Io {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Body was not valid JSON, or did not fit in the byte budget.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The envelope decoded fine but does not have the positions the
    /// extractor needs.
    #[error("schema mismatch on {chart}: {detail}")]
    SchemaMismatch { chart: String, detail: String },
}

impl MonitorError {
    /// Short, stable label used as a counter key in poll statistics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::Io { .. } => "io",
            Self::MalformedResponse(_) => "malformed_response",
            Self::SchemaMismatch { .. } => "schema_mismatch",
        }
    }

    pub fn schema(chart: &str, detail: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            chart: chart.to_owned(),
            detail: detail.into(),
        }
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
