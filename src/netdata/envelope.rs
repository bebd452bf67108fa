use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

use crate::error::MonitorError;

/// Decoded `jsonwrap` response for one chart query.
///
/// Missing fields fall back to their defaults and `null` entries inside the
/// value arrays read as `0.0`; nothing beyond that shape coercion is checked
/// here. `latest_values[i]` belongs to the `i`-th declared dimension.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricEnvelope {
    pub api: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub id: String,
    #[serde_as(as = "DefaultOnNull")]
    pub name: String,
    pub view_update_every: i64,
    pub update_every: i64,
    pub first_entry: i64,
    pub last_entry: i64,
    pub after: i64,
    pub before: i64,
    #[serde_as(as = "DefaultOnNull")]
    pub group: String,
    #[serde_as(as = "Vec<DefaultOnNull>")]
    pub options: Vec<String>,
    #[serde_as(as = "Vec<DefaultOnNull>")]
    pub dimension_names: Vec<String>,
    #[serde_as(as = "Vec<DefaultOnNull>")]
    pub dimension_ids: Vec<String>,
    #[serde_as(as = "Vec<DefaultOnNull>")]
    pub latest_values: Vec<f64>,
    #[serde_as(as = "Vec<DefaultOnNull>")]
    pub view_latest_values: Vec<f64>,
    pub dimensions: usize,
    pub points: usize,
    #[serde_as(as = "DefaultOnNull")]
    pub format: String,
    /// Result rows, left undecoded.
    pub result: serde_json::Value,
    #[serde_as(as = "DefaultOnNull")]
    pub min: f64,
    #[serde_as(as = "DefaultOnNull")]
    pub max: f64,
}

impl MetricEnvelope {
    /// First processing option echoed by the server (usually `jsonwrap`).
    pub fn primary_option(&self) -> Option<&str> {
        self.options.first().map(String::as_str)
    }

    /// Second processing option echoed by the server.
    pub fn secondary_option(&self) -> Option<&str> {
        self.options.get(1).map(String::as_str)
    }
}

/// Decode a complete body. Anything over `limit` bytes is rejected before
/// it reaches the JSON decoder.
pub fn parse_envelope(body: &[u8], limit: usize) -> Result<MetricEnvelope, MonitorError> {
    if body.len() > limit {
        return Err(MonitorError::MalformedResponse(format!(
            "body exceeds {limit} byte budget"
        )));
    }
    Ok(serde_json::from_slice(body)?)
}
