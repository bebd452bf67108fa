use std::fmt;

use serde::Serialize;

use crate::error::MonitorError;
use crate::netdata::{MetricEnvelope, MetricQuery};

// ─── Chart ids ───────────────────────────────────────────────────

/// Chart ids to query. Sensor and WAN chart names differ between routers,
/// so every id is configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSet {
    pub cpu: String,
    pub ram: String,
    pub temperature: String,
    pub wan: String,
}

impl Default for ChartSet {
    fn default() -> Self {
        Self {
            cpu: "system.cpu".into(),
            ram: "system.ram".into(),
            temperature: "sensors.temp_thermal_zone0_thermal_thermal_zone0".into(),
            wan: "net.pppoe_wan".into(),
        }
    }
}

// ─── MetricKind ──────────────────────────────────────────────────

/// The five values the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Cpu,
    Memory,
    Temperature,
    Downstream,
    Upstream,
}

impl MetricKind {
    /// Fetch order within one poll cycle.
    pub const POLL_ORDER: [MetricKind; 5] = [
        Self::Cpu,
        Self::Memory,
        Self::Temperature,
        Self::Downstream,
        Self::Upstream,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Memory => "memory",
            Self::Temperature => "temperature",
            Self::Downstream => "downstream",
            Self::Upstream => "upstream",
        }
    }

    pub fn query(self, charts: &ChartSet) -> MetricQuery {
        match self {
            Self::Cpu => MetricQuery::new(&charts.cpu),
            Self::Memory => MetricQuery::new(&charts.ram),
            Self::Temperature => MetricQuery::new(&charts.temperature),
            Self::Downstream => MetricQuery::with_dimensions(&charts.wan, "received"),
            Self::Upstream => MetricQuery::with_dimensions(&charts.wan, "sent"),
        }
    }

    /// Derive this metric's scalar from an envelope.
    ///
    /// Reads `latest_values` by position. The positions are fixed per chart
    /// on NetData; names are never consulted.
    pub fn extract(self, envelope: &MetricEnvelope) -> Result<f64, MonitorError> {
        let values = positional(envelope, self.required_positions())?;
        let value = match self {
            // softirq + user + system + nice
            Self::Cpu => values.iter().sum::<f64>(),
            Self::Memory => {
                let (free, used, cached, buffers) = (values[0], values[1], values[2], values[3]);
                let total = free + used + cached + buffers;
                if total == 0.0 {
                    0.0
                } else {
                    used / total * 100.0
                }
            }
            Self::Temperature => values[0],
            // bits -> bytes
            Self::Downstream => values[0] / 8.0,
            // negated so both directions share one chart
            Self::Upstream => -(values[0] / 8.0),
        };
        Ok(value)
    }

    fn required_positions(self) -> usize {
        match self {
            Self::Cpu | Self::Memory => 4,
            Self::Temperature | Self::Downstream | Self::Upstream => 1,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// First `needed` latest values, after checking the positional contract.
fn positional(envelope: &MetricEnvelope, needed: usize) -> Result<&[f64], MonitorError> {
    let chart = envelope.id.as_str();
    let values = envelope.latest_values.as_slice();

    if values.len() != envelope.dimensions {
        return Err(MonitorError::schema(
            chart,
            format!(
                "{} latest values for {} declared dimensions",
                values.len(),
                envelope.dimensions
            ),
        ));
    }
    if values.len() < needed {
        return Err(MonitorError::schema(
            chart,
            format!("need {needed} dimensions, got {}", values.len()),
        ));
    }
    Ok(&values[..needed])
}
