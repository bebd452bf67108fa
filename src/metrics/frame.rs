use chrono::{DateTime, Utc};
use serde::Serialize;

use super::extractor::MetricKind;
use super::format::{format_speed, FormattedSpeed};
use super::series::SERIES_LEN;

/// Temperature above which the gauge turns hot.
pub const HOT_THRESHOLD_C: f64 = 75.0;

/// Gauge start angle and sweep for 0–100 °C.
const ARC_START_DEG: f64 = 120.0;
const ARC_SWEEP_DEG: f64 = 300.0;

// ─── Readings ────────────────────────────────────────────────────

/// Signed throughput (downstream positive, upstream negated) and the raw
/// bit rate it came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpeedSample {
    pub speed: f64,
    pub raw_bits: f64,
}

/// Last good value of every metric. A failed fetch leaves its field alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Readings {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub temperature: f64,
    pub downstream: SpeedSample,
    pub upstream: SpeedSample,
}

impl Readings {
    pub fn value(&self, metric: MetricKind) -> f64 {
        match metric {
            MetricKind::Cpu => self.cpu_usage,
            MetricKind::Memory => self.memory_usage,
            MetricKind::Temperature => self.temperature,
            MetricKind::Downstream => self.downstream.speed,
            MetricKind::Upstream => self.upstream.speed,
        }
    }
}

/// Freshness of one metric at frame time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricStatus {
    pub metric: MetricKind,
    pub last_updated: Option<DateTime<Utc>>,
    /// Not refreshed by the cycle that produced this frame.
    pub stale: bool,
}

// ─── Display text ────────────────────────────────────────────────

/// Label text as the device screen shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayText {
    pub cpu: String,
    pub memory: String,
    pub temperature: String,
    pub upstream: FormattedSpeed,
    pub downstream: FormattedSpeed,
    /// End angle of the temperature arc, in degrees.
    pub temperature_arc_end: i64,
    pub temperature_hot: bool,
}

impl DisplayText {
    pub fn from_readings(r: &Readings) -> Self {
        Self {
            cpu: format!("{:.1}%", r.cpu_usage),
            memory: format!("{:.0}%", r.memory_usage),
            temperature: format!("{:.0}°C", r.temperature),
            upstream: format_speed(r.upstream.speed.abs()),
            downstream: format_speed(r.downstream.speed.abs()),
            temperature_arc_end: (ARC_START_DEG + ARC_SWEEP_DEG * r.temperature / 100.0) as i64,
            temperature_hot: r.temperature > HOT_THRESHOLD_C,
        }
    }
}

// ─── Frame ───────────────────────────────────────────────────────

/// Everything the display needs after one poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardFrame {
    pub captured_at: DateTime<Utc>,
    pub readings: Readings,
    pub display: DisplayText,
    pub downstream_series: [i64; SERIES_LEN],
    pub upstream_series: [i64; SERIES_LEN],
    /// Upper bound of the throughput chart's y axis.
    pub chart_range: f64,
    pub status: Vec<MetricStatus>,
}

impl DashboardFrame {
    pub fn stale_metrics(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.status.iter().filter(|s| s.stale).map(|s| s.metric)
    }
}
