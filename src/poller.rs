use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::error::MonitorError;
use crate::metrics::frame::{DashboardFrame, DisplayText, MetricStatus, Readings, SpeedSample};
use crate::metrics::series::chart_range;
use crate::metrics::{ChartSet, MetricKind, RollingSeries};
use crate::netdata::MetricSource;

// ─── Display seam ────────────────────────────────────────────────

/// Receives one frame per cycle. Implementations must not block.
pub trait FrameSink: Send + Sync {
    fn publish(&self, frame: &DashboardFrame, report: &CycleReport);
}

// ─── Cycle report ────────────────────────────────────────────────

/// How one metric's fetch went.
#[derive(Debug)]
pub struct FetchOutcome {
    pub metric: MetricKind,
    /// Fetch + extraction wall time.
    pub elapsed_us: u64,
    pub result: Result<(), MonitorError>,
}

#[derive(Debug)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_us: u64,
    pub outcomes: Vec<FetchOutcome>,
}

impl CycleReport {
    /// Metrics whose value was kept from an earlier cycle.
    pub fn failed(&self) -> impl Iterator<Item = MetricKind> + '_ {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_err())
            .map(|o| o.metric)
    }

    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }
}

// ─── PollCycle ───────────────────────────────────────────────────

/// Owns everything that outlives a single fetch: the last good readings,
/// both throughput series and per-metric freshness.
///
/// Envelopes never outlive the step that fetched them, so a later fetch in
/// the same cycle cannot be read in place of an earlier one.
pub struct PollCycle<S> {
    source: S,
    charts: ChartSet,
    readings: Readings,
    downstream: RollingSeries,
    upstream: RollingSeries,
    last_updated: HashMap<MetricKind, DateTime<Utc>>,
}

impl<S: MetricSource> PollCycle<S> {
    pub fn new(source: S, charts: ChartSet) -> Self {
        Self {
            source,
            charts,
            readings: Readings::default(),
            downstream: RollingSeries::new(),
            upstream: RollingSeries::new(),
            last_updated: HashMap::new(),
        }
    }

    /// Fetch and apply every metric once, in `POLL_ORDER`.
    ///
    /// Failures are absorbed: the metric keeps its previous value and the
    /// error is recorded in the report. Nothing is retried.
    pub async fn run_once(&mut self) -> CycleReport {
        let started_at = Utc::now();
        let cycle_start = Instant::now();
        let mut outcomes = Vec::with_capacity(MetricKind::POLL_ORDER.len());

        for metric in MetricKind::POLL_ORDER {
            let t0 = Instant::now();
            let result = self.refresh(metric).await;
            let elapsed_us = t0.elapsed().as_micros() as u64;

            if let Err(err) = &result {
                warn!(
                    %metric,
                    kind = err.kind(),
                    error = %err,
                    previous = self.readings.value(metric),
                    "keeping previous value"
                );
            }
            outcomes.push(FetchOutcome {
                metric,
                elapsed_us,
                result,
            });
        }

        CycleReport {
            started_at,
            elapsed_us: cycle_start.elapsed().as_micros() as u64,
            outcomes,
        }
    }

    /// Fetch one metric and apply it. The envelope is dropped on return.
    async fn refresh(&mut self, metric: MetricKind) -> Result<(), MonitorError> {
        let query = metric.query(&self.charts);
        let envelope = self.source.fetch(&query).await?;
        let value = metric.extract(&envelope)?;
        let raw = envelope.latest_values.first().copied().unwrap_or_default();

        debug!(%metric, value, raw, "extracted");

        match metric {
            MetricKind::Cpu => self.readings.cpu_usage = value,
            MetricKind::Memory => self.readings.memory_usage = value,
            MetricKind::Temperature => self.readings.temperature = value,
            MetricKind::Downstream => {
                self.readings.downstream = SpeedSample { speed: value, raw_bits: raw };
                self.downstream.push_reading(value);
            }
            MetricKind::Upstream => {
                self.readings.upstream = SpeedSample { speed: value, raw_bits: raw };
                self.upstream.push_reading(value);
            }
        }
        self.last_updated.insert(metric, Utc::now());
        Ok(())
    }

    /// Current chart bound from both series' cached maxima.
    pub fn chart_range(&self) -> f64 {
        chart_range(self.upstream.max(), self.downstream.max())
    }

    /// Build the frame for the display, marking metrics `report` could not
    /// refresh as stale.
    pub fn frame(&self, report: &CycleReport) -> DashboardFrame {
        let failed: Vec<MetricKind> = report.failed().collect();
        let status = MetricKind::POLL_ORDER
            .iter()
            .map(|&metric| MetricStatus {
                metric,
                last_updated: self.last_updated.get(&metric).copied(),
                stale: failed.contains(&metric),
            })
            .collect();

        DashboardFrame {
            captured_at: Utc::now(),
            readings: self.readings,
            display: DisplayText::from_readings(&self.readings),
            downstream_series: *self.downstream.samples(),
            upstream_series: *self.upstream.samples(),
            chart_range: self.chart_range(),
            status,
        }
    }
}

// Read-only views, only the tests look inside a running cycle.
#[cfg(test)]
impl<S> PollCycle<S> {
    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    pub fn downstream(&self) -> &RollingSeries {
        &self.downstream
    }

    pub fn upstream(&self) -> &RollingSeries {
        &self.upstream
    }
}

// ─── Public entry point ──────────────────────────────────────────

/// Runs one cycle per `period` until `running` is cleared, publishing each
/// frame to `sink`.
///
/// A slow cycle delays the next tick instead of bunching ticks up.
pub async fn run<S, K>(
    mut cycle: PollCycle<S>,
    sink: Arc<K>,
    period: Duration,
    running: Arc<AtomicBool>,
) where
    S: MetricSource,
    K: FrameSink + ?Sized,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = IntervalStream::new(interval);

    info!(period_ms = period.as_millis() as u64, "poll loop started");

    while ticks.next().await.is_some() {
        if !running.load(Ordering::Relaxed) {
            break;
        }

        let report = cycle.run_once().await;
        let frame = cycle.frame(&report);

        if report.all_ok() {
            info!(
                cpu = %frame.display.cpu,
                mem = %frame.display.memory,
                temp = %frame.display.temperature,
                down = %frame.display.downstream,
                up = %frame.display.upstream,
                range = frame.chart_range,
                "cycle complete"
            );
        } else {
            warn!(
                failed = report.failed().count(),
                elapsed_us = report.elapsed_us,
                "cycle complete with stale metrics"
            );
        }

        sink.publish(&frame, &report);
    }

    info!("poll loop stopped");
}
