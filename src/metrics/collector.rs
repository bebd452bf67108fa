use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use chrono::{DateTime, Utc};
use hdrhistogram::Histogram;
use parking_lot::Mutex;
use serde::Serialize;

use super::extractor::MetricKind;
use super::frame::DashboardFrame;
use super::percentiles::PercentileSet;
use crate::poller::{CycleReport, FrameSink};

// ─── Configuration ───────────────────────────────────────────────

/// How many cycle summaries we keep for the live feed
const MAX_RECENT_CYCLES: usize = 120;

/// HdrHistogram range: 1 μs → 60 s, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 3;

// ─── Public types ────────────────────────────────────────────────

/// Display-side store for poll results.
/// The poll loop calls `publish()`, the dashboard endpoints call `snapshot()`.
pub struct DashboardStore {
    inner: Mutex<Inner>,
}

/// One entry in the live cycle feed.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    pub started_at: DateTime<Utc>,
    pub elapsed_us: u64,
    pub failed: Vec<MetricKind>,
}

/// Counters and fetch latency across every published cycle.
#[derive(Debug, Clone, Serialize)]
pub struct PollStats {
    pub cycles: u64,
    pub fetches: u64,
    pub failures: u64,
    /// Failure counts keyed by error kind.
    pub failures_by_kind: BTreeMap<&'static str, u64>,
    pub fetch_latency_us: PercentileSet,
    pub uptime_secs: f64,
}

/// Complete snapshot shipped to the dashboard on every SSE tick.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// `None` until the first cycle has been published.
    pub frame: Option<DashboardFrame>,
    pub stats: PollStats,
    pub recent_cycles: Vec<CycleRecord>,
}

// ─── Internal state ──────────────────────────────────────────────

struct Inner {
    latest: Option<DashboardFrame>,

    fetch_hist: Histogram<u64>,

    cycles: u64,
    fetches: u64,
    failures: u64,
    failures_by_kind: BTreeMap<&'static str, u64>,

    recent_cycles: VecDeque<CycleRecord>,

    // Wall-clock anchor for uptime
    start_time: Option<Instant>,
}

// ─── DashboardStore impl ─────────────────────────────────────────

impl DashboardStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::new()),
        }
    }

    /// Produce a read-only snapshot for the dashboard.
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.inner.lock().snapshot()
    }
}

impl Default for DashboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSink for DashboardStore {
    fn publish(&self, frame: &DashboardFrame, report: &CycleReport) {
        self.inner.lock().record(frame, report);
    }
}

// ─── Inner impl ──────────────────────────────────────────────────

impl Inner {
    fn new() -> Self {
        Self {
            latest: None,
            fetch_hist: Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
                .expect("histogram creation"),
            cycles: 0,
            fetches: 0,
            failures: 0,
            failures_by_kind: BTreeMap::new(),
            recent_cycles: VecDeque::with_capacity(MAX_RECENT_CYCLES + 1),
            start_time: None,
        }
    }

    fn record(&mut self, frame: &DashboardFrame, report: &CycleReport) {
        self.start_time.get_or_insert_with(Instant::now);

        self.cycles += 1;
        for outcome in &report.outcomes {
            self.fetches += 1;
            // Clamp to ≥ 1 μs and ≤ the histogram ceiling
            let _ = self
                .fetch_hist
                .record(outcome.elapsed_us.clamp(HIST_LOW, HIST_HIGH));
            if let Err(err) = &outcome.result {
                self.failures += 1;
                *self.failures_by_kind.entry(err.kind()).or_insert(0) += 1;
            }
        }

        self.recent_cycles.push_back(CycleRecord {
            started_at: report.started_at,
            elapsed_us: report.elapsed_us,
            failed: report.failed().collect(),
        });
        if self.recent_cycles.len() > MAX_RECENT_CYCLES {
            self.recent_cycles.pop_front();
        }

        self.latest = Some(frame.clone());
    }

    fn snapshot(&self) -> DashboardSnapshot {
        let uptime_secs = self
            .start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        DashboardSnapshot {
            frame: self.latest.clone(),
            stats: PollStats {
                cycles: self.cycles,
                fetches: self.fetches,
                failures: self.failures,
                failures_by_kind: self.failures_by_kind.clone(),
                fetch_latency_us: PercentileSet::from_histogram(&self.fetch_hist),
                uptime_secs,
            },
            recent_cycles: self.recent_cycles.iter().cloned().collect(),
        }
    }
}
