use hdrhistogram::Histogram;
use serde::Serialize;

/// Fetch round-trip latency breakdown, in microseconds.
/// Serialized straight into the dashboard snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentileSet {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub p999: u64,
    pub count: u64,
}

impl PercentileSet {
    /// Extract a full percentile set from an HdrHistogram.
    /// Returns zeroed values if the histogram is empty.
    pub fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.is_empty() {
            return Self::default();
        }

        Self {
            min: hist.min(),
            max: hist.max(),
            mean: hist.mean(),
            p50: hist.value_at_quantile(0.50),
            p95: hist.value_at_quantile(0.95),
            p99: hist.value_at_quantile(0.99),
            p999: hist.value_at_quantile(0.999),
            count: hist.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_histogram_is_zeroed() {
        let hist = Histogram::<u64>::new_with_bounds(1, 60_000_000, 3).unwrap();
        let set = PercentileSet::from_histogram(&hist);
        assert_eq!(set, PercentileSet::default());
    }

    #[test]
    fn reports_spread_of_recorded_latencies() {
        let mut hist = Histogram::<u64>::new_with_bounds(1, 60_000_000, 3).unwrap();
        for us in 1..=1000u64 {
            hist.record(us).unwrap();
        }
        let set = PercentileSet::from_histogram(&hist);
        assert_eq!(set.count, 1000);
        assert_eq!(set.min, 1);
        assert!(set.max >= 1000 && set.max <= 1001);
        assert!(set.p50 >= 495 && set.p50 <= 505, "{}", set.p50);
        assert!(set.p99 >= set.p95 && set.p999 >= set.p99);
    }
}
