use serde::Serialize;

/// Number of samples a throughput chart shows.
pub const SERIES_LEN: usize = 10;

/// Fixed-length scrolling history (oldest first) with a cached maximum.
///
/// `push` rescans all ten slots after every shift; at this size that is
/// cheaper than maintaining a candidate deque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollingSeries {
    samples: [i64; SERIES_LEN],
    max: i64,
}

impl Default for RollingSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl RollingSeries {
    /// Ten zeros, max 0.
    pub fn new() -> Self {
        Self {
            samples: [0; SERIES_LEN],
            max: 0,
        }
    }

    /// Drop the oldest sample, append `sample`, recompute the maximum.
    /// Returns the new maximum.
    pub fn push(&mut self, sample: i64) -> i64 {
        self.samples.rotate_left(1);
        self.samples[SERIES_LEN - 1] = sample;
        self.max = self.samples.iter().copied().max().unwrap_or(sample);
        self.max
    }

    /// Append a fractional reading; the fraction is truncated toward zero
    /// and out-of-range values saturate.
    pub fn push_reading(&mut self, reading: f64) -> i64 {
        self.push(reading as i64)
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn samples(&self) -> &[i64; SERIES_LEN] {
        &self.samples
    }
}

// ─── Chart range ─────────────────────────────────────────────────

/// Smallest peak the throughput axis is scaled to.
pub const CHART_FLOOR: i64 = 16;

/// Headroom above the tallest sample.
pub const CHART_HEADROOM: f64 = 1.1;

/// Upper bound of the shared throughput axis.
///
/// Upstream samples are stored negated, so magnitudes are compared.
pub fn chart_range(upstream_max: i64, downstream_max: i64) -> f64 {
    let peak = upstream_max
        .saturating_abs()
        .max(downstream_max.saturating_abs())
        .max(CHART_FLOOR);
    peak as f64 * CHART_HEADROOM
}

#[cfg(test)]
mod tests {
    use super::*;

    fn true_max(series: &RollingSeries) -> i64 {
        *series.samples().iter().max().unwrap()
    }

    #[test]
    fn starts_zeroed() {
        let series = RollingSeries::new();
        assert_eq!(series.samples(), &[0; SERIES_LEN]);
        assert_eq!(series.max(), 0);
    }

    #[test]
    fn push_shifts_toward_head() {
        let mut series = RollingSeries::new();
        for v in 1..=12 {
            series.push(v);
        }
        assert_eq!(series.samples(), &[3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(series.samples()[SERIES_LEN - 1], 12);
        assert_eq!(series.max(), 12);
    }

    #[test]
    fn max_drops_when_peak_scrolls_out() {
        let mut series = RollingSeries::new();
        series.push(500);
        for _ in 0..SERIES_LEN - 1 {
            series.push(7);
            assert_eq!(series.max(), 500);
        }
        series.push(7);
        assert_eq!(series.max(), 7);
    }

    #[test]
    fn all_negative_input_tracks_true_max() {
        let mut series = RollingSeries::new();
        for v in [-40, -10, -900, -3, -77, -12, -5, -8, -60, -31, -2, -700] {
            series.push(v);
            assert_eq!(series.max(), true_max(&series));
            assert_eq!(series.samples().len(), SERIES_LEN);
        }
        assert_eq!(series.max(), -2);
    }

    #[test]
    fn all_equal_input() {
        let mut series = RollingSeries::new();
        for _ in 0..25 {
            assert_eq!(series.push(42), true_max(&series));
        }
        assert_eq!(series.samples(), &[42; SERIES_LEN]);
        assert_eq!(series.max(), 42);
    }

    #[test]
    fn mixed_sequence_keeps_invariant() {
        let mut series = RollingSeries::new();
        let mut x: i64 = 17;
        for _ in 0..200 {
            // cheap LCG so the sequence wanders over both signs
            x = (x * 1_103_515_245 + 12_345) % 65_536 - 32_768;
            series.push(x);
            assert_eq!(series.max(), true_max(&series));
        }
    }

    #[test]
    fn push_reading_truncates_and_saturates() {
        let mut series = RollingSeries::new();
        series.push_reading(12.9);
        assert_eq!(series.samples()[SERIES_LEN - 1], 12);
        series.push_reading(-12.9);
        assert_eq!(series.samples()[SERIES_LEN - 1], -12);
        series.push_reading(f64::MAX);
        assert_eq!(series.samples()[SERIES_LEN - 1], i64::MAX);
    }

    #[test]
    fn chart_range_has_a_floor() {
        assert!((chart_range(0, 0) - 17.6).abs() < 1e-9);
        assert!((chart_range(-3, 5) - 17.6).abs() < 1e-9);
    }

    #[test]
    fn chart_range_covers_both_directions() {
        assert!((chart_range(0, 1000) - 1100.0).abs() < 1e-9);
        assert!((chart_range(-2000, 1000) - 2200.0).abs() < 1e-9);
        for (up, down) in [(-5, 3), (-100_000, 20), (0, 99), (i64::MIN, 0)] {
            let range = chart_range(up, down);
            assert!(range >= 16.0 * CHART_HEADROOM);
            let peak = up.saturating_abs().max(down.saturating_abs()) as f64;
            assert!(range >= peak * CHART_HEADROOM);
        }
    }
}
