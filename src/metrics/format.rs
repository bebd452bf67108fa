use std::fmt;

use serde::Serialize;

/// Display unit for a throughput reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SpeedUnit {
    #[serde(rename = "K/s")]
    Kilo,
    #[serde(rename = "M/s")]
    Mega,
    #[serde(rename = "G/s")]
    Giga,
}

impl SpeedUnit {
    pub fn label(self) -> &'static str {
        match self {
            Self::Kilo => "K/s",
            Self::Mega => "M/s",
            Self::Giga => "G/s",
        }
    }
}

impl fmt::Display for SpeedUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A speed ready for a label: number text plus unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedSpeed {
    pub value: String,
    pub unit: SpeedUnit,
}

impl fmt::Display for FormattedSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

// ─── Brackets ────────────────────────────────────────────────────

/// `(upper bound, divisor, decimals, unit)`; the first bracket whose bound
/// exceeds the value wins, anything past the last bound is G/s.
const BRACKETS: &[(f64, f64, usize, SpeedUnit)] = &[
    (100.0, 1.0, 2, SpeedUnit::Kilo),
    (1_000.0, 1.0, 1, SpeedUnit::Kilo),
    (100_000.0, 1024.0, 2, SpeedUnit::Mega),
    (1_000_000.0, 1024.0, 1, SpeedUnit::Mega),
];

const TOP_DIVISOR: f64 = 1024.0 * 1024.0;

/// Scale a magnitude for display. The input is never modified; callers
/// pass `abs()` of signed (upstream) readings.
pub fn format_speed(speed: f64) -> FormattedSpeed {
    let (divisor, decimals, unit) = BRACKETS
        .iter()
        .find(|(bound, ..)| speed < *bound)
        .map(|&(_, divisor, decimals, unit)| (divisor, decimals, unit))
        .unwrap_or((TOP_DIVISOR, 2, SpeedUnit::Giga));

    FormattedSpeed {
        value: format!("{:.*}", decimals, speed / divisor),
        unit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(v: f64) -> (String, SpeedUnit) {
        let f = format_speed(v);
        (f.value, f.unit)
    }

    #[test]
    fn bracket_boundaries() {
        assert_eq!(fmt(99.99), ("99.99".into(), SpeedUnit::Kilo));
        assert_eq!(fmt(100.0), ("100.0".into(), SpeedUnit::Kilo));
        assert_eq!(fmt(999.99), ("1000.0".into(), SpeedUnit::Kilo));
        assert_eq!(fmt(1000.0), ("0.98".into(), SpeedUnit::Mega));
        assert_eq!(fmt(99_999.99), ("97.66".into(), SpeedUnit::Mega));
        assert_eq!(fmt(100_000.0), ("97.7".into(), SpeedUnit::Mega));
        assert_eq!(fmt(1_000_000.0), ("0.95".into(), SpeedUnit::Giga));
    }

    #[test]
    fn small_and_zero() {
        assert_eq!(fmt(0.0), ("0.00".into(), SpeedUnit::Kilo));
        assert_eq!(fmt(12.5), ("12.50".into(), SpeedUnit::Kilo));
    }

    #[test]
    fn large_values_stay_in_giga() {
        assert_eq!(fmt(3.0 * 1024.0 * 1024.0), ("3.00".into(), SpeedUnit::Giga));
    }

    #[test]
    fn display_joins_value_and_unit() {
        assert_eq!(format_speed(512.0).to_string(), "512.0 K/s");
        assert_eq!(SpeedUnit::Mega.to_string(), "M/s");
    }
}
