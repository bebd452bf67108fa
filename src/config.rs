use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::metrics::ChartSet;

// ─── Defaults ────────────────────────────────────────────────────

const DEFAULT_HOST: &str = "192.168.8.1";
const DEFAULT_PORT: &str = "19999";
const DEFAULT_POLL_MS: u64 = 1_000;
/// Response body budget. A `jsonwrap` reply for one point is well under 2 KiB.
const DEFAULT_BODY_LIMIT: usize = 8 * 1024;
const DEFAULT_LISTEN: &str = "0.0.0.0:3000";

// ─── MonitorConfig ───────────────────────────────────────────────

/// Runtime settings, read from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// NetData host, passed through untouched.
    pub host: String,
    /// NetData port, kept as a string; a bad value fails at connect time.
    pub port: String,
    pub charts: ChartSet,
    pub poll_interval: Duration,
    pub body_limit: usize,
    pub listen_addr: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT.into(),
            charts: ChartSet::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_MS),
            body_limit: DEFAULT_BODY_LIMIT,
            listen_addr: DEFAULT_LISTEN.into(),
            log_dir: None,
        }
    }
}

impl MonitorConfig {
    /// Load `.env` (ignored if missing) and read `MONITOR_*` variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let string = |key: &str, default: String| lookup(key).unwrap_or(default);

        let poll_ms: u64 = parse_var(&lookup, "MONITOR_POLL_INTERVAL_MS", DEFAULT_POLL_MS)?;
        if poll_ms == 0 {
            anyhow::bail!("MONITOR_POLL_INTERVAL_MS must be greater than zero");
        }

        Ok(Self {
            host: string("MONITOR_HOST", defaults.host),
            port: string("MONITOR_PORT", defaults.port),
            charts: ChartSet {
                cpu: string("MONITOR_CPU_CHART", defaults.charts.cpu),
                ram: string("MONITOR_RAM_CHART", defaults.charts.ram),
                temperature: string("MONITOR_TEMP_CHART", defaults.charts.temperature),
                wan: string("MONITOR_WAN_CHART", defaults.charts.wan),
            },
            poll_interval: Duration::from_millis(poll_ms),
            body_limit: parse_var(&lookup, "MONITOR_BODY_LIMIT", DEFAULT_BODY_LIMIT)?,
            listen_addr: string("MONITOR_LISTEN", defaults.listen_addr),
            log_dir: lookup("MONITOR_LOG_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<MonitorConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MonitorConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(from_pairs(&[]).unwrap(), MonitorConfig::default());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = from_pairs(&[
            ("MONITOR_HOST", "openwrt.lan"),
            ("MONITOR_PORT", "29999"),
            ("MONITOR_WAN_CHART", "net.eth1"),
            ("MONITOR_POLL_INTERVAL_MS", "2500"),
            ("MONITOR_BODY_LIMIT", " 4096 "),
            ("MONITOR_LOG_DIR", "/var/log/router-monitor"),
        ])
        .unwrap();
        assert_eq!(cfg.host, "openwrt.lan");
        assert_eq!(cfg.port, "29999");
        assert_eq!(cfg.charts.wan, "net.eth1");
        assert_eq!(cfg.charts.cpu, "system.cpu");
        assert_eq!(cfg.poll_interval, Duration::from_millis(2500));
        assert_eq!(cfg.body_limit, 4096);
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/var/log/router-monitor")));
    }

    #[test]
    fn port_is_not_validated() {
        let cfg = from_pairs(&[("MONITOR_PORT", "nineteen")]).unwrap();
        assert_eq!(cfg.port, "nineteen");
    }

    #[test]
    fn bad_numbers_name_the_variable() {
        let err = from_pairs(&[("MONITOR_BODY_LIMIT", "lots")]).unwrap_err();
        assert!(err.to_string().contains("MONITOR_BODY_LIMIT"));

        let err = from_pairs(&[("MONITOR_POLL_INTERVAL_MS", "0")]).unwrap_err();
        assert!(err.to_string().contains("MONITOR_POLL_INTERVAL_MS"));
    }

    #[test]
    fn empty_log_dir_is_unset() {
        let cfg = from_pairs(&[("MONITOR_LOG_DIR", "")]).unwrap();
        assert_eq!(cfg.log_dir, None);
    }
}
