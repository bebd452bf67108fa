// ─── Constants ───────────────────────────────────────────────────

/// NetData v1 data endpoint.
const DATA_ENDPOINT: &str = "/api/v1/data";

/// Strip to the simple JSON wrapper, keep natural sample points, drop
/// all-zero dimensions.
const QUERY_OPTIONS: &str = "s|jsonwrap|nonzero";

/// Relative window: the two most recent samples.
const LOOKBACK: i32 = -2;

// ─── MetricQuery ─────────────────────────────────────────────────

/// One chart query against the data endpoint.
///
/// Aggregation (`group=average`, `points=1`, `gtime=0`) and the lookback
/// window are fixed; only the chart and the dimension filter vary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    chart: String,
    dimensions: String,
}

impl MetricQuery {
    /// Query every dimension of `chart`.
    pub fn new(chart: impl Into<String>) -> Self {
        Self::with_dimensions(chart, "")
    }

    /// Query only the dimensions matched by `filter` (e.g. `received`).
    pub fn with_dimensions(chart: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            chart: chart.into(),
            dimensions: filter.into(),
        }
    }

    pub fn chart(&self) -> &str {
        &self.chart
    }

    pub fn dimensions(&self) -> &str {
        &self.dimensions
    }

    /// Request path with the query string. The dimension filter goes in
    /// raw, only the fixed options string is percent-encoded.
    pub fn path(&self) -> String {
        format!(
            "{DATA_ENDPOINT}?chart={}&format=json&points=1&gtime=0&group=average\
             &dimensions={}&options={}&after={LOOKBACK}",
            self.chart,
            self.dimensions,
            urlencoding::encode(QUERY_OPTIONS),
        )
    }

    /// Full request text, ready to write to the socket.
    ///
    /// `host` is not validated; a bad value only shows up when connecting.
    pub fn request(&self, host: &str) -> String {
        format!(
            "GET {} HTTP/0.1\r\nHost: {host}\r\nConnection: close\r\n\r\n",
            self.path()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_carries_every_fixed_parameter() {
        let path = MetricQuery::new("system.cpu").path();
        assert_eq!(
            path,
            "/api/v1/data?chart=system.cpu&format=json&points=1&gtime=0&group=average\
             &dimensions=&options=s%7Cjsonwrap%7Cnonzero&after=-2"
        );
    }

    #[test]
    fn dimension_filter_is_embedded_raw() {
        let path = MetricQuery::with_dimensions("net.pppoe_wan", "received|sent").path();
        assert!(path.contains("&dimensions=received|sent&"));
        assert!(path.starts_with("/api/v1/data?chart=net.pppoe_wan&"));
    }

    #[test]
    fn request_has_host_and_close_headers() {
        let req = MetricQuery::new("system.ram").request("192.168.8.1");
        assert!(req.starts_with("GET /api/v1/data?chart=system.ram&"));
        assert!(req.contains(" HTTP/0.1\r\n"));
        assert!(req.contains("\r\nHost: 192.168.8.1\r\n"));
        assert!(req.ends_with("Connection: close\r\n\r\n"));
    }

    #[test]
    fn empty_host_still_builds() {
        let req = MetricQuery::new("system.ram").request("");
        assert!(req.contains("\r\nHost: \r\n"));
    }
}
