//! Client side of the NetData `/api/v1/data` endpoint: query building,
//! transport and envelope decoding.

pub mod envelope;
pub mod fetcher;
pub mod query;

pub use envelope::MetricEnvelope;
pub use fetcher::{HttpFetcher, MetricSource};
pub use query::MetricQuery;
