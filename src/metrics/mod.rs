pub mod collector;
pub mod extractor;
pub mod format;
pub mod frame;
pub mod percentiles;
pub mod series;
pub mod stream;

pub use collector::DashboardStore;
pub use extractor::{ChartSet, MetricKind};
pub use series::RollingSeries;
