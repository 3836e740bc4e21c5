//! Per-service overhead accumulation from Gradle performance statistics output.

pub mod parse;
pub mod row;
pub mod table;

pub use parse::{MalformedStatisticsLine, parse_statistics_line};
pub use row::{OverheadSnapshot, ServiceSample};
pub use table::OverheadAccumulator;
