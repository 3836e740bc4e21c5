pub mod report;

pub use report::{ReportFormat, render_report};
