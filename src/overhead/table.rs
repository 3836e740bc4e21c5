use crate::listener::{TaskId, TaskNotificationListener};
use crate::overhead::{
    MalformedStatisticsLine, OverheadSnapshot, ServiceSample, parse_statistics_line,
};
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Running per-service duration totals.
///
/// One lock guards the whole table; it is held only for a single
/// read-modify-write or for the copy taken by [`snapshot`](Self::snapshot).
/// Share it between output streams with an `Arc`.
#[derive(Debug, Default)]
pub struct OverheadAccumulator {
    totals: Mutex<HashMap<String, u64>>,
    malformed: AtomicU64,
}

impl OverheadAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one output line. Malformed statistics lines are logged and dropped.
    pub fn record(&self, line: &str) {
        if let Err(e) = self.try_record(line) {
            self.malformed.fetch_add(1, Ordering::Relaxed);
            warn!("discarding malformed performance statistics line: {}", e);
        }
    }

    /// Statistics lines [`record`](Self::record) has discarded so far.
    pub fn malformed_lines(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }

    /// Like [`record`](Self::record) but hands the parse outcome back.
    pub fn try_record(
        &self,
        line: &str,
    ) -> Result<Option<ServiceSample>, MalformedStatisticsLine> {
        let sample = match parse_statistics_line(line)? {
            Some(s) => s,
            None => return Ok(None),
        };

        let total = {
            let mut totals = self.totals.lock();
            let total = totals.entry(sample.service.clone()).or_insert(0);
            *total = total.saturating_add(sample.duration_ms);
            *total
        };
        debug!(
            "service {} +{} ms (total {} ms)",
            sample.service, sample.duration_ms, total
        );

        Ok(Some(sample))
    }

    pub fn snapshot(&self) -> OverheadSnapshot {
        let totals = self.totals.lock();
        totals.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }
}

impl TaskNotificationListener for OverheadAccumulator {
    fn on_task_output(&self, _id: &TaskId, text: &str, _stdout: bool) {
        // One chunk may carry several lines.
        for line in text.lines() {
            self.record(line);
        }
    }
}
