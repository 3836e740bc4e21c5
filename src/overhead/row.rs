use std::collections::BTreeMap;

/// One parsed performance statistics record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSample {
    pub service: String,
    pub duration_ms: u64,
}

/// Point-in-time copy of the totals, ordered by service name.
pub type OverheadSnapshot = BTreeMap<String, u64>;
