//! Report model: turn an overhead snapshot into per-service rows + totals.

use crate::overhead::OverheadSnapshot;
use regex::Regex;
use serde::Serialize;

/// Statistic keys are this prefix followed by the service name.
pub const STATISTIC_KEY_PREFIX: &str = "gradle_model_builder_overhead_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOverheadView {
    pub service: String,
    /// Build statistic key reported to CI.
    pub key: String,
    pub total_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsView {
    pub services: usize,
    pub total_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverheadReport {
    /// Sorted by service name.
    pub services: Vec<ServiceOverheadView>,
    pub totals: TotalsView,
}

/// Build report data from a snapshot, keeping only services that match `filter`.
pub fn build_report(snapshot: &OverheadSnapshot, filter: Option<&Regex>) -> OverheadReport {
    let services: Vec<ServiceOverheadView> = snapshot
        .iter()
        .filter(|(service, _)| filter.is_none_or(|re| re.is_match(service)))
        .map(|(service, total_ms)| ServiceOverheadView {
            service: service.clone(),
            key: format!("{}{}", STATISTIC_KEY_PREFIX, service),
            total_ms: *total_ms,
        })
        .collect();

    let total_ms = services
        .iter()
        .fold(0u64, |acc, s| acc.saturating_add(s.total_ms));

    OverheadReport {
        totals: TotalsView {
            services: services.len(),
            total_ms,
        },
        services,
    }
}
