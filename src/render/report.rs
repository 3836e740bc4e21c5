use crate::model::OverheadReport;
use crate::teamcity::ServiceMessages;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One build statistic message per service.
    Teamcity,
    /// Aligned text table.
    Plain,
    Json,
}

/// Render the report; the result always ends with a newline.
pub fn render_report(
    report: &OverheadReport,
    format: ReportFormat,
    messages: ServiceMessages,
) -> anyhow::Result<String> {
    let out = match format {
        ReportFormat::Teamcity => render_statistics(report, messages),
        ReportFormat::Plain => render_table(report),
        ReportFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)?;
            json.push('\n');
            json
        }
    };
    Ok(out)
}

fn render_statistics(report: &OverheadReport, messages: ServiceMessages) -> String {
    let mut out = String::new();
    for row in &report.services {
        out.push_str(&messages.statistic(&row.key, &row.total_ms.to_string()));
        out.push('\n');
    }
    out
}

fn render_table(report: &OverheadReport) -> String {
    const SERVICE: &str = "service";
    const TOTAL: &str = "total_ms";

    let summary = format!("({} services)", report.totals.services);
    let width = report
        .services
        .iter()
        .map(|s| s.service.len())
        .chain([SERVICE.len(), summary.len()])
        .max()
        .unwrap_or(SERVICE.len());

    let mut out = format!("{:<width$}  {:>12}\n", SERVICE, TOTAL, width = width);
    for row in &report.services {
        out.push_str(&format!(
            "{:<width$}  {:>12}\n",
            row.service,
            row.total_ms,
            width = width
        ));
    }
    out.push_str(&format!(
        "{:<width$}  {:>12}\n",
        summary,
        report.totals.total_ms,
        width = width
    ));
    out
}
