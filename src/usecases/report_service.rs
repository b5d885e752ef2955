//! Report service. Writes a computed dashboard to disk as Markdown plus CSV tables.

use crate::adapters::export::{chart_to_csv, daily_calls_to_csv, follow_ups_to_csv};
use crate::domain::dashboard::Metric;
use crate::domain::{Agent, Dashboard, DashboardFilters, DomainError};
use chrono::{DateTime, Local};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

/// Service for exporting dashboard reports.
///
/// One export produces four files sharing a stem:
/// `<stem>.md`, `<stem>_follow_ups.csv`, `<stem>_daily_calls.csv`, `<stem>_leads_by_status.csv`.
pub struct ReportService {
    reports_dir: PathBuf,
}

impl ReportService {
    pub fn new(reports_dir: PathBuf) -> Self {
        Self { reports_dir }
    }

    /// Export `dashboard` as seen by `viewer` with `filters`. Returns the written paths.
    pub async fn export(
        &self,
        viewer: &Agent,
        filters: &DashboardFilters,
        dashboard: &Dashboard,
    ) -> Result<Vec<PathBuf>, DomainError> {
        self.export_at(viewer, filters, dashboard, Local::now()).await
    }

    pub async fn export_at(
        &self,
        viewer: &Agent,
        filters: &DashboardFilters,
        dashboard: &Dashboard,
        generated_at: DateTime<Local>,
    ) -> Result<Vec<PathBuf>, DomainError> {
        fs::create_dir_all(&self.reports_dir)
            .await
            .map_err(|e| DomainError::Export(format!("Failed to create reports dir: {}", e)))?;

        let stem = format!(
            "dashboard_{}_{}_{}",
            viewer.id,
            filters.date_filter,
            generated_at.format("%Y%m%d_%H%M%S")
        );

        let csv_err = |e: csv::Error| DomainError::Export(format!("Failed to generate CSV: {}", e));
        let outputs = [
            (format!("{}.md", stem), render_markdown(viewer, filters, dashboard, &generated_at)),
            (
                format!("{}_follow_ups.csv", stem),
                follow_ups_to_csv(&dashboard.follow_ups).map_err(csv_err)?,
            ),
            (
                format!("{}_daily_calls.csv", stem),
                daily_calls_to_csv(&dashboard.charts.daily_performance_data).map_err(csv_err)?,
            ),
            (
                format!("{}_leads_by_status.csv", stem),
                chart_to_csv(&dashboard.charts.leads_by_status_data, "status").map_err(csv_err)?,
            ),
        ];

        let mut written = Vec::with_capacity(outputs.len());
        for (name, contents) in outputs {
            let path = self.reports_dir.join(name);
            fs::write(&path, contents)
                .await
                .map_err(|e| DomainError::Export(format!("Failed to write {}: {}", path.display(), e)))?;
            info!(path = %path.display(), "report file written");
            written.push(path);
        }

        info!(user = %viewer.id, files = written.len(), "dashboard exported");
        Ok(written)
    }
}

fn metric_row(md: &mut String, label: &str, metric: &Metric) {
    md.push_str(&format!("| {} | {} | {:+} |\n", label, metric.value, metric.change));
}

/// Markdown digest of a dashboard.
pub fn render_markdown(
    viewer: &Agent,
    filters: &DashboardFilters,
    dashboard: &Dashboard,
    generated_at: &DateTime<Local>,
) -> String {
    let stats = &dashboard.stats;
    let charts = &dashboard.charts;
    let mut md = String::new();

    // Header
    md.push_str(&format!("# Sales Dashboard: {}\n\n", filters.date_filter.title()));
    md.push_str(&format!(
        "**Viewer:** {} ({}) | **Agent filter:** {} | **Generated:** {}\n\n",
        viewer.name,
        viewer.role,
        filters.agent_filter,
        generated_at.format("%Y-%m-%d %H:%M")
    ));
    md.push_str("---\n\n");

    md.push_str("## Metrics\n\n");
    md.push_str("| Metric | Value | Change |\n|---|---:|---:|\n");
    metric_row(&mut md, "Total attempted calls", &stats.total_attempted_calls);
    metric_row(&mut md, "Total interested", &stats.total_interested);
    metric_row(&mut md, "Total deals done", &stats.total_deals_done);
    metric_row(&mut md, "Un-attempted leads", &stats.un_attempted_leads);
    metric_row(&mut md, "Today's pending calls", &stats.todays_pending_calls);
    metric_row(&mut md, "Total leads", &stats.total_leads);
    metric_row(&mut md, "Old pending follow-ups", &stats.old_pending_follow_ups);
    md.push('\n');

    md.push_str("## Calls vs Deals\n\n");
    for row in &charts.calls_vs_deals_data {
        md.push_str(&format!("- **{}:** {} calls, {} deals\n", row.name, row.calls, row.deals));
    }
    md.push('\n');

    md.push_str("## Interest\n\n");
    for row in &charts.interest_data {
        md.push_str(&format!("- {}: {}\n", row.name, row.value));
    }
    md.push('\n');

    if !charts.leads_by_status_data.is_empty() {
        md.push_str("## Leads by Status\n\n| Status | Leads |\n|---|---:|\n");
        for row in &charts.leads_by_status_data {
            md.push_str(&format!("| {} | {} |\n", row.name, row.value));
        }
        md.push('\n');
    }

    if !charts.daily_performance_data.is_empty() {
        md.push_str("## Daily Calls\n\n| Day | Calls |\n|---|---:|\n");
        for row in &charts.daily_performance_data {
            md.push_str(&format!("| {} | {} |\n", row.date, row.calls));
        }
        md.push('\n');
    }

    md.push_str("## Upcoming Follow-ups\n\n");
    if dashboard.follow_ups.is_empty() {
        md.push_str("_No pending follow-ups._\n\n");
    } else {
        md.push_str("| Lead | Due | Status | Owner |\n|---|---|---|---|\n");
        for f in &dashboard.follow_ups {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                f.lead_name,
                f.follow_up_date,
                f.status.map_or("Unknown", |s| s.label()),
                f.owner_name.as_deref().unwrap_or("-"),
            ));
        }
        md.push('\n');
    }

    // Footer
    md.push_str("---\n");
    md.push_str("*Generated by leadboard*\n");
    md
}
