//! Plain-text rendering of dashboards and team tables for the terminal.

use crate::domain::dashboard::Metric;
use crate::domain::{Agent, AgentPerformance, Dashboard, DashboardFilters};
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

fn bar(value: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = (value * BAR_WIDTH).div_ceil(max);
    "█".repeat(len)
}

fn metric_line(out: &mut String, label: &str, metric: &Metric) {
    let _ = writeln!(out, "  {:<26}{:>6}  ({:+})", label, metric.value, metric.change);
}

/// Viewer and filter line shown above every dashboard.
pub fn render_header(viewer: &Agent, filters: &DashboardFilters, agent_label: &str) -> String {
    format!(
        "{} ({}) | {} | Agent: {}",
        viewer.name,
        viewer.role,
        filters.date_filter.title(),
        agent_label
    )
}

pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let stats = &dashboard.stats;
    let charts = &dashboard.charts;
    let mut out = String::new();

    out.push_str("Metrics\n");
    metric_line(&mut out, "Total attempted calls", &stats.total_attempted_calls);
    metric_line(&mut out, "Total interested", &stats.total_interested);
    metric_line(&mut out, "Total deals done", &stats.total_deals_done);
    metric_line(&mut out, "Un-attempted leads", &stats.un_attempted_leads);
    metric_line(&mut out, "Today's pending calls", &stats.todays_pending_calls);
    metric_line(&mut out, "Total leads", &stats.total_leads);
    metric_line(&mut out, "Old pending follow-ups", &stats.old_pending_follow_ups);

    out.push_str("\nCalls vs deals\n");
    for row in &charts.calls_vs_deals_data {
        let _ = writeln!(out, "  {:<14} calls {:>5}   deals {:>5}", row.name, row.calls, row.deals);
    }

    out.push_str("\nInterest\n");
    let interest_max = charts.interest_data.iter().map(|c| c.value).max().unwrap_or(0);
    for row in &charts.interest_data {
        let _ = writeln!(out, "  {:<16}{:>5} {}", row.name, row.value, bar(row.value, interest_max));
    }

    out.push_str("\nLeads by status\n");
    if charts.leads_by_status_data.is_empty() {
        out.push_str("  (no leads in range)\n");
    }
    let status_max = charts.leads_by_status_data.iter().map(|c| c.value).max().unwrap_or(0);
    for row in &charts.leads_by_status_data {
        let _ = writeln!(out, "  {:<16}{:>5} {}", row.name, row.value, bar(row.value, status_max));
    }

    out.push_str("\nDaily calls\n");
    if charts.daily_performance_data.is_empty() {
        out.push_str("  (no calls in range)\n");
    }
    let daily_max = charts.daily_performance_data.iter().map(|d| d.calls).max().unwrap_or(0);
    for row in &charts.daily_performance_data {
        let _ = writeln!(out, "  {:<8}{:>5} {}", row.date, row.calls, bar(row.calls, daily_max));
    }

    out.push_str("\nUpcoming follow-ups\n");
    if dashboard.follow_ups.is_empty() {
        out.push_str("  (none pending)\n");
    }
    for f in &dashboard.follow_ups {
        let _ = writeln!(
            out,
            "  {:<11} {:<24} {:<12} {}",
            f.follow_up_date,
            f.lead_name,
            f.status.map_or("Unknown", |s| s.label()),
            f.owner_name.as_deref().unwrap_or("-"),
        );
    }
    out
}

pub fn render_team(rows: &[AgentPerformance]) -> String {
    if rows.is_empty() {
        return "No agents to show.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:<12} {:>5} {:>6} {:>5} {:>6} {:>7} {:>8} {:>8} {:>8}",
        "Agent", "Role", "Leads", "Active", "Won", "Calls", "Conv%", "CallOK%", "Target%", "1st resp"
    );
    for r in rows {
        let target = if r.monthly_calls_target.is_some() {
            format!("{:.0}", r.monthly_calls_progress)
        } else {
            "-".to_string()
        };
        let _ = writeln!(
            out,
            "{:<20} {:<12} {:>5} {:>6} {:>5} {:>6} {:>7.1} {:>8.1} {:>8} {:>8}",
            truncate(&r.agent_name, 20),
            r.role.label(),
            r.total_leads,
            r.active_leads,
            r.converted_leads,
            r.total_calls,
            r.conversion_rate,
            r.call_success_rate,
            target,
            r.avg_first_response(),
        );
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}
