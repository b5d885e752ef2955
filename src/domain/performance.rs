//! Per-agent performance figures for the team view.

use crate::domain::entities::{Agent, AgentRole, CallOutcome, Lead, LeadStatus, RecordId};
use crate::domain::time::parse_timestamp;
use chrono::TimeZone;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPerformance {
    pub agent_id: RecordId,
    pub agent_name: String,
    pub role: AgentRole,
    pub team: Option<String>,
    pub total_leads: usize,
    /// Not Closed, Rejected or Lost. Leads without a status count as active.
    pub active_leads: usize,
    /// Approved or Closed.
    pub converted_leads: usize,
    pub total_calls: usize,
    pub successful_calls: usize,
    /// Percentages, 0 when the denominator is 0.
    pub conversion_rate: f64,
    pub call_success_rate: f64,
    pub monthly_calls_progress: f64,
    pub monthly_sales_progress: f64,
    pub monthly_calls_target: Option<u32>,
    pub monthly_sales_target: Option<u32>,
    /// Mean seconds from lead creation to first contact.
    pub avg_first_response_secs: Option<i64>,
}

impl AgentPerformance {
    pub fn avg_first_response(&self) -> String {
        self.avg_first_response_secs
            .map_or_else(|| "N/A".to_string(), format_duration)
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn progress(done: usize, target: Option<u32>) -> f64 {
    match target {
        Some(t) if t > 0 => done as f64 / f64::from(t) * 100.0,
        _ => 0.0,
    }
}

/// Seconds between a lead's creation and its earliest call, WhatsApp or email.
///
/// `None` when the lead has no readable creation time or was never contacted.
/// Activities with unreadable timestamps are ignored.
pub fn first_response_secs<Tz: TimeZone>(lead: &Lead, tz: &Tz) -> Option<i64> {
    let created = parse_timestamp(&lead.created_at, tz)?;
    let first_contact = lead
        .activities
        .iter()
        .filter(|a| a.kind.is_contact())
        .filter_map(|a| parse_timestamp(&a.timestamp, tz))
        .min()?;
    let millis = (first_contact - created).num_milliseconds();
    Some((millis as f64 / 1000.0).round() as i64)
}

/// Compact duration: at most two units out of d/h/m/s.
///
/// `0s` for zero and `N/A` for negative input.
pub fn format_duration(total_secs: i64) -> String {
    if total_secs < 0 {
        return "N/A".to_string();
    }
    if total_secs == 0 {
        return "0s".to_string();
    }
    let units = [
        (total_secs / 86_400, "d"),
        ((total_secs % 86_400) / 3_600, "h"),
        ((total_secs % 3_600) / 60, "m"),
        (total_secs % 60, "s"),
    ];
    units
        .iter()
        .filter(|(n, _)| *n > 0)
        .take(2)
        .map(|(n, unit)| format!("{}{}", n, unit))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn agent_performance<Tz: TimeZone>(agent: &Agent, leads: &[Lead], tz: &Tz) -> AgentPerformance {
    let own: Vec<&Lead> = leads.iter().filter(|l| l.is_owned_by(&agent.id)).collect();

    let total_calls = own.iter().map(|l| l.calls().count()).sum();
    let successful_calls = own
        .iter()
        .flat_map(|l| l.calls())
        .filter(|c| c.outcome == Some(CallOutcome::Success))
        .count();
    let converted_leads = own.iter().filter(|l| l.has_status(LeadStatus::is_converted)).count();
    let active_leads = own
        .iter()
        .filter(|l| l.status.is_none_or(LeadStatus::is_active))
        .count();

    // Negative gaps are data-entry errors and stay out of the mean.
    let responses: Vec<i64> = own
        .iter()
        .filter_map(|l| first_response_secs(l, tz))
        .filter(|s| *s >= 0)
        .collect();
    let avg_first_response_secs = if responses.is_empty() {
        None
    } else {
        Some(responses.iter().sum::<i64>() / responses.len() as i64)
    };

    AgentPerformance {
        agent_id: agent.id.clone(),
        agent_name: agent.name.clone(),
        role: agent.role,
        team: agent.team.clone(),
        total_leads: own.len(),
        active_leads,
        converted_leads,
        total_calls,
        successful_calls,
        conversion_rate: percent(converted_leads, own.len()),
        call_success_rate: percent(successful_calls, total_calls),
        monthly_calls_progress: progress(total_calls, agent.monthly_calls_target),
        monthly_sales_progress: progress(converted_leads, agent.monthly_sales_target),
        monthly_calls_target: agent.monthly_calls_target,
        monthly_sales_target: agent.monthly_sales_target,
        avg_first_response_secs,
    }
}

pub fn team_performance<Tz: TimeZone>(
    roster: &[&Agent],
    leads: &[Lead],
    tz: &Tz,
) -> Vec<AgentPerformance> {
    roster
        .iter()
        .map(|agent| agent_performance(agent, leads, tz))
        .collect()
}
