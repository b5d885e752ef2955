//! Dashboard aggregation: summary metrics, chart datasets and upcoming follow-ups.
//!
//! Everything here is a pure function of a snapshot, two filters and a clock
//! reading. Nothing is mutated and nothing can fail; unreadable timestamps simply
//! fall outside every date-scoped bucket.

use crate::domain::entities::{Activity, Agent, Lead, LeadStatus, RecordId, Task, TaskType};
use crate::domain::filters::{AgentFilter, DateFilter, filter_by_date};
use crate::domain::time::{numeric_label, parse_calendar_date, parse_timestamp, short_label};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Maximum number of rows in the follow-up table.
pub const RECENT_FOLLOW_UPS_LIMIT: usize = 5;

/// Fixed deltas shown beside each metric card.
///
/// These are display constants, not period-over-period comparisons. Nothing
/// derives them from history and nothing should branch on them.
pub mod static_change {
    pub const TOTAL_ATTEMPTED_CALLS: i64 = 5;
    pub const TOTAL_INTERESTED: i64 = 2;
    pub const TOTAL_DEALS_DONE: i64 = 1;
    pub const UN_ATTEMPTED_LEADS: i64 = -3;
    pub const TODAYS_PENDING_CALLS: i64 = 0;
    pub const TOTAL_LEADS: i64 = 10;
    pub const OLD_PENDING_FOLLOW_UPS: i64 = 4;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub value: usize,
    /// See [`static_change`].
    pub change: i64,
}

impl Metric {
    fn new(value: usize, change: i64) -> Self {
        Self { value, change }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Call activities inside the date window.
    pub total_attempted_calls: Metric,
    /// Date-windowed leads at Site Visit or Negotiation.
    pub total_interested: Metric,
    /// Date-windowed leads that are Closed.
    pub total_deals_done: Metric,
    /// Leads in scope that were never called, regardless of the window.
    pub un_attempted_leads: Metric,
    /// Open call tasks due today.
    pub todays_pending_calls: Metric,
    /// Leads in scope, regardless of the window.
    pub total_leads: Metric,
    /// Open follow-up tasks whose due date has passed.
    pub old_pending_follow_ups: Metric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartData {
    pub name: String,
    pub value: usize,
}

impl ChartData {
    fn new(name: impl Into<String>, value: usize) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallsVsDeals {
    pub name: String,
    pub calls: usize,
    pub deals: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPerformance {
    /// Short label such as `Dec 31`.
    pub date: String,
    pub calls: usize,
    /// Calendar day behind the label; ordering uses this, never the label.
    #[serde(skip)]
    pub day: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub calls_vs_deals_data: Vec<CallsVsDeals>,
    pub interest_data: Vec<ChartData>,
    pub leads_by_status_data: Vec<ChartData>,
    pub daily_performance_data: Vec<DailyPerformance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFollowUp {
    /// Task id.
    pub id: RecordId,
    pub lead_id: RecordId,
    pub lead_name: String,
    /// Due date as `M/D/YYYY`, or `Invalid Date`.
    pub follow_up_date: String,
    /// Status of the parent lead.
    pub status: Option<LeadStatus>,
    /// Owner of the parent lead, when the agent is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub charts: DashboardCharts,
    pub follow_ups: Vec<RecentFollowUp>,
}

/// A task viewed together with the lead that owns it. Borrowed, never copied.
#[derive(Debug, Clone, Copy)]
struct TaskRef<'a> {
    task: &'a Task,
    lead: &'a Lead,
}

impl TaskRef<'_> {
    fn is_open(&self, kind: TaskType) -> bool {
        !self.task.is_completed && self.task.kind == kind
    }
}

/// Compute the dashboard for `leads` as seen at `now`.
///
/// * `agent_filter` narrows the working set to one owner (or none for `All`).
/// * `date_filter` windows lead creation and call activity; backlog metrics
///   (un-attempted leads, pending tasks, total leads) ignore it.
/// * `agents` only resolves owner names for the follow-up table.
/// * Calendar days (today, chart buckets) are taken in `now`'s timezone.
pub fn compute_dashboard<Tz: TimeZone>(
    leads: &[Lead],
    agents: &[Agent],
    date_filter: DateFilter,
    agent_filter: &AgentFilter,
    now: &DateTime<Tz>,
) -> Dashboard {
    let tz = now.timezone();
    let now_utc = now.with_timezone(&Utc);
    let today = now.date_naive();

    let scoped: Vec<&Lead> = leads.iter().filter(|l| agent_filter.matches(l)).collect();
    let dated_leads = filter_by_date(scoped.iter().copied(), date_filter, now);
    let calls: Vec<&Activity> =
        filter_by_date(scoped.iter().flat_map(|&l| l.calls()), date_filter, now);
    let tasks: Vec<TaskRef<'_>> = scoped
        .iter()
        .flat_map(|&lead| lead.tasks.iter().map(move |task| TaskRef { task, lead }))
        .collect();

    let interested = count_leads(&dated_leads, LeadStatus::is_interested);
    let not_interested = count_leads(&dated_leads, LeadStatus::is_not_interested);
    let deals_done = count_leads(&dated_leads, |s| s == LeadStatus::Closed);
    let un_attempted = scoped.iter().filter(|l| !l.has_call()).count();

    let todays_pending_calls = tasks
        .iter()
        .filter(|t| t.is_open(TaskType::Call))
        .filter(|t| parse_calendar_date(&t.task.due_date, &tz) == Some(today))
        .count();
    let old_pending_follow_ups = tasks
        .iter()
        .filter(|t| t.is_open(TaskType::FollowUp))
        .filter(|t| parse_timestamp(&t.task.due_date, &tz).is_some_and(|due| due < now_utc))
        .count();

    let stats = DashboardStats {
        total_attempted_calls: Metric::new(calls.len(), static_change::TOTAL_ATTEMPTED_CALLS),
        total_interested: Metric::new(interested, static_change::TOTAL_INTERESTED),
        total_deals_done: Metric::new(deals_done, static_change::TOTAL_DEALS_DONE),
        un_attempted_leads: Metric::new(un_attempted, static_change::UN_ATTEMPTED_LEADS),
        todays_pending_calls: Metric::new(
            todays_pending_calls,
            static_change::TODAYS_PENDING_CALLS,
        ),
        total_leads: Metric::new(scoped.len(), static_change::TOTAL_LEADS),
        old_pending_follow_ups: Metric::new(
            old_pending_follow_ups,
            static_change::OLD_PENDING_FOLLOW_UPS,
        ),
    };

    let charts = DashboardCharts {
        calls_vs_deals_data: vec![CallsVsDeals {
            name: "Performance".to_string(),
            calls: calls.len(),
            deals: deals_done,
        }],
        interest_data: vec![
            ChartData::new("Interested", interested),
            ChartData::new("Not Interested", not_interested),
        ],
        leads_by_status_data: leads_by_status(&dated_leads),
        daily_performance_data: daily_performance(&calls, &tz),
    };

    Dashboard {
        stats,
        charts,
        follow_ups: recent_follow_ups(&tasks, agents, &tz),
    }
}

fn count_leads(leads: &[&Lead], pred: impl Fn(LeadStatus) -> bool) -> usize {
    leads.iter().filter(|l| l.has_status(&pred)).count()
}

/// One bucket per status present, in order of first appearance.
fn leads_by_status(leads: &[&Lead]) -> Vec<ChartData> {
    let mut buckets: Vec<ChartData> = Vec::new();
    for lead in leads {
        let label = lead.status_label();
        match buckets.iter_mut().find(|b| b.name == label) {
            Some(bucket) => bucket.value += 1,
            None => buckets.push(ChartData::new(label, 1)),
        }
    }
    buckets
}

/// Calls per calendar day in `tz`, oldest day first.
fn daily_performance<Tz: TimeZone>(calls: &[&Activity], tz: &Tz) -> Vec<DailyPerformance> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for call in calls {
        if let Some(at) = parse_timestamp(&call.timestamp, tz) {
            *by_day.entry(at.with_timezone(tz).date_naive()).or_default() += 1;
        }
    }
    by_day
        .into_iter()
        .map(|(day, calls)| DailyPerformance {
            date: short_label(day),
            calls,
            day,
        })
        .collect()
}

/// Open follow-ups, earliest due first, capped at [`RECENT_FOLLOW_UPS_LIMIT`].
/// Tasks with unreadable due dates sort last.
fn recent_follow_ups<Tz: TimeZone>(
    tasks: &[TaskRef<'_>],
    agents: &[Agent],
    tz: &Tz,
) -> Vec<RecentFollowUp> {
    let mut open: Vec<(Option<DateTime<Utc>>, &TaskRef<'_>)> = tasks
        .iter()
        .filter(|t| t.is_open(TaskType::FollowUp))
        .map(|t| (parse_timestamp(&t.task.due_date, tz), t))
        .collect();
    open.sort_by_key(|(due, _)| (due.is_none(), *due));

    open.into_iter()
        .take(RECENT_FOLLOW_UPS_LIMIT)
        .map(|(_, t)| RecentFollowUp {
            id: t.task.id.clone(),
            lead_id: t.lead.id.clone(),
            lead_name: t.lead.name.clone(),
            follow_up_date: parse_calendar_date(&t.task.due_date, tz)
                .map(numeric_label)
                .unwrap_or_else(|| "Invalid Date".to_string()),
            status: t.lead.status,
            owner_name: owner_name(t.lead, agents),
        })
        .collect()
}

fn owner_name(lead: &Lead, agents: &[Agent]) -> Option<String> {
    let id = lead.agent_id.as_ref()?;
    agents
        .iter()
        .find(|a| &a.id == id)
        .map(|a| a.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-05-15T14:00:00+05:30").unwrap()
    }

    fn leads(value: serde_json::Value) -> Vec<Lead> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_snapshot_gives_zeroes() {
        let d = compute_dashboard(&[], &[], DateFilter::All, &AgentFilter::All, &now());
        assert_eq!(d.stats.total_leads.value, 0);
        assert_eq!(d.stats.total_attempted_calls.value, 0);
        assert!(d.charts.leads_by_status_data.is_empty());
        assert!(d.charts.daily_performance_data.is_empty());
        assert!(d.follow_ups.is_empty());
        assert_eq!(
            d.charts.calls_vs_deals_data,
            vec![CallsVsDeals {
                name: "Performance".into(),
                calls: 0,
                deals: 0
            }]
        );
    }

    #[test]
    fn metric_changes_are_the_static_constants() {
        let d = compute_dashboard(&[], &[], DateFilter::All, &AgentFilter::All, &now());
        let changes = [
            d.stats.total_attempted_calls.change,
            d.stats.total_interested.change,
            d.stats.total_deals_done.change,
            d.stats.un_attempted_leads.change,
            d.stats.todays_pending_calls.change,
            d.stats.total_leads.change,
            d.stats.old_pending_follow_ups.change,
        ];
        assert_eq!(changes, [5, 2, 1, -3, 0, 10, 4]);
    }

    #[test]
    fn interest_buckets_exclude_other_statuses() {
        let data = leads(json!([
            {"id": 1, "status": "Site Visit", "createdAt": "2024-05-15T10:00:00+05:30"},
            {"id": 2, "status": "Negotiation", "createdAt": "2024-05-15T10:00:00+05:30"},
            {"id": 3, "status": "Lost", "createdAt": "2024-05-15T10:00:00+05:30"},
            {"id": 4, "status": "New", "createdAt": "2024-05-15T10:00:00+05:30"},
            {"id": 5, "status": "Approved", "createdAt": "2024-05-15T10:00:00+05:30"}
        ]));
        let d = compute_dashboard(&data, &[], DateFilter::Today, &AgentFilter::All, &now());
        assert_eq!(
            d.charts.interest_data,
            vec![
                ChartData::new("Interested", 2),
                ChartData::new("Not Interested", 1)
            ]
        );
        assert_eq!(d.stats.total_interested.value, 2);
    }

    #[test]
    fn leads_by_status_keeps_first_seen_order_and_unknown_bucket() {
        let data = leads(json!([
            {"id": 1, "status": "New"},
            {"id": 2},
            {"id": 3, "status": "Closed"},
            {"id": 4, "status": "New"},
            {"id": 5, "status": "Sleeping"}
        ]));
        let d = compute_dashboard(&data, &[], DateFilter::All, &AgentFilter::All, &now());
        assert_eq!(
            d.charts.leads_by_status_data,
            vec![
                ChartData::new("New", 2),
                ChartData::new("Unknown", 2),
                ChartData::new("Closed", 1),
            ]
        );
    }

    #[test]
    fn pending_task_metrics() {
        let data = leads(json!([{
            "id": 1, "name": "Meera", "status": "Contacted", "agentId": 2,
            "tasks": [
                {"id": "a", "type": "Call", "dueDate": "2024-05-15", "isCompleted": false},
                {"id": "b", "type": "Call", "dueDate": "2024-05-15", "isCompleted": true},
                {"id": "c", "type": "Call", "dueDate": "2024-05-16", "isCompleted": false},
                {"id": "d", "type": "Follow-up", "dueDate": "2024-05-01", "isCompleted": false},
                {"id": "e", "type": "Follow-up", "dueDate": "2024-06-01", "isCompleted": false},
                {"id": "f", "type": "Follow-up", "dueDate": "2024-04-01", "isCompleted": true},
                {"id": "g", "type": "Follow-up", "dueDate": "someday", "isCompleted": false}
            ]
        }]));
        let agents: Vec<Agent> =
            serde_json::from_value(json!([{"id": "2", "name": "Kiran", "role": "Agent"}])).unwrap();
        let d = compute_dashboard(&data, &agents, DateFilter::All, &AgentFilter::All, &now());
        assert_eq!(d.stats.todays_pending_calls.value, 1);
        assert_eq!(d.stats.old_pending_follow_ups.value, 1);

        let ids: Vec<&str> = d.follow_ups.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "e", "g"]);
        assert_eq!(d.follow_ups[0].follow_up_date, "5/1/2024");
        assert_eq!(d.follow_ups[0].lead_name, "Meera");
        assert_eq!(d.follow_ups[0].status, Some(LeadStatus::Contacted));
        assert_eq!(d.follow_ups[0].owner_name.as_deref(), Some("Kiran"));
        assert_eq!(d.follow_ups[2].follow_up_date, "Invalid Date");
    }

    #[test]
    fn follow_ups_capped_at_five() {
        let tasks: Vec<_> = (1..=8)
            .rev()
            .map(|d| json!({"id": d, "type": "Follow-up", "dueDate": format!("2024-05-0{}", d)}))
            .collect();
        let data = leads(json!([{"id": 1, "name": "Zoya", "tasks": tasks}]));
        let d = compute_dashboard(&data, &[], DateFilter::All, &AgentFilter::All, &now());
        let ids: Vec<&str> = d.follow_ups.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn daily_performance_buckets_by_local_day() {
        let data = leads(json!([{
            "id": 1,
            "activities": [
                {"id": 1, "type": "Call", "timestamp": "2024-05-14T20:00:00Z"},
                {"id": 2, "type": "Call", "timestamp": "2024-05-15T09:00:00+05:30"},
                {"id": 3, "type": "Call", "timestamp": "2024-05-13T09:00:00+05:30"},
                {"id": 4, "type": "Email", "timestamp": "2024-05-13T09:00:00+05:30"}
            ]
        }]));
        let d = compute_dashboard(&data, &[], DateFilter::All, &AgentFilter::All, &now());
        let rows: Vec<(&str, usize)> = d
            .charts
            .daily_performance_data
            .iter()
            .map(|r| (r.date.as_str(), r.calls))
            .collect();
        // 20:00Z on the 14th is 01:30 on the 15th at +05:30.
        assert_eq!(rows, vec![("May 13", 1), ("May 15", 2)]);
        assert_eq!(d.stats.total_attempted_calls.value, 3);
        assert_eq!(d.stats.un_attempted_leads.value, 0);
    }

    #[test]
    fn serialises_in_frontend_shape() {
        let data = leads(json!([{"id": 1, "status": "Closed"}]));
        let d = compute_dashboard(&data, &[], DateFilter::All, &AgentFilter::All, &now());
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["stats"]["totalDealsDone"]["value"], 1);
        assert_eq!(v["stats"]["totalLeads"]["change"], 10);
        assert_eq!(v["charts"]["leadsByStatusData"][0]["name"], "Closed");
        assert!(v["charts"]["callsVsDealsData"].is_array());
        assert!(v["followUps"].is_array());
    }
}
