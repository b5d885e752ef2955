//! End-to-end dashboard behaviour against the public API with a fixed clock.

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use leadboard::domain::filters::filter_by_date;
use leadboard::domain::{
    AgentFilter, CrmSnapshot, DashboardFilters, DateFilter, Lead, RecordId, compute_dashboard,
};
use leadboard::usecases::DashboardService;
use pretty_assertions::assert_eq;
use serde_json::json;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap()
}

fn leads(value: serde_json::Value) -> Vec<Lead> {
    serde_json::from_value(value).unwrap()
}

/// A mixed book: several owners, statuses, calls and tasks.
fn book() -> Vec<Lead> {
    leads(json!([
        {"id": 1, "name": "Asha", "agentId": 5, "status": "Closed", "createdAt": "2024-05-15T08:00:00Z",
         "activities": [{"id": 11, "type": "Call", "timestamp": "2024-05-15T09:00:00Z"}],
         "tasks": [{"id": "t1", "type": "Follow-up", "dueDate": "2024-05-10", "isCompleted": false}]},
        {"id": 2, "name": "Bilal", "agentId": "5", "status": "Negotiation", "createdAt": "2024-05-13T08:00:00Z",
         "activities": [
            {"id": 21, "type": "WhatsApp", "timestamp": "2024-05-13T09:00:00Z"},
            {"id": 22, "type": "Call", "timestamp": "2024-05-02T09:00:00Z"}
         ],
         "tasks": [
            {"id": "t2", "type": "Follow-up", "dueDate": "2024-05-20", "isCompleted": false},
            {"id": "t3", "type": "Follow-up", "dueDate": "2024-05-01", "isCompleted": true},
            {"id": "t4", "type": "Call", "dueDate": "2024-05-15", "isCompleted": false}
         ]},
        {"id": 3, "name": "Chen", "agentId": 6, "status": "Lost", "createdAt": "2024-04-01T08:00:00Z",
         "tasks": [{"id": "t5", "type": "Follow-up", "dueDate": "2024-05-18", "isCompleted": false}]},
        {"id": 4, "name": "Divya", "agentId": 6, "createdAt": "garbage",
         "activities": [{"id": 41, "type": "Call", "timestamp": "2024-05-14T23:30:00Z"}]},
        {"id": 5, "name": "Eli", "agentId": 0, "status": "Site Visit", "createdAt": "2024-05-11T08:00:00Z",
         "tasks": [
            {"id": "t6", "type": "Follow-up", "dueDate": "2024-05-16", "isCompleted": false},
            {"id": "t7", "type": "Follow-up", "dueDate": "2024-05-17", "isCompleted": false},
            {"id": "t8", "type": "Follow-up", "dueDate": "2024-05-19", "isCompleted": false}
         ]}
    ]))
}

#[test]
fn count_properties_hold_for_every_filter_combination() {
    let book = book();
    let agent_filters = [
        AgentFilter::All,
        AgentFilter::parse("5").unwrap(),
        AgentFilter::parse("6").unwrap(),
        AgentFilter::parse("404").unwrap(),
    ];
    for agent_filter in &agent_filters {
        let scoped: Vec<&Lead> = book.iter().filter(|l| agent_filter.matches(l)).collect();
        for date_filter in DateFilter::ALL_OPTIONS {
            let d = compute_dashboard(&book, &[], date_filter, agent_filter, &now());
            let dated = filter_by_date(scoped.iter().copied(), date_filter, &now());

            assert_eq!(d.stats.total_leads.value, scoped.len());
            let called = scoped.iter().filter(|l| l.has_call()).count();
            assert_eq!(d.stats.un_attempted_leads.value + called, d.stats.total_leads.value);

            let by_status: usize = d.charts.leads_by_status_data.iter().map(|c| c.value).sum();
            assert_eq!(by_status, dated.len());

            let interest: Vec<usize> = d.charts.interest_data.iter().map(|c| c.value).collect();
            assert!(interest.iter().all(|v| *v <= dated.len()));
            assert!(interest.iter().sum::<usize>() <= dated.len());
            assert!(d.stats.total_deals_done.value <= d.stats.total_leads.value);

            assert!(d.follow_ups.len() <= 5);
        }
    }
}

#[test]
fn follow_ups_are_open_sorted_and_capped() {
    let d = compute_dashboard(&book(), &[], DateFilter::All, &AgentFilter::All, &now());
    let ids: Vec<&str> = d.follow_ups.iter().map(|f| f.id.as_str()).collect();
    // t3 is completed; t4 is a call task; the sixth open follow-up (t2, May 20) is cut.
    assert_eq!(ids, vec!["t1", "t6", "t7", "t5", "t8"]);
    assert_eq!(d.follow_ups[0].lead_name, "Asha");
    assert_eq!(d.follow_ups[0].follow_up_date, "5/10/2024");
}

#[test]
fn backlog_metrics_ignore_date_window() {
    let today = compute_dashboard(&book(), &[], DateFilter::Today, &AgentFilter::All, &now());
    let all = compute_dashboard(&book(), &[], DateFilter::All, &AgentFilter::All, &now());
    assert_eq!(today.stats.total_leads.value, all.stats.total_leads.value);
    assert_eq!(today.stats.un_attempted_leads.value, 2);
    assert_eq!(today.stats.old_pending_follow_ups.value, 1);
    assert_eq!(today.stats.todays_pending_calls.value, 1);

    // Only lead 1 was created today; lead 4 has an unreadable creation time.
    assert_eq!(today.charts.leads_by_status_data.len(), 1);
    assert_eq!(today.stats.total_deals_done.value, 1);
    assert_eq!(today.stats.total_attempted_calls.value, 1);
    assert_eq!(all.stats.total_attempted_calls.value, 3);
}

#[test]
fn month_filter_scenario_for_agent_five() {
    let created_old = (now() - Duration::days(40)).to_rfc3339();
    let data = leads(json!([
        {"id": 1, "agentId": 5, "status": "Closed", "createdAt": now().to_rfc3339()},
        {"id": 2, "agentId": 5, "status": "New", "createdAt": created_old}
    ]));
    let d = compute_dashboard(
        &data,
        &[],
        DateFilter::Month,
        &AgentFilter::Agent(RecordId::from(5)),
        &now(),
    );
    assert_eq!(d.stats.total_deals_done.value, 1);
    assert_eq!(d.stats.total_leads.value, 2);
}

#[test]
fn textual_agent_filter_matches_numeric_owner() {
    let data = leads(json!([
        {"id": 1, "agentId": 5, "status": "New"},
        {"id": 2, "agentId": 55, "status": "New"},
        {"id": 3, "status": "New"}
    ]));
    let d = compute_dashboard(&data, &[], DateFilter::All, &"5".parse().unwrap(), &now());
    assert_eq!(d.stats.total_leads.value, 1);
}

#[test]
fn daily_calls_are_ordered_across_year_boundary() {
    let data = leads(json!([{
        "id": 1,
        "activities": [
            {"id": 3, "type": "Call", "timestamp": "2025-01-01T10:00:00Z"},
            {"id": 2, "type": "Call", "timestamp": "2024-12-31T10:00:00Z"},
            {"id": 1, "type": "Call", "timestamp": "2025-01-01T11:00:00Z"},
            {"id": 0, "type": "Call", "timestamp": "2024-01-02T11:00:00Z"}
        ]
    }]));
    let at = Utc.with_ymd_and_hms(2025, 1, 2, 9, 0, 0).unwrap();
    let d = compute_dashboard(&data, &[], DateFilter::All, &AgentFilter::All, &at);
    let rows: Vec<(String, usize)> = d
        .charts
        .daily_performance_data
        .iter()
        .map(|r| (r.date.clone(), r.calls))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Jan 2".to_string(), 1),
            ("Dec 31".to_string(), 1),
            ("Jan 1".to_string(), 2)
        ]
    );
}

#[test]
fn windows_follow_the_clock_timezone() {
    // 23:30Z on the 14th is already the 15th at +05:30.
    let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
    let at = ist.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap();
    let data = leads(json!([{
        "id": 1,
        "activities": [{"id": 1, "type": "Call", "timestamp": "2024-05-14T23:30:00Z"}]
    }]));
    let local = compute_dashboard(&data, &[], DateFilter::Today, &AgentFilter::All, &at);
    assert_eq!(local.stats.total_attempted_calls.value, 1);
    assert_eq!(local.charts.daily_performance_data[0].date, "May 15");

    let utc = compute_dashboard(&data, &[], DateFilter::Today, &AgentFilter::All, &at.with_timezone(&Utc));
    assert_eq!(utc.stats.total_attempted_calls.value, 0);
}

#[test]
fn service_enforces_scope_with_fixed_clock() {
    let snapshot: CrmSnapshot = serde_json::from_value(json!({
        "agents": [
            {"id": 5, "name": "Sara", "role": "Agent", "team": "North"},
            {"id": 6, "name": "Omar", "role": "Telecaller", "team": "North"},
            {"id": 9, "name": "Vikram", "role": "Sales Manager", "team": "North"}
        ],
        "leads": book()
    }))
    .unwrap();
    let sara = snapshot.agent(&RecordId::from(5)).unwrap().clone();
    let vikram = snapshot.agent(&RecordId::from(9)).unwrap().clone();

    // A plain agent asking for everything still only sees their own book.
    let view = DashboardService::build_at(&snapshot, &sara, &DashboardFilters::default(), &now()).unwrap();
    assert_eq!(view.filters.agent_filter, AgentFilter::Agent(RecordId::from(5)));
    assert_eq!(view.dashboard.stats.total_leads.value, 2);

    let filters = DashboardFilters {
        date_filter: DateFilter::Week,
        agent_filter: AgentFilter::parse("6").unwrap(),
    };
    let view = DashboardService::build_at(&snapshot, &vikram, &filters, &now()).unwrap();
    assert_eq!(view.dashboard.stats.total_leads.value, 2);
    assert_eq!(view.dashboard.stats.total_attempted_calls.value, 1);

    let outside = DashboardFilters {
        agent_filter: AgentFilter::parse("77").unwrap(),
        ..DashboardFilters::default()
    };
    assert!(DashboardService::build_at(&snapshot, &vikram, &outside, &now()).is_err());
}

#[test]
fn dashboard_json_shape() {
    let d = compute_dashboard(&book(), &[], DateFilter::All, &AgentFilter::All, &now());
    let v = serde_json::to_value(&d).unwrap();
    for key in [
        "totalAttemptedCalls",
        "totalInterested",
        "totalDealsDone",
        "unAttemptedLeads",
        "todaysPendingCalls",
        "totalLeads",
        "oldPendingFollowUps",
    ] {
        assert!(v["stats"][key]["value"].is_u64(), "missing {}", key);
        assert!(v["stats"][key]["change"].is_i64(), "missing {}", key);
    }
    for key in ["callsVsDealsData", "interestData", "leadsByStatusData", "dailyPerformanceData"] {
        assert!(v["charts"][key].is_array(), "missing {}", key);
    }
    let first = &v["followUps"][0];
    assert_eq!(first["leadName"], "Asha");
    assert_eq!(first["followUpDate"], "5/10/2024");
    assert_eq!(first["status"], "Closed");
}
