//! Map CRM backend records (snake_case REST payloads) to domain entities.

use crate::domain::entities::{
    Activity, ActivityType, Agent, AgentRole, CallOutcome, Lead, LeadStatus, LeadTag, RecordId,
    ReminderType, Task, TaskType,
};
use serde::Deserialize;

/// A related record: either embedded (`{"id": 3, ...}`) or a bare primary key.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RelatedRef {
    Embedded { id: RecordId },
    Key(RecordId),
}

impl RelatedRef {
    pub fn id(self) -> RecordId {
        match self {
            RelatedRef::Embedded { id } | RelatedRef::Key(id) => id,
        }
    }
}

/// List endpoints answer with a bare array or a paginated `{"results": [...]}` page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Page {
        #[serde(default = "Vec::new")]
        results: Vec<T>,
    },
}

impl<T> ListBody<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) | ListBody::Page { results: items } => items,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiActivity {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    pub timestamp: Option<String>,
    /// Display name of the author; older payloads use `agent_name`.
    pub agent: Option<String>,
    pub agent_name: Option<String>,
    pub notes: Option<String>,
    pub duration: Option<u64>,
    pub outcome: Option<CallOutcome>,
    pub subject: Option<String>,
    pub location: Option<String>,
    pub audio_url: Option<String>,
    pub source_activity: Option<RelatedRef>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTask {
    pub id: RecordId,
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub due_time: Option<String>,
    pub is_completed: Option<bool>,
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub reminder: Option<ReminderType>,
}

#[derive(Debug, Deserialize)]
pub struct ApiLead {
    pub id: RecordId,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tag: Option<LeadTag>,
    pub status: Option<LeadStatus>,
    pub source: Option<String>,
    pub agent: Option<RelatedRef>,
    pub agent_id: Option<RecordId>,
    pub created_at: Option<String>,
    pub last_contacted: Option<String>,
    #[serde(default)]
    pub activities: Vec<ApiActivity>,
    #[serde(default)]
    pub tasks: Vec<ApiTask>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAgent {
    pub id: RecordId,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<AgentRole>,
    pub team: Option<String>,
    pub monthly_calls_target: Option<u32>,
    pub monthly_sales_target: Option<u32>,
    pub reports_to: Option<RelatedRef>,
    pub is_active: Option<bool>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

pub fn activity_to_domain(a: ApiActivity) -> Activity {
    Activity {
        id: a.id,
        kind: a.kind,
        timestamp: a.timestamp.unwrap_or_default(),
        agent: non_empty(a.agent).or(a.agent_name).unwrap_or_default(),
        notes: a.notes.unwrap_or_default(),
        duration: a.duration,
        outcome: a.outcome,
        subject: a.subject,
        location: a.location,
        audio_url: a.audio_url,
        source_activity_id: a.source_activity.map(RelatedRef::id),
    }
}

pub fn task_to_domain(t: ApiTask) -> Task {
    Task {
        id: t.id,
        title: t.title.unwrap_or_default(),
        due_date: t.due_date.unwrap_or_default(),
        due_time: t.due_time,
        is_completed: t.is_completed.unwrap_or(false),
        kind: t.kind,
        reminder: t.reminder,
    }
}

/// Owner resolution: embedded agent object first, then `agent_id`, then a bare
/// `agent` key. Zero or empty ids mean unassigned.
pub fn lead_to_domain(l: ApiLead) -> Lead {
    let agent_id = match l.agent {
        Some(RelatedRef::Embedded { id }) => Some(id),
        Some(RelatedRef::Key(key)) => l.agent_id.or(Some(key)),
        None => l.agent_id,
    }
    .filter(|id| !id.is_unassigned());

    Lead {
        id: l.id,
        name: l.name.unwrap_or_default(),
        phone: l.phone.unwrap_or_default(),
        email: l.email.unwrap_or_default(),
        tag: l.tag,
        status: l.status,
        source: l.source.unwrap_or_default(),
        agent_id,
        created_at: l.created_at.unwrap_or_default(),
        last_contacted: l.last_contacted,
        activities: l.activities.into_iter().map(activity_to_domain).collect(),
        tasks: l.tasks.into_iter().map(task_to_domain).collect(),
    }
}

/// Display name: `name`, else `first_name last_name`, else `username`.
pub fn agent_to_domain(a: ApiAgent) -> Agent {
    let full_name = format!(
        "{} {}",
        a.first_name.as_deref().unwrap_or_default(),
        a.last_name.as_deref().unwrap_or_default()
    )
    .trim()
    .to_string();
    let name = non_empty(a.name)
        .or_else(|| non_empty(Some(full_name)))
        .or(a.username)
        .unwrap_or_default();

    Agent {
        id: a.id,
        name,
        email: a.email.unwrap_or_default(),
        role: a.role.unwrap_or(AgentRole::Unknown),
        team: non_empty(a.team),
        monthly_calls_target: a.monthly_calls_target,
        monthly_sales_target: a.monthly_sales_target,
        reports_to: a.reports_to.map(RelatedRef::id),
        is_active: Some(a.is_active.unwrap_or(true)),
    }
}

/// Human message from an error body: `detail`, `error` or `message`, when textual.
pub fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}
