//! Domain entities. Pure data structures for the core business.
//!
//! Field names follow the CRM's JSON export (camelCase). No HTTP/IO types here;
//! backend records are mapped into these by adapters.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Identifier of a lead, agent, activity or task.
///
/// The CRM emits ids both as JSON numbers and as text (form controls, UIDs), so
/// every id is normalised on construction: surrounding whitespace is dropped and
/// anything that reads as an integer is stored in canonical decimal form. Two ids
/// are equal iff their normalised text is equal, which makes `5` and `"5"` match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        match trimmed.parse::<i64>() {
            Ok(n) => Self(n.to_string()),
            Err(_) => Self(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty and zero ids mean "no owner".
    pub fn is_unassigned(&self) -> bool {
        self.0.is_empty() || self.0 == "0"
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self::from(n),
            Raw::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Self::from(f as i64),
            Raw::Float(f) => Self(f.to_string()),
            Raw::Text(s) => Self::new(s),
        })
    }
}

/// Pipeline stage of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    New,
    Contacted,
    #[serde(rename = "Site Visit")]
    SiteVisit,
    Negotiation,
    Approved,
    Closed,
    Rejected,
    Lost,
    /// Any value outside the fixed pipeline.
    #[serde(other)]
    Unknown,
}

impl LeadStatus {
    pub fn label(self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::SiteVisit => "Site Visit",
            LeadStatus::Negotiation => "Negotiation",
            LeadStatus::Approved => "Approved",
            LeadStatus::Closed => "Closed",
            LeadStatus::Rejected => "Rejected",
            LeadStatus::Lost => "Lost",
            LeadStatus::Unknown => "Unknown",
        }
    }

    pub fn is_interested(self) -> bool {
        matches!(self, LeadStatus::SiteVisit | LeadStatus::Negotiation)
    }

    pub fn is_not_interested(self) -> bool {
        matches!(self, LeadStatus::Rejected | LeadStatus::Lost)
    }

    /// Approved or closed: counted as a sale.
    pub fn is_converted(self) -> bool {
        matches!(self, LeadStatus::Approved | LeadStatus::Closed)
    }

    /// Still being worked (not closed, rejected or lost).
    pub fn is_active(self) -> bool {
        !matches!(
            self,
            LeadStatus::Closed | LeadStatus::Rejected | LeadStatus::Lost
        )
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadTag {
    Hot,
    Warm,
    Cold,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityType {
    Call,
    WhatsApp,
    Email,
    Note,
    #[serde(rename = "Status Change")]
    StatusChange,
    #[serde(rename = "Assignment Change")]
    AssignmentChange,
    #[serde(rename = "AI Summary")]
    AiSummary,
    Chatbot,
    #[serde(rename = "Site Visit Check-in")]
    SiteVisitCheckIn,
    #[serde(rename = "Voice Note")]
    VoiceNote,
    #[serde(other)]
    Other,
}

impl ActivityType {
    /// Outbound contact with the lead (used for first-response time).
    pub fn is_contact(self) -> bool {
        matches!(
            self,
            ActivityType::Call | ActivityType::WhatsApp | ActivityType::Email
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    Success,
    #[serde(rename = "No Answer")]
    NoAnswer,
    Voicemail,
    Busy,
    Missed,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    Call,
    Meeting,
    Email,
    #[serde(rename = "Follow-up")]
    FollowUp,
    Paperwork,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderType {
    None,
    #[serde(rename = "15 minutes before")]
    FifteenMinutes,
    #[serde(rename = "1 hour before")]
    OneHour,
    #[serde(rename = "1 day before")]
    OneDay,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentRole {
    Admin,
    #[serde(rename = "Sales Manager")]
    SalesManager,
    Agent,
    Telecaller,
    #[serde(rename = "Customer Support")]
    CustomerSupport,
    #[serde(other)]
    Unknown,
}

impl AgentRole {
    pub fn label(self) -> &'static str {
        match self {
            AgentRole::Admin => "Admin",
            AgentRole::SalesManager => "Sales Manager",
            AgentRole::Agent => "Agent",
            AgentRole::Telecaller => "Telecaller",
            AgentRole::CustomerSupport => "Customer Support",
            AgentRole::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A logged interaction with a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: ActivityType,
    /// Raw timestamp as exported; parsed on demand (see `domain::time`).
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub notes: String,
    /// Call duration in seconds.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub outcome: Option<CallOutcome>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Weak back-reference, e.g. an AI summary pointing at the call it summarises.
    #[serde(default)]
    pub source_activity_id: Option<RecordId>,
}

/// A scheduled to-do attached to a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub due_time: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(rename = "type")]
    pub kind: TaskType,
    #[serde(default)]
    pub reminder: Option<ReminderType>,
}

/// A prospective customer tracked through the sales pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tag: Option<LeadTag>,
    /// `None` when the export carries no status at all.
    #[serde(default)]
    pub status: Option<LeadStatus>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub agent_id: Option<RecordId>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub last_contacted: Option<String>,
    /// Newest first.
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Lead {
    pub fn status_label(&self) -> &'static str {
        self.status.map_or("Unknown", LeadStatus::label)
    }

    pub fn has_status(&self, pred: impl Fn(LeadStatus) -> bool) -> bool {
        self.status.is_some_and(pred)
    }

    pub fn calls(&self) -> impl Iterator<Item = &Activity> {
        self.activities
            .iter()
            .filter(|a| a.kind == ActivityType::Call)
    }

    pub fn has_call(&self) -> bool {
        self.calls().next().is_some()
    }

    pub fn is_owned_by(&self, agent: &RecordId) -> bool {
        self.agent_id.as_ref() == Some(agent)
    }
}

/// A CRM user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: AgentRole,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub monthly_calls_target: Option<u32>,
    #[serde(default)]
    pub monthly_sales_target: Option<u32>,
    #[serde(default)]
    pub reports_to: Option<RecordId>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Everything the dashboard reads: one consistent view of leads and agents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrmSnapshot {
    #[serde(default)]
    pub leads: Vec<Lead>,
    #[serde(default)]
    pub agents: Vec<Agent>,
}

impl CrmSnapshot {
    pub fn agent(&self, id: &RecordId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == id)
    }
}
