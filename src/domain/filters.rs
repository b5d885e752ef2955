//! Dashboard filters: the reporting window and the agent scope.

use crate::domain::entities::{Activity, Lead, RecordId};
use crate::domain::errors::DomainError;
use crate::domain::time::{month_start, parse_timestamp, start_of_day, week_start};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named trailing reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl DateFilter {
    pub const ALL_OPTIONS: [DateFilter; 4] = [
        DateFilter::All,
        DateFilter::Month,
        DateFilter::Week,
        DateFilter::Today,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DateFilter::Today => "today",
            DateFilter::Week => "week",
            DateFilter::Month => "month",
            DateFilter::All => "all",
        }
    }

    /// Human label used in menus and reports.
    pub fn title(self) -> &'static str {
        match self {
            DateFilter::Today => "Today",
            DateFilter::Week => "This Week",
            DateFilter::Month => "This Month",
            DateFilter::All => "All Time",
        }
    }

    /// Inclusive lower bound of the window, or `None` for `All`.
    ///
    /// Windows open at local midnight in the timezone of `now`: today, the most
    /// recent Sunday, or the 1st of the month.
    pub fn window_start<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let day = match self {
            DateFilter::All => return None,
            DateFilter::Today => today,
            DateFilter::Week => week_start(today),
            DateFilter::Month => month_start(today),
        };
        let start = start_of_day(&now.timezone(), day).map(|dt| dt.with_timezone(&Utc));
        // Unrepresentable local midnight: fall back to `now` so the window is
        // never silently widened.
        Some(start.unwrap_or_else(|| now.with_timezone(&Utc)))
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(DateFilter::Today),
            "week" => Ok(DateFilter::Week),
            "month" => Ok(DateFilter::Month),
            "all" => Ok(DateFilter::All),
            other => Err(DomainError::InvalidFilter(format!(
                "unknown date filter '{}' (expected today, week, month or all)",
                other
            ))),
        }
    }
}

/// Which agent's leads the dashboard covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AgentFilter {
    #[default]
    All,
    Agent(RecordId),
}

impl AgentFilter {
    /// Parse a filter value as emitted by a form control: `all` or any id text.
    /// Ids are normalised so `"5"` selects leads whose numeric owner id is 5.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(DomainError::InvalidFilter("empty agent filter".into()));
        }
        if s.eq_ignore_ascii_case("all") {
            return Ok(AgentFilter::All);
        }
        Ok(AgentFilter::Agent(RecordId::new(s)))
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        match self {
            AgentFilter::All => true,
            AgentFilter::Agent(id) => lead.is_owned_by(id),
        }
    }

    pub fn agent_id(&self) -> Option<&RecordId> {
        match self {
            AgentFilter::All => None,
            AgentFilter::Agent(id) => Some(id),
        }
    }
}

impl fmt::Display for AgentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentFilter::All => f.write_str("all"),
            AgentFilter::Agent(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for AgentFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentFilter::parse(s)
    }
}

impl Serialize for AgentFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgentFilter {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = RecordId::deserialize(deserializer)?;
        AgentFilter::parse(id.as_str()).map_err(serde::de::Error::custom)
    }
}

/// Something with a reporting timestamp: a lead's creation or an activity's time.
pub trait Dated {
    fn reported_at(&self) -> &str;
}

impl Dated for Lead {
    fn reported_at(&self) -> &str {
        &self.created_at
    }
}

impl Dated for Activity {
    fn reported_at(&self) -> &str {
        &self.timestamp
    }
}

/// Keep the items whose timestamp falls inside `filter`'s window.
///
/// `All` keeps everything, including items with unreadable timestamps; any
/// other window drops them.
pub fn filter_by_date<'a, T, Tz>(
    items: impl IntoIterator<Item = &'a T>,
    filter: DateFilter,
    now: &DateTime<Tz>,
) -> Vec<&'a T>
where
    T: Dated + 'a,
    Tz: TimeZone,
{
    let Some(start) = filter.window_start(now) else {
        return items.into_iter().collect();
    };
    let tz = now.timezone();
    items
        .into_iter()
        .filter(|item| parse_timestamp(item.reported_at(), &tz).is_some_and(|at| at >= start))
        .collect()
}

/// Filters currently applied by a viewer; remembered between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilters {
    pub date_filter: DateFilter,
    pub agent_filter: AgentFilter,
}
