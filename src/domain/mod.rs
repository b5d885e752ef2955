//! Core domain layer. No external I/O dependencies.
//!
//! Entities, filters and the dashboard computation live here. Dependencies flow inward.

pub mod dashboard;
pub mod entities;
pub mod errors;
pub mod filters;
pub mod performance;
pub mod scope;
pub mod time;

pub use dashboard::{Dashboard, RecentFollowUp, compute_dashboard};
pub use entities::{Activity, Agent, AgentRole, CrmSnapshot, Lead, LeadStatus, RecordId, Task};
pub use errors::DomainError;
pub use filters::{AgentFilter, DashboardFilters, DateFilter};
pub use performance::AgentPerformance;
