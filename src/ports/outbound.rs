//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{CrmSnapshot, DashboardFilters, DomainError, RecordId};

/// Where leads and agents come from: a JSON export or the CRM backend.
#[async_trait::async_trait]
pub trait LeadSourcePort: Send + Sync {
    /// Load one consistent snapshot of leads and agents.
    async fn load_snapshot(&self) -> Result<CrmSnapshot, DomainError>;

    /// Short human description for logs and the UI (path or URL).
    fn describe(&self) -> String;
}

/// Remembers the filters each viewer last applied.
#[async_trait::async_trait]
pub trait FilterStatePort: Send + Sync {
    /// Last filters saved for `user`, or `None` if nothing is stored.
    async fn get_filters(&self, user: &RecordId) -> Result<Option<DashboardFilters>, DomainError>;

    async fn set_filters(
        &self,
        user: &RecordId,
        filters: &DashboardFilters,
    ) -> Result<(), DomainError>;
}
