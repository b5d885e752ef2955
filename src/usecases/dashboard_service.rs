//! Dashboard use case: load snapshot -> scope to viewer -> compute -> remember filters.
//!
//! - Caches the last loaded snapshot; `reload` replaces it
//! - Re-validates every agent filter against the viewer's role before computing
//! - Filter persistence is best effort; a failed save is logged, not returned

use crate::domain::performance::team_performance;
use crate::domain::scope::{default_agent_filter, find_viewer, performance_roster, resolve_agent_filter};
use crate::domain::{
    Agent, AgentPerformance, CrmSnapshot, Dashboard, DashboardFilters, DomainError, RecordId,
    compute_dashboard,
};
use crate::ports::{FilterStatePort, LeadSourcePort};
use chrono::{DateTime, Local, TimeZone};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Dashboard service. Owns the current snapshot and the viewer's filter memory.
pub struct DashboardService {
    source: Arc<dyn LeadSourcePort>,
    state: Arc<dyn FilterStatePort>,
    snapshot: RwLock<Option<Arc<CrmSnapshot>>>,
}

/// A computed dashboard together with the filters actually applied.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub filters: DashboardFilters,
    pub dashboard: Dashboard,
}

impl DashboardService {
    pub fn new(source: Arc<dyn LeadSourcePort>, state: Arc<dyn FilterStatePort>) -> Self {
        Self {
            source,
            state,
            snapshot: RwLock::new(None),
        }
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    /// Fetch a fresh snapshot from the source and make it current.
    pub async fn reload(&self) -> Result<Arc<CrmSnapshot>, DomainError> {
        let snapshot = Arc::new(self.source.load_snapshot().await?);
        info!(
            source = %self.source.describe(),
            leads = snapshot.leads.len(),
            agents = snapshot.agents.len(),
            "loaded CRM snapshot"
        );
        *self.snapshot.write().await = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Current snapshot, loading it on first use.
    pub async fn snapshot(&self) -> Result<Arc<CrmSnapshot>, DomainError> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }
        self.reload().await
    }

    /// Resolve the signed-in user.
    pub async fn viewer(&self, id: &RecordId) -> Result<Agent, DomainError> {
        let snapshot = self.snapshot().await?;
        find_viewer(&snapshot.agents, id).cloned()
    }

    /// Filters to start a session with: the remembered ones when still within
    /// the viewer's scope, otherwise the role defaults.
    pub async fn initial_filters(&self, viewer: &Agent) -> Result<DashboardFilters, DomainError> {
        let snapshot = self.snapshot().await?;
        let remembered = match self.state.get_filters(&viewer.id).await {
            Ok(f) => f,
            Err(e) => {
                warn!(user = %viewer.id, error = %e, "could not read saved filters");
                None
            }
        };

        let Some(saved) = remembered else {
            return Ok(DashboardFilters {
                agent_filter: default_agent_filter(viewer),
                ..DashboardFilters::default()
            });
        };

        let agent_filter = match resolve_agent_filter(viewer, &snapshot.agents, &saved.agent_filter) {
            Ok(f) => f,
            Err(e) => {
                warn!(user = %viewer.id, error = %e, "saved agent filter out of scope, using default");
                default_agent_filter(viewer)
            }
        };
        Ok(DashboardFilters {
            date_filter: saved.date_filter,
            agent_filter,
        })
    }

    /// Compute the dashboard for `viewer` now, in the local timezone, and
    /// remember the applied filters.
    pub async fn build(
        &self,
        viewer: &Agent,
        filters: &DashboardFilters,
    ) -> Result<DashboardView, DomainError> {
        let snapshot = self.snapshot().await?;
        let view = Self::build_at(&snapshot, viewer, filters, &Local::now())?;

        if let Err(e) = self.state.set_filters(&viewer.id, &view.filters).await {
            warn!(user = %viewer.id, error = %e, "could not save filters");
        }
        Ok(view)
    }

    /// Compute a dashboard against an explicit clock. Rejects agent filters
    /// outside the viewer's scope.
    pub fn build_at<Tz: TimeZone>(
        snapshot: &CrmSnapshot,
        viewer: &Agent,
        filters: &DashboardFilters,
        now: &DateTime<Tz>,
    ) -> Result<DashboardView, DomainError> {
        let agent_filter = resolve_agent_filter(viewer, &snapshot.agents, &filters.agent_filter)?;
        let applied = DashboardFilters {
            date_filter: filters.date_filter,
            agent_filter,
        };
        let dashboard = compute_dashboard(
            &snapshot.leads,
            &snapshot.agents,
            applied.date_filter,
            &applied.agent_filter,
            now,
        );

        info!(
            user = %viewer.id,
            date_filter = %applied.date_filter,
            agent_filter = %applied.agent_filter,
            total_leads = dashboard.stats.total_leads.value,
            calls = dashboard.stats.total_attempted_calls.value,
            deals = dashboard.stats.total_deals_done.value,
            "computed dashboard"
        );
        debug!(follow_ups = dashboard.follow_ups.len(), "follow-up list ready");

        Ok(DashboardView {
            filters: applied,
            dashboard,
        })
    }

    /// Performance of every agent on the viewer's roster.
    pub async fn team_performance(&self, viewer: &Agent) -> Result<Vec<AgentPerformance>, DomainError> {
        let snapshot = self.snapshot().await?;
        let roster = performance_roster(viewer, &snapshot.agents);
        let rows = team_performance(&roster, &snapshot.leads, &Local);
        info!(user = %viewer.id, agents = rows.len(), "computed team performance");
        Ok(rows)
    }
}
