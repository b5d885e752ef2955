//! Implements InputPort. Inquire-based interactive menu.
//!
//! Flow: load snapshot -> pick viewer -> menu loop (dashboard, filters, team, export, reload).

use crate::adapters::ui::progress::with_spinner;
use crate::adapters::ui::render::{render_dashboard, render_header, render_team};
use crate::domain::scope::{can_choose_agent, default_agent_filter, resolve_agent_filter, visible_agents};
use crate::domain::{Agent, AgentFilter, CrmSnapshot, DashboardFilters, DateFilter, DomainError, RecordId};
use crate::ports::InputPort;
use crate::usecases::{DashboardService, ReportService};
use async_trait::async_trait;
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::Select;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Global inquire styling. Call once before the first prompt.
pub fn apply_theme() {
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("?").with_fg(Color::LightMagenta))
        .with_highlighted_option_prefix(Styled::new("›").with_fg(Color::LightCyan))
        .with_answer(StyleSheet::new().with_fg(Color::LightCyan));
    inquire::set_global_render_config(config);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    ShowDashboard,
    ChangeDateFilter,
    ChangeAgentFilter,
    TeamPerformance,
    ExportReport,
    Reload,
    Quit,
}

impl MenuAction {
    fn for_viewer(viewer: &Agent) -> Vec<MenuAction> {
        let mut actions = vec![MenuAction::ShowDashboard, MenuAction::ChangeDateFilter];
        if can_choose_agent(viewer) {
            actions.push(MenuAction::ChangeAgentFilter);
        }
        actions.extend([
            MenuAction::TeamPerformance,
            MenuAction::ExportReport,
            MenuAction::Reload,
            MenuAction::Quit,
        ]);
        actions
    }
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuAction::ShowDashboard => "Show dashboard",
            MenuAction::ChangeDateFilter => "Change date filter",
            MenuAction::ChangeAgentFilter => "Change agent filter",
            MenuAction::TeamPerformance => "Team performance",
            MenuAction::ExportReport => "Export report",
            MenuAction::Reload => "Reload data",
            MenuAction::Quit => "Quit",
        })
    }
}

fn agent_option(agent: &Agent) -> String {
    match &agent.team {
        Some(team) => format!("{} ({}, {}) [{}]", agent.name, agent.role, team, agent.id),
        None => format!("{} ({}) [{}]", agent.name, agent.role, agent.id),
    }
}

fn agent_label(snapshot: &CrmSnapshot, filter: &AgentFilter) -> String {
    match filter {
        AgentFilter::All => "All agents".to_string(),
        AgentFilter::Agent(id) => snapshot
            .agent(id)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| id.to_string()),
    }
}

/// Esc / Ctrl-C end the session quietly; anything else is an input error.
fn is_cancel(e: &InquireError) -> bool {
    matches!(
        e,
        InquireError::OperationCanceled | InquireError::OperationInterrupted
    )
}

fn input_err(e: InquireError) -> DomainError {
    DomainError::Input(e.to_string())
}

/// TUI adapter. Inquire prompts.
pub struct TuiInputPort {
    dashboard: Arc<DashboardService>,
    reports: Arc<ReportService>,
    user_id: Option<RecordId>,
}

impl TuiInputPort {
    pub fn new(
        dashboard: Arc<DashboardService>,
        reports: Arc<ReportService>,
        user_id: Option<RecordId>,
    ) -> Self {
        Self {
            dashboard,
            reports,
            user_id,
        }
    }

    /// `None` when the user backs out of the prompt.
    async fn pick_viewer(&self) -> Result<Option<Agent>, DomainError> {
        if let Some(id) = &self.user_id {
            return self.dashboard.viewer(id).await.map(Some);
        }
        let snapshot = self.dashboard.snapshot().await?;
        if snapshot.agents.is_empty() {
            return Err(DomainError::Scope("snapshot has no agents to sign in as".into()));
        }
        let options: Vec<String> = snapshot.agents.iter().map(agent_option).collect();
        match Select::new("Sign in as", options).raw_prompt() {
            Ok(picked) => Ok(snapshot.agents.get(picked.index).cloned()),
            Err(e) if is_cancel(&e) => Ok(None),
            Err(e) => Err(input_err(e)),
        }
    }

    fn pick_date_filter(current: DateFilter) -> Result<DateFilter, InquireError> {
        let options: Vec<&str> = DateFilter::ALL_OPTIONS.iter().map(|f| f.title()).collect();
        let cursor = DateFilter::ALL_OPTIONS
            .iter()
            .position(|f| *f == current)
            .unwrap_or(0);
        let picked = Select::new("Date range", options)
            .with_starting_cursor(cursor)
            .raw_prompt()?;
        Ok(DateFilter::ALL_OPTIONS[picked.index])
    }

    async fn pick_agent_filter(&self, viewer: &Agent) -> Result<Option<AgentFilter>, DomainError> {
        let snapshot = self.dashboard.snapshot().await?;
        let visible = visible_agents(viewer, &snapshot.agents);
        let mut options = vec!["All agents".to_string()];
        options.extend(visible.iter().map(|a| agent_option(a)));
        let picked = match Select::new("Show leads of", options).raw_prompt() {
            Ok(p) => p,
            Err(e) if is_cancel(&e) => return Ok(None),
            Err(e) => return Err(input_err(e)),
        };
        Ok(Some(match picked.index {
            0 => AgentFilter::All,
            i => AgentFilter::Agent(visible[i - 1].id.clone()),
        }))
    }

    async fn show_dashboard(&self, viewer: &Agent, filters: &mut DashboardFilters) -> Result<(), DomainError> {
        let view = self.dashboard.build(viewer, filters).await?;
        *filters = view.filters.clone();
        let snapshot = self.dashboard.snapshot().await?;
        println!();
        println!("{}", render_header(viewer, filters, &agent_label(&snapshot, &filters.agent_filter)));
        println!("{}", render_dashboard(&view.dashboard));
        Ok(())
    }

    async fn export(&self, viewer: &Agent, filters: &DashboardFilters) -> Result<(), DomainError> {
        let view = self.dashboard.build(viewer, filters).await?;
        let paths = with_spinner(
            "Writing report",
            "Report written",
            self.reports.export(viewer, &view.filters, &view.dashboard),
        )
        .await?;
        for p in paths {
            println!("  {}", p.display());
        }
        Ok(())
    }

    async fn reload(&self, viewer: &Agent, filters: &mut DashboardFilters) -> Result<Agent, DomainError> {
        let snapshot = with_spinner("Reloading CRM data", "Data reloaded", self.dashboard.reload()).await?;
        let viewer = self.dashboard.viewer(&viewer.id).await?;
        filters.agent_filter = resolve_agent_filter(&viewer, &snapshot.agents, &filters.agent_filter)
            .unwrap_or_else(|_| default_agent_filter(&viewer));
        Ok(viewer)
    }
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        let source = self.dashboard.source_description();
        with_spinner(
            &format!("Loading CRM data from {}", source),
            "CRM data loaded",
            self.dashboard.reload(),
        )
        .await?;

        let Some(mut viewer) = self.pick_viewer().await? else {
            return Ok(());
        };
        let mut filters = self.dashboard.initial_filters(&viewer).await?;
        println!("Signed in as {}", agent_option(&viewer));

        loop {
            let actions = MenuAction::for_viewer(&viewer);
            let action = match Select::new("What next?", actions).prompt() {
                Ok(a) => a,
                Err(e) if is_cancel(&e) => break,
                Err(e) => return Err(input_err(e)),
            };

            let outcome = match action {
                MenuAction::ShowDashboard => self.show_dashboard(&viewer, &mut filters).await,
                MenuAction::ChangeDateFilter => match Self::pick_date_filter(filters.date_filter) {
                    Ok(f) => {
                        filters.date_filter = f;
                        self.show_dashboard(&viewer, &mut filters).await
                    }
                    Err(e) if is_cancel(&e) => Ok(()),
                    Err(e) => Err(input_err(e)),
                },
                MenuAction::ChangeAgentFilter => match self.pick_agent_filter(&viewer).await {
                    Ok(Some(f)) => {
                        filters.agent_filter = f;
                        self.show_dashboard(&viewer, &mut filters).await
                    }
                    Ok(None) => Ok(()),
                    Err(e) => Err(e),
                },
                MenuAction::TeamPerformance => self
                    .dashboard
                    .team_performance(&viewer)
                    .await
                    .map(|rows| println!("\n{}", render_team(&rows))),
                MenuAction::ExportReport => self.export(&viewer, &filters).await,
                MenuAction::Reload => match self.reload(&viewer, &mut filters).await {
                    Ok(v) => {
                        viewer = v;
                        Ok(())
                    }
                    Err(e) => Err(e),
                },
                MenuAction::Quit => break,
            };

            // Recoverable: report and return to the menu.
            if let Err(e) = outcome {
                warn!(error = %e, action = %action, "menu action failed");
                println!("! {}", e);
            }
        }
        Ok(())
    }
}
