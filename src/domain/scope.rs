//! Role-based visibility: which agents a viewer may see and filter by.

use crate::domain::entities::{Agent, AgentRole, RecordId};
use crate::domain::errors::DomainError;
use crate::domain::filters::AgentFilter;

fn same_team(a: &Agent, b: &Agent) -> bool {
    a.team == b.team
}

/// Agents the viewer may pick in the agent filter.
///
/// Admins see everyone, sales managers see their own team (themselves
/// included), everybody else sees only themselves.
pub fn visible_agents<'a>(viewer: &'a Agent, agents: &'a [Agent]) -> Vec<&'a Agent> {
    match viewer.role {
        AgentRole::Admin => agents.iter().collect(),
        AgentRole::SalesManager => agents.iter().filter(|a| same_team(a, viewer)).collect(),
        _ => vec![viewer],
    }
}

/// Only admins and sales managers choose whose leads they look at.
pub fn can_choose_agent(viewer: &Agent) -> bool {
    matches!(viewer.role, AgentRole::Admin | AgentRole::SalesManager)
}

pub fn default_agent_filter(viewer: &Agent) -> AgentFilter {
    if can_choose_agent(viewer) {
        AgentFilter::All
    } else {
        AgentFilter::Agent(viewer.id.clone())
    }
}

/// Check a requested agent filter against the viewer's scope.
///
/// Viewers who cannot choose are pinned to their own leads whatever they ask
/// for. Choosers get `All` or any visible agent; anything else is a scope error.
pub fn resolve_agent_filter(
    viewer: &Agent,
    agents: &[Agent],
    requested: &AgentFilter,
) -> Result<AgentFilter, DomainError> {
    if !can_choose_agent(viewer) {
        return Ok(default_agent_filter(viewer));
    }
    match requested {
        AgentFilter::All => Ok(AgentFilter::All),
        AgentFilter::Agent(id) => {
            if visible_agents(viewer, agents).iter().any(|a| &a.id == id) {
                Ok(requested.clone())
            } else {
                Err(DomainError::Scope(format!(
                    "agent {} is not visible to {} ({})",
                    id, viewer.name, viewer.role
                )))
            }
        }
    }
}

/// Agents listed in the team-performance view.
///
/// Sales managers get the field staff of their team (agents and telecallers),
/// not themselves.
pub fn performance_roster<'a>(viewer: &'a Agent, agents: &'a [Agent]) -> Vec<&'a Agent> {
    match viewer.role {
        AgentRole::Admin => agents.iter().collect(),
        AgentRole::SalesManager => agents
            .iter()
            .filter(|a| same_team(a, viewer))
            .filter(|a| matches!(a.role, AgentRole::Agent | AgentRole::Telecaller))
            .collect(),
        _ => vec![viewer],
    }
}

/// Look up the signed-in user among the snapshot's agents.
pub fn find_viewer<'a>(agents: &'a [Agent], id: &RecordId) -> Result<&'a Agent, DomainError> {
    agents
        .iter()
        .find(|a| &a.id == id)
        .ok_or_else(|| DomainError::Scope(format!("no agent with id {} in snapshot", id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn roster() -> Vec<Agent> {
        serde_json::from_value(json!([
            {"id": 1, "name": "Anita", "role": "Admin"},
            {"id": 2, "name": "Vikram", "role": "Sales Manager", "team": "North"},
            {"id": 3, "name": "Sara", "role": "Agent", "team": "North"},
            {"id": 4, "name": "Dev", "role": "Telecaller", "team": "North"},
            {"id": 5, "name": "Lina", "role": "Agent", "team": "South"},
            {"id": 6, "name": "Omar", "role": "Customer Support", "team": "North"}
        ]))
        .unwrap()
    }

    fn ids(agents: &[&Agent]) -> Vec<String> {
        agents.iter().map(|a| a.id.to_string()).collect()
    }

    #[test]
    fn visibility_by_role() {
        let agents = roster();
        assert_eq!(visible_agents(&agents[0], &agents).len(), 6);
        assert_eq!(ids(&visible_agents(&agents[1], &agents)), ["2", "3", "4", "6"]);
        assert_eq!(ids(&visible_agents(&agents[4], &agents)), ["5"]);
    }

    #[test]
    fn defaults_follow_role() {
        let agents = roster();
        assert_eq!(default_agent_filter(&agents[0]), AgentFilter::All);
        assert_eq!(default_agent_filter(&agents[1]), AgentFilter::All);
        assert_eq!(
            default_agent_filter(&agents[2]),
            AgentFilter::Agent(RecordId::from(3))
        );
    }

    #[test]
    fn resolve_pins_plain_agents_to_themselves() {
        let agents = roster();
        let got = resolve_agent_filter(&agents[2], &agents, &AgentFilter::All).unwrap();
        assert_eq!(got, AgentFilter::Agent(RecordId::from(3)));
    }

    #[test]
    fn resolve_rejects_agents_outside_team() {
        let agents = roster();
        let manager = &agents[1];
        let ok = resolve_agent_filter(manager, &agents, &AgentFilter::parse("4").unwrap());
        assert_eq!(ok.unwrap(), AgentFilter::Agent(RecordId::from(4)));
        let err = resolve_agent_filter(manager, &agents, &AgentFilter::parse("5").unwrap());
        assert!(matches!(err, Err(DomainError::Scope(_))));
        let admin = resolve_agent_filter(&agents[0], &agents, &AgentFilter::parse("5").unwrap());
        assert!(admin.is_ok());
    }

    #[test]
    fn performance_roster_is_field_staff() {
        let agents = roster();
        assert_eq!(ids(&performance_roster(&agents[1], &agents)), ["3", "4"]);
        assert_eq!(ids(&performance_roster(&agents[3], &agents)), ["4"]);
        assert_eq!(performance_roster(&agents[0], &agents).len(), 6);
    }

    #[test]
    fn unknown_viewer_is_scope_error() {
        let agents = roster();
        assert_eq!(find_viewer(&agents, &RecordId::new("2")).unwrap().name, "Vikram");
        assert!(find_viewer(&agents, &RecordId::from(99)).is_err());
    }
}
