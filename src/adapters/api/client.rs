//! CRM backend adapter. Implements LeadSourcePort over the REST API.

use crate::adapters::api::mapper::{ApiAgent, ApiLead, ListBody, agent_to_domain, error_message, lead_to_domain};
use crate::domain::{CrmSnapshot, DomainError};
use crate::ports::LeadSourcePort;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default backend location used by the CRM frontend.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Reads leads and agents from `{base}/leads/` and `{base}/agents/`.
///
/// Sends `Authorization: Bearer <token>` when a token is configured.
pub struct ApiLeadSource {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiLeadSource {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::Source(format!("HTTP client setup failed: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// `{base}/{path}/` with exactly one slash between the parts.
    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            path.trim_matches('/')
        )
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, DomainError> {
        let url = self.endpoint(path);
        debug!(url = %url, "requesting CRM list");

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::Source(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, url = %url, "CRM API returned error");
            let message = error_message(&text).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
            return Err(DomainError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ListBody<T> = response
            .json()
            .await
            .map_err(|e| DomainError::Source(format!("Failed to parse {} response: {}", path, e)))?;
        Ok(body.into_items())
    }
}

#[async_trait::async_trait]
impl LeadSourcePort for ApiLeadSource {
    async fn load_snapshot(&self) -> Result<CrmSnapshot, DomainError> {
        let (leads, agents) = tokio::try_join!(
            self.get_list::<ApiLead>("leads"),
            self.get_list::<ApiAgent>("agents"),
        )?;

        info!(
            base_url = %self.base_url,
            leads = leads.len(),
            agents = agents.len(),
            "fetched CRM records"
        );

        Ok(CrmSnapshot {
            leads: leads.into_iter().map(lead_to_domain).collect(),
            agents: agents.into_iter().map(agent_to_domain).collect(),
        })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
