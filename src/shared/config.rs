//! Application configuration. Data paths, CRM backend location, signed-in user.

use crate::adapters::api::DEFAULT_API_BASE_URL;
use crate::domain::RecordId;
use serde::Deserialize;
use std::path::PathBuf;

/// Default HTTP timeout for backend requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Root for state and reports. Read from LEADBOARD_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// JSON export used when no backend is configured. Read from LEADBOARD_SNAPSHOT_PATH.
    #[serde(default)]
    pub snapshot_path: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // CRM backend
    // ─────────────────────────────────────────────────────────────────────────
    /// Backend base URL, e.g. http://127.0.0.1:8000/api. Read from LEADBOARD_API_BASE_URL.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Bearer token. Read from LEADBOARD_API_TOKEN.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Read from LEADBOARD_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Skip the sign-in prompt. Read from LEADBOARD_USER_ID.
    #[serde(default)]
    pub user_id: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("LEADBOARD_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("LEADBOARD").try_parsing(true));
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    /// Defaults to `<data_dir>/snapshot.json`.
    pub fn snapshot_path_or_default(&self) -> PathBuf {
        self.snapshot_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.data_dir_or_default().join("snapshot.json"))
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir_or_default().join("state.json")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.data_dir_or_default().join("reports")
    }

    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    /// Signed-in user from config, if any.
    pub fn user_id(&self) -> Option<RecordId> {
        self.user_id
            .as_deref()
            .map(RecordId::new)
            .filter(|id| !id.is_unassigned())
    }

    /// Returns true if the REST backend should be used instead of the JSON export.
    pub fn is_api_configured(&self) -> bool {
        self.api_base_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty())
    }
}
