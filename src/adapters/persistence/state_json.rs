//! Implements FilterStatePort using a JSON file.
//!
//! Remembers the last applied dashboard filters per viewer.

use crate::domain::{DashboardFilters, DomainError, RecordId};
use crate::ports::FilterStatePort;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// State: user id -> last filters.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateData {
    #[serde(default)]
    filters: BTreeMap<RecordId, DashboardFilters>,
}

/// JSON file-based filter memory.
pub struct FilterStateJson {
    path: std::path::PathBuf,
    cache: tokio::sync::RwLock<StateData>,
}

impl FilterStateJson {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: tokio::sync::RwLock::new(StateData::default()),
        }
    }

    /// Load state from disk. A missing or unreadable file starts empty.
    pub async fn load(&self) -> Result<(), DomainError> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt filter state");
                StateData::default()
            }),
            Err(_) => StateData::default(),
        };
        *self.cache.write().await = data;
        Ok(())
    }

    /// Write to a temp file, sync, then rename over the target.
    async fn save(&self) -> Result<(), DomainError> {
        let data = self.cache.read().await;
        let json =
            serde_json::to_string_pretty(&*data).map_err(|e| DomainError::State(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::State(format!("create state dir: {}", e)))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::State(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::State(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::State(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::State(format!("atomic rename failed: {}", e)))?;

        debug!(path = %self.path.display(), "filter state saved");
        Ok(())
    }
}

#[async_trait::async_trait]
impl FilterStatePort for FilterStateJson {
    async fn get_filters(&self, user: &RecordId) -> Result<Option<DashboardFilters>, DomainError> {
        let cache = self.cache.read().await;
        Ok(cache.filters.get(user).cloned())
    }

    async fn set_filters(
        &self,
        user: &RecordId,
        filters: &DashboardFilters,
    ) -> Result<(), DomainError> {
        {
            let mut cache = self.cache.write().await;
            if cache.filters.get(user) == Some(filters) {
                return Ok(());
            }
            cache.filters.insert(user.clone(), filters.clone());
        }
        self.save().await
    }
}
