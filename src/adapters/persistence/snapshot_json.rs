//! Implements LeadSourcePort from a JSON export on disk.
//!
//! File shape: `{"leads": [...], "agents": [...]}` in the frontend's camelCase form.

use crate::domain::{CrmSnapshot, DomainError};
use crate::ports::LeadSourcePort;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// File-system snapshot source. Re-reads the file on every load.
pub struct JsonSnapshotSource {
    path: PathBuf,
}

impl JsonSnapshotSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl LeadSourcePort for JsonSnapshotSource {
    async fn load_snapshot(&self) -> Result<CrmSnapshot, DomainError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(DomainError::Source(format!(
                    "snapshot file not found: {}",
                    self.path.display()
                )));
            }
            Err(e) => {
                return Err(DomainError::Source(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let snapshot: CrmSnapshot = serde_json::from_str(&raw).map_err(|e| {
            DomainError::Source(format!("parse {}: {}", self.path.display(), e))
        })?;

        let abs_path = self.path.canonicalize().unwrap_or_else(|_| self.path.clone());
        info!(
            path = %abs_path.display(),
            leads = snapshot.leads.len(),
            agents = snapshot.agents.len(),
            "read snapshot from disk"
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
