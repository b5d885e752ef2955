//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these. The dashboard computation
//! itself is total and never returns one.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Snapshot source error: {0}")]
    Source(String),

    /// The CRM backend answered with a non-success status.
    #[error("CRM API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("State error: {0}")]
    State(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Input error: {0}")]
    Input(String),

    /// Viewer unknown, or an agent filter outside the viewer's scope.
    #[error("Scope error: {0}")]
    Scope(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}
