//! File-backed adapters: snapshot source and filter memory.

pub mod snapshot_json;
pub mod state_json;

pub use snapshot_json::JsonSnapshotSource;
pub use state_json::FilterStateJson;
