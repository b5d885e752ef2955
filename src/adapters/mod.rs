//! Infrastructure adapters. Implement outbound ports.
//!
//! CRM backend, filesystem, terminal UI. Map errors to DomainError.

pub mod api;
pub mod export;
pub mod persistence;
pub mod ui;
