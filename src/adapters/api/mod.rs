//! CRM REST backend: HTTP client and payload mapping.

pub mod client;
pub mod mapper;

pub use client::{ApiLeadSource, DEFAULT_API_BASE_URL};
