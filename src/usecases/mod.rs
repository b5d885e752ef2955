//! Application use cases. Orchestrate domain logic via ports.

pub mod dashboard_service;
pub mod report_service;

pub use dashboard_service::{DashboardService, DashboardView};
pub use report_service::ReportService;
