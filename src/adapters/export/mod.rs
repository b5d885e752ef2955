//! Export adapters: flat files derived from a computed dashboard.

pub mod csv_utils;

pub use csv_utils::{chart_to_csv, daily_calls_to_csv, follow_ups_to_csv};
