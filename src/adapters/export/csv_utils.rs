//! CSV utilities for dashboard exports. Uses the `csv` crate for quoting and escaping.
//!
//! Each function renders one dashboard dataset as a comma-separated table with a header row.

use crate::domain::dashboard::{ChartData, DailyPerformance, RecentFollowUp};

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new())
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

/// Format: `task_id,lead_id,lead_name,follow_up_date,status,owner`.
///
/// Missing status and owner are written as empty fields.
pub fn follow_ups_to_csv(rows: &[RecentFollowUp]) -> Result<String, csv::Error> {
    let mut wtr = writer();
    wtr.write_record(["task_id", "lead_id", "lead_name", "follow_up_date", "status", "owner"])?;

    for row in rows {
        let status = row.status.map(|s| s.label()).unwrap_or_default();
        let owner = row.owner_name.as_deref().unwrap_or_default();
        // Names come from free-text forms; keep one row per record.
        let name = row.lead_name.replace(['\n', '\r'], " ");
        wtr.write_record([
            row.id.as_str(),
            row.lead_id.as_str(),
            name.as_str(),
            row.follow_up_date.as_str(),
            status,
            owner,
        ])?;
    }

    wtr.flush()?;
    into_string(wtr)
}

/// Format: `day,label,calls` with `day` as ISO date.
pub fn daily_calls_to_csv(rows: &[DailyPerformance]) -> Result<String, csv::Error> {
    let mut wtr = writer();
    wtr.write_record(["day", "label", "calls"])?;
    for row in rows {
        wtr.write_record([
            row.day.format("%Y-%m-%d").to_string(),
            row.date.clone(),
            row.calls.to_string(),
        ])?;
    }
    wtr.flush()?;
    into_string(wtr)
}

/// Two-column chart table; `name_header` labels the first column.
pub fn chart_to_csv(rows: &[ChartData], name_header: &str) -> Result<String, csv::Error> {
    let mut wtr = writer();
    wtr.write_record([name_header, "count"])?;
    for row in rows {
        wtr.write_record([row.name.clone(), row.value.to_string()])?;
    }
    wtr.flush()?;
    into_string(wtr)
}
