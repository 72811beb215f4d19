//! Server time presets: named deadlines (maintenance, season end) read from
//! a `time_presets` sheet with `server_name, description, time` columns.
//!
//! Only the calendar date of `time` is used. Every preset lands on the
//! server's daily reset, 08:00 at UTC+8.

use std::path::Path;

use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use levelcalc_core::time::Timestamp;

use crate::loader::{find_data_file, DataLoadError};
use crate::schema::{RawRow, RawValue};
use crate::season::read_rows;

pub const PRESETS_FILE: &str = "time_presets";

pub const SERVER_UTC_OFFSET_SECS: i32 = 8 * 3600;
pub const SERVER_RESET_HOUR: u32 = 8;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePreset {
    pub server_name: String,
    pub label: String,
    pub at: Timestamp,
}

/// Extract the calendar date from `2025-03-01T12:00:00Z`, `2025-03-01`,
/// `2025/3/1` or `2025/3/1 04:00`.
pub fn parse_preset_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date = match raw.split_once('T') {
        Some((date, _)) => date,
        None => raw.split_whitespace().next()?,
    };
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date, fmt).ok())
}

/// The server reset instant on `date`.
pub fn server_reset_at(date: NaiveDate) -> Option<Timestamp> {
    let offset = FixedOffset::east_opt(SERVER_UTC_OFFSET_SECS)?;
    let local = date.and_hms_opt(SERVER_RESET_HOUR, 0, 0)?;
    let at = local.and_local_timezone(offset).single()?;
    Some(Timestamp::from_millis(at.timestamp_millis()))
}

/// Read presets from `time_presets.*` in `dir`. Rows with no server name or
/// an unreadable date are skipped. A missing file yields no presets.
pub fn load_presets(dir: &Path) -> Result<Vec<TimePreset>, DataLoadError> {
    let Some(path) = find_data_file(dir, PRESETS_FILE)? else {
        return Ok(Vec::new());
    };
    let rows = read_rows(&path)?;
    let text = |row: &RawRow, key: &str| {
        row.get(key).map(RawValue::as_text).unwrap_or_default()
    };

    let mut presets = Vec::new();
    for (line, row) in &rows {
        let server_name = text(row, "server_name");
        let time = text(row, "time");
        let at = parse_preset_date(&time).and_then(server_reset_at);
        match at {
            Some(at) if !server_name.is_empty() => presets.push(TimePreset {
                server_name,
                label: text(row, "description"),
                at,
            }),
            _ => tracing::debug!(file = %path.display(), row = line, time = %time, "skipping time preset"),
        }
    }
    Ok(presets)
}
