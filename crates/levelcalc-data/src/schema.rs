//! On-disk row formats for cost sheets, shop sheets and average-drop sheets.
//!
//! Every sheet arrives as loosely typed rows: a map from normalized header
//! to a number or a piece of text. The conversions here turn those rows into
//! core types, rejecting rows that cannot be priced.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use levelcalc_core::fixed::{f64_to_fixed64, Fixed64};
use levelcalc_core::material::{normalize_header, CostColumn, MaterialKey};
use levelcalc_core::sources::ShopPlan;
use levelcalc_core::table::CostRow;

use crate::sheet::CsvSheet;
use crate::loader::DataLoadError;

/// Accepted names for the level column, after normalization.
pub const LEVEL_ALIASES: [&str; 3] = ["level", "lvl", "等級"];

/// Rows carrying a non-empty `season` cell belong to that season only.
pub const SEASON_COLUMN: &str = "season";

// ===========================================================================
// Raw values
// ===========================================================================

/// One cell: numeric when it reads as a number, text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Parse a CSV cell. Thousands separators are ignored and an empty cell
    /// reads as zero.
    pub fn parse(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return RawValue::Number(0.0);
        }
        match parse_number(trimmed) {
            Some(n) => RawValue::Number(n),
            None => RawValue::Text(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) if n.is_finite() => Some(*n),
            RawValue::Number(_) => None,
            RawValue::Text(s) => parse_number(s.trim()),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            RawValue::Number(n) => n.to_string(),
            RawValue::Text(s) => s.trim().to_string(),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub type RawRow = BTreeMap<String, RawValue>;

/// Re-key a row by normalized header. Later duplicates win.
pub fn normalize_row(row: RawRow) -> RawRow {
    row.into_iter()
        .map(|(k, v)| (normalize_header(&k), v))
        .collect()
}

/// Turn a CSV sheet into raw rows, keeping each record's line number.
pub fn sheet_rows(sheet: &CsvSheet) -> Vec<(usize, RawRow)> {
    sheet
        .records
        .iter()
        .map(|(line, record)| {
            let row = sheet
                .headers
                .iter()
                .enumerate()
                .filter(|(_, header)| !header.is_empty())
                .map(|(i, header)| (header.clone(), RawValue::parse(sheet.cell(record, i))))
                .collect();
            (*line, row)
        })
        .collect()
}

/// Whether `row` applies to `season`. Case-insensitive; rows with no season
/// are shared.
pub fn season_matches(row: &RawRow, season: &str) -> bool {
    match row.get(SEASON_COLUMN) {
        None => true,
        Some(RawValue::Number(n)) if *n == 0.0 => true,
        Some(value) => {
            let tag = value.as_text();
            tag.is_empty() || tag.eq_ignore_ascii_case(season)
        }
    }
}

// ===========================================================================
// Cost rows
// ===========================================================================

fn invalid(file: &Path, row: usize, detail: impl Into<String>) -> DataLoadError {
    DataLoadError::InvalidRow {
        file: file.to_path_buf(),
        row,
        detail: detail.into(),
    }
}

fn level_of(row: &RawRow) -> Option<f64> {
    LEVEL_ALIASES
        .iter()
        .find_map(|alias| row.get(*alias))
        .and_then(RawValue::as_f64)
}

/// Convert one raw row into a [`CostRow`].
///
/// The level must be a whole number >= 1. Cost cells must be non-negative;
/// fractional costs are floored and unreadable text counts as zero.
pub fn to_cost_row(row: &RawRow, file: &Path, index: usize) -> Result<CostRow, DataLoadError> {
    let level = level_of(row).ok_or_else(|| invalid(file, index, "no level column"))?;
    if level < 1.0 || level.fract() != 0.0 || level > f64::from(u32::MAX) {
        return Err(invalid(file, index, format!("level {level} is not a positive integer")));
    }

    let mut out = CostRow::new(level as u32);
    for (header, value) in row {
        let column = CostColumn::new(header);
        if !column.is_cost() {
            continue;
        }
        let amount = match value.as_f64() {
            Some(n) if n < 0.0 => {
                return Err(invalid(file, index, format!("{header} is negative")));
            }
            Some(n) => n.floor() as u64,
            None => {
                tracing::warn!(file = %file.display(), row = index, column = %header, "unreadable cost, using zero");
                0
            }
        };
        out.costs.insert(column, amount);
    }
    Ok(out)
}

/// Filter by season and convert every row. `index` in errors is the CSV line
/// number when known, otherwise the 1-based position in the list.
pub fn to_cost_rows(
    rows: &[(usize, RawRow)],
    season: &str,
    file: &Path,
) -> Result<Vec<CostRow>, DataLoadError> {
    let kept: Vec<&(usize, RawRow)> = rows
        .iter()
        .filter(|(_, row)| season_matches(row, season))
        .collect();
    tracing::debug!(
        file = %file.display(),
        total = rows.len(),
        kept = kept.len(),
        season,
        "filtered rows by season"
    );
    kept.into_iter()
        .map(|(index, row)| to_cost_row(row, file, *index))
        .collect()
}

// ===========================================================================
// Shop and average sheets
// ===========================================================================

/// Shop sheet: `id, average, cost_rola[, season]`. The average daily buy
/// becomes the default daily purchase.
pub fn to_shop_plans(rows: &[(usize, RawRow)], season: &str) -> BTreeMap<MaterialKey, ShopPlan> {
    let number = |row: &RawRow, key: &str| -> Fixed64 {
        row.get(key)
            .and_then(RawValue::as_f64)
            .map(f64_to_fixed64)
            .unwrap_or(Fixed64::ZERO)
    };
    rows.iter()
        .filter(|(_, row)| season_matches(row, season))
        .filter_map(|(_, row)| {
            let id = row.get("id")?.as_text().to_lowercase();
            if id.is_empty() {
                return None;
            }
            let plan = ShopPlan {
                daily_buy: number(row, "average"),
                rola_unit_cost: number(row, "cost_rola"),
            };
            Some((MaterialKey::from_column(&id), plan))
        })
        .collect()
}

/// Average-drop sheet: first column is the material id, second the average.
/// Unreadable averages count as zero.
pub fn to_averages(sheet: &CsvSheet) -> BTreeMap<MaterialKey, Fixed64> {
    sheet
        .records
        .iter()
        .filter_map(|(_, record)| {
            let id = sheet.cell(record, 0).to_lowercase();
            if id.is_empty() {
                return None;
            }
            let avg = RawValue::parse(sheet.cell(record, 1))
                .as_f64()
                .map(f64_to_fixed64)
                .unwrap_or(Fixed64::ZERO);
            Some((MaterialKey::from_column(&id), avg))
        })
        .collect()
}
