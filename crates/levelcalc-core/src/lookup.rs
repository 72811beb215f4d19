//! Range-cost lookup over cumulative tables.
//!
//! Source tables are sparse: a level may have no row of its own. The lookup
//! answers with the nearest row at or below the requested level, and with
//! zeros when there is none. It is total over every `i64`.

use std::collections::BTreeSet;

use crate::material::CostColumn;
use crate::table::{Costs, CumulativeCostRow};

/// The row with the greatest `level <= level`, if any.
///
/// `rows` must be sorted ascending by level, which [`crate::table::CostTable`]
/// guarantees.
pub fn predecessor(rows: &[CumulativeCostRow], level: i64) -> Option<&CumulativeCostRow> {
    if level <= 0 {
        return None;
    }
    let idx = rows.partition_point(|row| i64::from(row.level) <= level);
    idx.checked_sub(1).map(|i| &rows[i])
}

/// Cumulative costs through `level`.
///
/// Every column in `columns` is present in the result, zero-filled when the
/// level is `<= 0` or precedes the first row, so callers can subtract two
/// lookups without checking for missing keys. Levels past the end of the
/// table degrade to the last row.
pub fn cumulative_at(
    rows: &[CumulativeCostRow],
    columns: &BTreeSet<CostColumn>,
    level: i64,
) -> Costs {
    let mut out: Costs = columns.iter().map(|column| (column.clone(), 0)).collect();
    if let Some(row) = predecessor(rows, level) {
        out.extend(row.cumulative.iter().map(|(k, v)| (k.clone(), *v)));
    }
    out
}
