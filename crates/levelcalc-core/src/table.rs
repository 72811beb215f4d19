//! Per-level cost rows and the cumulative tables built from them.
//!
//! A [`CostTable`] is built once per data refresh and never mutated
//! afterwards. Rebuilding on new source rows produces a fresh table that the
//! caller publishes in place of the old one.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::fixed::Amount;
use crate::lookup;
use crate::material::CostColumn;

/// Amount per cost column.
pub type Costs = BTreeMap<CostColumn, Amount>;

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// The cost of one level of one track, as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRow {
    pub level: u32,
    #[serde(default)]
    pub costs: Costs,
}

impl CostRow {
    pub fn new(level: u32) -> Self {
        Self {
            level,
            costs: Costs::new(),
        }
    }

    /// Builder-style helper. The column name is normalized.
    pub fn with_cost(mut self, column: &str, amount: Amount) -> Self {
        self.costs.insert(CostColumn::new(column), amount);
        self
    }
}

/// Running totals through `level`: every cost column summed over all source
/// rows at or below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativeCostRow {
    pub level: u32,
    pub cumulative: Costs,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Turn per-level rows into cumulative rows.
///
/// Rows are sorted by level first (stable, so duplicate levels keep their
/// source order). Columns are the union over every row; a row missing a
/// column contributes zero to it. Output length equals input length and each
/// column is non-decreasing down the output.
pub fn build_cumulative(rows: &[CostRow]) -> Vec<CumulativeCostRow> {
    let mut sorted: Vec<&CostRow> = rows.iter().collect();
    sorted.sort_by_key(|row| row.level);

    let mut running: Costs = rows
        .iter()
        .flat_map(|row| row.costs.keys())
        .map(|column| (column.clone(), 0))
        .collect();

    let mut out = Vec::with_capacity(sorted.len());
    for row in sorted {
        for (column, amount) in &row.costs {
            let total = running.entry(column.clone()).or_insert(0);
            *total = total.saturating_add(*amount);
        }
        out.push(CumulativeCostRow {
            level: row.level,
            cumulative: running.clone(),
        });
    }
    out
}

/// An inclusive run of levels, e.g. the rows a table lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelSpan {
    pub first: u32,
    pub last: u32,
}

impl LevelSpan {
    pub fn single(level: u32) -> Self {
        Self {
            first: level,
            last: level,
        }
    }

    /// Number of levels in the span.
    pub fn width(&self) -> u64 {
        u64::from(self.last - self.first) + 1
    }
}

impl fmt::Display for LevelSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

// ---------------------------------------------------------------------------
// CostTable
// ---------------------------------------------------------------------------

/// One track's source rows together with their cumulative rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostTable {
    /// Source rows sorted by level.
    source: Vec<CostRow>,
    /// Cumulative rows, parallel to `source`.
    rows: Vec<CumulativeCostRow>,
    /// Every cost column known to the table.
    columns: BTreeSet<CostColumn>,
}

impl CostTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from raw rows. Non-cost columns are dropped; column
    /// names are already normalized by [`CostColumn`].
    pub fn build(rows: impl IntoIterator<Item = CostRow>) -> Self {
        let mut source: Vec<CostRow> = rows
            .into_iter()
            .map(|mut row| {
                row.costs.retain(|column, _| column.is_cost());
                row
            })
            .collect();
        source.sort_by_key(|row| row.level);

        let rows = build_cumulative(&source);
        let columns: BTreeSet<CostColumn> = source
            .iter()
            .flat_map(|row| row.costs.keys().cloned())
            .collect();

        tracing::debug!(
            rows = source.len(),
            columns = columns.len(),
            "built cumulative cost table"
        );

        Self {
            source,
            rows,
            columns,
        }
    }

    pub fn source_rows(&self) -> &[CostRow] {
        &self.source
    }

    pub fn rows(&self) -> &[CumulativeCostRow] {
        &self.rows
    }

    pub fn columns(&self) -> &BTreeSet<CostColumn> {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Highest level present in the source data.
    pub fn max_level(&self) -> Option<u32> {
        self.source.last().map(|row| row.level)
    }

    /// Whether the source data carries a row for exactly `level`.
    pub fn has_level(&self, level: u32) -> bool {
        self.source
            .binary_search_by_key(&level, |row| row.level)
            .is_ok()
    }

    /// Levels in `range` with no source row, as ascending spans. Work is
    /// proportional to the number of source rows, not the width of `range`.
    pub fn missing_spans(&self, range: Range<u32>) -> Vec<LevelSpan> {
        let mut out = Vec::new();
        let mut next = range.start;
        let from = self.source.partition_point(|row| row.level < range.start);
        for row in &self.source[from..] {
            if row.level >= range.end {
                break;
            }
            if row.level > next {
                out.push(LevelSpan {
                    first: next,
                    last: row.level - 1,
                });
            }
            next = next.max(row.level + 1);
        }
        if next < range.end {
            out.push(LevelSpan {
                first: next,
                last: range.end - 1,
            });
        }
        out
    }

    /// Cumulative costs through `level`. See [`lookup::cumulative_at`].
    pub fn at(&self, level: i64) -> Costs {
        lookup::cumulative_at(&self.rows, &self.columns, level)
    }

    /// Cumulative amount of a single column through `level`.
    pub fn column_at(&self, column: &CostColumn, level: i64) -> Amount {
        lookup::predecessor(&self.rows, level)
            .and_then(|row| row.cumulative.get(column).copied())
            .unwrap_or(0)
    }
}
