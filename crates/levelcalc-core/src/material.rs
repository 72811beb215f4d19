//! Material identifiers and raw cost column names.
//!
//! Source sheets name their cost columns `cost_<material>` in snake case and
//! are not reliably clean (stray whitespace, a byte-order mark on the first
//! header, mixed case). [`CostColumn`] stores the normalized column name;
//! [`MaterialKey`] is the camel-case id the rest of the planner speaks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fixed::{Amount, Rate};

/// Prefix every cost column carries.
pub const COST_PREFIX: &str = "cost_";

/// Quantity per material.
pub type Amounts = BTreeMap<MaterialKey, Amount>;

/// Hourly production rate per material.
pub type Rates = BTreeMap<MaterialKey, Rate>;

/// Lowercase, trim and strip a leading byte-order mark.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
}

/// A normalized cost column name such as `cost_stone_ore`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CostColumn(String);

impl CostColumn {
    pub fn new(raw: &str) -> Self {
        Self(normalize_header(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this column carries a cost (as opposed to `level`, `season`, ...).
    pub fn is_cost(&self) -> bool {
        self.0.starts_with(COST_PREFIX)
    }

    pub fn material(&self) -> MaterialKey {
        MaterialKey::from_column(&self.0)
    }
}

impl From<String> for CostColumn {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<CostColumn> for String {
    fn from(column: CostColumn) -> Self {
        column.0
    }
}

impl fmt::Display for CostColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a material (`rola`, `stoneOre`, `exp`, ...). Cheap to compare,
/// ordered so reports iterate deterministically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialKey(String);

impl MaterialKey {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `cost_stone_ore` -> `stoneOre`. Pure and deterministic.
    pub fn from_column(column: &str) -> Self {
        let body = column.strip_prefix(COST_PREFIX).unwrap_or(column);
        Self(snake_to_camel(body))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MaterialKey {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Uppercase every lowercase ASCII letter that follows an underscore and
/// drop that underscore. Other underscores are kept.
fn snake_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('_', Some(next)) if next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_bom_whitespace_and_case() {
        assert_eq!(normalize_header("\u{feff}Cost_Rola "), "cost_rola");
        assert_eq!(normalize_header("  \u{feff} LEVEL"), "level");
        assert_eq!(normalize_header("cost_exp"), "cost_exp");
    }

    #[test]
    fn column_maps_to_camel_case_material() {
        assert_eq!(CostColumn::new("cost_stone_ore").material().as_str(), "stoneOre");
        assert_eq!(
            CostColumn::new("COST_REFINING_STONE").material().as_str(),
            "refiningStone"
        );
        assert_eq!(CostColumn::new("cost_rola").material().as_str(), "rola");
    }

    #[test]
    fn underscores_before_non_letters_survive() {
        assert_eq!(MaterialKey::from_column("cost_tier_2").as_str(), "tier_2");
        assert_eq!(MaterialKey::from_column("cost_trailing_").as_str(), "trailing_");
    }

    #[test]
    fn cost_detection() {
        assert!(CostColumn::new(" Cost_Sand").is_cost());
        assert!(!CostColumn::new("level").is_cost());
        assert!(!CostColumn::new("season").is_cost());
    }

    #[test]
    fn column_deserializes_normalized() {
        let col: CostColumn = serde_json::from_str("\"\\ufeffCOST_SAND \"").unwrap();
        assert_eq!(col.as_str(), "cost_sand");
    }
}
