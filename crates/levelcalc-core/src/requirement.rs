//! Requirement aggregation across tracks.
//!
//! A player at level `L` has already paid the cumulative cost through
//! `L - 1`, so moving from `current` to `target` costs
//! `at(target - 1) - at(current - 1)`. Before pricing a range the source rows
//! must cover every level in `[current, target)`; otherwise the track reports
//! a [`DataGap`] and contributes nothing, leaving other tracks unaffected.

use std::collections::{BTreeMap, BTreeSet};

use crate::fixed::Amount;
use crate::material::{Amounts, MaterialKey};
use crate::table::{CostTable, LevelSpan};
use crate::track::TrackKind;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A level range that the source data cannot fully price.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, thiserror::Error)]
#[error("missing data: {track} has no row for level {}", format_spans(.missing))]
pub struct DataGap {
    /// Which track (slot id or relic tier) hit the gap.
    pub track: String,
    /// Missing levels in the requested range, as ascending spans.
    pub missing: Vec<LevelSpan>,
    /// Materials the track's table prices, or the track kind's usual
    /// materials when the table has no columns.
    pub materials: Vec<MaterialKey>,
}

impl DataGap {
    pub fn first_missing(&self) -> Option<u32> {
        self.missing.first().map(|span| span.first)
    }
}

fn format_spans(spans: &[LevelSpan]) -> String {
    spans
        .iter()
        .map(LevelSpan::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Single-track pricing
// ---------------------------------------------------------------------------

/// Materials needed to move one track from `current` to `target`.
///
/// Empty unless `target > current`. Each material's delta is clamped at zero
/// so a corrupted, non-monotonic table cannot surface a negative need.
pub fn requirement_delta(table: &CostTable, current: u32, target: u32) -> Amounts {
    let mut out = Amounts::new();
    if target <= current {
        return out;
    }
    let start = table.at(i64::from(current) - 1);
    let end = table.at(i64::from(target) - 1);
    for (column, end_amount) in end {
        let start_amount = start.get(&column).copied().unwrap_or(0);
        let delta = end_amount.saturating_sub(start_amount);
        let total = out.entry(column.material()).or_insert(0);
        *total = total.saturating_add(delta);
    }
    out
}

/// [`requirement_delta`] guarded by a source-data coverage check over
/// `[current, target)`.
pub fn checked_delta(
    table: &CostTable,
    kind: TrackKind,
    track: &str,
    current: u32,
    target: u32,
) -> Result<Amounts, DataGap> {
    if target <= current {
        return Ok(Amounts::new());
    }
    let missing = table.missing_spans(current..target);
    if !missing.is_empty() {
        let mut materials: BTreeSet<MaterialKey> =
            table.columns().iter().map(|column| column.material()).collect();
        if materials.is_empty() {
            materials = kind.usual_materials().iter().copied().map(MaterialKey::from).collect();
        }
        return Err(DataGap {
            track: track.to_string(),
            missing,
            materials: materials.into_iter().collect(),
        });
    }
    Ok(requirement_delta(table, current, target))
}

// ---------------------------------------------------------------------------
// Totals
// ---------------------------------------------------------------------------

/// How one material shows up in the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialLine {
    /// Fully priced.
    Total(Amount),
    /// At least one contributing track could not be priced.
    MissingData(Vec<DataGap>),
}

/// Per-material running sum for one calculation pass, plus the data gaps
/// encountered along the way.
///
/// Adding tracks is commutative and associative: the order of
/// [`RequirementTotals::add_track`] calls never changes the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementTotals {
    totals: Amounts,
    gaps: BTreeSet<DataGap>,
}

impl RequirementTotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count` copies of an already priced requirement.
    pub fn add(&mut self, requirement: &Amounts, count: u32) {
        for (material, amount) in requirement {
            let total = self.totals.entry(material.clone()).or_insert(0);
            *total = total.saturating_add(amount.saturating_mul(u64::from(count)));
        }
    }

    /// Price one track (`count` identical copies of it) and fold it in.
    /// A data gap is recorded and the track contributes nothing.
    pub fn add_track(
        &mut self,
        table: &CostTable,
        kind: TrackKind,
        track: &str,
        current: u32,
        target: u32,
        count: u32,
    ) -> Result<(), DataGap> {
        match checked_delta(table, kind, track, current, target) {
            Ok(delta) => {
                self.add(&delta, count);
                Ok(())
            }
            Err(gap) => {
                tracing::warn!(
                    track,
                    first_missing = gap.first_missing(),
                    "cost data does not cover requested levels"
                );
                self.gaps.insert(gap.clone());
                Err(gap)
            }
        }
    }

    pub fn record_gap(&mut self, gap: DataGap) {
        self.gaps.insert(gap);
    }

    /// Fold another pass's totals into this one.
    pub fn merge(&mut self, other: &RequirementTotals) {
        self.add(&other.totals, 1);
        self.gaps.extend(other.gaps.iter().cloned());
    }

    /// Numeric totals, excluding any material marked as missing data.
    pub fn priced(&self) -> Amounts {
        let blocked = self.blocked_materials();
        self.totals
            .iter()
            .filter(|(material, _)| !blocked.contains(*material))
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Raw totals from every track that priced successfully.
    pub fn totals(&self) -> &Amounts {
        &self.totals
    }

    pub fn gaps(&self) -> impl Iterator<Item = &DataGap> {
        self.gaps.iter()
    }

    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }

    /// One line per material: a total or a missing-data marker, never both.
    pub fn lines(&self) -> BTreeMap<MaterialKey, MaterialLine> {
        let mut out: BTreeMap<MaterialKey, MaterialLine> = self
            .totals
            .iter()
            .map(|(k, v)| (k.clone(), MaterialLine::Total(*v)))
            .collect();
        for gap in &self.gaps {
            for material in &gap.materials {
                let line = out
                    .entry(material.clone())
                    .or_insert_with(|| MaterialLine::MissingData(Vec::new()));
                match line {
                    MaterialLine::MissingData(gaps) => gaps.push(gap.clone()),
                    other => *other = MaterialLine::MissingData(vec![gap.clone()]),
                }
            }
        }
        out
    }

    fn blocked_materials(&self) -> BTreeSet<&MaterialKey> {
        self.gaps.iter().flat_map(|gap| gap.materials.iter()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CostRow;

    /// Every level 1..=10 costs 10 of `cost_stone_ore`.
    fn flat_table() -> CostTable {
        CostTable::build((1..=10).map(|lvl| CostRow::new(lvl).with_cost("cost_stone_ore", 10)))
    }

    fn stone() -> MaterialKey {
        MaterialKey::new("stoneOre")
    }

    #[test]
    fn zero_width_and_backward_ranges_are_empty() {
        let table = flat_table();
        for level in 0..12 {
            assert!(requirement_delta(&table, level, level).is_empty());
            assert!(requirement_delta(&table, level, level.saturating_sub(5)).is_empty());
        }
    }

    #[test]
    fn at_level_means_paid_through_previous() {
        let table = flat_table();
        // cumulative(2) - cumulative(0) = 20 - 0
        assert_eq!(requirement_delta(&table, 1, 3)[&stone()], 20);
        assert_eq!(requirement_delta(&table, 4, 5)[&stone()], 10);
    }

    #[test]
    fn corrupted_table_never_goes_negative() {
        // build_cumulative cannot produce a decreasing column, so load one.
        let table: CostTable = serde_json::from_str(
            r#"{
                "source": [
                    {"level": 1, "costs": {"cost_rola": 5}},
                    {"level": 2, "costs": {"cost_rola": 5}}
                ],
                "rows": [
                    {"level": 1, "cumulative": {"cost_rola": 9}},
                    {"level": 2, "cumulative": {"cost_rola": 4}}
                ],
                "columns": ["cost_rola"]
            }"#,
        )
        .unwrap();
        let delta = requirement_delta(&table, 2, 3);
        assert_eq!(delta[&MaterialKey::new("rola")], 0);
    }

    #[test]
    fn gap_is_reported_instead_of_total() {
        let table = CostTable::build(
            (1..=10)
                .filter(|lvl| *lvl != 5)
                .map(|lvl| CostRow::new(lvl).with_cost("cost_stone_ore", 10)),
        );
        let err = checked_delta(&table, TrackKind::Equipment, "equipment_helmet", 3, 7).unwrap_err();
        assert_eq!(err.missing, vec![LevelSpan::single(5)]);
        assert_eq!(err.materials, vec![stone()]);
        assert!(err.to_string().contains("equipment_helmet"));
        assert!(err.to_string().contains('5'));
    }

    #[test]
    fn absent_table_charges_the_usual_materials() {
        let mut totals = RequirementTotals::new();
        let gap = totals
            .add_track(&CostTable::empty(), TrackKind::Pet, "pet1", 1, 5, 1)
            .unwrap_err();
        assert_eq!(gap.missing, vec![LevelSpan { first: 1, last: 4 }]);
        assert_eq!(gap.materials, vec![MaterialKey::new("freezeDried")]);
        assert!(matches!(
            totals.lines()[&MaterialKey::new("freezeDried")],
            MaterialLine::MissingData(_)
        ));
        assert!(totals.priced().is_empty());
    }

    #[test]
    fn runaway_target_stays_one_span() {
        let table = CostTable::build((1..=200).map(|lvl| CostRow::new(lvl).with_cost("cost_exp", 1)));
        let gap = checked_delta(&table, TrackKind::Character, "character", 1, 50_000_000).unwrap_err();
        assert_eq!(gap.missing.len(), 1);
        assert_eq!(gap.first_missing(), Some(201));
        assert!(gap.to_string().contains("201-49999999"));
    }

    #[test]
    fn gap_in_one_track_does_not_block_another() {
        let good = flat_table();
        let holey = CostTable::build(vec![
            CostRow::new(1).with_cost("cost_essence", 50),
            CostRow::new(3).with_cost("cost_essence", 100),
        ]);

        let mut totals = RequirementTotals::new();
        totals.add_track(&good, TrackKind::Equipment, "equipment_boots", 1, 3, 1).unwrap();
        assert!(totals.add_track(&holey, TrackKind::Skill, "skill_combat1", 1, 3, 1).is_err());

        assert_eq!(totals.priced()[&stone()], 20);
        let lines = totals.lines();
        assert_eq!(lines[&stone()], MaterialLine::Total(20));
        assert!(matches!(
            &lines[&MaterialKey::new("essence")],
            MaterialLine::MissingData(gaps) if gaps[0].missing == vec![LevelSpan::single(2)]
        ));
    }

    #[test]
    fn gap_material_is_excluded_from_priced_totals() {
        let a = flat_table();
        let b = CostTable::build(vec![CostRow::new(1).with_cost("cost_stone_ore", 1)]);
        let mut totals = RequirementTotals::new();
        totals.add_track(&a, TrackKind::Equipment, "equipment_armor", 1, 3, 1).unwrap();
        totals.add_track(&b, TrackKind::Equipment, "equipment_boots", 1, 4, 1).unwrap_err();
        assert!(totals.priced().get(&stone()).is_none());
        assert_eq!(totals.totals()[&stone()], 20);
        assert!(matches!(totals.lines()[&stone()], MaterialLine::MissingData(_)));
    }

    #[test]
    fn order_of_tracks_does_not_matter() {
        let a = flat_table();
        let b = CostTable::build(vec![
            CostRow::new(1).with_cost("cost_stone_ore", 3).with_cost("cost_rola", 7),
        ]);
        let holey = CostTable::build(vec![CostRow::new(2).with_cost("cost_rola", 1)]);

        let mut forward = RequirementTotals::new();
        forward.add_track(&a, TrackKind::Equipment, "a", 2, 6, 1).ok();
        forward.add_track(&b, TrackKind::Equipment, "b", 1, 2, 3).ok();
        forward.add_track(&holey, TrackKind::Equipment, "c", 1, 3, 1).ok();

        let mut backward = RequirementTotals::new();
        backward.add_track(&holey, TrackKind::Equipment, "c", 1, 3, 1).ok();
        backward.add_track(&b, TrackKind::Equipment, "b", 1, 2, 3).ok();
        backward.add_track(&a, TrackKind::Equipment, "a", 2, 6, 1).ok();

        assert_eq!(forward, backward);
        assert_eq!(forward.lines(), backward.lines());
    }

    #[test]
    fn counts_multiply_the_delta() {
        let table = flat_table();
        let mut totals = RequirementTotals::new();
        totals.add_track(&table, TrackKind::Relic, "relic_tier_12", 2, 4, 5).unwrap();
        assert_eq!(totals.totals()[&stone()], 100);
    }

    #[test]
    fn merge_sums_and_keeps_gaps() {
        let table = flat_table();
        let mut a = RequirementTotals::new();
        a.add_track(&table, TrackKind::Equipment, "x", 1, 2, 1).unwrap();
        let mut b = RequirementTotals::new();
        b.add_track(&table, TrackKind::Equipment, "y", 1, 3, 1).unwrap();
        b.record_gap(DataGap {
            track: "z".into(),
            missing: vec![LevelSpan::single(11)],
            materials: vec![MaterialKey::new("rola")],
        });
        a.merge(&b);
        assert_eq!(a.totals()[&stone()], 30);
        assert!(a.has_gaps());
    }
}
