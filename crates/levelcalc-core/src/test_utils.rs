//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::collections::BTreeMap;

use crate::fixed::{f64_to_fixed64, Fixed64};
use crate::material::MaterialKey;
use crate::plan::{CalcInput, Calculator, CalculatorConfig, CostBook, EXP_MATERIAL};
use crate::season::{GroupWeights, SeasonScoring};
use crate::table::{CostRow, CostTable};
use crate::time::Timestamp;
use crate::track::{Targets, TrackKind};

// ===========================================================================
// Small helpers
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    f64_to_fixed64(v)
}

pub fn key(id: &str) -> MaterialKey {
    MaterialKey::new(id)
}

/// Every level in `levels` costs `amount` of `column`.
pub fn flat_rows(levels: impl IntoIterator<Item = u32>, column: &str, amount: u64) -> Vec<CostRow> {
    levels
        .into_iter()
        .map(|lvl| CostRow::new(lvl).with_cost(column, amount))
        .collect()
}

pub fn flat_table(levels: impl IntoIterator<Item = u32>, column: &str, amount: u64) -> CostTable {
    CostTable::build(flat_rows(levels, column, amount))
}

// ===========================================================================
// Sample season
// ===========================================================================

/// Leaving level k costs `250 * k` experience, for levels 1..=200.
pub fn character_rows() -> Vec<CostRow> {
    (1..=200)
        .map(|lvl| CostRow::new(lvl).with_cost("cost_exp", 250 * u64::from(lvl)))
        .collect()
}

/// 10 stone ore and 100 rola per level, levels 1..=30.
pub fn equipment_rows() -> Vec<CostRow> {
    (1..=30)
        .map(|lvl| {
            CostRow::new(lvl)
                .with_cost("cost_stone_ore", 10)
                .with_cost("cost_rola", 100)
        })
        .collect()
}

pub fn skill_rows() -> Vec<CostRow> {
    (1..=30)
        .map(|lvl| CostRow::new(lvl).with_cost("cost_essence", 25 * u64::from(lvl)))
        .collect()
}

/// Pets are only priced through level 5.
pub fn pet_rows() -> Vec<CostRow> {
    flat_rows(1..=5, "cost_freeze_dried", 30)
}

/// Relic tiers 10..=20: `100 + 10 * (tier - 10)` sand and 1000 rola each.
pub fn relic_rows() -> Vec<CostRow> {
    (10..=20)
        .map(|tier| {
            CostRow::new(tier)
                .with_cost("cost_sand", 100 + 10 * u64::from(tier - 10))
                .with_cost("cost_rola", 1_000)
        })
        .collect()
}

pub fn sample_raw() -> BTreeMap<TrackKind, Vec<CostRow>> {
    [
        (TrackKind::Character, character_rows()),
        (TrackKind::Equipment, equipment_rows()),
        (TrackKind::Skill, skill_rows()),
        (TrackKind::Pet, pet_rows()),
        (TrackKind::Relic, relic_rows()),
    ]
    .into_iter()
    .collect()
}

pub fn sample_book() -> CostBook {
    CostBook::build(sample_raw())
}

pub fn first_season_scoring() -> SeasonScoring {
    SeasonScoring {
        season: "s1".into(),
        base_level: 100,
        weights: GroupWeights {
            character: 100,
            equipment_resonance: 38 * 5,
            skill_resonance: 14 * 8,
            pet_resonance: 14 * 4,
            relic_resonance: 57 * 20,
        },
        relic_level_divisor: 10,
        star_divisor: 100,
        star_offset: 10,
    }
}

pub fn sample_config() -> CalculatorConfig {
    CalculatorConfig {
        seasons: vec![first_season_scoring()],
        ..CalculatorConfig::default()
    }
}

pub fn sample_calculator() -> Calculator {
    Calculator::with_book(sample_config(), sample_book())
}

/// A valid, fully priced input: character 5 -> 8, two equipment pieces,
/// one skill, twenty relics.
pub fn sample_input() -> CalcInput {
    let mut input = CalcInput {
        targets: Targets {
            character: 8,
            equipment_resonance: 12,
            skill_resonance: 6,
            pet_resonance: 0,
            relic_resonance: 13,
        },
        now: Timestamp(1_700_000_000_000),
        deadline: Some(Timestamp(1_700_000_000_000 + 3 * 24 * 3_600_000)),
        ..CalcInput::default()
    };
    input.current_levels.insert("character".into(), 5);
    input.current_levels.insert("equipment_main_weapon".into(), 10);
    input.current_levels.insert("equipment_helmet".into(), 8);
    input.current_levels.insert("skill_combat1".into(), 4);
    input.relic_counts.insert(10, 12);
    input.relic_counts.insert(12, 8);
    input.owned.insert(key("rola"), 5_000);
    input.owned.insert(key(EXP_MATERIAL), 400);
    input.hourly_rates.insert(key("rola"), fixed(120.0));
    input.hourly_rates.insert(key(EXP_MATERIAL), fixed(300.0));
    input
}
