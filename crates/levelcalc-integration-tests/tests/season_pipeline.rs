//! Integration test: data directory -> season tables -> calculation pass.
//!
//! Writes CSV cost sheets and a RON config into a temp directory, loads them
//! through `levelcalc-data`, and checks the report the core calculator
//! produces from them.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use levelcalc_core::plan::{CalcInput, Calculator, CalculatorConfig, PlanError, ValidationError};
use levelcalc_core::requirement::MaterialLine;
use levelcalc_core::test_utils::{fixed, key};
use levelcalc_core::time::{MILLIS_PER_HOUR, Timestamp};
use levelcalc_core::track::Targets;
use levelcalc_data::{load_config, load_season};

const NOW: Timestamp = Timestamp(1_700_000_000_000);

fn make_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "levelcalc_integration_{name}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Character: leaving level k costs 100k exp (1..=10).
/// Equipment: 50 rola + 2 stone ore per level in s1, something else in s2.
/// Relic tiers 10..=20: 10 sand + 100 rola each.
fn write_season(dir: &Path) {
    let mut character = String::from("\u{feff}Level,Cost_EXP\r\n");
    for lvl in 1..=10 {
        writeln!(character, "{lvl},{}", 100 * lvl).unwrap();
    }
    fs::write(dir.join("character_upgrade_costs.csv"), character).unwrap();

    let mut equipment = String::from("lvl,season,cost_rola,cost_stone_ore\n");
    for lvl in 1..=20 {
        writeln!(equipment, "{lvl},s1,50,2").unwrap();
        writeln!(equipment, "{lvl},s2,\"1,000\",9").unwrap();
    }
    fs::write(dir.join("equipment_upgrade_costs.csv"), equipment).unwrap();

    let mut relic = String::from("level,cost_sand,cost_rola\n");
    for tier in 10..=20 {
        writeln!(relic, "{tier},10,100").unwrap();
    }
    fs::write(dir.join("relic_upgrade_costs.csv"), relic).unwrap();

    fs::write(
        dir.join("config.ron"),
        r#"(
    seasons: [
        (season: "s1", base_level: 5, weights: (character: 10), star_divisor: 5, star_offset: 1),
    ],
)"#,
    )
    .unwrap();
}

fn input() -> CalcInput {
    let mut input = CalcInput {
        targets: Targets {
            character: 6,
            equipment_resonance: 10,
            relic_resonance: 12,
            ..Targets::default()
        },
        now: NOW,
        deadline: Some(NOW.plus_millis(10 * MILLIS_PER_HOUR)),
        ..CalcInput::default()
    };
    input.current_levels.insert("character".into(), 3);
    input.current_levels.insert("equipment_main_weapon".into(), 5);
    input.current_levels.insert("equipment_helmet".into(), 5);
    input.relic_counts.insert(10, 20);
    input.owned.insert(key("rola"), 1_000);
    input.owned.insert(key("exp"), 200);
    input.hourly_rates.insert(key("rola"), fixed(100.0));
    input.hourly_rates.insert(key("exp"), fixed(600.0));
    input
}

fn calculator(dir: &Path, season: &str) -> Calculator {
    let config = load_config(dir).unwrap();
    let data = load_season(dir, season);
    let mut calc = Calculator::with_book(config, data.book());
    calc.select_season(season);
    calc
}

#[test]
fn csv_season_prices_every_track() {
    let dir = make_dir("pipeline");
    write_season(&dir);

    let data = load_season(&dir, "s1");
    assert_eq!(
        data.missing_files,
        vec!["skill_upgrade_costs".to_string(), "pet_upgrade_costs".to_string()]
    );

    let report = calculator(&dir, "s1").compute(&input()).unwrap();
    let priced = report.requirements.priced();
    // Two equipment slots 5 -> 10 plus twenty relics 10 -> 12.
    assert_eq!(priced[&key("rola")], 2 * 250 + 20 * 200);
    assert_eq!(priced[&key("stoneOre")], 2 * 10);
    assert_eq!(priced[&key("sand")], 20 * 20);
    assert_eq!(priced[&key("exp")], 1_200);
    assert!(!report.requirements.has_gaps());

    assert_eq!(report.produced[&key("rola")], 1_000);
    assert_eq!(report.deficit[&key("rola")], 2_500);
    assert_eq!(report.deficit[&key("sand")], 400);
    assert_eq!(report.deficit[&key("exp")], 0);

    let character = report.character.unwrap();
    assert_eq!(character.readout.to_next_level, 100);
    assert_eq!(character.target_level.needed_experience, 1_000);
    assert_eq!(character.target_level.minutes_needed, 100);
    assert_eq!(character.reachable_level, 11);

    assert_eq!(report.season_score, Some(10));
    assert_eq!(report.stars, Some(3));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn season_filter_changes_prices() {
    let dir = make_dir("pipeline_s2");
    write_season(&dir);

    let report = calculator(&dir, "s2").compute(&input()).unwrap();
    let priced = report.requirements.priced();
    assert_eq!(priced[&key("rola")], 2 * 5 * 1_000 + 20 * 200);
    // No scoring configured for s2.
    assert_eq!(report.stars, None);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn relic_total_must_be_twenty() {
    let dir = make_dir("pipeline_relic");
    write_season(&dir);

    let mut bad = input();
    bad.relic_counts.insert(10, 19);
    let err = calculator(&dir, "s1").compute(&bad).unwrap_err();
    assert_eq!(
        err,
        PlanError::Validation(ValidationError::RelicCount {
            expected: 20,
            actual: 19
        })
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn fallback_tables_mark_missing_data() {
    let dir = make_dir("pipeline_fallback");
    let data = load_season(&dir, "s1");
    assert_eq!(data.missing_files.len(), 5);

    let calc = Calculator::with_book(CalculatorConfig::default(), data.book());
    let mut input = CalcInput {
        targets: Targets {
            equipment_resonance: 10,
            ..Targets::default()
        },
        now: NOW,
        ..CalcInput::default()
    };
    input.current_levels.insert("equipment_boots".into(), 2);
    input.current_levels.insert("skill_arcane2".into(), 1);
    input.targets.skill_resonance = 3;

    let report = calc.compute(&input).unwrap();
    let lines = report.requirements.lines();
    // Built-in equipment jumps from level 2 to 30.
    assert!(matches!(lines[&key("stoneOre")], MaterialLine::MissingData(_)));
    assert!(matches!(lines[&key("rola")], MaterialLine::MissingData(_)));
    assert_eq!(lines[&key("essence")], MaterialLine::Total(125));
    assert!(!report.deficit.contains_key(&key("rola")));
    assert_eq!(report.deficit[&key("essence")], 125);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn reload_swaps_tables_whole() {
    let dir = make_dir("pipeline_reload");
    let mut calc = Calculator::with_book(CalculatorConfig::default(), load_season(&dir, "s1").book());
    let before = calc.book();

    write_season(&dir);
    calc.install(load_season(&dir, "s1").book());
    let report = calc.compute(&input()).unwrap();
    assert_eq!(report.requirements.priced()[&key("sand")], 400);

    // The old book is still whole for anyone holding it.
    assert_eq!(before.kinds().count(), 5);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn bundled_data_directory_loads() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");

    let config = load_config(&dir).unwrap();
    let s1 = config.season("s1").unwrap();
    let maxed = Targets {
        character: 110,
        ..Targets::default()
    };
    assert_eq!(s1.stars(s1.score(&maxed)), 20);

    let presets = levelcalc_data::load_presets(&dir).unwrap();
    assert_eq!(presets.len(), 3);
    assert_eq!(presets[0].label, "Season 1 end");
    assert!(presets[1].at < presets[0].at);

    let data = load_season(&dir, "s1");
    assert_eq!(data.sources.shop.len(), 3);
    assert_eq!(data.sources.shop_rola_daily(), 5 * 120 + 800 + 2 * 300);
}
