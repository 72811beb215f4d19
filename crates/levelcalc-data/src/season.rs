//! Loading one season's cost sheets, shop sheet and drop averages from a
//! data directory.
//!
//! A track whose sheet is missing, unreadable or empty after season
//! filtering falls back to the built-in tables in [`crate::fallback`] and is
//! named in [`SeasonData::missing_files`]. Loading a season therefore never
//! fails as a whole.

use std::collections::BTreeMap;
use std::path::Path;

use levelcalc_core::fixed::{f64_to_fixed64, Fixed64};
use levelcalc_core::material::MaterialKey;
use levelcalc_core::plan::CostBook;
use levelcalc_core::sources::{MaterialSources, ShopPlan};
use levelcalc_core::table::CostRow;
use levelcalc_core::track::TrackKind;

use crate::fallback::fallback_rows;
use crate::loader::{
    deserialize_file, deserialize_list, detect_format, find_data_file, read_sheet,
    DataLoadError, Format,
};
use crate::schema::{self, RawRow};

/// TOML cost files keep their rows under this key.
pub const ROWS_KEY: &str = "rows";

pub const SHOP_FILE: &str = "shop";
pub const DUNGEON_AVERAGE_FILE: &str = "dungeon_average";
pub const EXPLORE_AVERAGE_FILE: &str = "explore_average";

/// Base file name (no extension) of each track's cost sheet.
pub fn track_file(kind: TrackKind) -> &'static str {
    match kind {
        TrackKind::Character => "character_upgrade_costs",
        TrackKind::Equipment => "equipment_upgrade_costs",
        TrackKind::Skill => "skill_upgrade_costs",
        TrackKind::Pet => "pet_upgrade_costs",
        TrackKind::Relic => "relic_upgrade_costs",
    }
}

/// Everything loaded for one season.
#[derive(Debug, Clone, Default)]
pub struct SeasonData {
    pub season: String,
    pub raw: BTreeMap<TrackKind, Vec<CostRow>>,
    pub sources: MaterialSources,
    /// Base names of sheets that were replaced by fallback tables.
    pub missing_files: Vec<String>,
}

impl SeasonData {
    /// Build every track's cumulative table.
    pub fn book(&self) -> CostBook {
        CostBook::build(self.raw.clone())
    }

    pub fn used_fallback(&self) -> bool {
        !self.missing_files.is_empty()
    }
}

// ===========================================================================
// Row reading
// ===========================================================================

/// Read a sheet of any supported format into raw rows. CSV rows keep their
/// line number; structured rows are numbered from 1.
pub(crate) fn read_rows(path: &Path) -> Result<Vec<(usize, RawRow)>, DataLoadError> {
    if detect_format(path)? == Format::Csv {
        return Ok(schema::sheet_rows(&read_sheet(path)?));
    }
    let rows: Vec<RawRow> = deserialize_list(path, ROWS_KEY)?;
    Ok(rows
        .into_iter()
        .map(schema::normalize_row)
        .enumerate()
        .map(|(i, row)| (i + 1, row))
        .collect())
}

/// Load one track's rows for `season`.
///
/// Returns `Ok(None)` when no sheet exists for the track.
pub fn load_track(
    dir: &Path,
    kind: TrackKind,
    season: &str,
) -> Result<Option<Vec<CostRow>>, DataLoadError> {
    let Some(path) = find_data_file(dir, track_file(kind))? else {
        return Ok(None);
    };
    let rows = read_rows(&path)?;
    let out = schema::to_cost_rows(&rows, season, &path)?;
    tracing::debug!(track = %kind, file = %path.display(), rows = out.len(), "loaded cost sheet");
    Ok(Some(out))
}

fn load_shop(dir: &Path, season: &str) -> Result<BTreeMap<MaterialKey, ShopPlan>, DataLoadError> {
    match find_data_file(dir, SHOP_FILE)? {
        Some(path) => Ok(schema::to_shop_plans(&read_rows(&path)?, season)),
        None => Ok(BTreeMap::new()),
    }
}

/// CSV averages are positional; structured files are a plain id -> average map.
fn load_averages(dir: &Path, base: &str) -> Result<BTreeMap<MaterialKey, Fixed64>, DataLoadError> {
    let Some(path) = find_data_file(dir, base)? else {
        return Ok(BTreeMap::new());
    };
    if detect_format(&path)? == Format::Csv {
        return Ok(schema::to_averages(&read_sheet(&path)?));
    }
    let raw: BTreeMap<String, f64> = deserialize_file(&path)?;
    Ok(raw
        .into_iter()
        .map(|(id, avg)| (MaterialKey::from_column(&id.to_lowercase()), f64_to_fixed64(avg)))
        .collect())
}

// ===========================================================================
// Season loading
// ===========================================================================

/// Load every track of `season` from `dir`, falling back per track.
///
/// Optional sheets (shop, drop averages) that fail to load are logged and
/// left empty.
pub fn load_season(dir: &Path, season: &str) -> SeasonData {
    let mut data = SeasonData {
        season: season.to_string(),
        ..SeasonData::default()
    };

    for kind in TrackKind::ALL {
        let rows = match load_track(dir, kind, season) {
            Ok(Some(rows)) if !rows.is_empty() => rows,
            Ok(_) => {
                tracing::warn!(track = %kind, season, "no cost rows, using built-in table");
                data.missing_files.push(track_file(kind).to_string());
                fallback_rows(kind)
            }
            Err(e) => {
                tracing::warn!(track = %kind, season, error = %e, "cost sheet unreadable, using built-in table");
                data.missing_files.push(track_file(kind).to_string());
                fallback_rows(kind)
            }
        };
        data.raw.insert(kind, rows);
    }

    data.sources.shop = load_shop(dir, season).unwrap_or_else(|e| {
        tracing::warn!(season, error = %e, "shop sheet unreadable");
        BTreeMap::new()
    });
    for (base, plans) in [
        (DUNGEON_AVERAGE_FILE, &mut data.sources.dungeon),
        (EXPLORE_AVERAGE_FILE, &mut data.sources.explore),
    ] {
        match load_averages(dir, base) {
            Ok(averages) => MaterialSources::apply_averages(plans, &averages),
            Err(e) => tracing::warn!(file = base, error = %e, "average sheet unreadable"),
        }
    }

    tracing::info!(
        season,
        fallback = data.missing_files.len(),
        shop_items = data.sources.shop.len(),
        "season data loaded"
    );
    data
}
