//! Built-in sample tables used when a season's sheet cannot be loaded.
//!
//! These are coarse and deliberately sparse; equipment jumps from level 2
//! straight to 30, so any range across the hole reports missing data rather
//! than a number.

use levelcalc_core::table::CostRow;
use levelcalc_core::track::TrackKind;

const CHARACTER_LEVELS: u32 = 200;

/// `floor(200 * level^2.2)` for levels 1..=200.
fn character_rows() -> Vec<CostRow> {
    (1..=CHARACTER_LEVELS)
        .map(|level| {
            let exp = (200.0 * f64::from(level).powf(2.2)).floor() as u64;
            CostRow::new(level).with_cost("cost_exp", exp)
        })
        .collect()
}

fn equipment_rows() -> Vec<CostRow> {
    [(1, 10, 100, 0), (2, 20, 200, 0), (30, 500, 5000, 1)]
        .into_iter()
        .map(|(level, stone, rola, refining)| {
            CostRow::new(level)
                .with_cost("cost_stone_ore", stone)
                .with_cost("cost_rola", rola)
                .with_cost("cost_refining_stone", refining)
        })
        .collect()
}

fn single_column(column: &str, amounts: [u64; 3]) -> Vec<CostRow> {
    (1u32..)
        .zip(amounts)
        .map(|(level, amount)| CostRow::new(level).with_cost(column, amount))
        .collect()
}

fn relic_rows() -> Vec<CostRow> {
    [(1, 100, 1000), (2, 150, 1500), (3, 200, 2000)]
        .into_iter()
        .map(|(level, sand, rola)| {
            CostRow::new(level)
                .with_cost("cost_sand", sand)
                .with_cost("cost_rola", rola)
        })
        .collect()
}

/// Fallback rows for one track.
pub fn fallback_rows(kind: TrackKind) -> Vec<CostRow> {
    match kind {
        TrackKind::Character => character_rows(),
        TrackKind::Equipment => equipment_rows(),
        TrackKind::Skill => single_column("cost_essence", [50, 75, 100]),
        TrackKind::Pet => single_column("cost_freeze_dried", [30, 45, 60]),
        TrackKind::Relic => relic_rows(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use levelcalc_core::material::CostColumn;

    #[test]
    fn every_track_has_rows() {
        for kind in TrackKind::ALL {
            assert!(!fallback_rows(kind).is_empty(), "{kind}");
        }
    }

    #[test]
    fn character_curve() {
        let rows = fallback_rows(TrackKind::Character);
        assert_eq!(rows.len(), 200);
        let exp = CostColumn::new("cost_exp");
        assert_eq!(rows[0].costs[&exp], 200);
        // 200 * 2^2.2 = 918.95...
        assert_eq!(rows[1].costs[&exp], 918);
        assert!(rows.windows(2).all(|w| w[0].costs[&exp] < w[1].costs[&exp]));
    }

    #[test]
    fn equipment_is_sparse() {
        let levels: Vec<u32> = fallback_rows(TrackKind::Equipment)
            .iter()
            .map(|r| r.level)
            .collect();
        assert_eq!(levels, vec![1, 2, 30]);
    }
}
