//! Experience projection for the character track.
//!
//! Stateless: the caller may re-project every second with a growing
//! held-experience snapshot and always gets an answer derived from scratch.

use serde::{Deserialize, Serialize};

use crate::fixed::{self, Amount, Rate};
use crate::material::CostColumn;
use crate::table::CostTable;
use crate::time::{self, Timestamp};

/// Cost column holding character experience.
pub const EXP_COLUMN: &str = "cost_exp";

/// Outcome class of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionStatus {
    /// No table loaded, no current level, or already at the level cap.
    Unset,
    /// Target is at or below the current level.
    Reached,
    /// Held experience already covers the target.
    Ready,
    /// Experience is still needed but the rate is not positive.
    NoRate,
    /// Normal projection.
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    pub status: ProjectionStatus,
    pub needed_experience: Amount,
    /// Whole minutes, rounded up.
    pub minutes_needed: u64,
    /// `None` when the target cannot be reached (no rate, or unset).
    pub completion: Option<Timestamp>,
}

impl Projection {
    fn at_once(status: ProjectionStatus, now: Timestamp) -> Self {
        Self {
            status,
            needed_experience: 0,
            minutes_needed: 0,
            completion: Some(now),
        }
    }
}

/// Experience still needed for the next level and for the target level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExperienceReadout {
    pub to_next_level: Amount,
    pub to_target_level: Amount,
}

/// Experience granted by instant speed-up items, each worth
/// `hours_per_item` hours of production at `hourly_rate`.
pub fn speed_up_experience(hourly_rate: Rate, items: u32, hours_per_item: u32) -> Amount {
    fixed::floor_times(hourly_rate, u64::from(items) * u64::from(hours_per_item))
}

pub struct ExperienceProjector<'a> {
    table: &'a CostTable,
    column: CostColumn,
    max_level: u32,
}

impl<'a> ExperienceProjector<'a> {
    pub fn new(table: &'a CostTable, max_level: u32) -> Self {
        Self {
            table,
            column: CostColumn::new(EXP_COLUMN),
            max_level,
        }
    }

    /// Experience spent reaching everything through `level`.
    pub fn cumulative_exp(&self, level: i64) -> Amount {
        self.table.column_at(&self.column, level)
    }

    /// `max(0, cum(target - 1) - cum(current - 1) - held)`.
    pub fn needed(&self, current: u32, held: Amount, target: u32) -> Amount {
        if target <= current {
            return 0;
        }
        let reached = self.cumulative_exp(i64::from(current) - 1);
        let goal = self.cumulative_exp(i64::from(target) - 1);
        goal.saturating_sub(reached).saturating_sub(held)
    }

    pub fn project(
        &self,
        current: u32,
        held: Amount,
        hourly_rate: Rate,
        target: u32,
        now: Timestamp,
    ) -> Projection {
        if self.table.is_empty() || current == 0 || current >= self.max_level {
            return Projection {
                status: ProjectionStatus::Unset,
                needed_experience: 0,
                minutes_needed: 0,
                completion: None,
            };
        }
        if target <= current {
            return Projection::at_once(ProjectionStatus::Reached, now);
        }

        let needed = self.needed(current, held, target);
        if needed == 0 {
            return Projection::at_once(ProjectionStatus::Ready, now);
        }

        match fixed::minutes_to_accumulate(needed, hourly_rate) {
            None => Projection {
                status: ProjectionStatus::NoRate,
                needed_experience: needed,
                minutes_needed: 0,
                completion: None,
            },
            Some(minutes) => Projection {
                status: ProjectionStatus::Ok,
                needed_experience: needed,
                minutes_needed: minutes,
                completion: Some(now.plus_minutes(minutes)),
            },
        }
    }

    pub fn project_next_level(
        &self,
        current: u32,
        held: Amount,
        hourly_rate: Rate,
        now: Timestamp,
    ) -> Projection {
        self.project(current, held, hourly_rate, current.saturating_add(1), now)
    }

    pub fn readout(&self, current: u32, held: Amount, target: u32) -> ExperienceReadout {
        ExperienceReadout {
            to_next_level: self.needed(current, held, current.saturating_add(1)),
            to_target_level: self.needed(current, held, target),
        }
    }

    /// Highest level the character can reach by `deadline` from held
    /// experience plus passive production, never below `current` and never
    /// above what the table (or the level cap) can price.
    ///
    /// Deliberately reports the level arrived at after paying row `k`
    /// (`k + 1`), not the level of the last affordable row, so the cap sits
    /// one past the table's top row.
    pub fn reachable_level(
        &self,
        current: u32,
        held: Amount,
        hourly_rate: Rate,
        now: Timestamp,
        deadline: Option<Timestamp>,
    ) -> u32 {
        let Some(table_max) = self.table.max_level() else {
            return current;
        };
        if current == 0 {
            return current;
        }
        let produced = fixed::produced_over(hourly_rate, time::remaining_millis(now, deadline));
        let budget = self
            .cumulative_exp(i64::from(current) - 1)
            .saturating_add(held)
            .saturating_add(produced);

        // Paying cum(k) takes the character to level k + 1.
        let rows = self.table.rows();
        let paid = rows.partition_point(|row| {
            row.cumulative.get(&self.column).copied().unwrap_or(0) <= budget
        });
        let reachable = match paid.checked_sub(1) {
            Some(i) => rows[i].level.saturating_add(1),
            None => current,
        };
        let cap = table_max.saturating_add(1).min(self.max_level).max(current);
        reachable.clamp(current, cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;
    use crate::table::CostRow;
    use crate::time::{MILLIS_PER_HOUR, MILLIS_PER_MINUTE};

    /// Leaving level k for k + 1 costs 250 * k experience.
    fn exp_table() -> CostTable {
        CostTable::build((1..=10).map(|lvl| CostRow::new(lvl).with_cost(EXP_COLUMN, 250 * lvl as u64)))
    }

    fn rate(v: f64) -> Rate {
        f64_to_fixed64(v)
    }

    #[test]
    fn eta_rounds_up() {
        let table = exp_table();
        let p = ExperienceProjector::new(&table, 200);
        let now = Timestamp(1_000);
        let out = p.project(1, 0, rate(100.0), 2, now);
        assert_eq!(out.status, ProjectionStatus::Ok);
        assert_eq!(out.needed_experience, 250);
        assert_eq!(out.minutes_needed, 150);
        assert_eq!(out.completion, Some(Timestamp(1_000 + 150 * MILLIS_PER_MINUTE)));
    }

    #[test]
    fn held_experience_is_subtracted() {
        let table = exp_table();
        let p = ExperienceProjector::new(&table, 200);
        // 1 -> 4 costs 250 + 500 + 750 = 1500
        let out = p.project(1, 400, rate(60.0), 4, Timestamp(0));
        assert_eq!(out.needed_experience, 1_100);
        assert_eq!(out.minutes_needed, 1_100);
    }

    #[test]
    fn status_signals() {
        let table = exp_table();
        let p = ExperienceProjector::new(&table, 200);
        let now = Timestamp(0);

        let reached = p.project(5, 0, rate(10.0), 5, now);
        assert_eq!(reached.status, ProjectionStatus::Reached);
        assert_eq!(reached.completion, Some(now));

        let ready = p.project(1, 10_000, rate(10.0), 3, now);
        assert_eq!(ready.status, ProjectionStatus::Ready);
        assert_eq!(ready.needed_experience, 0);

        let stalled = p.project(1, 0, Rate::ZERO, 3, now);
        assert_eq!(stalled.status, ProjectionStatus::NoRate);
        assert_eq!(stalled.needed_experience, 750);
        assert_eq!(stalled.completion, None);

        let negative = p.project(1, 0, rate(-5.0), 3, now);
        assert_eq!(negative.status, ProjectionStatus::NoRate);
    }

    #[test]
    fn unset_without_table_or_level() {
        let empty = CostTable::empty();
        let p = ExperienceProjector::new(&empty, 200);
        assert_eq!(p.project(3, 0, rate(1.0), 5, Timestamp(0)).status, ProjectionStatus::Unset);

        let table = exp_table();
        let p = ExperienceProjector::new(&table, 10);
        assert_eq!(p.project(0, 0, rate(1.0), 5, Timestamp(0)).status, ProjectionStatus::Unset);
        assert_eq!(p.project(10, 0, rate(1.0), 12, Timestamp(0)).status, ProjectionStatus::Unset);
    }

    #[test]
    fn reprojecting_with_more_held_experience_shrinks_eta() {
        let table = exp_table();
        let p = ExperienceProjector::new(&table, 200);
        let mut last = u64::MAX;
        for second in 0..120u64 {
            let held = second * 100 / 3_600;
            let out = p.project(2, held, rate(100.0), 3, Timestamp(0));
            assert!(out.minutes_needed <= last);
            last = out.minutes_needed;
        }
    }

    #[test]
    fn readout_for_next_and_target() {
        let table = exp_table();
        let p = ExperienceProjector::new(&table, 200);
        let r = p.readout(2, 100, 4);
        assert_eq!(r.to_next_level, 400);
        assert_eq!(r.to_target_level, 400 + 750);
        assert_eq!(p.readout(4, 0, 2).to_target_level, 0);
    }

    #[test]
    fn speed_up_items_grant_hours_of_production() {
        assert_eq!(speed_up_experience(rate(1_250.5), 3, 2), 7_503);
        assert_eq!(speed_up_experience(rate(1_000.0), 0, 2), 0);
        assert_eq!(speed_up_experience(rate(-10.0), 4, 2), 0);
    }

    #[test]
    fn reachable_level_counts_production_until_deadline() {
        let table = exp_table();
        let p = ExperienceProjector::new(&table, 200);
        let now = Timestamp(0);
        // At level 2 with nothing held, 10h of 100/h = 1000 exp:
        // 2 -> 3 costs 500, 3 -> 4 costs 750. Only one level fits.
        let deadline = Some(Timestamp(10 * MILLIS_PER_HOUR));
        assert_eq!(p.reachable_level(2, 0, rate(100.0), now, deadline), 3);
        // 250 more held covers 3 -> 4 as well.
        assert_eq!(p.reachable_level(2, 250, rate(100.0), now, deadline), 4);
    }

    #[test]
    fn reachable_level_is_clamped() {
        let table = exp_table();
        let p = ExperienceProjector::new(&table, 200);
        let now = Timestamp(0);
        assert_eq!(p.reachable_level(4, 0, Rate::ZERO, now, None), 4);
        assert_eq!(p.reachable_level(4, u64::MAX, Rate::ZERO, now, None), 11);

        let capped = ExperienceProjector::new(&table, 8);
        assert_eq!(capped.reachable_level(4, u64::MAX, Rate::ZERO, now, None), 8);

        let empty = CostTable::empty();
        let none = ExperienceProjector::new(&empty, 200);
        assert_eq!(none.reachable_level(7, 1_000, rate(5.0), now, None), 7);
    }
}
