//! Levelcalc Core -- the cumulative-cost and projection engine behind the
//! upgrade planner.
//!
//! Given a player's current levels on every upgrade track (character,
//! equipment slots, skills, pets, relic tiers) and a set of target levels,
//! the engine prices the climb in materials, nets that against what the
//! player owns or will passively produce before a deadline, and projects
//! when the character reaches a level from an hourly experience rate.
//!
//! # Pipeline
//!
//! 1. **Build** -- raw per-level [`table::CostRow`]s become running totals
//!    ([`table::CostTable`]), once per data refresh.
//! 2. **Lookup** -- [`lookup::cumulative_at`] answers "cost paid through
//!    level L" for any integer, falling back to the nearest lower row.
//! 3. **Aggregate** -- [`requirement`] prices `current -> target` per track
//!    and sums across tracks, isolating data gaps per track.
//! 4. **Resolve** -- [`deficit::resolve`] nets requirements against owned
//!    and produced amounts.
//! 5. **Project** -- [`experience::ExperienceProjector`] turns held
//!    experience and an hourly rate into an ETA.
//!
//! [`plan::Calculator`] owns the published tables and runs the whole pass
//! from a [`plan::CalcInput`] snapshot.
//!
//! # Key Types
//!
//! - [`material::MaterialKey`] / [`material::CostColumn`] -- material ids and
//!   normalized cost column names.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for hourly rates.
//! - [`time::Timestamp`] -- wall-clock instant in epoch milliseconds.

pub mod deficit;
pub mod experience;
pub mod fixed;
pub mod lookup;
pub mod material;
pub mod plan;
pub mod requirement;
pub mod season;
pub mod sources;
pub mod table;
pub mod time;
pub mod track;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
