//! One full calculation pass.
//!
//! [`Calculator`] owns the published cost tables and the configuration. A
//! caller assembles a [`CalcInput`] snapshot and gets back a [`PlanReport`]
//! built from scratch: requirements per material, passive production, the
//! resulting deficit, and the character projections.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::deficit::{self, DeficitReport};
use crate::experience::{self, ExperienceProjector, ExperienceReadout, Projection};
use crate::fixed::{Amount, Rate};
use crate::material::{Amounts, MaterialKey, Rates};
use crate::requirement::RequirementTotals;
use crate::season::SeasonScoring;
use crate::table::{CostRow, CostTable};
use crate::time::Timestamp;
use crate::track::{default_slots, SlotConfig, TargetGroup, Targets, TrackKind};

/// Material key for character experience in owned amounts and rates.
pub const EXP_MATERIAL: &str = "exp";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A cross-field input invariant was violated. Aborts the whole pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("relic count must total {expected}, got {actual}")]
    RelicCount { expected: u32, actual: u64 },
    #[error("relic tier {tier} is outside {min}..={max}")]
    RelicTier { tier: u32, min: u32, max: u32 },
    #[error("unknown slot {0:?}")]
    UnknownSlot(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// Character level cap.
    pub max_level: u32,
    /// Required relic count when any relics are entered.
    pub relic_total: u32,
    pub relic_tier_min: u32,
    pub relic_tier_max: u32,
    /// Hours of production one speed-up item grants.
    pub speed_up_hours: u32,
    pub slots: Vec<SlotConfig>,
    pub seasons: Vec<SeasonScoring>,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_level: 200,
            relic_total: 20,
            relic_tier_min: 10,
            relic_tier_max: 20,
            speed_up_hours: 2,
            slots: default_slots(),
            seasons: Vec::new(),
        }
    }
}

impl CalculatorConfig {
    pub fn relic_tiers(&self) -> RangeInclusive<u32> {
        self.relic_tier_min..=self.relic_tier_max
    }

    pub fn season(&self, id: &str) -> Option<&SeasonScoring> {
        self.seasons.iter().find(|s| s.season == id)
    }
}

// ---------------------------------------------------------------------------
// CostBook
// ---------------------------------------------------------------------------

/// Every track's cumulative table for one season. Immutable once built;
/// a reload builds a new book and swaps it in whole.
#[derive(Debug, Clone, Default)]
pub struct CostBook {
    tables: BTreeMap<TrackKind, CostTable>,
}

impl CostBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every track from raw rows.
    #[cfg(not(feature = "parallel"))]
    pub fn build(raw: BTreeMap<TrackKind, Vec<CostRow>>) -> Self {
        let tables = raw
            .into_iter()
            .map(|(kind, rows)| (kind, CostTable::build(rows)))
            .collect();
        Self { tables }
    }

    /// Build every track from raw rows, one rayon task per track.
    #[cfg(feature = "parallel")]
    pub fn build(raw: BTreeMap<TrackKind, Vec<CostRow>>) -> Self {
        use rayon::prelude::*;

        let built: Vec<(TrackKind, CostTable)> = raw
            .into_par_iter()
            .map(|(kind, rows)| (kind, CostTable::build(rows)))
            .collect();
        Self {
            tables: built.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, kind: TrackKind, table: CostTable) {
        self.tables.insert(kind, table);
    }

    pub fn get(&self, kind: TrackKind) -> Option<&CostTable> {
        self.tables.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = TrackKind> + '_ {
        self.tables.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

/// Everything one pass reads, captured once by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcInput {
    /// Current level per slot id. Missing or zero means unset.
    pub current_levels: BTreeMap<String, u32>,
    pub targets: Targets,
    /// Relic count per tier.
    pub relic_counts: BTreeMap<u32, u32>,
    /// Owned materials; `exp` is held character experience.
    pub owned: Amounts,
    /// Hourly passive production; `exp` is the character experience rate.
    pub hourly_rates: Rates,
    pub speed_up_items: u32,
    pub deadline: Option<Timestamp>,
    pub now: Timestamp,
}

impl CalcInput {
    pub fn current(&self, slot: &str) -> u32 {
        self.current_levels.get(slot).copied().unwrap_or(0)
    }

    pub fn held_experience(&self) -> Amount {
        self.owned
            .get(&MaterialKey::new(EXP_MATERIAL))
            .copied()
            .unwrap_or(0)
    }

    pub fn experience_rate(&self) -> Rate {
        self.hourly_rates
            .get(&MaterialKey::new(EXP_MATERIAL))
            .copied()
            .unwrap_or(Rate::ZERO)
    }

    pub fn relic_count(&self) -> u64 {
        self.relic_counts.values().map(|c| u64::from(*c)).sum()
    }
}

/// Character-side numbers derived from the experience table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterOutlook {
    pub readout: ExperienceReadout,
    pub next_level: Projection,
    pub target_level: Projection,
    /// Highest level reachable by the deadline.
    pub reachable_level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanReport {
    pub requirements: RequirementTotals,
    pub produced: Amounts,
    pub deficit: DeficitReport,
    /// `None` when no character level was entered.
    pub character: Option<CharacterOutlook>,
    pub season_score: Option<u64>,
    pub stars: Option<i64>,
}

impl PlanReport {
    fn empty() -> Self {
        Self {
            requirements: RequirementTotals::new(),
            produced: Amounts::new(),
            deficit: DeficitReport::new(),
            character: None,
            season_score: None,
            stars: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Calculator {
    config: CalculatorConfig,
    book: Arc<CostBook>,
    season: Option<String>,
}

impl Calculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            config,
            book: Arc::new(CostBook::new()),
            season: None,
        }
    }

    pub fn with_book(config: CalculatorConfig, book: CostBook) -> Self {
        let mut calc = Self::new(config);
        calc.install(book);
        calc
    }

    /// Publish a fully built book, replacing the previous one.
    pub fn install(&mut self, book: CostBook) {
        tracing::debug!(tracks = book.tables.len(), "installing cost book");
        self.book = Arc::new(book);
    }

    /// The currently published book. Holders keep a consistent snapshot
    /// even if a reload installs a new one.
    pub fn book(&self) -> Arc<CostBook> {
        Arc::clone(&self.book)
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn select_season(&mut self, season: &str) {
        self.season = Some(season.to_string());
    }

    pub fn season(&self) -> Option<&str> {
        self.season.as_deref()
    }

    pub fn validate(&self, input: &CalcInput) -> Result<(), ValidationError> {
        let tiers = self.config.relic_tiers();
        for (tier, count) in &input.relic_counts {
            if *count > 0 && !tiers.contains(tier) {
                return Err(ValidationError::RelicTier {
                    tier: *tier,
                    min: *tiers.start(),
                    max: *tiers.end(),
                });
            }
        }
        let total = input.relic_count();
        if total > 0 && total != u64::from(self.config.relic_total) {
            return Err(ValidationError::RelicCount {
                expected: self.config.relic_total,
                actual: total,
            });
        }
        if let Some(unknown) = input
            .current_levels
            .keys()
            .find(|id| !self.config.slots.iter().any(|slot| &slot.id == *id))
        {
            return Err(ValidationError::UnknownSlot(unknown.clone()));
        }
        Ok(())
    }

    pub fn compute(&self, input: &CalcInput) -> Result<PlanReport, PlanError> {
        if let Err(err) = self.validate(input) {
            tracing::warn!(error = %err, "calculation rejected");
            return Err(err.into());
        }

        let (season_score, stars) = match self.scoring() {
            Some(scoring) => {
                let score = scoring.score(&input.targets);
                (Some(score), Some(scoring.stars(score)))
            }
            None => (None, None),
        };

        let has_slots = self
            .config
            .slots
            .iter()
            .any(|slot| input.current(&slot.id) > 0);
        if !has_slots && input.relic_count() == 0 {
            return Ok(PlanReport {
                season_score,
                stars,
                ..PlanReport::empty()
            });
        }

        let book = self.book();
        let requirements = self.aggregate(&book, input);
        let produced = deficit::passive_production(&input.hourly_rates, input.now, input.deadline);
        let deficit = deficit::resolve(&requirements.priced(), &input.owned, &produced);
        let character = self.character_outlook(&book, input);

        Ok(PlanReport {
            requirements,
            produced,
            deficit,
            character,
            season_score,
            stars,
        })
    }

    fn scoring(&self) -> Option<&SeasonScoring> {
        self.season.as_deref().and_then(|id| self.config.season(id))
    }

    fn aggregate(&self, book: &CostBook, input: &CalcInput) -> RequirementTotals {
        let empty = CostTable::empty();
        let mut totals = RequirementTotals::new();

        for slot in &self.config.slots {
            let current = input.current(&slot.id);
            if current == 0 {
                continue;
            }
            let target = input.targets.effective(slot.group, current);
            let table = book.get(slot.kind).unwrap_or(&empty);
            // A gap is recorded in `totals`; other tracks carry on.
            totals.add_track(table, slot.kind, &slot.id, current, target, 1).ok();
        }

        let relic_table = book.get(TrackKind::Relic).unwrap_or(&empty);
        for (tier, count) in &input.relic_counts {
            if *count == 0 {
                continue;
            }
            let target = input.targets.effective(TargetGroup::RelicResonance, *tier);
            let label = format!("relic_tier_{tier}");
            totals
                .add_track(relic_table, TrackKind::Relic, &label, *tier, target, *count)
                .ok();
        }
        totals
    }

    fn character_outlook(&self, book: &CostBook, input: &CalcInput) -> Option<CharacterOutlook> {
        let current = input.current("character");
        if current == 0 {
            return None;
        }
        let table = book.get(TrackKind::Character)?;
        let projector = ExperienceProjector::new(table, self.config.max_level);

        let held = input.held_experience();
        let rate = input.experience_rate();
        let target = input.targets.character;
        let boosted = held.saturating_add(experience::speed_up_experience(
            rate,
            input.speed_up_items,
            self.config.speed_up_hours,
        ));

        Some(CharacterOutlook {
            readout: projector.readout(current, held, target),
            next_level: projector.project_next_level(current, boosted, rate, input.now),
            target_level: projector.project(current, boosted, rate, target, input.now),
            reachable_level: projector.reachable_level(current, held, rate, input.now, input.deadline),
        })
    }
}
