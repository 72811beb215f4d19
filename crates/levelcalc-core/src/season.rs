//! Season score and primordial-star conversion.
//!
//! Each season scores the target levels that exceed its base level. All
//! constants come from [`SeasonScoring`], which is loaded from configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::track::{TargetGroup, Targets};

/// Points per level above the season base, per target group. Each weight
/// already includes the number of slots in the group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupWeights {
    pub character: u64,
    pub equipment_resonance: u64,
    pub skill_resonance: u64,
    pub pet_resonance: u64,
    pub relic_resonance: u64,
}

impl GroupWeights {
    pub fn get(&self, group: TargetGroup) -> u64 {
        match group {
            TargetGroup::Character => self.character,
            TargetGroup::EquipmentResonance => self.equipment_resonance,
            TargetGroup::SkillResonance => self.skill_resonance,
            TargetGroup::PetResonance => self.pet_resonance,
            TargetGroup::RelicResonance => self.relic_resonance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonScoring {
    pub season: String,
    /// Levels at or below this score nothing.
    pub base_level: u32,
    pub weights: GroupWeights,
    /// Relic levels run on a smaller scale: their base is
    /// `base_level / relic_level_divisor`.
    #[serde(default = "default_relic_level_divisor")]
    pub relic_level_divisor: u32,
    pub star_divisor: i64,
    pub star_offset: i64,
}

fn default_relic_level_divisor() -> u32 {
    10
}

impl SeasonScoring {
    pub fn base_for(&self, group: TargetGroup) -> u32 {
        match group {
            TargetGroup::RelicResonance => self
                .base_level
                .checked_div(self.relic_level_divisor)
                .unwrap_or(self.base_level),
            _ => self.base_level,
        }
    }

    /// Sum over groups of `(target - base) * weight` for targets above base.
    pub fn score(&self, targets: &Targets) -> u64 {
        [
            TargetGroup::Character,
            TargetGroup::EquipmentResonance,
            TargetGroup::SkillResonance,
            TargetGroup::PetResonance,
            TargetGroup::RelicResonance,
        ]
        .into_iter()
        .map(|group| {
            let above = targets.get(group).saturating_sub(self.base_for(group));
            u64::from(above).saturating_mul(self.weights.get(group))
        })
        .fold(0u64, u64::saturating_add)
    }

    /// `floor(score / star_divisor + star_offset)`.
    ///
    /// A zero divisor yields the offset alone.
    pub fn stars(&self, score: u64) -> i64 {
        let score = i64::try_from(score).unwrap_or(i64::MAX);
        let whole = score.checked_div_euclid(self.star_divisor).unwrap_or(0);
        whole.saturating_add(self.star_offset)
    }
}

/// Primordial stars recorded per season, with a running total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarLedger {
    per_season: BTreeMap<String, i64>,
}

impl StarLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, season: &str, stars: i64) {
        self.per_season.insert(season.to_string(), stars);
    }

    pub fn get(&self, season: &str) -> Option<i64> {
        self.per_season.get(season).copied()
    }

    pub fn total(&self) -> i64 {
        self.per_season.values().fold(0i64, |acc, v| acc.saturating_add(*v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.per_season.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
