//! Upgrade tracks, slots and the target groups that drive them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which cost table a slot is priced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Character,
    Equipment,
    Skill,
    Pet,
    Relic,
}

impl TrackKind {
    pub const ALL: [TrackKind; 5] = [
        TrackKind::Character,
        TrackKind::Equipment,
        TrackKind::Skill,
        TrackKind::Pet,
        TrackKind::Relic,
    ];

    /// Materials a track of this kind is normally priced in. A track whose
    /// table is absent has no columns of its own, so a gap on it is charged
    /// to these.
    pub fn usual_materials(self) -> &'static [&'static str] {
        match self {
            TrackKind::Character => &["exp"],
            TrackKind::Equipment => &["stoneOre", "rola", "refiningStone"],
            TrackKind::Skill => &["essence"],
            TrackKind::Pet => &["freezeDried"],
            TrackKind::Relic => &["sand", "rola"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrackKind::Character => "character",
            TrackKind::Equipment => "equipment",
            TrackKind::Skill => "skill",
            TrackKind::Pet => "pet",
            TrackKind::Relic => "relic",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A shared target level that several slots climb toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetGroup {
    Character,
    EquipmentResonance,
    SkillResonance,
    PetResonance,
    RelicResonance,
}

/// Target level per group. Zero means no target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Targets {
    pub character: u32,
    pub equipment_resonance: u32,
    pub skill_resonance: u32,
    pub pet_resonance: u32,
    pub relic_resonance: u32,
}

impl Targets {
    pub fn get(&self, group: TargetGroup) -> u32 {
        match group {
            TargetGroup::Character => self.character,
            TargetGroup::EquipmentResonance => self.equipment_resonance,
            TargetGroup::SkillResonance => self.skill_resonance,
            TargetGroup::PetResonance => self.pet_resonance,
            TargetGroup::RelicResonance => self.relic_resonance,
        }
    }

    /// The level a slot actually climbs to: never below where it already is.
    pub fn effective(&self, group: TargetGroup, current: u32) -> u32 {
        self.get(group).max(current)
    }
}

/// One independently levelled slot (a weapon, a skill, a pet, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
    /// Stable id, also used as the track label in data-gap reports.
    pub id: String,
    pub kind: TrackKind,
    pub group: TargetGroup,
}

impl SlotConfig {
    pub fn new(id: &str, kind: TrackKind, group: TargetGroup) -> Self {
        Self {
            id: id.to_string(),
            kind,
            group,
        }
    }
}

/// Character, five equipment pieces, eight skills and four pets.
pub fn default_slots() -> Vec<SlotConfig> {
    let mut slots = vec![SlotConfig::new(
        "character",
        TrackKind::Character,
        TargetGroup::Character,
    )];
    for piece in ["main_weapon", "off_weapon", "helmet", "armor", "boots"] {
        slots.push(SlotConfig::new(
            &format!("equipment_{piece}"),
            TrackKind::Equipment,
            TargetGroup::EquipmentResonance,
        ));
    }
    for family in ["combat", "arcane"] {
        for n in 1..=4 {
            slots.push(SlotConfig::new(
                &format!("skill_{family}{n}"),
                TrackKind::Skill,
                TargetGroup::SkillResonance,
            ));
        }
    }
    for n in 1..=4 {
        slots.push(SlotConfig::new(
            &format!("pet{n}"),
            TrackKind::Pet,
            TargetGroup::PetResonance,
        ));
    }
    slots
}
