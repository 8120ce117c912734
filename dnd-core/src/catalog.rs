//! Races, classes and backgrounds offered during character creation.
//!
//! Characters store these as plain string identifiers (`"half-elf"`,
//! `"wizard"`, `"folk-hero"`), so every lookup here is by identifier and
//! tolerates identifiers it does not know.

use crate::dice::DieType;
use dnd_api::CharacterBackground;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hit die used for class identifiers missing from the table.
pub const DEFAULT_HIT_DIE: DieType = DieType::D8;

// ============================================================================
// Classes
// ============================================================================

/// D&D character classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Fighter,
    Wizard,
    Rogue,
    Cleric,
    Ranger,
    Paladin,
    Barbarian,
    Bard,
    Sorcerer,
    Warlock,
    Druid,
    Monk,
}

impl CharacterClass {
    /// All classes in picker order.
    pub fn all() -> &'static [CharacterClass] {
        &[
            CharacterClass::Fighter,
            CharacterClass::Wizard,
            CharacterClass::Rogue,
            CharacterClass::Cleric,
            CharacterClass::Ranger,
            CharacterClass::Paladin,
            CharacterClass::Barbarian,
            CharacterClass::Bard,
            CharacterClass::Sorcerer,
            CharacterClass::Warlock,
            CharacterClass::Druid,
            CharacterClass::Monk,
        ]
    }

    pub fn from_id(id: &str) -> Option<CharacterClass> {
        Self::all().iter().copied().find(|c| c.id() == id)
    }

    pub fn id(&self) -> &'static str {
        match self {
            CharacterClass::Barbarian => "barbarian",
            CharacterClass::Bard => "bard",
            CharacterClass::Cleric => "cleric",
            CharacterClass::Druid => "druid",
            CharacterClass::Fighter => "fighter",
            CharacterClass::Monk => "monk",
            CharacterClass::Paladin => "paladin",
            CharacterClass::Ranger => "ranger",
            CharacterClass::Rogue => "rogue",
            CharacterClass::Sorcerer => "sorcerer",
            CharacterClass::Warlock => "warlock",
            CharacterClass::Wizard => "wizard",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Barbarian => "Barbarian",
            CharacterClass::Bard => "Bard",
            CharacterClass::Cleric => "Cleric",
            CharacterClass::Druid => "Druid",
            CharacterClass::Fighter => "Fighter",
            CharacterClass::Monk => "Monk",
            CharacterClass::Paladin => "Paladin",
            CharacterClass::Ranger => "Ranger",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Sorcerer => "Sorcerer",
            CharacterClass::Warlock => "Warlock",
            CharacterClass::Wizard => "Wizard",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CharacterClass::Barbarian => "Fierce berserker",
            CharacterClass::Bard => "Jack of all trades",
            CharacterClass::Cleric => "Divine spellcaster",
            CharacterClass::Druid => "Nature magic user",
            CharacterClass::Fighter => "Master of weapons and armor",
            CharacterClass::Monk => "Martial arts master",
            CharacterClass::Paladin => "Holy warrior",
            CharacterClass::Ranger => "Wilderness warrior",
            CharacterClass::Rogue => "Cunning and stealthy",
            CharacterClass::Sorcerer => "Innate magic user",
            CharacterClass::Warlock => "Pact magic wielder",
            CharacterClass::Wizard => "Scholar of arcane magic",
        }
    }

    pub fn hit_die(&self) -> DieType {
        match self {
            CharacterClass::Barbarian => DieType::D12,
            CharacterClass::Fighter | CharacterClass::Paladin | CharacterClass::Ranger => {
                DieType::D10
            }
            CharacterClass::Bard
            | CharacterClass::Cleric
            | CharacterClass::Druid
            | CharacterClass::Monk
            | CharacterClass::Rogue
            | CharacterClass::Warlock => DieType::D8,
            CharacterClass::Sorcerer | CharacterClass::Wizard => DieType::D6,
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Hit die for a class identifier; unknown identifiers get a d8.
pub fn hit_die_for(class_id: &str) -> DieType {
    CharacterClass::from_id(class_id)
        .map(|c| c.hit_die())
        .unwrap_or(DEFAULT_HIT_DIE)
}

// ============================================================================
// Races
// ============================================================================

/// Playable races.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RaceType {
    Human,
    Elf,
    Dwarf,
    Halfling,
    Dragonborn,
    Gnome,
    HalfElf,
    HalfOrc,
    Tiefling,
}

impl RaceType {
    /// All races in picker order.
    pub fn all() -> &'static [RaceType] {
        &[
            RaceType::Human,
            RaceType::Elf,
            RaceType::Dwarf,
            RaceType::Halfling,
            RaceType::Dragonborn,
            RaceType::Gnome,
            RaceType::HalfElf,
            RaceType::HalfOrc,
            RaceType::Tiefling,
        ]
    }

    pub fn from_id(id: &str) -> Option<RaceType> {
        Self::all().iter().copied().find(|r| r.id() == id)
    }

    pub fn id(&self) -> &'static str {
        match self {
            RaceType::Human => "human",
            RaceType::Elf => "elf",
            RaceType::Dwarf => "dwarf",
            RaceType::Halfling => "halfling",
            RaceType::Dragonborn => "dragonborn",
            RaceType::Gnome => "gnome",
            RaceType::HalfElf => "half-elf",
            RaceType::HalfOrc => "half-orc",
            RaceType::Tiefling => "tiefling",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RaceType::Human => "Human",
            RaceType::Elf => "Elf",
            RaceType::Dwarf => "Dwarf",
            RaceType::Halfling => "Halfling",
            RaceType::Dragonborn => "Dragonborn",
            RaceType::Gnome => "Gnome",
            RaceType::HalfElf => "Half-Elf",
            RaceType::HalfOrc => "Half-Orc",
            RaceType::Tiefling => "Tiefling",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RaceType::Human => "Versatile and ambitious",
            RaceType::Elf => "Graceful and magical",
            RaceType::Dwarf => "Hardy and resilient",
            RaceType::Halfling => "Small but brave",
            RaceType::Dragonborn => "Draconic heritage",
            RaceType::Gnome => "Small and clever",
            RaceType::HalfElf => "Between two worlds",
            RaceType::HalfOrc => "Strength and struggle",
            RaceType::Tiefling => "Infernal heritage",
        }
    }
}

impl fmt::Display for RaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Backgrounds
// ============================================================================

/// Character backgrounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Background {
    Acolyte,
    Criminal,
    FolkHero,
    Noble,
    Sage,
    Soldier,
    Charlatan,
    Entertainer,
    GuildArtisan,
    Hermit,
    Outlander,
    Sailor,
}

impl Background {
    /// All backgrounds in picker order.
    pub fn all() -> &'static [Background] {
        &[
            Background::Acolyte,
            Background::Criminal,
            Background::FolkHero,
            Background::Noble,
            Background::Sage,
            Background::Soldier,
            Background::Charlatan,
            Background::Entertainer,
            Background::GuildArtisan,
            Background::Hermit,
            Background::Outlander,
            Background::Sailor,
        ]
    }

    pub fn from_id(id: &str) -> Option<Background> {
        Self::all().iter().copied().find(|b| b.id() == id)
    }

    pub fn id(&self) -> &'static str {
        match self {
            Background::Acolyte => "acolyte",
            Background::Criminal => "criminal",
            Background::FolkHero => "folk-hero",
            Background::Noble => "noble",
            Background::Sage => "sage",
            Background::Soldier => "soldier",
            Background::Charlatan => "charlatan",
            Background::Entertainer => "entertainer",
            Background::GuildArtisan => "guild-artisan",
            Background::Hermit => "hermit",
            Background::Outlander => "outlander",
            Background::Sailor => "sailor",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Background::Acolyte => "Acolyte",
            Background::Criminal => "Criminal",
            Background::FolkHero => "Folk Hero",
            Background::Noble => "Noble",
            Background::Sage => "Sage",
            Background::Soldier => "Soldier",
            Background::Charlatan => "Charlatan",
            Background::Entertainer => "Entertainer",
            Background::GuildArtisan => "Guild Artisan",
            Background::Hermit => "Hermit",
            Background::Outlander => "Outlander",
            Background::Sailor => "Sailor",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Background::Acolyte => "Served in a temple",
            Background::Criminal => "Lived outside the law",
            Background::FolkHero => "Champion of the people",
            Background::Noble => "Born to privilege",
            Background::Sage => "Scholar and researcher",
            Background::Soldier => "Served in an army",
            Background::Charlatan => "Master of deception",
            Background::Entertainer => "Performer and artist",
            Background::GuildArtisan => "Member of a craft guild",
            Background::Hermit => "Lived in seclusion",
            Background::Outlander => "From the wilderness",
            Background::Sailor => "Sailed the seas",
        }
    }

    /// The `{id, name, description}` object stored on a character. An
    /// unknown id keeps the id and leaves name and description empty.
    pub fn payload_for(id: &str) -> CharacterBackground {
        match Background::from_id(id) {
            Some(background) => CharacterBackground {
                id: id.to_string(),
                name: background.name().to_string(),
                description: background.description().to_string(),
            },
            None => CharacterBackground {
                id: id.to_string(),
                name: String::new(),
                description: String::new(),
            },
        }
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
