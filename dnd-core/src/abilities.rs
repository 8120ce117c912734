//! Ability scores and modifiers.
//!
//! Scores are plain integers. Generated scores land in 3..=18, but manual
//! entry is never clamped, so everything here is total over `i32`.

use dnd_api::CharacterStats;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score substituted when a stat field does not hold a number.
pub const DEFAULT_SCORE: i32 = 10;

/// Level substituted when the level field does not hold a number.
pub const DEFAULT_LEVEL: i32 = 1;

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    /// All abilities in sheet order.
    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Ability scores container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AbilityScores {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: i32) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        modifier(self.get(ability))
    }
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self::new(
            DEFAULT_SCORE,
            DEFAULT_SCORE,
            DEFAULT_SCORE,
            DEFAULT_SCORE,
            DEFAULT_SCORE,
            DEFAULT_SCORE,
        )
    }
}

impl From<AbilityScores> for CharacterStats {
    fn from(scores: AbilityScores) -> Self {
        CharacterStats {
            strength: scores.strength,
            dexterity: scores.dexterity,
            constitution: scores.constitution,
            intelligence: scores.intelligence,
            wisdom: scores.wisdom,
            charisma: scores.charisma,
        }
    }
}

impl From<CharacterStats> for AbilityScores {
    fn from(stats: CharacterStats) -> Self {
        AbilityScores::new(
            stats.strength,
            stats.dexterity,
            stats.constitution,
            stats.intelligence,
            stats.wisdom,
            stats.charisma,
        )
    }
}

/// Ability modifier: `floor((score - 10) / 2)`.
///
/// Floors toward negative infinity, so 7 gives -2 rather than -1. Computed
/// in `i64` so the extremes of `i32` cannot overflow.
pub fn modifier(score: i32) -> i32 {
    // |result| <= 2^31 / 2 + 5, always representable.
    (i64::from(score) - 10).div_euclid(2) as i32
}

/// Format a modifier for display: `+2`, `+0`, `-1`.
pub fn format_modifier(modifier: i32) -> String {
    if modifier >= 0 {
        format!("+{modifier}")
    } else {
        modifier.to_string()
    }
}

/// Normalize a stat field's text. Anything that does not start with a
/// non-zero integer becomes [`DEFAULT_SCORE`].
pub fn parse_score_input(text: &str) -> i32 {
    parse_int_input(text, DEFAULT_SCORE)
}

/// Normalize the level field's text, falling back to [`DEFAULT_LEVEL`].
pub fn parse_level_input(text: &str) -> i32 {
    parse_int_input(text, DEFAULT_LEVEL)
}

/// Leading integer of a numeric field, or `fallback` when there is none or
/// it is zero.
pub fn parse_int_input(text: &str, fallback: i32) -> i32 {
    parse_leading_int(text)
        .filter(|v| *v != 0)
        .unwrap_or(fallback)
}

/// Parse an optionally signed run of leading digits, ignoring leading
/// whitespace and whatever follows the digits ("12abc" is 12, "3.9" is 3).
fn parse_leading_int(text: &str) -> Option<i32> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_table() {
        assert_eq!(modifier(10), 0);
        assert_eq!(modifier(11), 0);
        assert_eq!(modifier(12), 1);
        assert_eq!(modifier(9), -1);
        assert_eq!(modifier(7), -2);
        assert_eq!(modifier(3), -4);
        assert_eq!(modifier(18), 4);
    }

    #[test]
    fn test_modifier_floors_odd_scores_below_ten() {
        // Truncating division would give -1, -2, -3 here.
        assert_eq!(modifier(1), -5);
        assert_eq!(modifier(5), -3);
        assert_eq!(modifier(0), -5);
        assert_eq!(modifier(-1), -6);
    }

    #[test]
    fn test_modifier_is_total() {
        assert_eq!(modifier(i32::MAX), 1_073_741_818);
        assert_eq!(modifier(i32::MIN), -1_073_741_829);
        assert_eq!(modifier(30), 10);
    }

    #[test]
    fn test_scores_get_set_and_default() {
        let mut scores = AbilityScores::default();
        for ability in Ability::all() {
            assert_eq!(scores.get(ability), 10);
        }
        scores.set(Ability::Dexterity, 16);
        assert_eq!(scores.dexterity, 16);
        assert_eq!(scores.modifier(Ability::Dexterity), 3);
    }

    #[test]
    fn test_stats_conversion_preserves_order() {
        let scores = AbilityScores::new(8, 14, 13, 15, 12, 10);
        let stats: CharacterStats = scores.into();
        assert_eq!(stats.intelligence, 15);
        assert_eq!(AbilityScores::from(stats), scores);
    }

    #[test]
    fn test_format_modifier() {
        assert_eq!(format_modifier(2), "+2");
        assert_eq!(format_modifier(0), "+0");
        assert_eq!(format_modifier(-1), "-1");
    }

    #[test]
    fn test_score_input_fallbacks() {
        assert_eq!(parse_score_input(""), 10);
        assert_eq!(parse_score_input("abc"), 10);
        assert_eq!(parse_score_input("-"), 10);
        assert_eq!(parse_score_input("0"), 10);
        assert_eq!(parse_score_input("99999999999"), 10);
    }

    #[test]
    fn test_score_input_accepts_leading_integer() {
        assert_eq!(parse_score_input("15"), 15);
        assert_eq!(parse_score_input("  7"), 7);
        assert_eq!(parse_score_input("12abc"), 12);
        assert_eq!(parse_score_input("3.9"), 3);
        assert_eq!(parse_score_input("25"), 25);
        assert_eq!(parse_score_input("-4"), -4);
    }

    #[test]
    fn test_level_input_fallbacks() {
        assert_eq!(parse_level_input(""), 1);
        assert_eq!(parse_level_input("x"), 1);
        assert_eq!(parse_level_input("0"), 1);
        assert_eq!(parse_level_input("5"), 5);
        assert_eq!(parse_level_input("40"), 40);
    }
}
