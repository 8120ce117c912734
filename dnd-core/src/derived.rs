//! Combat statistics derived from class and ability scores.
//!
//! Neither value is clamped. A d6 class with very low Constitution can end
//! up with zero or negative hit points; that is preserved as-is.

use crate::abilities::{modifier, AbilityScores};
use crate::catalog::hit_die_for;
use serde::{Deserialize, Serialize};

/// Proficiency bonus a new character starts with. It is a user-editable
/// field and does not scale with level.
pub const DEFAULT_PROFICIENCY_BONUS: i32 = 2;

/// Base armor class before the Dexterity modifier.
pub const BASE_ARMOR_CLASS: i32 = 10;

/// Hit points and armor class for a class/score combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedCombatStats {
    pub hit_points: i32,
    pub armor_class: i32,
}

impl DerivedCombatStats {
    /// Compute from a class identifier and the full score set.
    pub fn compute(class_id: &str, scores: &AbilityScores) -> Self {
        Self {
            hit_points: hit_points(class_id, scores.constitution),
            armor_class: armor_class(scores.dexterity),
        }
    }
}

/// `hit die + CON modifier`.
pub fn hit_points(class_id: &str, constitution: i32) -> i32 {
    hit_die_for(class_id).sides() + modifier(constitution)
}

/// `10 + DEX modifier`.
pub fn armor_class(dexterity: i32) -> i32 {
    BASE_ARMOR_CLASS + modifier(dexterity)
}
