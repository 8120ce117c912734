//! Dice for ability score generation.
//!
//! Ability scores are rolled as 4d6, dropping the lowest die. The resulting
//! distribution is bell-shaped over 3..=18 with a mean of about 12.24.

use crate::abilities::{Ability, AbilityScores};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Die sizes used by the character rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DieType {
    D6,
    D8,
    D10,
    D12,
}

impl DieType {
    pub fn sides(&self) -> i32 {
        match self {
            DieType::D6 => 6,
            DieType::D8 => 8,
            DieType::D10 => 10,
            DieType::D12 => 12,
        }
    }

    pub fn from_sides(sides: i32) -> Option<DieType> {
        match sides {
            6 => Some(DieType::D6),
            8 => Some(DieType::D8),
            10 => Some(DieType::D10),
            12 => Some(DieType::D12),
            _ => None,
        }
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// One 4d6-drop-lowest roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRoll {
    /// All four dice, highest first.
    pub dice: [u8; 4],
}

impl AbilityRoll {
    /// The three dice that count.
    pub fn kept(&self) -> &[u8] {
        &self.dice[..3]
    }

    pub fn dropped(&self) -> u8 {
        self.dice[3]
    }

    pub fn total(&self) -> i32 {
        self.kept().iter().map(|&d| i32::from(d)).sum()
    }
}

impl fmt::Display for AbilityRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, low] = self.dice;
        write!(f, "[{a}, {b}, {c}, ({low})] = {}", self.total())
    }
}

/// Roll 4d6 and keep the three highest.
pub fn roll_4d6_drop_lowest_with_rng<R: Rng>(rng: &mut R) -> AbilityRoll {
    let mut dice = [0u8; 4];
    for die in &mut dice {
        *die = rng.gen_range(1..=6);
    }
    dice.sort_unstable_by(|a, b| b.cmp(a));
    AbilityRoll { dice }
}

/// Roll one ability score (4d6, drop lowest).
pub fn roll_4d6_drop_lowest() -> i32 {
    roll_4d6_drop_lowest_with_rng(&mut rand::thread_rng()).total()
}

/// Roll a full set of scores, one independent roll per ability in sheet
/// order. Scores are not sorted or reassigned.
pub fn roll_ability_scores_with_rng<R: Rng>(rng: &mut R) -> AbilityScores {
    let mut scores = AbilityScores::default();
    for ability in Ability::all() {
        let roll = roll_4d6_drop_lowest_with_rng(rng);
        scores.set(ability, roll.total());
    }
    scores
}

/// Roll a full set of scores.
pub fn roll_ability_scores() -> AbilityScores {
    roll_ability_scores_with_rng(&mut rand::thread_rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const TRIALS: usize = 50_000;

    #[test]
    fn test_roll_range() {
        for _ in 0..1_000 {
            let score = roll_4d6_drop_lowest();
            assert!((3..=18).contains(&score));
        }
    }

    #[test]
    fn test_roll_drops_the_lowest_die() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let roll = roll_4d6_drop_lowest_with_rng(&mut rng);
            assert!(roll.dice.iter().all(|d| (1..=6).contains(d)));
            assert!(roll.kept().iter().all(|&d| d >= roll.dropped()));
            let all: i32 = roll.dice.iter().map(|&d| i32::from(d)).sum();
            assert_eq!(roll.total(), all - i32::from(roll.dropped()));
        }
    }

    #[test]
    fn test_distribution_is_not_uniform() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut counts = [0usize; 19];
        let mut sum = 0i64;
        for _ in 0..TRIALS {
            let total = roll_4d6_drop_lowest_with_rng(&mut rng).total();
            counts[total as usize] += 1;
            sum += i64::from(total);
        }

        // Exact mean is 15869 / 1296 = 12.2446...
        let mean = sum as f64 / TRIALS as f64;
        assert!((mean - 12.24).abs() < 0.1, "mean was {mean}");

        // A flat 3..=18 distribution would have a mean of 10.5 and put 1/16
        // of the rolls on 3. The real odds of a 3 are 1/1296.
        assert!(counts[3] < TRIALS / 200);
        assert!(counts[18] < TRIALS / 30);

        let mode = (3..=18).max_by_key(|&v| counts[v]).unwrap();
        assert!((12..=13).contains(&mode), "mode was {mode}");
    }

    #[test]
    fn test_ability_set_uses_six_rolls() {
        let mut rng = StdRng::seed_from_u64(42);
        let scores = roll_ability_scores_with_rng(&mut rng);

        let mut replay = StdRng::seed_from_u64(42);
        for ability in Ability::all() {
            let expected = roll_4d6_drop_lowest_with_rng(&mut replay).total();
            assert_eq!(scores.get(ability), expected);
        }
    }

    #[test]
    fn test_successive_sets_are_independent() {
        // Two successive sets from one generator must not repeat each other.
        let mut rng = StdRng::seed_from_u64(1234);
        let mut identical = 0;
        for _ in 0..200 {
            let first = roll_ability_scores_with_rng(&mut rng);
            let second = roll_ability_scores_with_rng(&mut rng);
            if first == second {
                identical += 1;
            }
        }
        assert!(identical < 2);
    }

    #[test]
    fn test_roll_display_marks_dropped_die() {
        let roll = AbilityRoll { dice: [6, 5, 4, 1] };
        assert_eq!(roll.to_string(), "[6, 5, 4, (1)] = 15");
    }

    #[test]
    fn test_die_type_sides() {
        assert_eq!(DieType::D12.sides(), 12);
        assert_eq!(DieType::from_sides(8), Some(DieType::D8));
        assert_eq!(DieType::from_sides(20), None);
        assert_eq!(DieType::D6.to_string(), "d6");
    }
}
