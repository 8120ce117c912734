//! Roll a few ability score sets and show the derived stats per class.
//!
//! Run with: `RUST_LOG=debug cargo run -p dnd-core --example roll_stats`

use dnd_core::abilities::{format_modifier, Ability};
use dnd_core::dice::{roll_4d6_drop_lowest_with_rng, AbilityRoll};
use dnd_core::{CharacterClass, DerivedCombatStats};
use rand::thread_rng;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut rng = thread_rng();

    println!("=== Rolling ability scores (4d6, drop lowest) ===\n");
    let mut scores = dnd_core::AbilityScores::default();
    for ability in Ability::all() {
        let roll: AbilityRoll = roll_4d6_drop_lowest_with_rng(&mut rng);
        scores.set(ability, roll.total());
        println!(
            "  {}: {roll}  ({})",
            ability.abbreviation(),
            format_modifier(scores.modifier(ability))
        );
    }

    println!("\n=== Derived stats by class ===\n");
    for class in CharacterClass::all() {
        let derived = DerivedCombatStats::compute(class.id(), &scores);
        tracing::debug!(class = class.id(), hit_die = %class.hit_die(), "computed");
        println!(
            "  {:<10} {:>4}  HP {:>3}  AC {:>3}",
            class.name(),
            class.hit_die().to_string(),
            derived.hit_points,
            derived.armor_class
        );
    }
}
