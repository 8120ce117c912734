//! Character creation wizard.
//!
//! Five steps, each guarded by the field it collects:
//!
//! | # | Step | Required to advance |
//! |---|------|---------------------|
//! | 1 | Basics | non-blank name |
//! | 2 | Race | race selected |
//! | 3 | Class | class selected |
//! | 4 | Background & stats | background selected |
//! | 5 | Backstory & review | (terminal, save) |
//!
//! Derived combat stats are never cached on the draft; they are recomputed
//! from the current class and scores whenever they are read, and frozen into
//! the payload at save time.

use crate::abilities::{parse_level_input, parse_score_input, Ability, AbilityScores, DEFAULT_LEVEL};
use crate::catalog::{Background, CharacterClass, RaceType};
use crate::derived::{DerivedCombatStats, DEFAULT_PROFICIENCY_BONUS};
use crate::dice::roll_ability_scores_with_rng;
use crate::inflight::InFlight;
use crate::store::CharacterStore;
use chrono::{DateTime, SecondsFormat, Utc};
use dnd_api::{Character, CharacterBackstory, NewCharacter};
use rand::Rng;
use std::time::Duration;
use thiserror::Error;

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CreationStep {
    #[default]
    Basics,
    Race,
    Class,
    BackgroundAndStats,
    BackstoryAndReview,
}

impl CreationStep {
    pub const COUNT: u8 = 5;

    /// One-based step number.
    pub fn number(&self) -> u8 {
        match self {
            CreationStep::Basics => 1,
            CreationStep::Race => 2,
            CreationStep::Class => 3,
            CreationStep::BackgroundAndStats => 4,
            CreationStep::BackstoryAndReview => 5,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CreationStep::Basics => "Basic Information",
            CreationStep::Race => "Choose Your Race",
            CreationStep::Class => "Choose Your Class",
            CreationStep::BackgroundAndStats => "Background & Ability Scores",
            CreationStep::BackstoryAndReview => "Backstory & Final Review",
        }
    }

    /// Completion shown on the progress bar, rounded to a whole percent.
    pub fn progress_percent(&self) -> u8 {
        let percent = u16::from(self.number()) * 100 / u16::from(Self::COUNT);
        percent as u8
    }

    pub fn next(&self) -> Option<CreationStep> {
        match self {
            CreationStep::Basics => Some(CreationStep::Race),
            CreationStep::Race => Some(CreationStep::Class),
            CreationStep::Class => Some(CreationStep::BackgroundAndStats),
            CreationStep::BackgroundAndStats => Some(CreationStep::BackstoryAndReview),
            CreationStep::BackstoryAndReview => None,
        }
    }

    pub fn prev(&self) -> Option<CreationStep> {
        match self {
            CreationStep::Basics => None,
            CreationStep::Race => Some(CreationStep::Basics),
            CreationStep::Class => Some(CreationStep::Race),
            CreationStep::BackgroundAndStats => Some(CreationStep::Class),
            CreationStep::BackstoryAndReview => Some(CreationStep::BackgroundAndStats),
        }
    }
}

/// Everything the wizard has collected so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterDraft {
    pub name: String,
    pub race: Option<RaceType>,
    pub class: Option<CharacterClass>,
    pub background: Option<Background>,
    pub level: i32,
    pub scores: AbilityScores,
    pub proficiency_bonus: i32,
    pub backstory: String,
}

impl Default for CharacterDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            race: None,
            class: None,
            background: None,
            level: DEFAULT_LEVEL,
            scores: AbilityScores::default(),
            proficiency_bonus: DEFAULT_PROFICIENCY_BONUS,
            backstory: String::new(),
        }
    }
}

impl CharacterDraft {
    /// Class identifier as stored on the character (empty when unset).
    pub fn class_id(&self) -> &'static str {
        self.class.map(|c| c.id()).unwrap_or("")
    }

    pub fn derived(&self) -> DerivedCombatStats {
        DerivedCombatStats::compute(self.class_id(), &self.scores)
    }
}

/// Error from saving the wizard's character.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("Character is not ready to save")]
    NotReady,

    #[error("Saving the character timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Failed to save character: {0}")]
    Rejected(#[source] dnd_api::Error),
}

impl SaveError {
    /// Text for the transient notification shown after a failed save.
    pub fn notice(&self) -> &'static str {
        match self {
            SaveError::NotReady => "Name, race and class are required before saving.",
            SaveError::TimedOut(_) => "Saving took too long. Please try again.",
            SaveError::Rejected(_) => "Failed to save character. Please try again.",
        }
    }
}

/// Review-screen summary of the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterSummary {
    pub name: String,
    pub race: &'static str,
    pub class: &'static str,
    pub background: &'static str,
    pub level: i32,
    pub hit_points: i32,
    pub armor_class: i32,
    pub proficiency_bonus: i32,
}

/// Character creation state machine.
#[derive(Debug, Clone, Default)]
pub struct CharacterWizard {
    step: CreationStep,
    draft: CharacterDraft,
    saving: bool,
}

impl CharacterWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> CreationStep {
        self.step
    }

    pub fn draft(&self) -> &CharacterDraft {
        &self.draft
    }

    /// Whether a save request is in flight.
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    // ------------------------------------------------------------------
    // Field edits
    // ------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    /// Set the level from the raw text of its input field.
    pub fn set_level_input(&mut self, text: &str) {
        self.draft.level = parse_level_input(text);
    }

    pub fn select_race(&mut self, race: RaceType) {
        self.draft.race = Some(race);
    }

    pub fn select_class(&mut self, class: CharacterClass) {
        self.draft.class = Some(class);
    }

    pub fn select_background(&mut self, background: Background) {
        self.draft.background = Some(background);
    }

    /// Set one score from the raw text of its input field.
    pub fn set_stat_input(&mut self, ability: Ability, text: &str) {
        self.draft.scores.set(ability, parse_score_input(text));
    }

    pub fn set_proficiency_bonus(&mut self, bonus: i32) {
        self.draft.proficiency_bonus = bonus;
    }

    pub fn set_backstory(&mut self, backstory: impl Into<String>) {
        self.draft.backstory = backstory.into();
    }

    /// Re-roll all six scores. Only allowed on the background & stats step;
    /// returns whether anything was rolled.
    pub fn roll_stats(&mut self) -> bool {
        self.roll_stats_with_rng(&mut rand::thread_rng())
    }

    pub fn roll_stats_with_rng<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.step != CreationStep::BackgroundAndStats {
            return false;
        }
        self.draft.scores = roll_ability_scores_with_rng(rng);
        true
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Whether the current step's required field is filled in.
    pub fn can_advance(&self) -> bool {
        match self.step {
            CreationStep::Basics => !self.draft.name.trim().is_empty(),
            CreationStep::Race => self.draft.race.is_some(),
            CreationStep::Class => self.draft.class.is_some(),
            CreationStep::BackgroundAndStats => self.draft.background.is_some(),
            CreationStep::BackstoryAndReview => false,
        }
    }

    /// Advance one step if allowed. Returns whether the step changed.
    pub fn next(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        match self.step.next() {
            Some(step) => {
                self.step = step;
                true
            }
            None => false,
        }
    }

    /// Go back one step; stays put on the first step.
    pub fn previous(&mut self) {
        if let Some(step) = self.step.prev() {
            self.step = step;
        }
    }

    // ------------------------------------------------------------------
    // Review & save
    // ------------------------------------------------------------------

    pub fn derived(&self) -> DerivedCombatStats {
        self.draft.derived()
    }

    pub fn summary(&self) -> CharacterSummary {
        let derived = self.derived();
        CharacterSummary {
            name: if self.draft.name.is_empty() {
                "Unnamed".to_string()
            } else {
                self.draft.name.clone()
            },
            race: self.draft.race.map(|r| r.name()).unwrap_or("None"),
            class: self.draft.class.map(|c| c.name()).unwrap_or("None"),
            background: self.draft.background.map(|b| b.name()).unwrap_or("None"),
            level: self.draft.level,
            hit_points: derived.hit_points,
            armor_class: derived.armor_class,
            proficiency_bonus: self.draft.proficiency_bonus,
        }
    }

    /// Whether the save control is enabled.
    pub fn can_save(&self) -> bool {
        self.step == CreationStep::BackstoryAndReview
            && !self.saving
            && !self.draft.name.is_empty()
            && self.draft.race.is_some()
            && self.draft.class.is_some()
    }

    /// Assemble the creation payload, stamping the backstory with the
    /// current time.
    pub fn build_payload(&self) -> NewCharacter {
        self.build_payload_at(Utc::now())
    }

    pub fn build_payload_at(&self, now: DateTime<Utc>) -> NewCharacter {
        let draft = &self.draft;
        let derived = draft.derived();

        NewCharacter {
            name: draft.name.clone(),
            race: draft.race.map(|r| r.id()).unwrap_or("").to_string(),
            character_class: draft.class_id().to_string(),
            level: draft.level,
            hit_points: derived.hit_points,
            armor_class: derived.armor_class,
            proficiency_bonus: draft.proficiency_bonus,
            stats: draft.scores.into(),
            background: Background::payload_for(
                draft.background.map(|b| b.id()).unwrap_or(""),
            ),
            backstory: CharacterBackstory {
                text: draft.backstory.clone(),
                created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        }
    }

    /// Disable the save control and hand out the payload to submit.
    pub fn begin_save(&mut self) -> Result<NewCharacter, SaveError> {
        if !self.can_save() {
            return Err(SaveError::NotReady);
        }
        self.saving = true;
        Ok(self.build_payload())
    }

    /// Re-enable the save control and pass the outcome through.
    pub fn finish_save(
        &mut self,
        outcome: Result<Character, SaveError>,
    ) -> Result<Character, SaveError> {
        self.saving = false;
        match &outcome {
            Ok(character) => {
                tracing::info!(id = %character.id, name = %character.sheet.name, "character saved")
            }
            Err(error) => tracing::warn!(%error, "character save failed"),
        }
        outcome
    }

    /// Submit the character, giving up after `limit`.
    ///
    /// Success means the caller should leave the wizard. On failure the
    /// wizard stays on the review step with saving re-enabled.
    pub async fn save<S>(&mut self, store: &S, limit: Duration) -> Result<Character, SaveError>
    where
        S: CharacterStore + ?Sized,
    {
        let payload = self.begin_save()?;
        tracing::debug!(name = %payload.name, class = %payload.character_class, "saving character");

        let outcome = {
            // Re-enables saving even if this future is dropped mid-request.
            let _in_flight = InFlight::resume(&mut self.saving);
            match tokio::time::timeout(limit, store.create_character(&payload)).await {
                Ok(Ok(character)) => Ok(character),
                Ok(Err(dnd_api::Error::Timeout)) | Err(_) => Err(SaveError::TimedOut(limit)),
                Ok(Err(error)) => Err(SaveError::Rejected(error)),
            }
        };

        self.finish_save(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn wizard_at_review() -> CharacterWizard {
        let mut wizard = CharacterWizard::new();
        wizard.set_name("Elara");
        assert!(wizard.next());
        wizard.select_race(RaceType::Elf);
        assert!(wizard.next());
        wizard.select_class(CharacterClass::Wizard);
        assert!(wizard.next());
        wizard.select_background(Background::Sage);
        assert!(wizard.next());
        wizard
    }

    #[test]
    fn test_defaults() {
        let wizard = CharacterWizard::new();
        assert_eq!(wizard.step(), CreationStep::Basics);
        assert_eq!(wizard.draft().level, 1);
        assert_eq!(wizard.draft().proficiency_bonus, 2);
        assert_eq!(wizard.draft().scores, AbilityScores::default());
        assert!(!wizard.is_saving());
    }

    #[test]
    fn test_next_blocked_without_name() {
        let mut wizard = CharacterWizard::new();
        assert!(!wizard.next());
        assert_eq!(wizard.step(), CreationStep::Basics);

        wizard.set_name("   ");
        assert!(!wizard.next());
        assert_eq!(wizard.step(), CreationStep::Basics);

        wizard.set_name("Thorin");
        assert!(wizard.next());
        assert_eq!(wizard.step(), CreationStep::Race);
    }

    #[test]
    fn test_each_step_guards_its_field() {
        let mut wizard = CharacterWizard::new();
        wizard.set_name("Thorin");
        wizard.next();

        assert!(!wizard.next());
        wizard.select_race(RaceType::Dwarf);
        assert!(wizard.next());

        assert!(!wizard.next());
        wizard.select_class(CharacterClass::Fighter);
        assert!(wizard.next());

        assert!(!wizard.next());
        wizard.select_background(Background::Soldier);
        assert!(wizard.next());

        assert_eq!(wizard.step(), CreationStep::BackstoryAndReview);
        assert!(!wizard.next());
        assert_eq!(wizard.step(), CreationStep::BackstoryAndReview);
    }

    #[test]
    fn test_previous_floors_at_first_step() {
        let mut wizard = CharacterWizard::new();
        wizard.previous();
        assert_eq!(wizard.step(), CreationStep::Basics);

        let mut wizard = wizard_at_review();
        for _ in 0..10 {
            wizard.previous();
        }
        assert_eq!(wizard.step(), CreationStep::Basics);
    }

    #[test]
    fn test_previous_ignores_guards() {
        let mut wizard = wizard_at_review();
        wizard.set_name("");
        wizard.previous();
        assert_eq!(wizard.step(), CreationStep::BackgroundAndStats);
    }

    #[test]
    fn test_roll_only_on_stats_step() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut wizard = CharacterWizard::new();
        assert!(!wizard.roll_stats_with_rng(&mut rng));
        assert_eq!(wizard.draft().scores, AbilityScores::default());

        let mut wizard = wizard_at_review();
        assert!(!wizard.roll_stats_with_rng(&mut rng));

        wizard.previous();
        assert!(wizard.roll_stats_with_rng(&mut rng));
        assert_eq!(wizard.step(), CreationStep::BackgroundAndStats);
        for ability in Ability::all() {
            assert!((3..=18).contains(&wizard.draft().scores.get(ability)));
        }
    }

    #[test]
    fn test_stat_and_level_inputs_normalize() {
        let mut wizard = CharacterWizard::new();
        wizard.set_stat_input(Ability::Strength, "17");
        wizard.set_stat_input(Ability::Dexterity, "");
        wizard.set_stat_input(Ability::Wisdom, "25");
        wizard.set_level_input("abc");
        assert_eq!(wizard.draft().scores.strength, 17);
        assert_eq!(wizard.draft().scores.dexterity, 10);
        assert_eq!(wizard.draft().scores.wisdom, 25);
        assert_eq!(wizard.draft().level, 1);

        wizard.set_level_input("7");
        assert_eq!(wizard.draft().level, 7);
    }

    #[test]
    fn test_derived_tracks_class_and_stat_changes() {
        let mut wizard = CharacterWizard::new();
        // No class yet: default d8.
        assert_eq!(wizard.derived().hit_points, 8);

        wizard.select_class(CharacterClass::Barbarian);
        wizard.set_stat_input(Ability::Constitution, "8");
        assert_eq!(wizard.derived().hit_points, 11);

        wizard.select_class(CharacterClass::Wizard);
        wizard.set_stat_input(Ability::Constitution, "14");
        wizard.set_stat_input(Ability::Dexterity, "16");
        assert_eq!(wizard.derived(), DerivedCombatStats { hit_points: 8, armor_class: 13 });
    }

    #[test]
    fn test_can_save_requires_review_step_and_fields() {
        let mut wizard = wizard_at_review();
        assert!(wizard.can_save());

        wizard.previous();
        assert!(!wizard.can_save());
        wizard.next();

        wizard.set_name("");
        assert!(!wizard.can_save());
    }

    #[test]
    fn test_payload_shape() {
        let mut wizard = wizard_at_review();
        wizard.set_backstory("Raised in the Great Library.");
        wizard.set_stat_input(Ability::Constitution, "14");
        wizard.set_stat_input(Ability::Dexterity, "15");

        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let payload = wizard.build_payload_at(now);

        assert_eq!(payload.name, "Elara");
        assert_eq!(payload.race, "elf");
        assert_eq!(payload.character_class, "wizard");
        assert_eq!(payload.level, 1);
        assert_eq!(payload.hit_points, 8);
        assert_eq!(payload.armor_class, 12);
        assert_eq!(payload.proficiency_bonus, 2);
        assert_eq!(payload.stats.constitution, 14);
        assert_eq!(payload.background.name, "Sage");
        assert_eq!(payload.backstory.text, "Raised in the Great Library.");
        assert_eq!(payload.backstory.created_at, "2024-03-01T09:30:00.000Z");
    }

    #[test]
    fn test_begin_save_disables_control() {
        let mut wizard = wizard_at_review();
        let payload = wizard.begin_save().unwrap();
        assert_eq!(payload.name, "Elara");
        assert!(wizard.is_saving());
        assert!(!wizard.can_save());
        assert!(matches!(wizard.begin_save(), Err(SaveError::NotReady)));

        let result = wizard.finish_save(Err(SaveError::TimedOut(Duration::from_secs(15))));
        assert!(result.is_err());
        assert!(!wizard.is_saving());
        assert!(wizard.can_save());
    }

    #[test]
    fn test_summary_placeholders() {
        let wizard = CharacterWizard::new();
        let summary = wizard.summary();
        assert_eq!(summary.name, "Unnamed");
        assert_eq!(summary.race, "None");
        assert_eq!(summary.class, "None");
        assert_eq!(summary.background, "None");

        let summary = wizard_at_review().summary();
        assert_eq!(summary.race, "Elf");
        assert_eq!(summary.class, "Wizard");
        assert_eq!(summary.hit_points, 6);
    }

    #[test]
    fn test_step_metadata() {
        assert_eq!(CreationStep::Basics.number(), 1);
        assert_eq!(CreationStep::BackstoryAndReview.number(), 5);
        let percents: Vec<u8> = [
            CreationStep::Basics,
            CreationStep::Race,
            CreationStep::Class,
            CreationStep::BackgroundAndStats,
            CreationStep::BackstoryAndReview,
        ]
        .iter()
        .map(|step| step.progress_percent())
        .collect();
        assert_eq!(percents, vec![20, 40, 60, 80, 100]);
        assert_eq!(CreationStep::Basics.prev(), None);
        assert_eq!(CreationStep::BackstoryAndReview.next(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_save_can_be_retried() {
        let backend = crate::testing::MockBackend::new();
        backend.set_latency(Some(Duration::from_secs(60)));
        let mut wizard = wizard_at_review();

        let abandoned =
            tokio::time::timeout(Duration::from_secs(1), wizard.save(&backend, Duration::from_secs(120)))
                .await;
        assert!(abandoned.is_err());
        assert!(!wizard.is_saving());
        assert!(wizard.can_save());

        backend.set_latency(None);
        let character = wizard.save(&backend, Duration::from_secs(15)).await.unwrap();
        assert_eq!(character.sheet.name, "Elara");
    }

    #[test]
    fn test_save_error_notices_are_distinct() {
        let rejected = SaveError::Rejected(dnd_api::Error::Rejected("nope".to_string()));
        assert_eq!(rejected.notice(), "Failed to save character. Please try again.");
        assert_ne!(
            SaveError::TimedOut(Duration::from_secs(15)).notice(),
            rejected.notice()
        );
    }
}
