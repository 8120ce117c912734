//! Editing a stored character.
//!
//! The edit form covers name, level, hit points, armor class and backstory.
//! Nothing is recomputed from class or scores here; whatever the player
//! types is sent back, after the same numeric-field normalization the
//! wizard uses.

use crate::abilities::{parse_int_input, parse_level_input};
use crate::derived::BASE_ARMOR_CLASS;
use crate::store::CharacterStore;
use chrono::{DateTime, SecondsFormat, Utc};
use dnd_api::{Character, CharacterBackstory, CharacterUpdate};
use thiserror::Error;

/// Hit points substituted when the field does not hold a number.
pub const DEFAULT_EDIT_HIT_POINTS: i32 = 1;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Failed to update character: {0}")]
    Rejected(#[source] dnd_api::Error),
}

impl EditError {
    pub fn notice(&self) -> &'static str {
        match self {
            EditError::Rejected(_) => "Failed to update character. Please try again.",
        }
    }
}

/// Edit form seeded from a stored character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterEdit {
    id: String,
    pub name: String,
    pub level: i32,
    pub hit_points: i32,
    pub armor_class: i32,
    pub backstory: String,
}

impl CharacterEdit {
    pub fn from_character(character: &Character) -> Self {
        Self {
            id: character.id.clone(),
            name: character.sheet.name.clone(),
            level: character.sheet.level,
            hit_points: character.sheet.hit_points,
            armor_class: character.sheet.armor_class,
            backstory: character.sheet.backstory.text.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_level_input(&mut self, text: &str) {
        self.level = parse_level_input(text);
    }

    pub fn set_hit_points_input(&mut self, text: &str) {
        self.hit_points = parse_int_input(text, DEFAULT_EDIT_HIT_POINTS);
    }

    pub fn set_armor_class_input(&mut self, text: &str) {
        self.armor_class = parse_int_input(text, BASE_ARMOR_CLASS);
    }

    pub fn set_backstory(&mut self, backstory: impl Into<String>) {
        self.backstory = backstory.into();
    }

    /// Partial update for the edited fields. An empty backstory is left out
    /// so the stored one is kept.
    pub fn to_update(&self) -> CharacterUpdate {
        self.to_update_at(Utc::now())
    }

    pub fn to_update_at(&self, now: DateTime<Utc>) -> CharacterUpdate {
        let backstory = (!self.backstory.is_empty()).then(|| CharacterBackstory {
            text: self.backstory.clone(),
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        CharacterUpdate {
            name: Some(self.name.clone()),
            level: Some(self.level),
            hit_points: Some(self.hit_points),
            armor_class: Some(self.armor_class),
            backstory,
            ..CharacterUpdate::default()
        }
    }

    /// Send the edit and return the stored character.
    pub async fn save<S>(&self, store: &S) -> Result<Character, EditError>
    where
        S: CharacterStore + ?Sized,
    {
        match store.update_character(&self.id, &self.to_update()).await {
            Ok(character) => {
                tracing::info!(id = %character.id, "character updated");
                Ok(character)
            }
            Err(error) => {
                tracing::warn!(id = %self.id, %error, "character update failed");
                Err(EditError::Rejected(error))
            }
        }
    }
}
