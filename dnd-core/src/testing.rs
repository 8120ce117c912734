//! Test doubles for the backend and the identity provider.
//!
//! - `MockBackend` implements every store trait in memory, with scripted
//!   DM replies and switchable failure and latency.
//! - `MockAuthProvider` hands out whatever session the test sets.

use crate::session::{AuthError, AuthProvider, Session, User};
use crate::store::{CampaignStore, CharacterStore, ChatRelay};
use async_trait::async_trait;
use dnd_api::{
    Campaign, CampaignCreate, CampaignDetail, Character, CharacterUpdate, ChatReply, Error,
    NewCharacter,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const CREATED_AT: &str = "2024-01-01T00:00:00.000Z";

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MockBackend {
    characters: Mutex<Vec<Character>>,
    campaigns: Mutex<Vec<Campaign>>,
    details: Mutex<Vec<CampaignDetail>>,
    /// Scripted DM replies, returned in order.
    replies: Mutex<VecDeque<String>>,
    /// `(campaign_id, message)` for every relayed chat message.
    relayed: Mutex<Vec<(String, String)>>,
    failure: Mutex<Option<String>>,
    latency: Mutex<Option<Duration>>,
    next_id: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend whose DM answers with `replies` in order.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        backend
            .replies
            .lock()
            .unwrap()
            .extend(replies.into_iter().map(Into::into));
        backend
    }

    pub fn with_details(self, details: Vec<CampaignDetail>) -> Self {
        *self.details.lock().unwrap() = details;
        self
    }

    /// Make every call fail with `Error::Rejected(message)`, or succeed
    /// again with `None`.
    pub fn set_failure(&self, message: Option<&str>) {
        *self.failure.lock().unwrap() = message.map(str::to_string);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn characters(&self) -> Vec<Character> {
        self.characters.lock().unwrap().clone()
    }

    pub fn campaigns(&self) -> Vec<Campaign> {
        self.campaigns.lock().unwrap().clone()
    }

    pub fn relayed(&self) -> Vec<(String, String)> {
        self.relayed.lock().unwrap().clone()
    }

    async fn gate(&self) -> Result<(), Error> {
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let failure = self.failure.lock().unwrap().clone();
        match failure {
            Some(message) => Err(Error::Rejected(message)),
            None => Ok(()),
        }
    }

    fn mint_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

#[async_trait]
impl CharacterStore for MockBackend {
    async fn list_characters(&self) -> Result<Vec<Character>, Error> {
        self.gate().await?;
        Ok(self.characters())
    }

    async fn create_character(&self, character: &NewCharacter) -> Result<Character, Error> {
        self.gate().await?;
        let created = Character {
            id: self.mint_id("char"),
            sheet: character.clone(),
            owner_id: Some("test-user".to_string()),
            created_at: CREATED_AT.to_string(),
            weapon: None,
            items: None,
            mana: None,
            status: None,
        };
        self.characters.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_character(
        &self,
        id: &str,
        update: &CharacterUpdate,
    ) -> Result<Character, Error> {
        self.gate().await?;
        let mut characters = self.characters.lock().unwrap();
        let character = characters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::Rejected(format!("Character {id} not found")))?;
        apply_update(&mut character.sheet, update);
        Ok(character.clone())
    }

    async fn delete_character(&self, id: &str) -> Result<(), Error> {
        self.gate().await?;
        self.characters.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}

#[async_trait]
impl CampaignStore for MockBackend {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        self.gate().await?;
        Ok(self.campaigns())
    }

    async fn create_campaign(&self, campaign: &CampaignCreate) -> Result<Campaign, Error> {
        self.gate().await?;
        let created = Campaign {
            id: self.mint_id("camp"),
            campaign_title: campaign.campaign_title.clone(),
            filter_title: campaign.filter_title.clone(),
            initial_message: campaign.initial_message.clone(),
            chat_history: campaign.chat_history.clone(),
            game_state_history: campaign.game_state_history.clone(),
            owner_id: "test-user".to_string(),
            created_at: CREATED_AT.to_string(),
        };
        self.campaigns.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn delete_campaign(&self, id: &str) -> Result<(), Error> {
        self.gate().await?;
        self.campaigns.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn campaign_details(&self) -> Result<Vec<CampaignDetail>, Error> {
        self.gate().await?;
        Ok(self.details.lock().unwrap().clone())
    }
}

#[async_trait]
impl ChatRelay for MockBackend {
    async fn relay(&self, campaign_id: &str, message: &str) -> Result<ChatReply, Error> {
        self.relayed
            .lock()
            .unwrap()
            .push((campaign_id.to_string(), message.to_string()));
        self.gate().await?;
        let response = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "The DM has no more scripted responses.".to_string());
        Ok(ChatReply {
            response,
            game_state: None,
        })
    }
}

/// Copy every field the update carries onto the stored sheet.
fn apply_update(sheet: &mut NewCharacter, update: &CharacterUpdate) {
    let update = update.clone();
    if let Some(name) = update.name {
        sheet.name = name;
    }
    if let Some(race) = update.race {
        sheet.race = race;
    }
    if let Some(class) = update.character_class {
        sheet.character_class = class;
    }
    if let Some(level) = update.level {
        sheet.level = level;
    }
    if let Some(hit_points) = update.hit_points {
        sheet.hit_points = hit_points;
    }
    if let Some(armor_class) = update.armor_class {
        sheet.armor_class = armor_class;
    }
    if let Some(bonus) = update.proficiency_bonus {
        sheet.proficiency_bonus = bonus;
    }
    if let Some(stats) = update.stats {
        sheet.stats = stats;
    }
    if let Some(background) = update.background {
        sheet.background = background;
    }
    if let Some(backstory) = update.backstory {
        sheet.backstory = backstory;
    }
}

/// Identity provider returning whatever session the test last set.
#[derive(Debug, Default)]
pub struct MockAuthProvider {
    session: Mutex<Option<Session>>,
    latency: Mutex<Option<Duration>>,
    failing: AtomicBool,
    get_session_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
}

impl MockAuthProvider {
    /// A provider with no session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(session: Session) -> Self {
        let provider = Self::new();
        provider.set_session(Some(session));
        provider
    }

    pub fn set_session(&self, session: Option<Session>) {
        *self.session.lock().unwrap() = session;
    }

    /// Delay `get_session` by `latency`. The session is read before the
    /// delay, so a slow call returns what was current when it started.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get_session_calls(&self) -> usize {
        self.get_session_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), AuthError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AuthError::Provider("identity provider unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        self.get_session_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let session = self.session.lock().unwrap().clone();
        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.set_session(None);
        Ok(())
    }
}

/// A session for `user_id` carrying `token`.
pub fn sample_session(user_id: &str, token: &str) -> Session {
    Session {
        access_token: token.to_string(),
        refresh_token: Some(format!("refresh-{token}")),
        expires_at: None,
        user: User {
            id: user_id.to_string(),
            email: Some(format!("{user_id}@example.com")),
        },
    }
}

/// A catalog entry for campaign tests.
pub fn sample_detail(title: &str) -> CampaignDetail {
    CampaignDetail {
        title: title.to_string(),
        filter_title: title.to_lowercase().replace(' ', "-"),
        initial_description: format!("You arrive at {title}."),
        summary: format!("An adventure called {title}."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_backend_failure_switch() {
        let backend = MockBackend::new();
        backend.set_failure(Some("boom"));
        let err = backend.list_characters().await.unwrap_err();
        assert!(matches!(err, Error::Rejected(ref m) if m == "boom"));

        backend.set_failure(None);
        assert!(backend.list_characters().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replies_in_order_then_fallback() {
        let backend = MockBackend::with_replies(["one", "two"]);
        assert_eq!(backend.relay("c", "a").await.unwrap().response, "one");
        assert_eq!(backend.relay("c", "b").await.unwrap().response, "two");
        assert_eq!(
            backend.relay("c", "c").await.unwrap().response,
            "The DM has no more scripted responses."
        );
        assert_eq!(backend.relayed().len(), 3);
    }

    #[tokio::test]
    async fn test_update_applies_every_field() {
        let backend = MockBackend::new();
        let sheet = crate::wizard::CharacterWizard::new().build_payload();
        let stored = backend.create_character(&sheet).await.unwrap();

        let update = CharacterUpdate {
            name: Some("Renamed".to_string()),
            race: Some("tiefling".to_string()),
            character_class: Some("warlock".to_string()),
            level: Some(3),
            hit_points: Some(17),
            armor_class: Some(14),
            proficiency_bonus: Some(3),
            stats: Some(dnd_api::CharacterStats {
                strength: 8,
                dexterity: 14,
                constitution: 12,
                intelligence: 10,
                wisdom: 10,
                charisma: 17,
            }),
            background: Some(crate::catalog::Background::payload_for("charlatan")),
            backstory: Some(dnd_api::CharacterBackstory {
                text: "Made a pact.".to_string(),
                created_at: "2024-06-01T08:00:00.000Z".to_string(),
            }),
        };
        let updated = backend.update_character(&stored.id, &update).await.unwrap();

        assert_eq!(updated.sheet.race, "tiefling");
        assert_eq!(updated.sheet.character_class, "warlock");
        assert_eq!(updated.sheet.armor_class, 14);
        assert_eq!(updated.sheet.proficiency_bonus, 3);
        assert_eq!(updated.sheet.stats.charisma, 17);
        assert_eq!(updated.sheet.background.name, "Charlatan");
        assert_eq!(updated.sheet.backstory.text, "Made a pact.");
        assert_eq!(backend.characters()[0], updated);
    }

    #[tokio::test]
    async fn test_empty_update_changes_nothing() {
        let backend = MockBackend::new();
        let sheet = crate::wizard::CharacterWizard::new().build_payload();
        let stored = backend.create_character(&sheet).await.unwrap();
        let updated = backend
            .update_character(&stored.id, &CharacterUpdate::default())
            .await
            .unwrap();
        assert_eq!(updated, stored);
    }

    #[test]
    fn test_sample_detail() {
        let detail = sample_detail("Lost Mine");
        assert_eq!(detail.filter_title, "lost-mine");
    }
}
