//! Seams between the client core and the backend.
//!
//! The wizard, chat thread and campaign helpers talk to these traits rather
//! than to [`dnd_api::Client`] directly, so tests can swap in the doubles
//! from [`crate::testing`].

use async_trait::async_trait;
use dnd_api::{
    Campaign, CampaignCreate, CampaignDetail, Character, CharacterUpdate, ChatReply, Client,
    Error, NewCharacter,
};

/// Character persistence.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    async fn list_characters(&self) -> Result<Vec<Character>, Error>;
    async fn create_character(&self, character: &NewCharacter) -> Result<Character, Error>;
    async fn update_character(
        &self,
        id: &str,
        update: &CharacterUpdate,
    ) -> Result<Character, Error>;
    async fn delete_character(&self, id: &str) -> Result<(), Error>;
}

/// Campaign persistence and the catalog of startable campaigns.
#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, Error>;
    async fn create_campaign(&self, campaign: &CampaignCreate) -> Result<Campaign, Error>;
    async fn delete_campaign(&self, id: &str) -> Result<(), Error>;
    async fn campaign_details(&self) -> Result<Vec<CampaignDetail>, Error>;
}

/// Relays player input to the Dungeon Master for a campaign.
#[async_trait]
pub trait ChatRelay: Send + Sync {
    async fn relay(&self, campaign_id: &str, message: &str) -> Result<ChatReply, Error>;
}

#[async_trait]
impl CharacterStore for Client {
    async fn list_characters(&self) -> Result<Vec<Character>, Error> {
        Client::list_characters(self).await
    }

    async fn create_character(&self, character: &NewCharacter) -> Result<Character, Error> {
        Client::create_character(self, character).await
    }

    async fn update_character(
        &self,
        id: &str,
        update: &CharacterUpdate,
    ) -> Result<Character, Error> {
        Client::update_character(self, id, update).await
    }

    async fn delete_character(&self, id: &str) -> Result<(), Error> {
        Client::delete_character(self, id).await
    }
}

#[async_trait]
impl CampaignStore for Client {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        Client::list_campaigns(self).await
    }

    async fn create_campaign(&self, campaign: &CampaignCreate) -> Result<Campaign, Error> {
        Client::create_campaign(self, campaign).await
    }

    async fn delete_campaign(&self, id: &str) -> Result<(), Error> {
        Client::delete_campaign(self, id).await
    }

    async fn campaign_details(&self) -> Result<Vec<CampaignDetail>, Error> {
        Client::campaign_details(self).await
    }
}

#[async_trait]
impl ChatRelay for Client {
    async fn relay(&self, campaign_id: &str, message: &str) -> Result<ChatReply, Error> {
        self.send_chat(campaign_id, message).await
    }
}
