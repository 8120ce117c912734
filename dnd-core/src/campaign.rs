//! Starting and removing campaigns.

use crate::store::CampaignStore;
use chrono::{SecondsFormat, Utc};
use dnd_api::{Campaign, CampaignCreate, CampaignDetail, Character, ChatEntry, ChatRole, GameState};
use thiserror::Error;

pub const DELETED_NOTICE: &str = "Campaign deleted successfully!";

#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("Failed to create campaign: {0}")]
    Create(#[source] dnd_api::Error),

    #[error("Failed to delete campaign: {0}")]
    Delete(#[source] dnd_api::Error),
}

impl CampaignError {
    pub fn notice(&self) -> &'static str {
        match self {
            CampaignError::Create(_) => "Failed to create campaign. Please try again.",
            CampaignError::Delete(_) => "Failed to delete campaign. Please try again.",
        }
    }
}

/// Creation payload for a catalog entry and the party the player picked.
///
/// The party becomes the first game-state snapshot; with no party the
/// history starts empty.
pub fn campaign_from_detail(detail: &CampaignDetail, characters: Vec<Character>) -> CampaignCreate {
    let game_state_history = if characters.is_empty() {
        Vec::new()
    } else {
        vec![GameState { characters }]
    };

    CampaignCreate {
        campaign_title: detail.title.clone(),
        filter_title: detail.filter_title.clone(),
        initial_message: detail.initial_description.clone(),
        chat_history: Vec::new(),
        game_state_history,
    }
}

/// Put the initial message into an empty chat history as the DM's opening
/// line.
pub fn seed_chat_history(create: &mut CampaignCreate) {
    if !create.chat_history.is_empty() || create.initial_message.trim().is_empty() {
        return;
    }
    create.chat_history.push(ChatEntry {
        role: ChatRole::Assistant,
        content: create.initial_message.clone(),
        timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    });
}

pub fn created_notice(campaign_title: &str, party_size: usize) -> String {
    format!("Campaign \"{campaign_title}\" created successfully with {party_size} character(s)!")
}

/// Create a campaign from a catalog entry with the selected party.
pub async fn start_campaign<S>(
    store: &S,
    detail: &CampaignDetail,
    characters: Vec<Character>,
) -> Result<Campaign, CampaignError>
where
    S: CampaignStore + ?Sized,
{
    let party_size = characters.len();
    let mut create = campaign_from_detail(detail, characters);
    seed_chat_history(&mut create);

    match store.create_campaign(&create).await {
        Ok(campaign) => {
            tracing::info!(id = %campaign.id, title = %campaign.campaign_title, party_size, "campaign created");
            Ok(campaign)
        }
        Err(error) => {
            tracing::warn!(%error, title = %detail.title, "campaign creation failed");
            Err(CampaignError::Create(error))
        }
    }
}

pub async fn remove_campaign<S>(store: &S, id: &str) -> Result<(), CampaignError>
where
    S: CampaignStore + ?Sized,
{
    store.delete_campaign(id).await.map_err(|error| {
        tracing::warn!(%error, id, "campaign deletion failed");
        CampaignError::Delete(error)
    })?;
    tracing::info!(id, "campaign deleted");
    Ok(())
}
