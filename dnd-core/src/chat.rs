//! Campaign chat thread between the player and the Dungeon Master.

use crate::inflight::InFlight;
use crate::store::ChatRelay;
use chrono::{DateTime, Utc};
use dnd_api::{Campaign, ChatRole, GameState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opening line when a campaign has no history or initial message.
pub const WELCOME_MESSAGE: &str = "Welcome, brave adventurer! You find yourself at the entrance of a mysterious dungeon. Ancient runes glow faintly on the stone archway, and you can hear distant echoes from within. What do you choose to do?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Player,
    DungeonMaster,
}

impl From<ChatRole> for Speaker {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => Speaker::Player,
            ChatRole::Assistant => Speaker::DungeonMaster,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub speaker: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Failed to reach the Dungeon Master: {0}")]
    Relay(#[from] dnd_api::Error),
}

/// Ordered conversation for one campaign.
#[derive(Debug, Clone)]
pub struct ChatThread {
    campaign_id: String,
    messages: Vec<ChatMessage>,
    awaiting_reply: bool,
    game_state: Option<GameState>,
}

impl ChatThread {
    /// Empty thread opened by the DM welcome message.
    pub fn new(campaign_id: impl Into<String>) -> Self {
        Self {
            campaign_id: campaign_id.into(),
            messages: vec![ChatMessage::new(Speaker::DungeonMaster, WELCOME_MESSAGE)],
            awaiting_reply: false,
            game_state: None,
        }
    }

    /// Resume a stored campaign.
    pub fn from_campaign(campaign: &Campaign) -> Self {
        let mut thread = Self::new(campaign.id.clone());
        if !campaign.chat_history.is_empty() {
            thread.messages = campaign
                .chat_history
                .iter()
                .map(|entry| {
                    let mut message = ChatMessage::new(entry.role.into(), entry.content.clone());
                    if let Some(ts) = entry
                        .timestamp
                        .as_deref()
                        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                    {
                        message.timestamp = ts.with_timezone(&Utc);
                    }
                    message
                })
                .collect();
        } else if !campaign.initial_message.trim().is_empty() {
            thread.messages = vec![ChatMessage::new(
                Speaker::DungeonMaster,
                campaign.initial_message.clone(),
            )];
        }
        thread.game_state = campaign.game_state_history.last().cloned();
        thread
    }

    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Latest game state reported by the DM, if any.
    pub fn game_state(&self) -> Option<&GameState> {
        self.game_state.as_ref()
    }

    /// Send player input and append the DM's reply.
    ///
    /// Blank input, or input while a reply is pending, does nothing and
    /// returns `Ok(None)`. On failure the player's message stays in the
    /// thread.
    pub async fn send<R>(&mut self, relay: &R, input: &str) -> Result<Option<&ChatMessage>, ChatError>
    where
        R: ChatRelay + ?Sized,
    {
        let input = input.trim();
        if input.is_empty() || self.awaiting_reply {
            return Ok(None);
        }

        self.messages.push(ChatMessage::new(Speaker::Player, input));

        let result = {
            let _awaiting = InFlight::start(&mut self.awaiting_reply);
            relay.relay(&self.campaign_id, input).await
        };

        match result {
            Ok(reply) => {
                if reply.game_state.is_some() {
                    self.game_state = reply.game_state;
                }
                self.messages
                    .push(ChatMessage::new(Speaker::DungeonMaster, reply.response));
                Ok(self.messages.last())
            }
            Err(error) => {
                tracing::warn!(campaign_id = %self.campaign_id, %error, "chat relay failed");
                Err(ChatError::Relay(error))
            }
        }
    }
}
