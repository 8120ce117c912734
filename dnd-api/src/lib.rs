//! Minimal client for the D&D character and campaign backend.
//!
//! This crate provides a focused client for the backend's REST API with:
//! - Character CRUD
//! - Campaign CRUD and the campaign catalog
//! - The Dungeon Master chat relay
//!
//! Every endpoint answers with the same envelope
//! (`{"success": bool, "data": ..., "error": ..., "message": ...}`); the
//! client unwraps it and turns `success: false` into [`Error::Rejected`].

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Response did not include any data")]
    MissingData,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(e.to_string())
        }
    }
}

/// Supplies the bearer token for each request.
///
/// Implemented by whatever owns the signed-in session, so the client always
/// sees the latest token after a refresh.
pub trait TokenSource: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// A fixed token, handy for scripts and tests.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl TokenSource for StaticToken {
    fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Backend API client.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    tokens: Option<Arc<dyn TokenSource>>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("authenticated", &self.tokens.is_some())
            .finish()
    }
}

impl Client {
    /// Create a new client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            tokens: None,
        })
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach the source of bearer tokens.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------
    // Characters
    // ------------------------------------------------------------------

    /// List the signed-in user's characters.
    pub async fn list_characters(&self) -> Result<Vec<Character>, Error> {
        self.fetch(Method::GET, "/characters").await
    }

    pub async fn get_character(&self, id: &str) -> Result<Character, Error> {
        self.fetch(Method::GET, &format!("/characters/{id}")).await
    }

    /// Create a character and return the stored record.
    pub async fn create_character(&self, character: &NewCharacter) -> Result<Character, Error> {
        self.submit(Method::POST, "/characters", character).await
    }

    /// Apply a partial update to a character.
    pub async fn update_character(
        &self,
        id: &str,
        update: &CharacterUpdate,
    ) -> Result<Character, Error> {
        self.submit(Method::PUT, &format!("/characters/{id}"), update)
            .await
    }

    pub async fn delete_character(&self, id: &str) -> Result<(), Error> {
        self.remove(&format!("/characters/{id}")).await
    }

    // ------------------------------------------------------------------
    // Campaigns
    // ------------------------------------------------------------------

    pub async fn list_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        self.fetch(Method::GET, "/campaigns").await
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Campaign, Error> {
        self.fetch(Method::GET, &format!("/campaigns/{id}")).await
    }

    pub async fn create_campaign(&self, campaign: &CampaignCreate) -> Result<Campaign, Error> {
        self.submit(Method::POST, "/campaigns", campaign).await
    }

    pub async fn update_campaign(
        &self,
        id: &str,
        update: &CampaignUpdate,
    ) -> Result<Campaign, Error> {
        self.submit(Method::PUT, &format!("/campaigns/{id}"), update)
            .await
    }

    pub async fn delete_campaign(&self, id: &str) -> Result<(), Error> {
        self.remove(&format!("/campaigns/{id}")).await
    }

    /// The catalog of campaigns a user can start.
    pub async fn campaign_details(&self) -> Result<Vec<CampaignDetail>, Error> {
        let details: CampaignDetailsResponse =
            self.fetch(Method::GET, "/campaigns/details").await?;
        Ok(details.campaigns)
    }

    // ------------------------------------------------------------------
    // Chat relay
    // ------------------------------------------------------------------

    /// Relay a player's message to the Dungeon Master for one campaign.
    pub async fn send_chat(&self, campaign_id: &str, message: &str) -> Result<ChatReply, Error> {
        let request = ChatRequest {
            message: message.to_string(),
        };
        self.submit(
            Method::POST,
            &format!("/campaigns/{campaign_id}/chat"),
            &request,
        )
        .await
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    async fn fetch<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, Error> {
        let envelope = self.execute(self.request(method, path), path).await?;
        envelope.data.ok_or(Error::MissingData)
    }

    async fn submit<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = self
            .execute(self.request(method, path).json(body), path)
            .await?;
        envelope.data.ok_or(Error::MissingData)
    }

    async fn remove(&self, path: &str) -> Result<(), Error> {
        let _: Envelope<serde_json::Value> =
            self.execute(self.request(Method::DELETE, path), path).await?;
        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .timeout(self.timeout)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<Envelope<T>, Error> {
        let headers = self.build_headers()?;
        tracing::debug!(endpoint = path, "sending backend request");

        let response = request.headers(headers).send().await.map_err(|e| {
            let error = Error::from(e);
            tracing::warn!(endpoint = path, %error, "backend request failed");
            error
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(endpoint = path, status = status.as_u16(), "backend returned an error status");
            return Err(Error::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))?;

        if !envelope.success {
            let reason = envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| "request failed".to_string());
            tracing::warn!(endpoint = path, %reason, "backend rejected request");
            return Err(Error::Rejected(reason));
        }

        Ok(envelope)
    }

    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.as_ref().and_then(|t| t.access_token()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| Error::Config(format!("Invalid access token: {e}")))?,
            );
        }
        Ok(headers)
    }
}

// ============================================================================
// Character types
// ============================================================================

/// The six ability scores as stored on a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStats {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBackground {
    pub id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBackstory {
    pub text: String,
    /// ISO 8601 timestamp.
    pub created_at: String,
}

/// Payload for creating a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCharacter {
    pub name: String,
    pub race: String,
    pub character_class: String,
    pub level: i32,
    pub hit_points: i32,
    pub armor_class: i32,
    pub proficiency_bonus: i32,
    pub stats: CharacterStats,
    pub background: CharacterBackground,
    pub backstory: CharacterBackstory,
}

/// A character record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    #[serde(flatten)]
    pub sheet: NewCharacter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mana: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hit_points: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub armor_class: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proficiency_bonus: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CharacterStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<CharacterBackground>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backstory: Option<CharacterBackstory>,
}

// ============================================================================
// Campaign types
// ============================================================================

/// Who wrote a chat history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Snapshot of the party at one point of a campaign.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    #[serde(default)]
    pub characters: Vec<Character>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub campaign_title: String,
    pub filter_title: String,
    pub initial_message: String,
    #[serde(default)]
    pub chat_history: Vec<ChatEntry>,
    #[serde(default)]
    pub game_state_history: Vec<GameState>,
    pub owner_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignCreate {
    pub campaign_title: String,
    pub filter_title: String,
    pub initial_message: String,
    #[serde(default)]
    pub chat_history: Vec<ChatEntry>,
    #[serde(default)]
    pub game_state_history: Vec<GameState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_history: Option<Vec<ChatEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_state_history: Option<Vec<GameState>>,
}

/// An entry of the campaign catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetail {
    pub title: String,
    pub filter_title: String,
    pub initial_description: String,
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CampaignDetailsResponse {
    campaigns: Vec<CampaignDetail>,
}

// ============================================================================
// Chat types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    message: String,
}

/// The Dungeon Master's answer to a relayed message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default)]
    pub game_state: Option<GameState>,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
    message: Option<String>,
}
