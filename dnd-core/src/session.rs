//! Authentication context shared by every view.
//!
//! A [`SessionContext`] wraps an [`AuthProvider`] and publishes the current
//! [`AuthState`] through a `watch` channel plus discrete [`AuthEvent`]s through
//! a `broadcast` channel. Views hold an `Arc<SessionContext>`; nothing here is
//! global.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 16;

/// Authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A signed-in session as handed out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Loading,
    SignedOut,
    SignedIn(Session),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::SignedIn(session) => Some(&session.user),
            _ => None,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, AuthState::SignedIn(_))
    }
}

/// Auth transitions, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(User),
    TokenRefreshed,
    SignedOut,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Auth provider error: {0}")]
    Provider(String),
}

/// Identity provider seam.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Current session, if any. `Ok(None)` means signed out.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Shared auth state.
pub struct SessionContext {
    provider: Arc<dyn AuthProvider>,
    state: watch::Sender<AuthState>,
    events: broadcast::Sender<AuthEvent>,
    /// Bumped by `sign_out`; a session check that spans a bump is stale.
    generation: AtomicU64,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionContext {
    /// New context in the `Loading` state. Call [`init`](Self::init) next.
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        let (state, _) = watch::channel(AuthState::Loading);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            provider,
            state,
            events,
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(*self.state.borrow(), AuthState::Loading)
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().is_signed_in()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// The signed-in user, or [`AuthError::NotSignedIn`] for views that
    /// should redirect to login.
    pub fn require_user(&self) -> Result<User, AuthError> {
        self.current_user().ok_or(AuthError::NotSignedIn)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn watch(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Load the initial session.
    pub async fn init(&self) -> AuthState {
        let generation = self.generation();
        let checked = self.provider.get_session().await;
        if self.generation() != generation {
            tracing::debug!("discarding session load that raced sign-out");
            return self.state();
        }
        match checked {
            Ok(Some(session)) => self.enter_signed_in(session),
            Ok(None) => self.enter_signed_out(),
            Err(error) => {
                tracing::warn!(%error, "could not load session");
                self.enter_signed_out()
            }
        }
        self.state()
    }

    /// Re-validate the session with the provider.
    pub async fn refresh(&self) -> AuthState {
        let previous = match &*self.state.borrow() {
            AuthState::SignedIn(session) => Some(session.clone()),
            _ => None,
        };

        let generation = self.generation();
        let checked = self.provider.get_session().await;
        if self.generation() != generation {
            tracing::debug!("discarding session check that raced sign-out");
            return self.state();
        }

        match checked {
            Ok(Some(session)) => match previous {
                Some(prev) if prev.user.id == session.user.id => {
                    let rotated = prev.access_token != session.access_token;
                    self.state.send_replace(AuthState::SignedIn(session));
                    if rotated {
                        tracing::debug!("access token refreshed");
                        self.emit(AuthEvent::TokenRefreshed);
                    }
                }
                _ => self.enter_signed_in(session),
            },
            Ok(None) => self.enter_signed_out(),
            Err(error) => {
                tracing::warn!(%error, "session validation failed");
                self.enter_signed_out()
            }
        }
        self.state()
    }

    /// Sign out through the provider. The context ends up signed out even
    /// if the provider call fails; the failure is still returned.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        // Checks already in flight, or started while the provider is
        // signing out, must not restore the old session.
        self.generation.fetch_add(1, Ordering::SeqCst);
        let result = self.provider.sign_out().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Err(error) = &result {
            tracing::warn!(%error, "provider sign-out failed");
        }
        let was_signed_in = self.is_signed_in();
        self.state.send_replace(AuthState::SignedOut);
        if was_signed_in {
            tracing::info!("signed out");
        }
        self.emit(AuthEvent::SignedOut);
        result
    }

    /// Periodically re-validate the session while signed in.
    ///
    /// The task stops when the returned handle is dropped.
    pub fn spawn_refresh_loop(self: &Arc<Self>, period: Duration) -> RefreshHandle {
        let ctx = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if ctx.is_signed_in() {
                    ctx.refresh().await;
                }
            }
        });
        RefreshHandle { task }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn enter_signed_in(&self, session: Session) {
        let user = session.user.clone();
        tracing::info!(user_id = %user.id, "signed in");
        self.state.send_replace(AuthState::SignedIn(session));
        self.emit(AuthEvent::SignedIn(user));
    }

    fn enter_signed_out(&self) {
        let previous = self.state.send_replace(AuthState::SignedOut);
        if previous.is_signed_in() {
            tracing::info!("session ended");
            self.emit(AuthEvent::SignedOut);
        }
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

impl dnd_api::TokenSource for SessionContext {
    fn access_token(&self) -> Option<String> {
        match &*self.state.borrow() {
            AuthState::SignedIn(session) => Some(session.access_token.clone()),
            _ => None,
        }
    }
}

/// Owns the refresh task; aborts it on drop.
#[derive(Debug)]
pub struct RefreshHandle {
    task: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
