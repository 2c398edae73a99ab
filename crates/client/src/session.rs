//! Session state: token persistence, in-memory mirror, and invalidation
//! broadcast.
//!
//! All mutation funnels through [`SessionState`], which keeps the device
//! store and the in-memory mirror in step. The *generation* counter
//! advances every time the tokens change hands (install, refresh, clear),
//! which is how concurrent requests tell whether a refresh cycle already
//! settled while they were in flight (see `NivasityClient`).

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, broadcast};

use crate::error::ApiError;
use crate::models::User;
use crate::store::{ACCESS_TOKEN_KEY, KeyValueStore, REFRESH_TOKEN_KEY, StoreError, USER_KEY};

/// An authenticated session as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Short-lived bearer token.
    pub access_token: String,
    /// Long-lived token exchanged for new access tokens.
    pub refresh_token: String,
    /// The signed-in user.
    pub user: User,
}

/// Token pair returned by the refresh endpoint. The backend may rotate the
/// refresh token; when it does not, the stored one stays valid.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenPair {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Session lifecycle events delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session became unusable (refresh failure or terminal 401) and
    /// was cleared. The user must sign in again.
    Invalidated,
    /// The user signed out voluntarily.
    LoggedOut,
}

/// In-memory mirror of the stored tokens.
#[derive(Debug, Clone)]
struct TokenCache {
    access: String,
    refresh: Option<String>,
}

/// Outcome bookkeeping for the refresh gate. Holding the [`Mutex`] around
/// this struct is what serializes refresh attempts.
#[derive(Debug, Default)]
pub(crate) struct RefreshGate {
    /// Whether the most recently settled cycle failed.
    pub last_failed: bool,
}

/// Shared session state behind the client.
pub(crate) struct SessionState {
    store: Arc<dyn KeyValueStore>,
    tokens: RwLock<Option<TokenCache>>,
    generation: AtomicU64,
    pub(crate) gate: Mutex<RefreshGate>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionState {
    /// Create session state, loading any persisted tokens from the store.
    pub(crate) fn new(store: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let access = store.get(ACCESS_TOKEN_KEY)?;
        let refresh = store.get(REFRESH_TOKEN_KEY)?;
        let cache = access.map(|access| TokenCache {
            access,
            refresh: refresh.clone(),
        });
        let (events, _) = broadcast::channel(16);

        Ok(Self {
            store,
            tokens: RwLock::new(cache),
            generation: AtomicU64::new(0),
            gate: Mutex::new(RefreshGate::default()),
            events,
        })
    }

    /// Subscribe to session lifecycle events.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Current access token plus the generation it belongs to.
    pub(crate) async fn snapshot(&self) -> (Option<String>, u64) {
        let generation = self.generation.load(Ordering::Acquire);
        let token = self
            .tokens
            .read()
            .await
            .as_ref()
            .map(|cache| cache.access.clone());
        (token, generation)
    }

    /// Current access token, if any.
    pub(crate) async fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|cache| cache.access.clone())
    }

    /// Current refresh token, if any.
    pub(crate) async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.as_ref()?.refresh.clone()
    }

    /// The current generation counter value.
    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Advance the generation counter. Called whenever a refresh cycle
    /// settles or the session is replaced.
    pub(crate) fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Persist a freshly authenticated session (login, OTP verification,
    /// Google sign-in).
    pub(crate) async fn install(&self, session: &Session) -> Result<(), StoreError> {
        self.store.set(ACCESS_TOKEN_KEY, &session.access_token)?;
        self.store.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        let user_json = serde_json::to_string(&session.user)?;
        self.store.set(USER_KEY, &user_json)?;

        *self.tokens.write().await = Some(TokenCache {
            access: session.access_token.clone(),
            refresh: Some(session.refresh_token.clone()),
        });
        // A fresh sign-in starts a clean refresh cycle
        self.gate.lock().await.last_failed = false;
        self.bump_generation();
        Ok(())
    }

    /// Apply the result of a successful silent refresh. Keeps the stored
    /// refresh token when the backend did not rotate it.
    pub(crate) async fn apply_refresh(&self, pair: &TokenPair) -> Result<(), StoreError> {
        self.store.set(ACCESS_TOKEN_KEY, &pair.access_token)?;
        if let Some(rotated) = &pair.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, rotated)?;
        }

        let mut tokens = self.tokens.write().await;
        let refresh = match (&pair.refresh_token, tokens.as_ref()) {
            (Some(rotated), _) => Some(rotated.clone()),
            (None, Some(cache)) => cache.refresh.clone(),
            (None, None) => None,
        };
        *tokens = Some(TokenCache {
            access: pair.access_token.clone(),
            refresh,
        });
        Ok(())
    }

    /// Write a single value through to the device store.
    pub(crate) fn store_value(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.store.set(key, value)
    }

    /// The persisted user record, if a session exists.
    pub(crate) fn stored_user(&self) -> Result<Option<User>, ApiError> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Remove every persisted session key and drop the in-memory mirror.
    /// Returns whether a live session was actually cleared.
    async fn clear(&self) -> Result<bool, StoreError> {
        let existed = self.tokens.write().await.take().is_some();
        self.store.remove(ACCESS_TOKEN_KEY)?;
        self.store.remove(REFRESH_TOKEN_KEY)?;
        self.store.remove(USER_KEY)?;
        Ok(existed)
    }

    /// Forced logout: clear the session and notify subscribers. The event
    /// fires at most once per cycle because only the call that actually
    /// cleared a live session broadcasts.
    pub(crate) async fn invalidate(&self) {
        match self.clear().await {
            Ok(true) => {
                let _ = self.events.send(SessionEvent::Invalidated);
            }
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(error = %err, "failed to clear session storage");
                let _ = self.events.send(SessionEvent::Invalidated);
            }
        }
    }

    /// Voluntary logout: clear the session and notify subscribers.
    pub(crate) async fn logout_local(&self) -> Result<(), StoreError> {
        if self.clear().await? {
            let _ = self.events.send(SessionEvent::LoggedOut);
        }
        Ok(())
    }
}
