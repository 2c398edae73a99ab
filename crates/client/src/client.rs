//! The session-aware API client.
//!
//! Wraps `reqwest::Client` and keeps the access token fresh transparently
//! to callers:
//!
//! - every authenticated request carries `Authorization: Bearer <token>`
//!   when a token is stored;
//! - a 401 on an authenticated request triggers a silent refresh and a
//!   single retry of the original request;
//! - concurrent 401s share one refresh call instead of issuing N redundant
//!   ones;
//! - when refresh is impossible or fails, the persisted session is cleared
//!   and a [`SessionEvent::Invalidated`] is broadcast to subscribers.
//!
//! There is no retry beyond the single refresh-and-retry: no backoff, no
//! circuit breaking, no request cancellation.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::envelope::{self, Envelope};
use crate::error::ApiError;
use crate::models::User;
use crate::session::{SessionEvent, SessionState};
use crate::store::KeyValueStore;
use crate::{api, session};

const USER_AGENT: &str = concat!("nivasity-client/", env!("CARGO_PKG_VERSION"));

/// Session-aware client for the Nivasity REST backend.
///
/// Cloning is cheap; all clones share the same HTTP pool, session state,
/// and event channel.
#[derive(Clone)]
pub struct NivasityClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ClientConfig,
    pub(crate) session: SessionState,
}

/// Whether a request participates in bearer authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    /// Attach the stored token and refresh on 401.
    Required,
    /// Never attach a token, never refresh. Used for all `/auth/*` calls.
    Skip,
}

/// A backend request before dispatch.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    body: Option<serde_json::Value>,
    auth: Auth,
    idempotency_key: Option<String>,
}

impl ApiRequest {
    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
            auth: Auth::Required,
            idempotency_key: None,
        }
    }

    pub(crate) fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
            auth: Auth::Required,
            idempotency_key: None,
        }
    }

    pub(crate) fn put(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.into(),
            body: Some(body),
            auth: Auth::Required,
            idempotency_key: None,
        }
    }

    /// Mark this request as not participating in authentication.
    pub(crate) fn skip_auth(mut self) -> Self {
        self.auth = Auth::Skip;
        self
    }

    /// Attach an idempotency key (payment initialization).
    pub(crate) fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

impl NivasityClient {
    /// Create a client with the given configuration and token store.
    ///
    /// Any session persisted in the store is picked up immediately, so an
    /// app restart keeps the user signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the store
    /// cannot be read.
    pub fn new(config: ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()?;
        let session = SessionState::new(store)?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                session,
            }),
        })
    }

    /// Subscribe to session lifecycle events ([`SessionEvent::Invalidated`]
    /// on forced logout, [`SessionEvent::LoggedOut`] on voluntary logout).
    ///
    /// Dropping the receiver unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.session.subscribe()
    }

    /// Whether a session is currently stored.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.session.access_token().await.is_some()
    }

    /// The persisted user record, if a session exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored record cannot be read or parsed.
    pub fn current_user(&self) -> Result<Option<User>, ApiError> {
        self.inner.session.stored_user()
    }

    // =========================================================================
    // Request pipeline
    // =========================================================================

    /// Execute a data-carrying request.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(&request).await?;
        Self::decode(response).await
    }

    /// Execute a message-only request, returning the envelope message.
    pub(crate) async fn execute_ack(&self, request: ApiRequest) -> Result<String, ApiError> {
        let response = self.dispatch(&request).await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: envelope::error_message(&body),
            });
        }
        let parsed: Envelope<serde_json::Value> = serde_json::from_str(&body)?;
        parsed.into_ack(status.as_u16())
    }

    /// Send a request, transparently refreshing the access token on 401.
    ///
    /// The original request is retried at most once; the refresh endpoint
    /// itself never passes through here (see [`api::auth::refresh`]).
    async fn dispatch(&self, request: &ApiRequest) -> Result<reqwest::Response, ApiError> {
        let (token, seen_generation) = match request.auth {
            Auth::Skip => (None, 0),
            Auth::Required => self.inner.session.snapshot().await,
        };

        let response = self.send_once(request, token.as_deref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED && request.auth == Auth::Required {
            let fresh_token = self.refresh_session(seen_generation).await?;
            let retried = self.send_once(request, Some(&fresh_token)).await?;
            if retried.status() == StatusCode::UNAUTHORIZED {
                // Already retried once; the backend keeps rejecting this
                // session, so it is unusable.
                self.inner.session.invalidate().await;
                return Err(ApiError::SessionExpired);
            }
            return Ok(retried);
        }

        Ok(response)
    }

    /// Build and send one HTTP request. No retry logic lives here.
    async fn send_once(
        &self,
        request: &ApiRequest,
        bearer: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.inner.config.endpoint(&request.path);
        let mut builder = self.inner.http.request(request.method.clone(), url);

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(key) = &request.idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }

        Ok(builder.send().await?)
    }

    /// Obtain a usable access token after a 401, performing at most one
    /// refresh per cycle across all concurrent callers.
    ///
    /// `seen_generation` is the generation of the token that just got
    /// rejected. Callers queue on the gate mutex; whoever holds it first
    /// performs the refresh and advances the generation, so every waiter
    /// that queued behind it observes the settled outcome instead of
    /// issuing another refresh call.
    #[instrument(skip(self))]
    async fn refresh_session(&self, seen_generation: u64) -> Result<String, ApiError> {
        let session = &self.inner.session;
        let mut gate = session.gate.lock().await;

        if session.generation() != seen_generation {
            // A cycle settled while this request was waiting.
            if gate.last_failed {
                return Err(ApiError::SessionExpired);
            }
            return match session.access_token().await {
                Some(token) => Ok(token),
                None => Err(ApiError::SessionExpired),
            };
        }

        let Some(refresh_token) = session.refresh_token().await else {
            session.invalidate().await;
            gate.last_failed = true;
            session.bump_generation();
            return Err(ApiError::SessionExpired);
        };

        match api::auth::refresh(&self.inner.http, &self.inner.config, &refresh_token).await {
            Ok(pair) => {
                if let Err(err) = session.apply_refresh(&pair).await {
                    // Tokens that cannot be persisted would desync the
                    // stored session; treat this as a failed cycle.
                    session.invalidate().await;
                    gate.last_failed = true;
                    session.bump_generation();
                    return Err(err.into());
                }
                gate.last_failed = false;
                session.bump_generation();
                Ok(pair.access_token)
            }
            Err(err) => {
                tracing::warn!(error = %err, "token refresh failed; clearing session");
                session.invalidate().await;
                gate.last_failed = true;
                session.bump_generation();
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Persist a freshly authenticated session.
    pub(crate) async fn install_session(
        &self,
        session: &session::Session,
    ) -> Result<(), ApiError> {
        self.inner.session.install(session).await?;
        Ok(())
    }

    /// Decode a response body through the `{status, message, data}`
    /// envelope.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: envelope::error_message(&body),
            });
        }

        let parsed: Envelope<T> = serde_json::from_str(&body)?;
        parsed.into_result(status.as_u16())
    }
}
