//! Integration test support for the Nivasity client.
//!
//! Every test runs the real client against a `mockito` server, so the full
//! pipeline is exercised: request building, bearer attachment, the 401
//! refresh path, envelope decoding, and storage.
//!
//! # Test Categories
//!
//! - `session_refresh` - single-flight refresh, invalidation, retry limits
//! - `auth_flows` - login/registration/OTP flows and token persistence
//! - `store_flows` - materials, payment, orders, tickets, cart sync

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::time::Duration;

use nivasity_client::{
    ACCESS_TOKEN_KEY, ClientConfig, KeyValueStore, MemoryStore, NivasityClient,
    REFRESH_TOKEN_KEY, USER_KEY,
};

/// A mock backend plus a client wired to it.
///
/// The `server` guard must stay alive for the duration of the test; the
/// `store` handle lets tests inspect exactly what was persisted.
pub struct TestContext {
    pub server: mockito::ServerGuard,
    pub client: NivasityClient,
    pub store: Arc<MemoryStore>,
}

impl TestContext {
    /// A context with no stored session.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be constructed.
    pub async fn new() -> Self {
        let server = mockito::Server::new_async().await;
        let store = Arc::new(MemoryStore::new());
        let client = build_client(&server, &store);
        Self {
            server,
            client,
            store,
        }
    }

    /// A context with a persisted session, as if the user signed in on a
    /// previous run.
    ///
    /// # Panics
    ///
    /// Panics if the store or client cannot be set up.
    pub async fn signed_in(access_token: &str, refresh_token: &str) -> Self {
        let server = mockito::Server::new_async().await;
        let store = Arc::new(MemoryStore::new());
        store
            .set(ACCESS_TOKEN_KEY, access_token)
            .expect("seed access token");
        store
            .set(REFRESH_TOKEN_KEY, refresh_token)
            .expect("seed refresh token");
        store
            .set(USER_KEY, &sample_stored_user())
            .expect("seed user");

        let client = build_client(&server, &store);
        Self {
            server,
            client,
            store,
        }
    }

    /// The three session keys as currently persisted.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be read.
    pub fn stored_session_keys(&self) -> (Option<String>, Option<String>, Option<String>) {
        (
            self.store.get(ACCESS_TOKEN_KEY).expect("read access token"),
            self.store
                .get(REFRESH_TOKEN_KEY)
                .expect("read refresh token"),
            self.store.get(USER_KEY).expect("read user"),
        )
    }
}

fn build_client(server: &mockito::ServerGuard, store: &Arc<MemoryStore>) -> NivasityClient {
    let config = ClientConfig::new(server.url())
        .expect("mock server URL")
        .with_timeout(Duration::from_secs(5));
    NivasityClient::new(config, Arc::clone(store) as Arc<dyn KeyValueStore>)
        .expect("build client")
}

/// Wrap a payload in the backend's success envelope.
#[must_use]
pub fn success_envelope(data: serde_json::Value) -> String {
    serde_json::json!({ "status": "success", "message": "ok", "data": data }).to_string()
}

/// The backend's error envelope with the given message.
#[must_use]
pub fn error_envelope(message: &str) -> String {
    serde_json::json!({ "status": "error", "message": message }).to_string()
}

/// A user payload in the auth endpoints' spelling.
#[must_use]
pub fn sample_user_payload() -> serde_json::Value {
    serde_json::json!({
        "id": 12,
        "email": "ada@unilag.edu.ng",
        "first_name": "Ada",
        "last_name": "Obi",
        "phone": "+2348031234567",
        "avatar_url": null,
        "school_id": 3,
        "department_id": 41,
        "admission_number": "190404001"
    })
}

/// A canonical `User` record as the client persists it under `USER_KEY`.
#[must_use]
pub fn sample_stored_user() -> String {
    serde_json::json!({
        "id": 12,
        "email": "ada@unilag.edu.ng",
        "first_name": "Ada",
        "last_name": "Obi",
        "phone": "+2348031234567",
        "avatar_url": null,
        "school_id": 3,
        "department_id": 41,
        "admission_number": "190404001"
    })
    .to_string()
}
