//! Nivasity API client.
//!
//! Session-aware client for the Nivasity student storefront backend:
//! authentication (password, OTP registration, Google sign-in), the
//! materials store, hosted-gateway checkout, order history, and support
//! tickets.
//!
//! # Architecture
//!
//! - [`NivasityClient`] wraps one `reqwest::Client` and the persisted
//!   session; clones share everything
//! - Access tokens are attached automatically and refreshed silently on
//!   401, with concurrent requests sharing a single refresh call
//! - Forced logout is broadcast through [`NivasityClient::subscribe`] so
//!   navigation can react without polling
//! - Backend payload variants are normalized into one canonical model set
//!   by pure per-endpoint adapters
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nivasity_client::{ClientConfig, MemoryStore, NivasityClient};
//! use secrecy::SecretString;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_env()?;
//! let client = NivasityClient::new(config, Arc::new(MemoryStore::new()))?;
//!
//! let session = client
//!     .login("ada@unilag.edu.ng", &SecretString::from("hunter2secret"))
//!     .await?;
//! println!("signed in as {}", session.user.full_name());
//!
//! let mut events = client.subscribe();
//! tokio::spawn(async move {
//!     if events.recv().await.is_ok() {
//!         // navigate back to the sign-in screen
//!     }
//! });
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod config;
mod envelope;
mod error;
mod session;
mod store;

pub mod api;
pub mod models;

pub use api::auth::RegistrationInput;
pub use api::materials::MaterialQuery;
pub use api::payment::CheckoutSession;
pub use api::profile::ProfileUpdate;
pub use client::NivasityClient;
pub use config::{ClientConfig, ConfigError, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use models::{Cart, CartLine, Material, MaterialPage, Order, OrderItem, Ticket, TicketMessage, User};
pub use session::{Session, SessionEvent};
pub use store::{
    ACCESS_TOKEN_KEY, FileStore, KeyValueStore, MemoryStore, REFRESH_TOKEN_KEY, StoreError,
    USER_KEY,
};
