//! Command implementations.

pub mod auth;
pub mod cart;
pub mod materials;
pub mod orders;
pub mod tickets;

use std::sync::Arc;

use nivasity_client::{ClientConfig, FileStore, NivasityClient};

/// Default on-disk session location, relative to the working directory.
const DEFAULT_SESSION_FILE: &str = ".nivasity/session.json";

/// Build a client with the session persisted to disk, so sign-in survives
/// between invocations.
pub(crate) fn build_client() -> Result<NivasityClient, Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env()?;
    let session_file = std::env::var("NIVASITY_SESSION_FILE")
        .unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_string());
    let store = Arc::new(FileStore::new(session_file));

    Ok(NivasityClient::new(config, store)?)
}
