//! Nivasity Core - Shared domain types.
//!
//! This crate provides the common types used across the Nivasity client SDK:
//! - `client` - Session-aware API client for the Nivasity REST backend
//! - `cli` - `nv-cli` command-line tool built on the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP, no storage. This
//! keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, phone numbers,
//!   prices, and status enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
