//! Endpoint modules.
//!
//! Each module covers one backend prefix (`/auth`, `/profile`,
//! `/materials`, `/payment`, `/dashboard`) and owns the mapping from that
//! prefix's payload shapes into the canonical models. The mapping is pure -
//! no module here holds state; everything shared lives in the client.

pub mod auth;
pub mod dashboard;
pub mod materials;
pub mod payment;
pub mod profile;
