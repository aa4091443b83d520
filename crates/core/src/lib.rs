//! Domain rules for the vidgen video-generation client.
//!
//! Everything here is pure: request validation, the provider catalogue,
//! resolution lookup, job-status classification and local credential
//! checks. Network I/O lives in `vidgen-client`.

pub mod auth;
pub mod error;
pub mod generation;
pub mod models;
pub mod resolution;
pub mod status_messages;
pub mod types;
