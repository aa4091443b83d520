//! Async client for the video-generation backend.
//!
//! Provides the REST wrapper ([`api::VideoApi`]), the generation workflow
//! controller (submit + poll), the session holder that owns bearer tokens
//! across restarts, and environment-driven configuration.

pub mod api;
pub mod backend;
pub mod clock;
pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod workflow;
