//! Shared identifiers, configuration, and error handling for the workshop publisher
//!
//! This crate provides common functionality used across the workspace:
//! - Platform identifiers (`AppId`, `PublishedFileId`, `OwnerId`)
//! - Configuration management following 12-factor principles
//! - Error types and the shared state machine error

pub mod config;
pub mod error;
pub mod ids;
pub mod state;

pub use config::WorkshopConfig;
pub use error::{Error, Result};
pub use ids::{AppId, OwnerId, PublishedFileId};
pub use state::StateError;
