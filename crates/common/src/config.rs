//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{Error, Result};
use crate::ids::AppId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkshopConfig {
    /// Application the published items belong to
    pub app_id: AppId,

    /// Change note used when an editor has none of its own
    pub default_change_note: String,
}

impl WorkshopConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        Self::from_vars(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_app_id = lookup("WORKSHOP_APP_ID")
            .ok_or_else(|| Error::Configuration("WORKSHOP_APP_ID is required".to_string()))?;

        let app_id = raw_app_id
            .trim()
            .parse::<u32>()
            .map(AppId)
            .map_err(|_| Error::InvalidValue {
                name: "WORKSHOP_APP_ID",
                value: raw_app_id.clone(),
            })?;

        let config = Self {
            app_id,
            default_change_note: lookup("WORKSHOP_CHANGE_NOTE").unwrap_or_default(),
        };

        tracing::debug!(app_id = %config.app_id, "Workshop configuration loaded");

        Ok(config)
    }
}
