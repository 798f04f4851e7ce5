//! Platform identifiers
//!
//! Thin newtypes over the raw integers the hosting platform hands out, so an
//! item id can never be passed where an app id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the application whose workshop items are being published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub u32);

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a published workshop item
///
/// Zero is the sentinel for "not yet created".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PublishedFileId(pub u64);

impl PublishedFileId {
    /// Sentinel for an item that does not exist on the platform yet
    pub const UNSET: PublishedFileId = PublishedFileId(0);

    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for PublishedFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PublishedFileId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Account that owns a published item; zero means "no owner" (deleted or missing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub u64);

impl OwnerId {
    pub fn is_none(&self) -> bool {
        self.0 == 0
    }
}
