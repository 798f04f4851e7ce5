//! Value types exchanged with the content platform

use serde::{Deserialize, Serialize};
use std::fmt;

use workshop_common::{OwnerId, PublishedFileId};

/// Kind of workshop item, fixed at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Community,
    Microtransaction,
    Collection,
    Art,
    Video,
    Screenshot,
    Game,
    Software,
    Concept,
    WebGuide,
    IntegratedGuide,
    Merch,
    ControllerBinding,
    SteamworksAccessInvite,
    SteamVideo,
    GameManagedItem,
}

/// Who can see a published item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    FriendsOnly,
    Private,
}

/// Kind of media a preview points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewType {
    Image,
    YouTubeVideo,
    Sketchfab,
    EnvironmentMapHorizontalCross,
    EnvironmentMapLatLong,
}

impl PreviewType {
    /// Video previews reference a hosted video id instead of a local file
    pub fn is_video(&self) -> bool {
        matches!(self, Self::YouTubeVideo | Self::Sketchfab)
    }
}

/// Status reported by the platform for a completed call
///
/// Carried on the wire as the platform's raw integer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum ResultCode {
    Ok,
    Fail,
    NoConnection,
    InvalidParam,
    FileNotFound,
    Busy,
    AccessDenied,
    Timeout,
    Banned,
    ServiceUnavailable,
    InsufficientPrivilege,
    LimitExceeded,
    Other(i32),
}

impl ResultCode {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Map a raw platform status value
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Ok,
            2 => Self::Fail,
            3 => Self::NoConnection,
            8 => Self::InvalidParam,
            9 => Self::FileNotFound,
            10 => Self::Busy,
            15 => Self::AccessDenied,
            16 => Self::Timeout,
            17 => Self::Banned,
            20 => Self::ServiceUnavailable,
            24 => Self::InsufficientPrivilege,
            25 => Self::LimitExceeded,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Ok => 1,
            Self::Fail => 2,
            Self::NoConnection => 3,
            Self::InvalidParam => 8,
            Self::FileNotFound => 9,
            Self::Busy => 10,
            Self::AccessDenied => 15,
            Self::Timeout => 16,
            Self::Banned => 17,
            Self::ServiceUnavailable => 20,
            Self::InsufficientPrivilege => 24,
            Self::LimitExceeded => 25,
            Self::Other(code) => *code,
        }
    }
}

impl From<i32> for ResultCode {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<ResultCode> for i32 {
    fn from(result: ResultCode) -> Self {
        result.code()
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Fail => write!(f, "Fail"),
            Self::NoConnection => write!(f, "NoConnection"),
            Self::InvalidParam => write!(f, "InvalidParam"),
            Self::FileNotFound => write!(f, "FileNotFound"),
            Self::Busy => write!(f, "Busy"),
            Self::AccessDenied => write!(f, "AccessDenied"),
            Self::Timeout => write!(f, "Timeout"),
            Self::Banned => write!(f, "Banned"),
            Self::ServiceUnavailable => write!(f, "ServiceUnavailable"),
            Self::InsufficientPrivilege => write!(f, "InsufficientPrivilege"),
            Self::LimitExceeded => write!(f, "LimitExceeded"),
            Self::Other(code) => write!(f, "Result({})", code),
        }
    }
}

/// Opaque handle for an open update session on one item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateHandle(pub u64);

impl fmt::Display for UpdateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Result of an item creation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateItemResult {
    pub published_file_id: PublishedFileId,
    pub needs_legal_agreement: bool,
    pub result: ResultCode,
}

/// Result of an update submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitItemResult {
    pub needs_legal_agreement: bool,
    pub result: ResultCode,
}

/// Live upload snapshot for an update submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProgress {
    pub bytes_processed: u64,
    pub bytes_total: u64,
}

impl UpdateProgress {
    /// Fraction of bytes processed, 0.0 when the total is still unknown
    pub fn fraction(&self) -> f64 {
        if self.bytes_total == 0 {
            return 0.0;
        }
        (self.bytes_processed as f64 / self.bytes_total as f64).clamp(0.0, 1.0)
    }
}

/// Preview attached to an item as reported by a metadata query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewDetails {
    pub index: u32,
    pub url_or_video_id: String,
    pub original_file_name: String,
    pub preview_type: PreviewType,
}

/// Item metadata as reported by a metadata query
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemDetails {
    pub published_file_id: PublishedFileId,
    /// Zero when the item was deleted or never existed
    pub owner_id: OwnerId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(default)]
    pub previews: Vec<PreviewDetails>,
}

impl ItemDetails {
    /// Placeholder record the platform returns for an unknown id
    pub fn missing(published_file_id: PublishedFileId) -> Self {
        Self {
            published_file_id,
            ..Self::default()
        }
    }

    pub fn exists(&self) -> bool {
        !self.owner_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // PL-U01: ResultCode maps raw platform values both ways
    #[test]
    fn test_result_code_mapping() {
        assert_eq!(ResultCode::from_code(1), ResultCode::Ok);
        assert_eq!(ResultCode::from_code(25), ResultCode::LimitExceeded);
        assert_eq!(ResultCode::from_code(99), ResultCode::Other(99));
        assert_eq!(ResultCode::AccessDenied.code(), 15);
        assert_eq!(ResultCode::Other(42).code(), 42);
        assert!(ResultCode::Ok.is_ok());
        assert!(!ResultCode::Fail.is_ok());
    }

    // PL-U08: Call results carry the raw status value
    #[test]
    fn test_result_code_wire_format() {
        let created: CreateItemResult = serde_json::from_value(serde_json::json!({
            "published_file_id": 0,
            "needs_legal_agreement": true,
            "result": 15
        }))
        .unwrap();
        assert_eq!(created.result, ResultCode::AccessDenied);
        assert!(created.needs_legal_agreement);

        let submitted = SubmitItemResult {
            needs_legal_agreement: false,
            result: ResultCode::Other(107),
        };
        let json = serde_json::to_value(&submitted).unwrap();
        assert_eq!(json["result"], 107);
    }

    // PL-U02: ResultCode display matches the platform names
    #[test]
    fn test_result_code_display() {
        assert_eq!(ResultCode::Ok.to_string(), "OK");
        assert_eq!(ResultCode::Fail.to_string(), "Fail");
        assert_eq!(ResultCode::Other(77).to_string(), "Result(77)");
    }

    // PL-U03: Progress fraction handles unknown totals
    #[test]
    fn test_update_progress_fraction() {
        assert_eq!(UpdateProgress::default().fraction(), 0.0);
        let half = UpdateProgress {
            bytes_processed: 512,
            bytes_total: 1024,
        };
        assert_eq!(half.fraction(), 0.5);
        let overshoot = UpdateProgress {
            bytes_processed: 2048,
            bytes_total: 1024,
        };
        assert_eq!(overshoot.fraction(), 1.0);
    }

    // PL-U04: Only hosted-video preview types count as video
    #[test]
    fn test_preview_type_is_video() {
        assert!(PreviewType::YouTubeVideo.is_video());
        assert!(PreviewType::Sketchfab.is_video());
        assert!(!PreviewType::Image.is_video());
        assert!(!PreviewType::EnvironmentMapLatLong.is_video());
    }

    // PL-U05: Item details parsed from a query payload
    #[test]
    fn test_item_details_from_json() {
        let details: ItemDetails = serde_json::from_value(serde_json::json!({
            "published_file_id": 42,
            "owner_id": 76561197960287930u64,
            "title": "Castle pack",
            "description": "Walls and towers",
            "tags": ["maps", "medieval"],
            "previews": [{
                "index": 0,
                "url_or_video_id": "dQw4w9WgXcQ",
                "original_file_name": "",
                "preview_type": "you_tube_video"
            }]
        }))
        .unwrap();

        assert!(details.exists());
        assert_eq!(details.published_file_id, PublishedFileId(42));
        assert_eq!(details.tags, vec!["maps", "medieval"]);
        assert_eq!(details.previews[0].preview_type, PreviewType::YouTubeVideo);
    }

    // PL-U06: Missing placeholder reports no owner
    #[test]
    fn test_missing_item_has_no_owner() {
        let details = ItemDetails::missing(PublishedFileId(7));
        assert!(!details.exists());
        assert_eq!(details.published_file_id, PublishedFileId(7));
        assert!(details.title.is_empty());
    }
}
