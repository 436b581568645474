//! Folder catalog types.

use serde::{Deserialize, Serialize};

/// One hit from `GET /api/search?type=dash-folder`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderHit {
    pub id: i64,
    #[serde(default)]
    pub uid: String,
    pub title: String,
}

/// Folder returned by `POST /api/folders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i64,
    #[serde(default)]
    pub uid: String,
    pub title: String,
}

/// Entry offered by the folder picker.
///
/// `value` is `None` for the "keep current" reset entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderOption {
    pub label: String,
    pub value: Option<i64>,
    /// Typed by the user and not yet in the catalog.
    pub is_new: bool,
}

impl FolderOption {
    pub fn new(label: impl Into<String>, value: Option<i64>) -> Self {
        Self {
            label: label.into(),
            value,
            is_new: false,
        }
    }

    /// A free-text entry that should be created on selection.
    pub fn custom(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: None,
            is_new: true,
        }
    }
}

impl From<FolderHit> for FolderOption {
    fn from(hit: FolderHit) -> Self {
        Self::new(hit.title, Some(hit.id))
    }
}

/// Selection reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderChoice {
    pub id: Option<i64>,
    pub title: String,
}
