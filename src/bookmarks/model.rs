use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub desc: Option<String>,
    pub rating: Option<i64>,
    pub created_at: String,
}

/// A bookmark about to be inserted. Fields are already validated and
/// sanitized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub desc: Option<String>,
    pub rating: Option<i64>,
}

/// Partial update. `None` leaves the stored value as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkChanges {
    pub title: Option<String>,
    pub url: Option<String>,
    pub desc: Option<String>,
    pub rating: Option<i64>,
}

impl BookmarkChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none() && self.desc.is_none() && self.rating.is_none()
    }
}

/// Raw request body for create and update. Keys outside this whitelist are
/// dropped during deserialization. `rating` stays untyped until validated,
/// clients send both `5` and `"5"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookmarkInput {
    pub title: Option<String>,
    pub url: Option<String>,
    pub desc: Option<String>,
    pub rating: Option<JsonValue>,
}
