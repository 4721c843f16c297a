use serde::{Deserialize, Serialize};

/// A note served by the remote global notes service.
///
/// Tags are plain labels with no link to the local tag registry, so two
/// global tags are the same tag exactly when their labels are equal.
/// A favorite is a full copy of one of these taken when it was favorited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalNote {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
