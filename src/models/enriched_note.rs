use serde::{Deserialize, Serialize};

use super::{NoteId, Tag};

/// A note joined with the tags it references.
///
/// Derived from a stored [`Note`](super::Note) and the current tag registry;
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedNote {
    pub id: NoteId,
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

impl EnrichedNote {
    /// Labels of the resolved tags, in note order.
    pub fn tag_labels(&self) -> Vec<&str> {
        self.tags.iter().map(|tag| tag.label.as_str()).collect()
    }
}
