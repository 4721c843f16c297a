use serde::{Deserialize, Serialize};

use super::{NoteId, Tag, TagId};

/// A note as it is stored.
///
/// Tags are held by id only. An id may outlive its tag (the tag was deleted
/// from the registry); such dangling references are kept here and dropped
/// when the view is composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Note body, kept as raw markdown.
    pub markdown: String,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
}

/// Title, body and tags supplied by the user when creating or editing a note.
///
/// Tags are passed as resolved [`Tag`] values rather than ids because they
/// may have been registered in the same action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub markdown: String,
    pub tags: Vec<Tag>,
}

impl NoteInput {
    /// Creates an input with the given title, an empty body and no tags.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Sets the markdown body.
    pub fn markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = markdown.into();
        self
    }

    /// Sets the tags.
    pub fn tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    /// Ids of the supplied tags, in the order given.
    pub fn tag_ids(&self) -> Vec<TagId> {
        self.tags.iter().map(|tag| tag.id).collect()
    }
}
