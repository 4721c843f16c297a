use serde::{Deserialize, Serialize};

use super::TagId;

/// A user-defined tag.
///
/// Identity is the `id`; labels are free text and need not be unique.
/// Notes refer to tags by id only, so renaming a tag is visible on every
/// note that references it the next time the view is composed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
}

impl Tag {
    /// Creates a new tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use hlar::{Tag, TagId};
    /// use uuid::Uuid;
    ///
    /// let id = TagId::new(Uuid::from_u128(1));
    /// let tag = Tag::new(id, "errand");
    /// assert_eq!(tag.id, id);
    /// assert_eq!(tag.label, "errand");
    /// ```
    pub fn new(id: TagId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}
