//! The tag registry: the single owner of every local [`Tag`].

use log::debug;

use crate::models::{IdGenerator, Tag, TagId};

/// Ordered collection of tags with unique ids.
///
/// Notes only hold [`TagId`]s. Deleting a tag here leaves those ids in
/// place; the view composer drops them when it resolves a note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    tags: Vec<Tag>,
}

impl TagRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from previously stored tags.
    ///
    /// Later entries reusing an id already seen are dropped so that ids stay
    /// unique.
    pub fn from_tags(tags: Vec<Tag>) -> Self {
        let mut registry = Self::new();
        for tag in tags {
            if registry.get(tag.id).is_some() {
                debug!("dropping duplicate stored tag {}", tag.id);
                continue;
            }
            registry.tags.push(tag);
        }
        registry
    }

    /// All tags in registration order.
    pub fn all(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    /// First tag carrying exactly this label.
    pub fn find_by_label(&self, label: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.label == label)
    }

    /// Ids of every tag carrying exactly this label, in registration order.
    pub fn ids_with_label(&self, label: &str) -> Vec<TagId> {
        self.tags
            .iter()
            .filter(|tag| tag.label == label)
            .map(|tag| tag.id)
            .collect()
    }

    /// Registers a new tag under a fresh id and returns it.
    ///
    /// Labels are not checked for uniqueness.
    ///
    /// # Examples
    ///
    /// ```
    /// use hlar::{SequentialIds, TagRegistry};
    ///
    /// let mut ids = SequentialIds::default();
    /// let mut registry = TagRegistry::new();
    /// let first = registry.add(&mut ids, "home");
    /// let second = registry.add(&mut ids, "home");
    ///
    /// assert_ne!(first.id, second.id);
    /// assert_eq!(registry.len(), 2);
    /// ```
    pub fn add(&mut self, ids: &mut dyn IdGenerator, label: impl Into<String>) -> Tag {
        let id = loop {
            let candidate = TagId::new(ids.next_id());
            if self.get(candidate).is_none() {
                break candidate;
            }
        };

        let tag = Tag::new(id, label);
        debug!("registered tag {} ({:?})", tag.id, tag.label);
        self.tags.push(tag.clone());
        tag
    }

    /// Replaces the label of the tag with `id`. Unknown ids are ignored.
    pub fn update(&mut self, id: TagId, label: impl Into<String>) {
        if let Some(tag) = self.tags.iter_mut().find(|tag| tag.id == id) {
            tag.label = label.into();
            debug!("renamed tag {} to {:?}", id, tag.label);
        }
    }

    /// Removes the tag with `id`. Unknown ids are ignored.
    ///
    /// Notes referencing the tag are not touched.
    pub fn delete(&mut self, id: TagId) {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.id != id);
        if self.tags.len() != before {
            debug!("deleted tag {}", id);
        }
    }
}
