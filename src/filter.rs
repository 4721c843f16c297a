//! Title and tag filtering shared by personal notes, global notes and
//! favorites.
//!
//! A note passes when its title contains the query (case-insensitive) and it
//! carries *every* selected tag. An empty query or an empty selection does
//! not constrain. Output keeps the input order.
//!
//! Local and global notes identify tags differently: an [`EnrichedNote`]
//! matches a selected tag by [`TagId`], a [`GlobalNote`] by label equality.
//! [`Filterable::TagKey`] keeps the two apart at the type level.

use std::borrow::Borrow;
use std::collections::HashSet;

use crate::models::{EnrichedNote, GlobalNote, TagId};

/// A note that can be filtered by title and tags.
pub trait Filterable {
    /// What a selected tag is compared against.
    type TagKey: ?Sized;

    fn title(&self) -> &str;

    /// True if the note carries the tag identified by `key`.
    fn has_tag(&self, key: &Self::TagKey) -> bool;
}

impl Filterable for EnrichedNote {
    type TagKey = TagId;

    fn title(&self) -> &str {
        &self.title
    }

    fn has_tag(&self, key: &TagId) -> bool {
        self.tags.iter().any(|tag| tag.id == *key)
    }
}

impl Filterable for GlobalNote {
    type TagKey = str;

    fn title(&self) -> &str {
        &self.title
    }

    fn has_tag(&self, key: &str) -> bool {
        self.tags.iter().any(|label| label == key)
    }
}

/// Returns the notes matching `title_query` and all of `selected`, in input
/// order.
///
/// # Examples
///
/// ```
/// use hlar::{filter, GlobalNote};
///
/// let notes = vec![
///     GlobalNote { id: "1".into(), title: "Team Meeting Notes".into(), markdown: String::new(), tags: vec!["work".into()] },
///     GlobalNote { id: "2".into(), title: "meet".into(), markdown: String::new(), tags: vec![] },
/// ];
///
/// let hits = filter(&notes, "meeting", &[] as &[String]);
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].id, "1");
/// ```
pub fn filter<'a, N, K>(notes: &'a [N], title_query: &str, selected: &[K]) -> Vec<&'a N>
where
    N: Filterable,
    K: Borrow<N::TagKey>,
{
    let query = title_query.to_lowercase();
    notes
        .iter()
        .filter(|note| matches_lowered(*note, &query, selected))
        .collect()
}

/// Single-note form of [`filter`].
pub fn matches<N, K>(note: &N, title_query: &str, selected: &[K]) -> bool
where
    N: Filterable,
    K: Borrow<N::TagKey>,
{
    matches_lowered(note, &title_query.to_lowercase(), selected)
}

fn matches_lowered<N, K>(note: &N, query: &str, selected: &[K]) -> bool
where
    N: Filterable,
    K: Borrow<N::TagKey>,
{
    let title_ok = query.is_empty() || note.title().to_lowercase().contains(query);
    title_ok && selected.iter().all(|key| note.has_tag(key.borrow()))
}

/// Distinct tag labels across `notes`, in first-seen order.
///
/// These are the selectable tag options for global notes and favorites,
/// which have no tag registry of their own.
pub fn available_labels(notes: &[GlobalNote]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut labels = Vec::new();
    for label in notes.iter().flat_map(|note| &note.tags) {
        if seen.insert(label.as_str()) {
            labels.push(label.clone());
        }
    }
    labels
}
