//! Joins stored notes with the tag registry.

use std::collections::HashMap;

use crate::models::{EnrichedNote, Note, Tag, TagId};

/// Resolves every note's tag ids against `tags`.
///
/// Resolved tags keep the note's `tag_ids` order. Ids with no matching tag
/// are dropped silently; the stored note still carries them. Inputs are left
/// untouched.
///
/// # Examples
///
/// ```
/// use hlar::{compose, Note, NoteId, Tag, TagId};
/// use uuid::Uuid;
///
/// let kept = Tag::new(TagId::new(Uuid::from_u128(1)), "kept");
/// let deleted = TagId::new(Uuid::from_u128(2));
/// let note = Note {
///     id: NoteId::new(Uuid::from_u128(10)),
///     title: "Shopping".into(),
///     markdown: "milk".into(),
///     tag_ids: vec![deleted, kept.id],
/// };
///
/// let view = compose(&[note], &[kept.clone()]);
/// assert_eq!(view[0].tags, vec![kept]);
/// ```
pub fn compose(notes: &[Note], tags: &[Tag]) -> Vec<EnrichedNote> {
    let by_id = index_tags(tags);
    notes.iter().map(|note| enrich(note, &by_id)).collect()
}

/// Resolves a single note. See [`compose`].
pub fn compose_one(note: &Note, tags: &[Tag]) -> EnrichedNote {
    enrich(note, &index_tags(tags))
}

fn index_tags(tags: &[Tag]) -> HashMap<TagId, &Tag> {
    let mut by_id = HashMap::with_capacity(tags.len());
    for tag in tags {
        // Registry ids are unique; keep the first if handed a raw list that is not.
        by_id.entry(tag.id).or_insert(tag);
    }
    by_id
}

fn enrich(note: &Note, by_id: &HashMap<TagId, &Tag>) -> EnrichedNote {
    EnrichedNote {
        id: note.id,
        title: note.title.clone(),
        markdown: note.markdown.clone(),
        tags: note
            .tag_ids
            .iter()
            .filter_map(|id| by_id.get(id).map(|tag| (*tag).clone()))
            .collect(),
    }
}
