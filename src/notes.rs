//! The note store: the single owner of every stored [`Note`].

use log::debug;

use crate::models::{IdGenerator, Note, NoteId, NoteInput};

/// Ordered collection of notes with unique ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteStore {
    notes: Vec<Note>,
}

impl NoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from previously stored notes, dropping later entries
    /// that reuse an id.
    pub fn from_notes(notes: Vec<Note>) -> Self {
        let mut store = Self::new();
        for note in notes {
            if store.get(note.id).is_some() {
                debug!("dropping duplicate stored note {}", note.id);
                continue;
            }
            store.notes.push(note);
        }
        store
    }

    /// All notes in creation order.
    pub fn all(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Stores a new note under a fresh id and returns that id.
    ///
    /// The note's tag ids are taken from `input.tags` in order. Empty titles,
    /// bodies and tag lists are all accepted.
    pub fn create(&mut self, ids: &mut dyn IdGenerator, input: NoteInput) -> NoteId {
        let id = loop {
            let candidate = NoteId::new(ids.next_id());
            if self.get(candidate).is_none() {
                break candidate;
            }
        };

        let tag_ids = input.tag_ids();
        self.notes.push(Note {
            id,
            title: input.title,
            markdown: input.markdown,
            tag_ids,
        });
        debug!("created note {}", id);
        id
    }

    /// Overwrites title, body and tag ids of the note with `id`.
    ///
    /// The tag association is replaced wholesale, never merged. Unknown ids
    /// are ignored.
    pub fn update(&mut self, id: NoteId, input: NoteInput) {
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            return;
        };

        note.tag_ids = input.tag_ids();
        note.title = input.title;
        note.markdown = input.markdown;
        debug!("updated note {}", id);
    }

    /// Removes the note with `id`. Unknown ids are ignored.
    pub fn delete(&mut self, id: NoteId) {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        if self.notes.len() != before {
            debug!("deleted note {}", id);
        }
    }
}
