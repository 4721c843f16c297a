pub mod config;
pub mod favorites;
pub mod filter;
pub mod global;
pub mod models;
pub mod notes;
pub mod remote;
pub mod service;
pub mod storage;
pub mod tags;
pub mod utils;
pub mod view;

pub use config::Config;
pub use favorites::Favorites;
pub use filter::{Filterable, available_labels, filter, matches};
pub use global::{Fetch, FetchState, GlobalNoteView, GlobalNotes, Ticket};
pub use models::{
    EnrichedNote, GlobalNote, IdGenerator, Note, NoteId, NoteInput, RandomIds, SequentialIds, Tag,
    TagId,
};
pub use notes::NoteStore;
pub use remote::{HttpNoteSource, HttpNoteSourceBuilder, RemoteError, RemoteNoteSource};
pub use service::NoteService;
pub use storage::{
    FAVORITES_KEY, KeyValueStore, MemoryStore, NOTES_KEY, SqliteStore, StorageError, TAGS_KEY,
};
pub use tags::TagRegistry;
pub use view::{compose, compose_one};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_accessible_from_crate_root() {
        assert!(SqliteStore::in_memory().is_ok());
        assert!(MemoryStore::new().is_empty());
    }

    #[test]
    fn types_accessible_from_crate_root() {
        let mut ids = SequentialIds::default();
        let tag = Tag::new(TagId::new(ids.next_id()), "test");
        assert_eq!(tag.label, "test");

        let input = NoteInput::new("title").tags(vec![tag.clone()]);
        assert_eq!(input.tag_ids(), vec![tag.id]);

        let mut service = NoteService::open(MemoryStore::new()).unwrap();
        let registered = service.add_tag("registered").unwrap();
        let id = service
            .create_note(NoteInput::new("title").tags(vec![registered.clone()]))
            .unwrap();
        assert_eq!(service.note(id).unwrap().tags, vec![registered]);
    }
}
