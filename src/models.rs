mod enriched_note;
mod global_note;
mod ids;
mod note;
mod tag;

pub use enriched_note::EnrichedNote;
pub use global_note::GlobalNote;
pub use ids::{IdGenerator, NoteId, RandomIds, SequentialIds, TagId};
pub use note::{Note, NoteInput};
pub use tag::Tag;
