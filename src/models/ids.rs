use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a note.
///
/// Wraps a UUID to provide type safety and prevent accidental
/// mixing of different ID types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Creates a new note ID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Unique identifier for a tag.
///
/// Wraps a UUID to provide type safety and prevent accidental
/// mixing of different ID types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(Uuid);

impl TagId {
    /// Creates a new tag ID.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TagId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Source of fresh identifiers for tags and notes.
///
/// Collections never trust a generator blindly: a freshly drawn id that is
/// already taken is discarded and another one is drawn.
pub trait IdGenerator {
    /// Returns the next identifier.
    fn next_id(&mut self) -> Uuid;
}

/// Random (v4) UUIDs. Used for every real session.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic ids counting up from a starting value.
///
/// # Examples
///
/// ```
/// use hlar::{IdGenerator, SequentialIds};
///
/// let mut ids = SequentialIds::starting_at(1);
/// assert_eq!(ids.next_id().as_u128(), 1);
/// assert_eq!(ids.next_id().as_u128(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    /// Creates a generator whose first id is `start`.
    pub fn starting_at(start: u128) -> Self {
        Self { next: start }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        let id = Uuid::from_u128(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_id_serializes_as_hyphenated_string() {
        let id = NoteId::new(Uuid::from_u128(42));
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""00000000-0000-0000-0000-00000000002a""#);

        let deserialized: NoteId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn tag_id_parses_from_display_output() {
        let id = TagId::new(Uuid::new_v4());
        let parsed: TagId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn parsing_rejects_non_uuid_text() {
        assert!("not-an-id".parse::<NoteId>().is_err());
        assert!("".parse::<TagId>().is_err());
    }

    #[test]
    fn ids_are_not_interchangeable() {
        // These lines would fail to compile:
        // let note_id: NoteId = TagId::new(Uuid::nil());
        // let tag_id: TagId = NoteId::new(Uuid::nil());

        let raw = Uuid::from_u128(1);
        let note_id = NoteId::new(raw);
        let tag_id = TagId::new(raw);

        // Same underlying value, but different types
        assert_eq!(note_id.get(), tag_id.get());
    }

    #[test]
    fn random_ids_do_not_repeat() {
        let mut ids = RandomIds;
        let first = ids.next_id();
        let second = ids.next_id();
        assert_ne!(first, second);
        assert_eq!(first.get_version_num(), 4);
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::starting_at(10);
        assert_eq!(ids.next_id(), Uuid::from_u128(10));
        assert_eq!(ids.next_id(), Uuid::from_u128(11));
    }
}
