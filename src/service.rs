use anyhow::{Context, Result};
use log::{debug, info};

use crate::filter::{Filterable, filter};
use crate::models::{EnrichedNote, IdGenerator, Note, NoteId, NoteInput, RandomIds, Tag, TagId};
use crate::notes::NoteStore;
use crate::storage::{KeyValueStore, NOTES_KEY, TAGS_KEY};
use crate::tags::TagRegistry;
use crate::view::compose;

/// Service layer providing note and tag management.
///
/// NoteService owns a key-value store together with the tag registry and
/// note store loaded from it. Both collections are read once when the
/// service opens and written back whole after every mutation that changes
/// them. The enriched view is recomputed eagerly after each such mutation,
/// so reads never see a stale join.
///
/// A mutation is committed in memory only after its collection has been
/// saved; if the save fails the service is left as it was.
///
/// # Examples
///
/// ```
/// use hlar::{MemoryStore, NoteInput, NoteService};
///
/// # fn main() -> anyhow::Result<()> {
/// let mut service = NoteService::open(MemoryStore::new())?;
/// let errand = service.add_tag("errand")?;
/// let id = service.create_note(NoteInput::new("Shopping").markdown("milk").tags(vec![errand]))?;
///
/// assert_eq!(service.note(id).unwrap().tag_labels(), vec!["errand"]);
/// # Ok(())
/// # }
/// ```
pub struct NoteService<S> {
    store: S,
    ids: Box<dyn IdGenerator>,
    tags: TagRegistry,
    notes: NoteStore,
    view: Vec<EnrichedNote>,
}

impl<S: KeyValueStore> NoteService<S> {
    /// Opens a service over `store`, drawing random ids.
    ///
    /// Missing collections load as empty.
    pub fn open(store: S) -> Result<Self> {
        Self::with_id_generator(store, RandomIds)
    }

    /// Opens a service over `store` with a custom id source.
    pub fn with_id_generator(store: S, ids: impl IdGenerator + 'static) -> Result<Self> {
        let tags: Vec<Tag> = store.load(TAGS_KEY).context("Failed to load tags")?;
        let notes: Vec<Note> = store.load(NOTES_KEY).context("Failed to load notes")?;

        let mut service = Self {
            store,
            ids: Box::new(ids),
            tags: TagRegistry::from_tags(tags),
            notes: NoteStore::from_notes(notes),
            view: Vec::new(),
        };
        service.recompose();
        info!(
            "loaded {} notes and {} tags",
            service.notes.len(),
            service.tags.len()
        );
        Ok(service)
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// All tags in registration order; also the selectable tag options.
    pub fn tags(&self) -> &[Tag] {
        self.tags.all()
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.tags
    }

    /// Notes in stored form, dangling tag ids included.
    pub fn stored_notes(&self) -> &[Note] {
        self.notes.all()
    }

    /// Every note joined with its tags, in creation order.
    pub fn notes(&self) -> &[EnrichedNote] {
        &self.view
    }

    /// A single enriched note.
    pub fn note(&self, id: NoteId) -> Option<&EnrichedNote> {
        self.view.iter().find(|note| note.id == id)
    }

    /// Notes whose title contains `title_query` and which carry every tag
    /// in `selected`.
    pub fn search(&self, title_query: &str, selected: &[TagId]) -> Vec<&EnrichedNote> {
        filter(self.view.as_slice(), title_query, selected)
    }

    /// Creates a note and returns its id.
    ///
    /// Tags in `input` must already be registered; see
    /// [`resolve_tags`](Self::resolve_tags).
    pub fn create_note(&mut self, input: NoteInput) -> Result<NoteId> {
        let mut notes = self.notes.clone();
        let id = notes.create(self.ids.as_mut(), input);
        self.commit_notes(notes)?;
        Ok(id)
    }

    /// Replaces title, body and tags of note `id`. Unknown ids are ignored.
    pub fn update_note(&mut self, id: NoteId, input: NoteInput) -> Result<()> {
        let mut notes = self.notes.clone();
        notes.update(id, input);
        self.commit_notes(notes)
    }

    /// Deletes note `id`. Unknown ids are ignored.
    pub fn delete_note(&mut self, id: NoteId) -> Result<()> {
        let mut notes = self.notes.clone();
        notes.delete(id);
        self.commit_notes(notes)
    }

    /// Registers a new tag.
    pub fn add_tag(&mut self, label: impl Into<String>) -> Result<Tag> {
        let mut tags = self.tags.clone();
        let tag = tags.add(self.ids.as_mut(), label);
        self.commit_tags(tags)?;
        Ok(tag)
    }

    /// Renames tag `id`. Unknown ids are ignored.
    pub fn update_tag(&mut self, id: TagId, label: impl Into<String>) -> Result<()> {
        let mut tags = self.tags.clone();
        tags.update(id, label);
        self.commit_tags(tags)
    }

    /// Deletes tag `id`. Notes keep the id; the view stops showing it.
    pub fn delete_tag(&mut self, id: TagId) -> Result<()> {
        let mut tags = self.tags.clone();
        tags.delete(id);
        self.commit_tags(tags)
    }

    /// Turns labels typed by the user into registered tags.
    ///
    /// A label reuses the first tag with exactly that label; otherwise a new
    /// tag is registered. Output follows input order, and a label repeated
    /// in the input resolves to the same tag each time.
    pub fn resolve_tags<L: AsRef<str>>(&mut self, labels: &[L]) -> Result<Vec<Tag>> {
        let mut tags = self.tags.clone();
        let mut resolved = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.as_ref();
            let tag = match tags.find_by_label(label) {
                Some(existing) => existing.clone(),
                None => tags.add(self.ids.as_mut(), label),
            };
            resolved.push(tag);
        }
        self.commit_tags(tags)?;
        Ok(resolved)
    }

    /// Notes whose title contains `title_query` and which carry, for every
    /// group in `groups`, at least one of the group's tags.
    ///
    /// Groups come from [`select_tags`](Self::select_tags). An empty group
    /// matches no note.
    pub fn search_labels(&self, title_query: &str, groups: &[Vec<TagId>]) -> Vec<&EnrichedNote> {
        filter(self.view.as_slice(), title_query, &[] as &[TagId])
            .into_iter()
            .filter(|note| groups.iter().all(|ids| ids.iter().any(|id| note.has_tag(id))))
            .collect()
    }

    /// Registered tags for each of `labels`, for tag selection by name.
    ///
    /// Labels are not unique, so each label yields every tag carrying it.
    /// Labels with no tag are returned separately; a selection containing
    /// one can match no note.
    pub fn select_tags<L: AsRef<str>>(&self, labels: &[L]) -> (Vec<Vec<TagId>>, Vec<String>) {
        let mut groups = Vec::new();
        let mut unknown = Vec::new();
        for label in labels {
            let ids = self.tags.ids_with_label(label.as_ref());
            if ids.is_empty() {
                unknown.push(label.as_ref().to_string());
            } else {
                groups.push(ids);
            }
        }
        (groups, unknown)
    }

    fn commit_notes(&mut self, notes: NoteStore) -> Result<()> {
        if notes == self.notes {
            return Ok(());
        }
        self.store
            .save(NOTES_KEY, notes.all())
            .context("Failed to save notes")?;
        self.notes = notes;
        self.recompose();
        Ok(())
    }

    fn commit_tags(&mut self, tags: TagRegistry) -> Result<()> {
        if tags == self.tags {
            return Ok(());
        }
        self.store
            .save(TAGS_KEY, tags.all())
            .context("Failed to save tags")?;
        self.tags = tags;
        self.recompose();
        Ok(())
    }

    fn recompose(&mut self) {
        self.view = compose(self.notes.all(), self.tags.all());
        debug!("composed {} notes", self.view.len());
    }
}
