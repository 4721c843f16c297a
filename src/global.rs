//! In-memory state for global notes fetched from the remote source.
//!
//! Fetches are single attempts and may finish out of order when the caller
//! drives them asynchronously. Each fetch is issued a [`Ticket`]; only the
//! most recently issued ticket may commit its result. A response for an
//! older ticket is discarded, so a slow early request can never overwrite a
//! newer one.

use anyhow::Result;
use log::{info, warn};

use crate::favorites::Favorites;
use crate::filter::{available_labels, filter};
use crate::models::GlobalNote;
use crate::remote::{RemoteError, RemoteNoteSource};
use crate::storage::KeyValueStore;

/// Handle for one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Sequence number of the request; later requests have larger numbers.
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Lifecycle of a fetched value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState<T> {
    /// Nothing requested yet.
    Idle,
    /// A request is in flight.
    Loading,
    Loaded(T),
    /// The latest request failed; carries the error message.
    Failed(String),
}

impl<T> FetchState<T> {
    /// The loaded value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// One state slot guarded by request sequencing.
#[derive(Debug, Clone)]
pub struct Fetch<T> {
    state: FetchState<T>,
    issued: u64,
    pending: Option<u64>,
}

impl<T> Default for Fetch<T> {
    fn default() -> Self {
        Self {
            state: FetchState::Idle,
            issued: 0,
            pending: None,
        }
    }
}

impl<T> Fetch<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Starts a new request, superseding any request still in flight.
    ///
    /// Previously loaded data is cleared; a failed or superseded fetch never
    /// leaves stale data visible.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.pending = Some(self.issued);
        self.state = FetchState::Loading;
        Ticket(self.issued)
    }

    /// True if `ticket` is the request whose result will be accepted.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.pending == Some(ticket.0)
    }

    /// Commits the result of `ticket`.
    ///
    /// Returns `false`, leaving state untouched, when the ticket has been
    /// superseded or already completed.
    pub fn complete(&mut self, ticket: Ticket, result: Result<T, RemoteError>) -> bool {
        if !self.is_current(ticket) {
            warn!(
                "discarding response for request #{} (latest is #{})",
                ticket.0, self.issued
            );
            return false;
        }

        self.pending = None;
        self.state = match result {
            Ok(value) => FetchState::Loaded(value),
            Err(e) => {
                warn!("fetch #{} failed: {e}", ticket.0);
                FetchState::Failed(e.to_string())
            }
        };
        true
    }
}

/// Global notes list and single-note detail, each with its own sequencing.
#[derive(Debug, Default)]
pub struct GlobalNotes {
    list: Fetch<Vec<GlobalNote>>,
    detail: Fetch<GlobalNote>,
}

impl GlobalNotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_state(&self) -> &FetchState<Vec<GlobalNote>> {
        self.list.state()
    }

    pub fn detail_state(&self) -> &FetchState<GlobalNote> {
        self.detail.state()
    }

    /// Loaded global notes; empty unless the latest list fetch succeeded.
    pub fn notes(&self) -> &[GlobalNote] {
        self.list.state().value().map(Vec::as_slice).unwrap_or_default()
    }

    /// Distinct tag labels across the loaded notes, in first-seen order.
    pub fn tag_options(&self) -> Vec<String> {
        available_labels(self.notes())
    }

    /// Loaded notes matching the title query and all selected labels.
    pub fn filtered<K: AsRef<str>>(&self, title_query: &str, labels: &[K]) -> Vec<&GlobalNote> {
        let labels: Vec<&str> = labels.iter().map(|label| label.as_ref()).collect();
        filter(self.notes(), title_query, &labels)
    }

    pub fn begin_list(&mut self) -> Ticket {
        info!("fetching global notes");
        self.list.begin()
    }

    pub fn complete_list(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<GlobalNote>, RemoteError>,
    ) -> bool {
        self.list.complete(ticket, result)
    }

    pub fn begin_detail(&mut self) -> Ticket {
        info!("fetching global note");
        self.detail.begin()
    }

    pub fn complete_detail(
        &mut self,
        ticket: Ticket,
        result: Result<GlobalNote, RemoteError>,
    ) -> bool {
        self.detail.complete(ticket, result)
    }

    /// Fetches the list synchronously through `source`.
    pub fn refresh<R>(&mut self, source: &R) -> &FetchState<Vec<GlobalNote>>
    where
        R: RemoteNoteSource + ?Sized,
    {
        let ticket = self.begin_list();
        let result = source.fetch_list();
        self.complete_list(ticket, result);
        self.list.state()
    }

    /// Fetches one note synchronously through `source`.
    pub fn open<R>(&mut self, source: &R, id: &str) -> &FetchState<GlobalNote>
    where
        R: RemoteNoteSource + ?Sized,
    {
        let ticket = self.begin_detail();
        let result = source.fetch_one(id);
        self.complete_detail(ticket, result);
        self.detail.state()
    }
}

/// A fetched global note together with its favorite status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalNoteView {
    pub note: GlobalNote,
    pub is_favorite: bool,
}

impl GlobalNoteView {
    /// Fetches note `id` and checks whether it is already a favorite.
    ///
    /// # Errors
    ///
    /// Returns the fetch failure, or a storage error reading favorites.
    pub fn load<R, S>(source: &R, favorites: &Favorites<S>, id: &str) -> Result<Self>
    where
        R: RemoteNoteSource + ?Sized,
        S: KeyValueStore,
    {
        let note = source.fetch_one(id)?;
        let is_favorite = favorites.contains(&note.id)?;
        Ok(Self { note, is_favorite })
    }

    /// Adds the note to favorites, or removes it if it already is one.
    ///
    /// Returns the new favorite status.
    pub fn toggle_favorite<S: KeyValueStore>(&mut self, favorites: &Favorites<S>) -> Result<bool> {
        if self.is_favorite {
            favorites.remove(&self.note.id)?;
            self.is_favorite = false;
        } else {
            favorites.add(self.note.clone())?;
            self.is_favorite = true;
        }
        Ok(self.is_favorite)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::storage::MemoryStore;

    fn note(id: &str, title: &str, tags: &[&str]) -> GlobalNote {
        GlobalNote {
            id: id.to_string(),
            title: title.to_string(),
            markdown: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Source answering from a fixed list, optionally failing.
    struct FakeSource {
        notes: Vec<GlobalNote>,
        fail: bool,
        calls: RefCell<usize>,
    }

    impl FakeSource {
        fn with(notes: Vec<GlobalNote>) -> Self {
            Self {
                notes,
                fail: false,
                calls: RefCell::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                notes: vec![],
                fail: true,
                calls: RefCell::new(0),
            }
        }
    }

    impl RemoteNoteSource for FakeSource {
        fn fetch_list(&self) -> Result<Vec<GlobalNote>, RemoteError> {
            *self.calls.borrow_mut() += 1;
            if self.fail {
                return Err(RemoteError::Http { status: 503 });
            }
            Ok(self.notes.clone())
        }

        fn fetch_one(&self, id: &str) -> Result<GlobalNote, RemoteError> {
            *self.calls.borrow_mut() += 1;
            self.notes
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or(RemoteError::Http { status: 404 })
        }
    }

    #[test]
    fn starts_idle_and_empty() {
        let global = GlobalNotes::new();
        assert_eq!(global.list_state(), &FetchState::Idle);
        assert!(global.notes().is_empty());
    }

    #[test]
    fn begin_marks_loading() {
        let mut fetch: Fetch<u32> = Fetch::new();
        let ticket = fetch.begin();

        assert!(fetch.state().is_loading());
        assert!(fetch.is_current(ticket));
    }

    #[test]
    fn newer_request_wins_over_late_older_response() {
        let mut global = GlobalNotes::new();
        let first = global.begin_list();
        let second = global.begin_list();

        assert!(global.complete_list(second, Ok(vec![note("new", "Newer", &[])])));
        assert!(!global.complete_list(first, Ok(vec![note("old", "Older", &[])])));

        assert_eq!(global.notes(), &[note("new", "Newer", &[])]);
    }

    #[test]
    fn superseded_response_arriving_first_is_discarded() {
        let mut global = GlobalNotes::new();
        let first = global.begin_list();
        let second = global.begin_list();

        assert!(!global.complete_list(first, Ok(vec![note("old", "Older", &[])])));
        assert!(global.list_state().is_loading());

        assert!(global.complete_list(second, Ok(vec![])));
        assert_eq!(global.list_state(), &FetchState::Loaded(vec![]));
    }

    #[test]
    fn begin_detail_leaves_list_untouched() {
        let mut global = GlobalNotes::new();
        let ticket = global.begin_detail();

        assert!(global.detail_state().is_loading());
        assert_eq!(global.list_state(), &FetchState::Idle);
        assert!(global.complete_detail(ticket, Ok(note("1", "One", &[]))));
        assert_eq!(global.detail_state().value().map(|n| n.id.as_str()), Some("1"));
    }

    #[test]
    fn ticket_completes_only_once() {
        let mut fetch: Fetch<u32> = Fetch::new();
        let ticket = fetch.begin();

        assert!(fetch.complete(ticket, Ok(1)));
        assert!(!fetch.complete(ticket, Ok(2)));
        assert_eq!(fetch.state(), &FetchState::Loaded(1));
    }

    #[test]
    fn tickets_increase() {
        let mut fetch: Fetch<u32> = Fetch::new();
        let a = fetch.begin();
        let b = fetch.begin();
        assert!(b > a);
        assert_eq!(b.sequence(), a.sequence() + 1);
    }

    #[test]
    fn failure_records_message_and_no_data() {
        let mut global = GlobalNotes::new();
        global.refresh(&FakeSource::with(vec![note("1", "One", &[])]));
        assert_eq!(global.notes().len(), 1);

        let state = global.refresh(&FakeSource::failing());

        assert_eq!(state.error(), Some("HTTP error: status 503"));
        assert!(global.notes().is_empty());
    }

    #[test]
    fn refresh_is_a_single_attempt() {
        let source = FakeSource::failing();
        let mut global = GlobalNotes::new();

        global.refresh(&source);

        assert_eq!(*source.calls.borrow(), 1);
    }

    #[test]
    fn filtered_and_tag_options_use_loaded_notes() {
        let mut global = GlobalNotes::new();
        global.refresh(&FakeSource::with(vec![
            note("1", "Soup recipe", &["food", "home"]),
            note("2", "Tax return", &["home"]),
            note("3", "Pasta recipe", &["food"]),
        ]));

        assert_eq!(global.tag_options(), vec!["food", "home"]);

        let hits = global.filtered("RECIPE", &["home"]);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "1");

        assert_eq!(global.filtered("", &[] as &[String]).len(), 3);
    }

    #[test]
    fn open_loads_detail_independently_of_list() {
        let source = FakeSource::with(vec![note("1", "One", &[])]);
        let mut global = GlobalNotes::new();

        let state = global.open(&source, "1");
        assert_eq!(state.value().map(|n| n.title.as_str()), Some("One"));
        assert_eq!(global.list_state(), &FetchState::Idle);

        let state = global.open(&source, "missing");
        assert_eq!(state.error(), Some("HTTP error: status 404"));
    }

    #[test]
    fn view_reports_and_toggles_favorite() {
        let store = MemoryStore::new();
        let favorites = Favorites::new(&store);
        let source = FakeSource::with(vec![note("1", "One", &["x"])]);

        let mut view = GlobalNoteView::load(&source, &favorites, "1").unwrap();
        assert!(!view.is_favorite);

        assert!(view.toggle_favorite(&favorites).unwrap());
        assert!(favorites.contains("1").unwrap());

        let reloaded = GlobalNoteView::load(&source, &favorites, "1").unwrap();
        assert!(reloaded.is_favorite);

        assert!(!view.toggle_favorite(&favorites).unwrap());
        assert!(!favorites.contains("1").unwrap());
    }

    #[test]
    fn view_propagates_fetch_failure() {
        let store = MemoryStore::new();
        let favorites = Favorites::new(&store);

        let err = GlobalNoteView::load(&FakeSource::failing(), &favorites, "1").unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
