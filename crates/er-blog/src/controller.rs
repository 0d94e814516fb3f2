//! Blog listing with infinite scroll.
//!
//! [`BlogController::begin`] and [`BlogController::finish`] are synchronous
//! and do all the bookkeeping; [`load`] is the async driver that runs the
//! fetch between them. The controller is expected to live in a `RefCell`
//! and is never borrowed across the fetch.

use std::cell::RefCell;

use er_api_types::PostsQuery;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::adapter::cards_from;
use crate::cursor::Cursor;
use crate::error::FetchError;
use crate::source::{PostsPage, PostsSource};
use crate::token::{LoadMode, RequestSlot, Ticket};
use crate::view::ResultsView;
use crate::watcher::ViewportWatcher;

/// User-facing strings. Technical detail only goes to the log.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub load_error: String,
    pub empty: String,
    pub end: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            load_error: "Could not load posts. Please try again later.".to_owned(),
            empty: "No posts found.".to_owned(),
            end: "You have reached the end.".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LoadingInitial,
    ReadyWatching,
    LoadingAppend,
    EndReached,
    Error,
}

/// What a [`BlogController::finish`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was started.
    Skipped,
    /// The request was superseded or cancelled; nothing changed.
    Discarded,
    Loaded { added: usize, ended: bool },
    Failed { watching: bool },
}

pub struct BlogController<V, W> {
    per_page: u64,
    messages: Messages,
    cursor: Cursor,
    phase: Phase,
    slot: RequestSlot,
    view: Option<V>,
    watcher: W,
    /// Set after a bad request; the watcher is never re-armed.
    stopped: bool,
}

impl<V, W> BlogController<V, W>
where
    V: ResultsView,
    W: ViewportWatcher,
{
    pub fn new(view: V, watcher: W, per_page: u64, messages: Messages) -> Self {
        Self {
            per_page: per_page.max(1),
            messages,
            cursor: Cursor::default(),
            phase: Phase::Idle,
            slot: RequestSlot::default(),
            view: Some(view),
            watcher,
            stopped: false,
        }
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn view(&self) -> Option<&V> {
        self.view.as_ref()
    }

    pub fn watcher(&self) -> &W {
        &self.watcher
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn in_flight(&self) -> bool {
        self.slot.in_flight()
    }

    /// Start a request. Returns `None` when an append is not allowed right now.
    pub fn begin(&mut self, mode: LoadMode) -> Option<Ticket> {
        let view = self.view.as_mut()?;
        match mode {
            LoadMode::Initial => {
                self.cursor.reset();
                self.stopped = false;
                self.watcher.disconnect();
                view.show_skeleton(&er_templates::skeleton(self.per_page as usize));
                self.cursor.is_loading = true;
                self.phase = Phase::LoadingInitial;
                let ticket = self.slot.start(mode, PostsQuery::new(0, self.per_page));
                debug!(ticket = ticket.id, "initial load started");
                Some(ticket)
            }
            LoadMode::Append => {
                let ready = matches!(self.phase, Phase::ReadyWatching | Phase::Error);
                if !ready
                    || self.stopped
                    || self.cursor.is_loading
                    || self.cursor.pending_append
                    || self.cursor.is_complete()
                {
                    return None;
                }
                self.cursor.is_loading = true;
                self.cursor.pending_append = true;
                self.phase = Phase::LoadingAppend;
                let query = PostsQuery::new(self.cursor.loaded_count, self.per_page);
                let ticket = self.slot.start(mode, query);
                debug!(ticket = ticket.id, offset = query.offset, "append started");
                Some(ticket)
            }
        }
    }

    /// Sentinel entered the viewport.
    pub fn on_intersect(&mut self) -> Option<Ticket> {
        self.begin(LoadMode::Append)
    }

    /// Apply the result of `ticket`. Superseded tickets change nothing.
    pub fn finish(&mut self, ticket: &Ticket, result: Result<PostsPage, FetchError>) -> LoadOutcome {
        if !self.slot.finish(ticket.id) || ticket.signal.is_cancelled() {
            debug!(ticket = ticket.id, "stale result discarded");
            return LoadOutcome::Discarded;
        }
        match result {
            Ok(page) => self.apply_page(ticket.mode, page),
            Err(err) if err.is_cancelled() => {
                debug!(ticket = ticket.id, "request cancelled by the source");
                self.apply_cancelled(ticket.mode)
            }
            Err(err) => self.apply_error(ticket.mode, &err),
        }
    }

    fn apply_page(&mut self, mode: LoadMode, page: PostsPage) -> LoadOutcome {
        let Some(view) = self.view.as_mut() else {
            return LoadOutcome::Discarded;
        };
        let returned = page.posts.len();
        let cards = cards_from(&page.posts);

        match mode {
            LoadMode::Initial => {
                view.hide_skeleton();
                self.cursor.record_initial(returned as u64, page.total);
                if cards.is_empty() {
                    view.show_empty(&self.messages.empty);
                } else {
                    view.render_initial(&cards);
                }
            }
            LoadMode::Append => {
                self.cursor.record_append(returned as u64, page.total);
                view.append_posts(&cards);
            }
        }

        let ended = !self.cursor.has_more();
        if self.cursor.is_complete() {
            view.show_end_message(&self.messages.end);
            self.watcher.disconnect();
            self.phase = Phase::EndReached;
            info!(loaded = self.cursor.loaded_count, total = self.cursor.total, "all posts loaded");
        } else if ended {
            // Nothing was ever listed.
            if mode == LoadMode::Append && self.cursor.loaded_count == 0 {
                view.show_empty(&self.messages.empty);
            }
            self.watcher.disconnect();
            self.phase = Phase::EndReached;
        } else {
            // The sentinel may still be in view after the new cards.
            self.watcher.rearm();
            self.phase = Phase::ReadyWatching;
        }
        LoadOutcome::Loaded {
            added: returned,
            ended,
        }
    }

    /// Undo the bookkeeping of `begin` without rendering anything.
    fn apply_cancelled(&mut self, mode: LoadMode) -> LoadOutcome {
        self.cursor.settle();
        match mode {
            LoadMode::Initial => {
                if let Some(view) = self.view.as_mut() {
                    view.hide_skeleton();
                }
                self.phase = Phase::Idle;
            }
            LoadMode::Append => {
                self.watcher.observe();
                self.phase = Phase::ReadyWatching;
            }
        }
        LoadOutcome::Discarded
    }

    fn apply_error(&mut self, mode: LoadMode, err: &FetchError) -> LoadOutcome {
        self.cursor.settle();
        self.phase = Phase::Error;
        let Some(view) = self.view.as_mut() else {
            return LoadOutcome::Discarded;
        };
        if mode == LoadMode::Initial {
            view.hide_skeleton();
        }
        view.show_error(&self.messages.load_error);

        if mode == LoadMode::Append && err.is_bad_request() {
            warn!(%err, offset = self.cursor.loaded_count, "append rejected, pagination stopped");
            self.stopped = true;
            self.watcher.disconnect();
            return LoadOutcome::Failed { watching: false };
        }

        warn!(%err, ?mode, "loading posts failed");
        self.watcher.observe();
        LoadOutcome::Failed { watching: true }
    }

    /// Cancel any request, stop watching and drop the view.
    pub fn teardown(&mut self) {
        self.slot.cancel();
        self.watcher.disconnect();
        self.view = None;
        self.cursor.settle();
        self.phase = Phase::Idle;
    }
}

/// Run one load: begin, fetch without holding the borrow, finish.
pub async fn load<V, W, S>(controller: &RefCell<BlogController<V, W>>, source: &S, mode: LoadMode) -> LoadOutcome
where
    V: ResultsView,
    W: ViewportWatcher,
    S: PostsSource + ?Sized,
{
    let Some(ticket) = controller.borrow_mut().begin(mode) else {
        return LoadOutcome::Skipped;
    };
    let result = source.fetch(ticket.query, ticket.signal.clone()).await;
    controller.borrow_mut().finish(&ticket, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::{ResultsModel, Status};
    use crate::watcher::MemoryWatcher;
    use serde_json::json;

    type Controller = BlogController<ResultsModel, MemoryWatcher>;

    fn controller() -> Controller {
        BlogController::new(ResultsModel::new("none"), MemoryWatcher::default(), 10, Messages::default())
    }

    fn page(from: u64, n: u64, total: Option<u64>) -> PostsPage {
        PostsPage::new((from..from + n).map(|id| json!({ "id": id + 1 })).collect(), total)
    }

    #[test]
    fn append_is_refused_while_loading() {
        let mut c = controller();
        let first = c.begin(LoadMode::Initial).expect("initial");
        assert!(c.on_intersect().is_none());
        c.finish(&first, Ok(page(0, 10, Some(30))));

        let append = c.on_intersect().expect("append");
        assert_eq!(append.query.offset, 10);
        assert!(c.on_intersect().is_none());
    }

    #[test]
    fn superseded_ticket_is_a_no_op() {
        let mut c = controller();
        let a = c.begin(LoadMode::Initial).expect("a");
        let b = c.begin(LoadMode::Initial).expect("b");
        assert!(a.signal.is_cancelled());

        assert_eq!(c.finish(&a, Ok(page(0, 10, Some(10)))), LoadOutcome::Discarded);
        assert_eq!(c.cursor().loaded_count, 0);
        assert_eq!(c.phase(), Phase::LoadingInitial);

        c.finish(&b, Ok(page(0, 3, Some(3))));
        assert_eq!(c.cursor().loaded_count, 3);
        assert_eq!(c.phase(), Phase::EndReached);
    }

    #[test]
    fn empty_first_page_shows_empty_state_without_watching() {
        let mut c = controller();
        let t = c.begin(LoadMode::Initial).expect("initial");
        let outcome = c.finish(&t, Ok(PostsPage::default()));
        assert_eq!(outcome, LoadOutcome::Loaded { added: 0, ended: true });
        assert_eq!(c.view().map(|v| v.status().clone()), Some(Status::Empty(Messages::default().empty)));
        assert!(!c.watcher().is_observing());
        assert!(c.on_intersect().is_none());
    }

    #[test]
    fn teardown_cancels_and_releases() {
        let mut c = controller();
        let t = c.begin(LoadMode::Initial).expect("initial");
        c.teardown();
        assert!(t.signal.is_cancelled());
        assert!(c.view().is_none());
        assert_eq!(c.finish(&t, Ok(page(0, 10, Some(20)))), LoadOutcome::Discarded);
        assert!(c.begin(LoadMode::Initial).is_none());
    }

    #[test]
    fn cancelled_result_is_not_an_empty_page() {
        let mut c = controller();
        let first = c.begin(LoadMode::Initial).expect("initial");
        c.finish(&first, Ok(page(0, 10, Some(30))));

        let append = c.on_intersect().expect("append");
        assert_eq!(c.finish(&append, Err(FetchError::Cancelled)), LoadOutcome::Discarded);
        assert_eq!(c.phase(), Phase::ReadyWatching);
        assert_eq!(c.cursor().loaded_count, 10);
        assert!(!c.cursor().is_loading);
        assert_eq!(c.view().map(|v| v.cards().len()), Some(10));

        let retry = c.on_intersect().expect("retry");
        assert_eq!(retry.query.offset, 10);
    }
}
