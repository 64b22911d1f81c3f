//! Infinite-scroll archive pagination.
//!
//! `ArchiveStore` walks the archive backwards one [`DateWindow`] at a time.
//! A continuation signal (the scroll sentinel becoming visible) starts a
//! fetch only when no fetch is in flight, the archive is not exhausted, and
//! no search query is active. An empty page is the only end-of-archive
//! signal; a failed fetch leaves the store untouched so a later signal can
//! retry the same window.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::cursor::{earliest_date, first_window, window_before, DateWindow};
use super::filter::filter_by_title;
use crate::client::ApodApi;
use crate::error::Result;
use crate::models::MediaItem;

/// Coarse state for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStatus {
    /// Nothing loaded yet.
    Pending,
    /// Pages loaded, more may be available.
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// An empty page was received; terminal.
    Exhausted,
}

/// What the loader row under the grid shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Footer {
    /// Hidden while a search is active.
    Hidden,
    Receiving,
    EndOfArchive,
    /// Idle sentinel waiting to become visible.
    Sentinel,
}

impl Footer {
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Footer::Hidden | Footer::Sentinel => None,
            Footer::Receiving => Some("Receiving Data Stream..."),
            Footer::EndOfArchive => Some("End of Archive"),
        }
    }
}

/// Ticket for an in-flight fetch, consumed by [`ArchiveStore::finish`].
#[derive(Debug, PartialEq, Eq)]
pub struct PendingFetch {
    id: u64,
    window: DateWindow,
}

impl PendingFetch {
    pub fn window(&self) -> DateWindow {
        self.window
    }
}

/// Result of applying a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// This many in-window entries were appended (possibly zero).
    Appended(usize),
    /// The page was empty; no further fetches will be made.
    Exhausted,
    /// The request failed; state is unchanged and the window will be retried.
    Failed,
    /// The ticket does not belong to the current in-flight fetch.
    Stale,
}

/// Accumulated archive pages plus pagination state.
#[derive(Debug, Default)]
pub struct ArchiveStore {
    pages: Vec<Vec<MediaItem>>,
    cursor: Option<NaiveDate>,
    exhausted: bool,
    in_flight: Option<u64>,
    next_id: u64,
    query: String,
}

impl ArchiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages in fetch order, each as received.
    pub fn pages(&self) -> &[Vec<MediaItem>] {
        &self.pages
    }

    /// Earliest date consumed so far, `None` before the first page.
    pub fn cursor(&self) -> Option<NaiveDate> {
        self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Update the search query. A non-empty query pauses continuation.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Window the next fetch would request.
    pub fn next_window(&self, today: NaiveDate) -> DateWindow {
        match self.cursor {
            None => first_window(today),
            Some(earliest) => window_before(earliest),
        }
    }

    /// Handle a continuation signal.
    ///
    /// Returns the fetch to perform, or `None` when the signal is ignored.
    pub fn begin_continue(&mut self, today: NaiveDate) -> Option<PendingFetch> {
        if self.is_fetching() {
            debug!("Continuation ignored: fetch already in flight");
            return None;
        }
        if self.exhausted {
            debug!("Continuation ignored: archive exhausted");
            return None;
        }
        if !self.query.is_empty() {
            debug!("Continuation paused by search query '{}'", self.query);
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.in_flight = Some(id);

        let window = self.next_window(today);
        debug!("Fetching archive window {}", window);
        Some(PendingFetch { id, window })
    }

    /// Apply the result of a fetch started by [`begin_continue`](Self::begin_continue).
    pub fn finish(&mut self, pending: PendingFetch, result: Result<Vec<MediaItem>>) -> FetchOutcome {
        if self.in_flight != Some(pending.id) {
            warn!("Dropping result for stale archive fetch {}", pending.window);
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(page) if page.is_empty() => {
                self.exhausted = true;
                info!("Archive exhausted at window {}", pending.window);
                FetchOutcome::Exhausted
            }
            Ok(mut page) => {
                let received = page.len();
                page.retain(|item| item.date <= pending.window.end);
                if page.len() < received {
                    warn!(
                        "Dropped {} entries dated after window {}",
                        received - page.len(),
                        pending.window
                    );
                }

                // Only ever moves backwards: everything kept is on or before window.end.
                self.cursor = Some(earliest_date(&page).unwrap_or(pending.window.start));
                let count = page.len();
                if count > 0 {
                    self.pages.push(page);
                }
                debug!(
                    "Appended {} entries from {}, {} loaded",
                    count,
                    pending.window,
                    self.len()
                );
                FetchOutcome::Appended(count)
            }
            Err(e) => {
                warn!("Archive fetch for {} failed: {}", pending.window, e);
                FetchOutcome::Failed
            }
        }
    }

    /// Run one continuation against `api`. `None` if the signal was ignored.
    pub async fn try_continue<A>(&mut self, api: &A, today: NaiveDate) -> Option<FetchOutcome>
    where
        A: ApodApi + ?Sized,
    {
        let pending = self.begin_continue(today)?;
        let result = api.fetch_range(pending.window()).await;
        Some(self.finish(pending, result))
    }

    /// All loaded entries, in fetch order.
    pub fn items(&self) -> impl Iterator<Item = &MediaItem> {
        self.pages.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries matching the current query.
    pub fn visible(&self) -> Vec<&MediaItem> {
        filter_by_title(self.items(), &self.query)
    }

    /// Look up a loaded entry by date.
    pub fn find(&self, date: NaiveDate) -> Option<&MediaItem> {
        self.items().find(|item| item.date == date)
    }

    pub fn status(&self) -> ArchiveStatus {
        if self.exhausted {
            ArchiveStatus::Exhausted
        } else if self.is_fetching() {
            ArchiveStatus::Fetching
        } else if self.pages.is_empty() {
            ArchiveStatus::Pending
        } else {
            ArchiveStatus::Idle
        }
    }

    pub fn footer(&self) -> Footer {
        if !self.query.is_empty() {
            Footer::Hidden
        } else if self.is_fetching() {
            Footer::Receiving
        } else if self.exhausted {
            Footer::EndOfArchive
        } else {
            Footer::Sentinel
        }
    }

    pub fn stats(&self) -> ArchiveStats {
        ArchiveStats {
            loaded: self.len(),
            pages: self.pages.len(),
        }
    }
}

/// Loaded-entry counts for the archive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStats {
    pub loaded: usize,
    pub pages: usize,
}

impl ArchiveStats {
    /// Header line describing how much has been loaded.
    pub fn summary(&self) -> String {
        format!("Exploring {} captured moments from the universe.", self.loaded)
    }
}
