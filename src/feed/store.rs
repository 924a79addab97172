//! Feed state and refresh orchestration

use super::FeedFetcher;
use crate::error::{Error, ErrorCategory, FetchError, Result};
use crate::types::{Event, FeedState};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Holds the last fetched articles and the fetch status
///
/// Overlapping refreshes are neither deduplicated nor cancelled: whichever
/// completes last determines the state. `is_loading` stays true until every
/// in-flight fetch has completed.
pub struct FeedStore {
    fetcher: FeedFetcher,
    state: watch::Sender<FeedState>,
    event_tx: broadcast::Sender<Event>,
    in_flight: AtomicUsize,
    requested: AtomicBool,
}

impl FeedStore {
    /// Create an idle store
    pub fn new(fetcher: FeedFetcher, event_tx: broadcast::Sender<Event>) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        Self {
            fetcher,
            state,
            event_tx,
            in_flight: AtomicUsize::new(0),
            requested: AtomicBool::new(false),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn watch(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Fetch the feed now and replace the stored articles
    ///
    /// Returns the number of articles received. The fetch runs on its own task,
    /// so dropping the returned future does not cancel it.
    pub async fn refresh(self: &Arc<Self>) -> Result<usize> {
        self.begin();
        match self.spawn_fetch().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Feed fetch task aborted");
                self.complete(Err(FetchError::Aborted))
            }
        }
    }

    /// Start a background refresh unless the feed was already requested
    ///
    /// Loading is flagged before this returns, so a view rendered right after
    /// shows the loading state. Returns whether a fetch was started.
    pub fn ensure_loaded(self: &Arc<Self>) -> bool {
        if self.requested.swap(true, Ordering::SeqCst) {
            return false;
        }

        self.begin();
        // failures are already recorded in state
        drop(self.spawn_fetch());
        true
    }

    fn spawn_fetch(self: &Arc<Self>) -> JoinHandle<Result<usize>> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = store.fetcher.fetch_feed().await;
            store.complete(outcome)
        })
    }

    fn begin(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.state.send_modify(|state| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            state.is_loading = true;
            state.error = None;
        });
        self.emit(Event::FeedLoading);
    }

    fn complete(
        &self,
        outcome: std::result::Result<Vec<crate::types::Article>, FetchError>,
    ) -> Result<usize> {
        let finished = |state: &mut FeedState| {
            let remaining = self
                .in_flight
                .fetch_sub(1, Ordering::SeqCst)
                .saturating_sub(1);
            state.is_loading = remaining > 0;
        };

        match outcome {
            Ok(articles) => {
                let count = articles.len();
                self.state.send_modify(|state| {
                    finished(state);
                    state.articles = articles;
                    state.error = None;
                    state.last_fetched = Some(Utc::now());
                });
                info!(count, url = %self.fetcher.url(), "Feed loaded");
                self.emit(Event::FeedLoaded { count });
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, url = %self.fetcher.url(), "Feed fetch failed");
                self.state.send_modify(|state| {
                    finished(state);
                    state.articles.clear();
                    state.error = Some(ErrorCategory::FetchFailed);
                });
                self.emit(Event::FeedFailed {
                    category: ErrorCategory::FetchFailed,
                });
                Err(Error::Fetch(e))
            }
        }
    }

    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
