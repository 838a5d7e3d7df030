//! The discovery feed screen's state machine.
//!
//! `Idle -> Loading -> Loaded`, going back to `Loading` on exhaustion, on a
//! like, on a focus-triggered reload, or on manual refresh. Every operation
//! leaves the controller in a retryable `Loaded` state; failures are logged
//! and reported through outcomes and notices, never returned as errors.

use sqlx::SqlitePool;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::models::{CandidateRecord, Coordinate, SearchRequest};
use crate::services::candidate_queue::CandidateQueue;
use crate::services::location_service::{self, LocationResolver};
use crate::services::matching_api_service::MatchingApi;
use crate::services::notification_service::{FeedNotice, Notifier};
use crate::services::search_parameter_service;
use crate::services::signal_service::{self, FeedSignal, FocusAction};

/// Why a completed load left the queue empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The backend answered with no candidates.
    NoCandidates,
    /// No stored, profile or device coordinate was available; no search ran.
    NoCoordinate,
    /// The search request failed.
    BackendUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    Empty(EmptyReason),
    /// Another load was already in flight.
    Dropped,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FocusOutcome {
    Unchanged,
    Reloaded(LoadOutcome),
    HeadRemoved {
        removed: Option<CandidateRecord>,
        refill: Option<LoadOutcome>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    /// `id` was not in the queue; nothing was sent.
    NotPending,
    Liked { delivered: bool, reload: LoadOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// Only the head candidate can be skipped.
    NotHead,
    Skipped {
        delivered: bool,
        refill: Option<LoadOutcome>,
    },
}

/// Snapshot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueState {
    pub items: Vec<CandidateRecord>,
    pub loading: bool,
    pub loaded: bool,
    pub empty_reason: Option<EmptyReason>,
}

impl QueueState {
    /// The empty screen is shown only after a load finished with nothing.
    pub fn shows_empty_state(&self) -> bool {
        self.loaded && !self.loading && self.items.is_empty()
    }
}

#[derive(Default)]
struct FeedState {
    queue: CandidateQueue,
    empty_reason: Option<EmptyReason>,
}

pub struct MatchingFeedController {
    pool: SqlitePool,
    api: Arc<dyn MatchingApi>,
    resolver: LocationResolver,
    notifier: Arc<dyn Notifier>,
    // Set at construction, cleared by the first load, never reset while mounted.
    first_search: AtomicBool,
    // Held for the whole of a load; plain loads give up if it is taken.
    load_lock: tokio::sync::Mutex<()>,
    loading: AtomicBool,
    state: Mutex<FeedState>,
}

/// Clears the loading flag however the load ends.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl MatchingFeedController {
    pub fn new(
        pool: SqlitePool,
        api: Arc<dyn MatchingApi>,
        resolver: LocationResolver,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            pool,
            api,
            resolver,
            notifier,
            first_search: AtomicBool::new(true),
            load_lock: tokio::sync::Mutex::new(()),
            loading: AtomicBool::new(false),
            state: Mutex::new(FeedState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> QueueState {
        let state = self.state();
        QueueState {
            items: state.queue.items().cloned().collect(),
            loading: self.loading.load(Ordering::Acquire),
            loaded: state.queue.is_loaded(),
            empty_reason: state.empty_reason,
        }
    }

    /// Screen mounted: a remove-top request left from an earlier session
    /// refers to a queue that no longer exists, so it is dropped before the
    /// first load.
    pub async fn mount(&self) -> LoadOutcome {
        let stale = FeedSignal::QueueHeadRemoveRequested;
        if let Err(e) = signal_service::clear(&self.pool, stale).await {
            warn!("📣 Clearing stale remove-top signal failed: {}", e);
        }
        self.initial_load().await
    }

    /// Pull-to-refresh.
    pub async fn refresh(&self) -> LoadOutcome {
        self.initial_load().await
    }

    /// Resolves location (first load only), reads filters, runs the search and
    /// replaces the queue with the result. A call arriving while another load
    /// is in flight is dropped, so an older response can never overwrite a
    /// newer one.
    pub async fn initial_load(&self) -> LoadOutcome {
        let Ok(permit) = self.load_lock.try_lock() else {
            debug!("🔄 Load already in flight, dropping request");
            return LoadOutcome::Dropped;
        };
        self.load(permit).await
    }

    /// Like `initial_load`, but waits for an in-flight load to land first.
    /// That load may have searched before a mutation, so its result cannot
    /// stand in for this one.
    async fn reload_after(&self) -> LoadOutcome {
        let permit = self.load_lock.lock().await;
        self.load(permit).await
    }

    async fn load(&self, _permit: tokio::sync::MutexGuard<'_, ()>) -> LoadOutcome {
        self.loading.store(true, Ordering::Release);
        let _guard = LoadingGuard(&self.loading);

        let (items, empty_reason) = self.fetch_candidates().await;
        let outcome = match empty_reason {
            Some(reason) => LoadOutcome::Empty(reason),
            None => LoadOutcome::Loaded(items.len()),
        };

        let mut state = self.state();
        state.queue.load(items);
        state.empty_reason = empty_reason;
        info!("🔄 Feed loaded: {:?}", outcome);
        outcome
    }

    async fn fetch_candidates(&self) -> (Vec<CandidateRecord>, Option<EmptyReason>) {
        let profile = match self.api.self_profile().await {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("👤 Self-profile fetch failed, continuing with stored data: {}", e);
                None
            }
        };

        let mut coordinate = location_service::load_cached_coordinate(&self.pool).await;
        if coordinate.is_none() {
            coordinate = profile.as_ref().and_then(|p| p.coordinate());
            if let Some(reused) = &coordinate {
                self.persist(reused).await;
            }
        }

        if self.first_search.swap(false, Ordering::AcqRel) {
            let timeout_override =
                search_parameter_service::load_gps_timeout_override(&self.pool).await;
            match self
                .resolver
                .resolve(coordinate.is_some(), timeout_override)
                .await
            {
                Ok(fresh) => {
                    self.persist(&fresh).await;
                    coordinate = Some(fresh);
                }
                Err(e) => {
                    info!("📍 Location unavailable: {}", e);
                    self.notifier.notify(FeedNotice::from(e));
                }
            }
        }

        let Some(coordinate) = coordinate else {
            return (Vec::new(), Some(EmptyReason::NoCoordinate));
        };

        let params = search_parameter_service::load_search_parameters(&self.pool).await;
        let request = SearchRequest::build(&params, &coordinate, profile.as_ref());
        match self.api.search(&request).await {
            Ok(items) if items.is_empty() => (items, Some(EmptyReason::NoCandidates)),
            Ok(items) => (items, None),
            Err(e) => {
                warn!("🔎 Search failed: {}", e);
                (Vec::new(), Some(EmptyReason::BackendUnavailable))
            }
        }
    }

    async fn persist(&self, coordinate: &Coordinate) {
        if let Err(e) = location_service::persist_coordinate(&self.pool, coordinate).await {
            warn!("📍 Persisting coordinate failed: {}", e);
        }
    }

    /// Screen gained focus: consume cross-screen signals and act on them.
    pub async fn refresh_on_focus(&self) -> FocusOutcome {
        // The head on display when focus returned is the one acted on elsewhere.
        let shown = self.state().queue.head().map(|c| c.id.clone());
        let pending = signal_service::peek_and_clear(&self.pool).await;
        match pending.resolve() {
            FocusAction::Nothing => FocusOutcome::Unchanged,
            FocusAction::Reload => FocusOutcome::Reloaded(self.initial_load().await),
            FocusAction::RemoveHead => {
                // An in-flight load would overwrite the removal; wait for it and
                // only remove the shown candidate if the new queue still leads
                // with it.
                let (removed, exhausted) = {
                    let _permit = self.load_lock.lock().await;
                    match &shown {
                        Some(id) => self.remove_head_if(id),
                        None => (None, self.state().queue.is_empty()),
                    }
                };
                let refill = if exhausted {
                    Some(self.initial_load().await)
                } else {
                    None
                };
                FocusOutcome::HeadRemoved { removed, refill }
            }
        }
    }

    /// Removes the head if it is `id`; reports whether the queue is now empty.
    fn remove_head_if(&self, id: &str) -> (Option<CandidateRecord>, bool) {
        let mut state = self.state();
        let removed = if state.queue.head().is_some_and(|c| c.id == id) {
            state.queue.remove_head()
        } else {
            None
        };
        (removed, state.queue.is_empty())
    }

    /// Likes a pending candidate, optionally with a message, then refetches
    /// the whole feed whatever the backend answered. The refetch is never
    /// dropped: it queues behind a load already in flight.
    pub async fn like(&self, id: &str, message: Option<&str>) -> LikeOutcome {
        let pending = self.state().queue.contains(id);
        if !pending {
            debug!("💗 Like for {} ignored, not pending", id);
            return LikeOutcome::NotPending;
        }

        let delivered = match self.api.like(id, message).await {
            Ok(()) => true,
            Err(e) => {
                warn!("💗 Like for {} failed: {}", id, e);
                false
            }
        };
        LikeOutcome::Liked {
            delivered,
            reload: self.reload_after().await,
        }
    }

    /// Hides the head candidate. Unlike `like`, the queue advances locally and
    /// is only refetched once it runs out.
    pub async fn skip(&self, id: &str) -> SkipOutcome {
        let is_head = self.state().queue.head().is_some_and(|c| c.id == id);
        if !is_head {
            return SkipOutcome::NotHead;
        }

        let delivered = match self.api.hide(id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("🙈 Hide for {} failed: {}", id, e);
                false
            }
        };

        // The head may have moved while the request was in flight.
        let (_, exhausted) = self.remove_head_if(id);
        let refill = if exhausted {
            Some(self.initial_load().await)
        } else {
            None
        };
        SkipOutcome::Skipped { delivered, refill }
    }
}
