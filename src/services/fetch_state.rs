//! Reactive state for one paginated catalog query.
//!
//! A [`FetchController`] binds a fetch function to a dependency value (a search
//! string, a genre id, ...). Changing the dependency restarts from page 1,
//! [`FetchController::load_more`] appends the next page, and
//! [`FetchController::refetch`] replaces the data with a fresh page 1.
//!
//! Only the most recently issued request may settle the state. Starting a new
//! request cancels the previous one's token and bumps a generation counter, so
//! a slow response arriving after a newer request is dropped on the floor.
//! Dropping an operation's future cancels its request and clears `loading`.

use futures_util::future::BoxFuture;
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;
use crate::models::Paged;

/// Snapshot of one query's state
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState<T> {
    pub data: Option<Vec<T>>,
    pub loading: bool,
    pub error: Option<String>,
    pub page: u32,
    pub total_pages: u32,
    pub has_more: bool,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            page: 0,
            total_pages: 0,
            has_more: false,
        }
    }
}

/// How a controller operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the state
    Committed,
    /// The fetch failed; `error` is set and prior data is untouched
    Failed,
    /// A newer request (or teardown) took over before this one settled
    Superseded,
    /// Nothing to do: no more pages, already loading, or nothing bound
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Replace,
    Append,
}

type Fetcher<D, T> = Arc<dyn Fn(D, u32) -> BoxFuture<'static, AppResult<Paged<T>>> + Send + Sync>;

struct Inner<D, T> {
    state: QueryState<T>,
    deps: Option<D>,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

pub struct FetchController<D, T> {
    fetcher: Fetcher<D, T>,
    inner: Mutex<Inner<D, T>>,
}

impl<D, T> FetchController<D, T>
where
    D: Clone + PartialEq + Send + 'static,
    T: Clone + Send + 'static,
{
    /// Creates an unbound controller around `fetch(deps, page)`
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn(D, u32) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Paged<T>>> + Send + 'static,
    {
        Self {
            fetcher: Arc::new(move |deps, page| Box::pin(fetch(deps, page))),
            inner: Mutex::new(Inner {
                state: QueryState::default(),
                deps: None,
                generation: 0,
                in_flight: None,
            }),
        }
    }

    fn inner(&self) -> MutexGuard<'_, Inner<D, T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current state snapshot
    pub fn state(&self) -> QueryState<T> {
        self.inner().state.clone()
    }

    /// Binds the query to `deps`, fetching page 1 when they differ from the
    /// currently bound value.
    pub async fn bind(&self, deps: D) -> FetchOutcome {
        {
            let mut inner = self.inner();
            if inner.deps.as_ref() == Some(&deps) {
                return FetchOutcome::Skipped;
            }
            inner.deps = Some(deps.clone());
            // Paging info belongs to the old deps until page 1 of the new ones lands.
            inner.state.page = 1;
            inner.state.total_pages = 0;
            inner.state.has_more = false;
            inner.state.error = None;
        }
        self.run(deps, 1, Mode::Replace).await
    }

    /// Fetches the next page in append mode.
    pub async fn load_more(&self) -> FetchOutcome {
        let (deps, next_page) = {
            let inner = self.inner();
            if !inner.state.has_more || inner.state.loading {
                return FetchOutcome::Skipped;
            }
            match &inner.deps {
                Some(deps) => (deps.clone(), inner.state.page + 1),
                None => return FetchOutcome::Skipped,
            }
        };
        self.run(deps, next_page, Mode::Append).await
    }

    /// Re-fetches page 1 in replace mode for the bound dependencies.
    ///
    /// Whether the fetch hits the network is up to the fetch function and
    /// whatever cache it consults.
    pub async fn refetch(&self) -> FetchOutcome {
        let deps = match &self.inner().deps {
            Some(deps) => deps.clone(),
            None => return FetchOutcome::Skipped,
        };
        self.run(deps, 1, Mode::Replace).await
    }

    /// Cancels the in-flight request, if any, leaving data untouched.
    pub fn cancel(&self) {
        let mut inner = self.inner();
        if let Some(token) = inner.in_flight.take() {
            token.cancel();
            inner.generation += 1;
            inner.state.loading = false;
        }
    }

    async fn run(&self, deps: D, page: u32, mode: Mode) -> FetchOutcome {
        let (token, generation) = {
            let mut inner = self.inner();
            if let Some(previous) = inner.in_flight.take() {
                previous.cancel();
            }
            inner.generation += 1;
            let token = CancellationToken::new();
            inner.in_flight = Some(token.clone());
            inner.state.loading = true;
            (token, inner.generation)
        };
        let mut guard = InFlightGuard {
            inner: &self.inner,
            generation,
            armed: true,
        };

        let fetch = (self.fetcher)(deps, page);
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!(page, "Fetch superseded before completion");
                return FetchOutcome::Superseded;
            }
            result = fetch => result,
        };
        guard.armed = false;

        let mut inner = self.inner();
        if inner.generation != generation || token.is_cancelled() {
            tracing::debug!(page, "Dropping stale fetch result");
            return FetchOutcome::Superseded;
        }
        inner.in_flight = None;

        match result {
            Ok(paged) => {
                let state = &mut inner.state;
                match (mode, state.data.as_mut()) {
                    (Mode::Append, Some(existing)) => existing.extend(paged.results),
                    _ => state.data = Some(paged.results),
                }
                state.loading = false;
                state.error = None;
                state.page = page;
                state.total_pages = paged.total_pages;
                state.has_more = page < paged.total_pages;
                FetchOutcome::Committed
            }
            Err(e) if e.is_cancellation() => {
                inner.state.loading = false;
                FetchOutcome::Superseded
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "Fetch failed, keeping previous data");
                inner.state.loading = false;
                inner.state.error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }
}

/// Releases the request slot when a `run` future is dropped before it settles
struct InFlightGuard<'a, D, T> {
    inner: &'a Mutex<Inner<D, T>>,
    generation: u64,
    armed: bool,
}

impl<D, T> Drop for InFlightGuard<'_, D, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.generation != self.generation {
            return;
        }
        if let Some(token) = inner.in_flight.take() {
            token.cancel();
        }
        inner.state.loading = false;
        tracing::debug!("Fetch dropped before completion");
    }
}
