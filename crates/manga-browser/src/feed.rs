//! Feed controller: filter state, loading guard and the fetch-and-render cycle.
//!
//! One controller drives one feed. The top-ranked listing and the filtered
//! browse listing are the same controller with a different [`FeedConfig`].
//!
//! Triggers take `&self`, so several of them can be in flight on one task.
//! While a cycle runs, the loading flag drops any other cycle start. Resetting
//! triggers bump a generation counter; a cycle whose generation moved on
//! while it waited discards its response and fetches again with the current
//! filters.

use crate::api::{get_page, CatalogTransport, MangaEntry, PaginatedResponse, RetryPolicy};
use crate::error::{FetchError, FilterError, FETCH_FAILED_MESSAGE};
use crate::filter::{FilterInput, FilterState};
use crate::query::{build_url, FeedKind};
use crate::render::{MangaCard, RenderSink};
use shared::Config;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

/// Static description of a feed
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub kind: FeedKind,
    pub base_url: String,
    pub page_size: u32,
    /// Filter state on construction and after a reset
    pub defaults: FilterState,
    /// Whether page 1 updates the result count display
    pub reports_total: bool,
    pub retry: RetryPolicy,
}

impl FeedConfig {
    /// Top-ranked listing
    pub fn top(config: &Config) -> Self {
        Self {
            kind: FeedKind::Top,
            base_url: config.api.base_url.clone(),
            page_size: config.api.page_size,
            defaults: FilterState::with_sort(&config.feeds.top_sort, ""),
            reports_total: false,
            retry: RetryPolicy::from(&config.retry),
        }
    }

    /// Filtered search listing
    pub fn browse(config: &Config) -> Self {
        Self {
            kind: FeedKind::Browse,
            base_url: config.api.base_url.clone(),
            page_size: config.api.page_size,
            defaults: FilterState::with_sort(
                &config.feeds.browse_order_by,
                &config.feeds.browse_sort,
            ),
            reports_total: true,
            retry: RetryPolicy::from(&config.retry),
        }
    }
}

struct FeedState {
    filters: FilterState,
    generation: u64,
}

/// Controller for one feed
pub struct FeedController<T, S> {
    config: FeedConfig,
    transport: T,
    sink: Mutex<S>,
    state: Mutex<FeedState>,
    loading: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Held for the whole fetch cycle; dropping it restores the idle UI.
struct CycleGuard<'a, S: RenderSink> {
    loading: &'a AtomicBool,
    sink: &'a Mutex<S>,
    show_loading: bool,
}

impl<S: RenderSink> Drop for CycleGuard<'_, S> {
    fn drop(&mut self) {
        {
            let mut sink = lock(self.sink);
            if self.show_loading {
                sink.set_loading(false);
            }
            sink.set_load_more_enabled(true);
        }
        self.loading.store(false, Ordering::Release);
    }
}

impl<T: CatalogTransport, S: RenderSink> FeedController<T, S> {
    pub fn new(config: FeedConfig, transport: T, sink: S) -> Self {
        let filters = config.defaults.clone();
        Self {
            config,
            transport,
            sink: Mutex::new(sink),
            state: Mutex::new(FeedState {
                filters,
                generation: 0,
            }),
            loading: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> FeedKind {
        self.config.kind
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether a fetch cycle is in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Snapshot of the current filter state
    pub fn filters(&self) -> FilterState {
        lock(&self.state).filters.clone()
    }

    /// Run `f` against the render sink
    pub fn with_sink<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut lock(&self.sink))
    }

    /// First load when the feed is opened
    pub async fn initial_load(&self) {
        self.run(true).await;
    }

    /// Fetch the next page and append it. Dropped while a cycle is running.
    pub async fn load_more(&self) {
        let Some(guard) = self.begin(false) else {
            return;
        };
        lock(&self.state).filters.page += 1;
        self.drive(guard).await;
    }

    /// Free-text search from the search field
    pub async fn search(&self, text: &str) {
        self.restart(|filters| filters.q = text.trim().to_string());
        self.run(true).await;
    }

    /// Sort selection changed (the top feed's filter dropdown)
    pub async fn change_sort(&self, sort: &str) {
        self.restart(|filters| filters.order_by = sort.to_string());
        self.run(true).await;
    }

    /// Take over all filter widgets and reload.
    ///
    /// Invalid input is reported before anything is cleared or fetched.
    pub async fn apply_filters(&self, input: &FilterInput) -> Result<(), FilterError> {
        let mut next = self.filters();
        next.apply(input)?;
        self.restart(|filters| *filters = next);
        self.run(true).await;
        Ok(())
    }

    /// Back to the feed's default filters
    pub async fn reset_filters(&self) {
        let defaults = self.config.defaults.clone();
        self.restart(|filters| *filters = defaults);
        self.run(true).await;
    }

    /// Run one fetch cycle unless one is already in flight
    pub async fn run(&self, show_loading: bool) {
        if let Some(guard) = self.begin(show_loading) {
            self.drive(guard).await;
        }
    }

    /// Mutate the filters, go back to page 1 and clear the grid
    fn restart(&self, update: impl FnOnce(&mut FilterState)) {
        {
            let mut state = lock(&self.state);
            update(&mut state.filters);
            state.filters.page = 1;
            state.generation += 1;
        }

        let mut sink = lock(&self.sink);
        sink.clear();
        if self.config.reports_total {
            sink.set_count(0);
        }
    }

    fn begin(&self, show_loading: bool) -> Option<CycleGuard<'_, S>> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(feed = self.config.kind.as_str(), "Fetch already in flight, ignoring");
            return None;
        }

        {
            let mut sink = lock(&self.sink);
            if show_loading {
                sink.set_loading(true);
            }
            sink.set_load_more_enabled(false);
        }

        Some(CycleGuard {
            loading: &self.loading,
            sink: &self.sink,
            show_loading,
        })
    }

    async fn drive<'a>(&'a self, mut guard: CycleGuard<'a, S>) {
        let feed = self.config.kind.as_str();

        loop {
            let (url, page, generation) = {
                let state = lock(&self.state);
                let url = build_url(
                    &self.config.base_url,
                    self.config.kind,
                    &state.filters,
                    self.config.page_size,
                );
                (url, state.filters.page, state.generation)
            };

            let result = get_page(&self.transport, &url, &self.config.retry).await;

            match self.finish(guard, generation, page, &url, result) {
                Some(stale) => {
                    debug!(feed, url = %url, "Filters changed during fetch, refetching");
                    guard = stale;
                }
                None => return,
            }
        }
    }

    /// Settle a fetched page and end the cycle, or hand the guard back when a
    /// resetting trigger moved the generation since the request was built.
    ///
    /// The state lock is held until the guard is released: a restart either
    /// lands before the check and gets refetched, or after the loading flag
    /// is clear and starts its own cycle.
    fn finish<'a>(
        &'a self,
        guard: CycleGuard<'a, S>,
        generation: u64,
        page: u32,
        url: &str,
        result: Result<PaginatedResponse<MangaEntry>, FetchError>,
    ) -> Option<CycleGuard<'a, S>> {
        let state = lock(&self.state);
        if state.generation != generation {
            return Some(guard);
        }

        if let Err(e) = result.and_then(|response| self.render_page(page, response)) {
            error!(feed = self.config.kind.as_str(), url = %url, error = %e, "Error fetching manga");
            let mut sink = lock(&self.sink);
            sink.show_error(FETCH_FAILED_MESSAGE);
            if self.config.reports_total {
                sink.set_count(0);
            }
        }

        drop(guard);
        drop(state);
        None
    }

    fn render_page(
        &self,
        page: u32,
        response: PaginatedResponse<MangaEntry>,
    ) -> Result<(), FetchError> {
        let total = if self.config.reports_total && page == 1 {
            let items = response
                .pagination
                .items
                .as_ref()
                .ok_or(FetchError::Malformed("pagination.items missing"))?;
            Some(items.total)
        } else {
            None
        };

        let cards: Vec<MangaCard> = response.data.iter().map(MangaCard::from).collect();

        info!(
            feed = self.config.kind.as_str(),
            page,
            cards = cards.len(),
            has_next_page = response.pagination.has_next_page,
            "Rendering page"
        );

        let mut sink = lock(&self.sink);
        if let Some(total) = total {
            sink.set_count(total);
        }
        sink.present(&cards);
        sink.set_load_more_visible(response.pagination.has_next_page);

        Ok(())
    }
}
