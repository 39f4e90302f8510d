// src/store/collection.rs

//! Caching store for one content collection.
//!
//! A store owns the last fetched page, pagination, loading/error flags and a
//! private TTL cache. State is published through a watch channel: callers
//! take snapshots or subscribe to changes, and only the store's own actions
//! write it.
//!
//! Every list, item and search request carries a generation token. A result
//! whose token is no longer the latest issued one is returned to its caller
//! but never applied to state, so a slow superseded request cannot overwrite
//! a faster later one.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use super::cache::{TtlCache, cache_key};
use super::clock::{Clock, SystemClock};
use crate::client::ContentApi;
use crate::error::{AppError, Result};
use crate::models::{ContentEntity, ItemResponse, ListResponse, QueryParams};
use crate::resilience::{ErrorContext, ErrorHandler, RetryOptions};

/// Page size assumed when a request does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Group key for records without a category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Group records by category, keeping their relative order.
pub fn group_by_category<T: ContentEntity>(
    items: impl IntoIterator<Item = T>,
) -> BTreeMap<String, Vec<T>> {
    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for item in items {
        let key = item.category().unwrap_or(UNCATEGORIZED).to_string();
        groups.entry(key).or_default().push(item);
    }
    groups
}

/// Coarse store lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Snapshot of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,

    /// Item loaded by slug or id
    pub current: Option<T>,
    pub featured: Vec<T>,

    pub search_results: Vec<T>,
    pub search_total: u64,
    pub search_query: String,

    pub loading: bool,
    pub error: Option<String>,

    /// Fingerprint of the request behind `items`
    pub cache_key: Option<String>,
    pub last_fetched: Option<DateTime<Utc>>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            current: None,
            featured: Vec::new(),
            search_results: Vec::new(),
            search_total: 0,
            search_query: String::new(),
            loading: false,
            error: None,
            cache_key: None,
            last_fetched: None,
        }
    }
}

impl<T> StoreState<T> {
    pub fn status(&self) -> LoadStatus {
        if self.loading {
            LoadStatus::Loading
        } else if self.error.is_some() {
            LoadStatus::Error
        } else if self.last_fetched.is_some() {
            LoadStatus::Ready
        } else {
            LoadStatus::Idle
        }
    }

    /// `ceil(total / page_size)`
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }

    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn has_next_page(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

/// Per-call fetch options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Serve a fresh cached result instead of calling the backend
    pub use_cache: bool,
}

impl FetchOptions {
    pub fn cached() -> Self {
        Self { use_cache: true }
    }

    pub fn fresh() -> Self {
        Self { use_cache: false }
    }
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::cached()
    }
}

/// List request kinds that populate `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ListRequest {
    All { params: QueryParams },
    Category { category: String, params: QueryParams },
    Published { params: QueryParams },
}

impl ListRequest {
    pub fn params(&self) -> &QueryParams {
        match self {
            ListRequest::All { params }
            | ListRequest::Category { params, .. }
            | ListRequest::Published { params } => params,
        }
    }

    fn action(&self) -> &'static str {
        match self {
            ListRequest::All { .. } => "list",
            ListRequest::Category { .. } => "list_by_category",
            ListRequest::Published { .. } => "list_published",
        }
    }

    fn dispatch<'a, T: ContentEntity>(
        &'a self,
        api: &'a dyn ContentApi<T>,
    ) -> BoxFuture<'a, Result<ListResponse<T>>> {
        match self {
            ListRequest::All { params } => api.list(params),
            ListRequest::Category { category, params } => api.list_by_category(category, params),
            ListRequest::Published { params } => api.list_published(params),
        }
    }
}

/// Caching store over a [`ContentApi`].
pub struct CollectionStore<T: ContentEntity> {
    name: String,
    api: Arc<dyn ContentApi<T>>,
    clock: Arc<dyn Clock>,
    state: watch::Sender<StoreState<T>>,
    lists: Mutex<TtlCache<ListResponse<T>>>,
    items: Mutex<TtlCache<ItemResponse<T>>>,
    list_generation: AtomicU64,
    item_generation: AtomicU64,
    search_generation: AtomicU64,
    featured_generation: AtomicU64,
    in_flight: AtomicUsize,
    /// Bumped whenever the caches are dropped
    cache_epoch: AtomicU64,
    last_request: Mutex<Option<ListRequest>>,
    last_error: Mutex<Option<AppError>>,
    resilience: Option<(ErrorHandler, RetryOptions)>,
}

impl<T: ContentEntity> CollectionStore<T> {
    pub fn new(name: impl Into<String>, api: Arc<dyn ContentApi<T>>, ttl: Duration) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            name: name.into(),
            api,
            clock: Arc::new(SystemClock),
            state,
            lists: Mutex::new(TtlCache::new(ttl)),
            items: Mutex::new(TtlCache::new(ttl)),
            list_generation: AtomicU64::new(0),
            item_generation: AtomicU64::new(0),
            search_generation: AtomicU64::new(0),
            featured_generation: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            cache_epoch: AtomicU64::new(0),
            last_request: Mutex::new(None),
            last_error: Mutex::new(None),
            resilience: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Route every backend call through `handler` with `options`.
    pub fn with_error_handling(mut self, handler: ErrorHandler, options: RetryOptions) -> Self {
        self.resilience = Some((handler, options));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> StoreState<T> {
        self.state.borrow().clone()
    }

    /// Receive a notification on every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState<T>> {
        self.state.subscribe()
    }

    /// Load a page of the collection.
    pub async fn fetch(&self, params: QueryParams, options: FetchOptions) -> Option<ListResponse<T>> {
        self.fetch_list(ListRequest::All { params }, options).await
    }

    /// Load a page of one category.
    pub async fn fetch_by_category(
        &self,
        category: impl Into<String>,
        params: QueryParams,
        options: FetchOptions,
    ) -> Option<ListResponse<T>> {
        let request = ListRequest::Category {
            category: category.into(),
            params,
        };
        self.fetch_list(request, options).await
    }

    /// Load a page of published records only.
    pub async fn fetch_published(
        &self,
        params: QueryParams,
        options: FetchOptions,
    ) -> Option<ListResponse<T>> {
        self.fetch_list(ListRequest::Published { params }, options)
            .await
    }

    /// Re-issue the most recent list request, bypassing the cache.
    pub async fn retry_last(&self) -> Option<ListResponse<T>> {
        let request = self.last_request.lock().clone()?;
        self.fetch_list(request, FetchOptions::fresh()).await
    }

    /// Load a page, applying it to state unless superseded.
    ///
    /// Failures are recorded in `error` and yield `None`; the previously
    /// loaded items stay in place.
    pub async fn fetch_list(
        &self,
        request: ListRequest,
        options: FetchOptions,
    ) -> Option<ListResponse<T>> {
        let key = cache_key(&format!("{}.{}", T::PATH, request.action()), &request);
        let token = self.list_generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.last_request.lock() = Some(request.clone());

        if options.use_cache {
            let cached = self.lists.lock().get(&key);
            if let Some(page) = cached {
                log::debug!("{}: serving {} from cache", self.name, request.action());
                self.apply_page(&request, &key, &page);
                return Some(page);
            }
        }

        self.begin();
        let epoch = self.cache_epoch.load(Ordering::SeqCst);
        let api = self.api.as_ref();
        let req = &request;
        let result = self
            .call(request.action(), move || req.dispatch(api))
            .await;

        if let Ok(page) = &result {
            self.cache_if_current(&self.lists, epoch, &key, page);
        }

        let latest = self.list_generation.load(Ordering::SeqCst) == token;
        self.finish(|state| {
            if !latest {
                return;
            }
            match &result {
                Ok(page) => Self::write_page(state, &request, &key, page, self.clock.now()),
                Err(error) => state.error = Some(error.to_string()),
            }
        });
        if !latest {
            log::debug!("{}: discarding superseded {} result", self.name, request.action());
        }

        self.settle(result)
    }

    /// Load one record by slug into `current`.
    pub async fn fetch_by_slug(&self, slug: &str, options: FetchOptions) -> Option<T> {
        let key = cache_key(&format!("{}.get_by_slug", T::PATH), slug);
        let token = self.item_generation.fetch_add(1, Ordering::SeqCst) + 1;

        if options.use_cache {
            let cached = self.items.lock().get(&key);
            if let Some(item) = cached {
                let now = self.clock.now();
                self.state.send_modify(|state| {
                    state.current = Some(item.item.clone());
                    state.error = None;
                    state.last_fetched = Some(now);
                });
                return Some(item.item);
            }
        }

        self.begin();
        let epoch = self.cache_epoch.load(Ordering::SeqCst);
        let api = self.api.as_ref();
        let result = self.call("get_by_slug", move || api.get_by_slug(slug)).await;

        if let Ok(item) = &result {
            self.cache_if_current(&self.items, epoch, &key, item);
        }

        let latest = self.item_generation.load(Ordering::SeqCst) == token;
        self.finish(|state| {
            if !latest {
                return;
            }
            match &result {
                Ok(item) => {
                    state.current = Some(item.item.clone());
                    state.last_fetched = Some(self.clock.now());
                }
                Err(error) => state.error = Some(error.to_string()),
            }
        });

        self.settle(result).map(|item| item.item)
    }

    /// Load featured records into `featured`.
    pub async fn fetch_featured(&self, params: QueryParams) -> Option<Vec<T>> {
        let token = self.featured_generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.begin();
        let api = self.api.as_ref();
        let params = &params;
        let result = self
            .call("list_featured", move || api.list_featured(params))
            .await;

        let latest = self.featured_generation.load(Ordering::SeqCst) == token;
        self.finish(|state| {
            if !latest {
                return;
            }
            match &result {
                Ok(page) => state.featured = page.items.clone(),
                Err(error) => state.error = Some(error.to_string()),
            }
        });

        self.settle(result).map(|page| page.items)
    }

    /// Full-text search into `search_results`.
    ///
    /// An empty query clears the results without calling the backend.
    pub async fn search(&self, query: &str, params: QueryParams) -> Option<ListResponse<T>> {
        let token = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim();

        if query.is_empty() {
            self.state.send_modify(|state| {
                state.search_results.clear();
                state.search_total = 0;
                state.search_query.clear();
            });
            return Some(ListResponse::default());
        }

        self.begin();
        let api = self.api.as_ref();
        let params = &params;
        let result = self
            .call("search", move || api.search(query, params))
            .await;

        let latest = self.search_generation.load(Ordering::SeqCst) == token;
        self.finish(|state| {
            if !latest {
                return;
            }
            match &result {
                Ok(page) => {
                    state.search_results = page.items.clone();
                    state.search_total = page.count;
                    state.search_query = query.to_string();
                }
                Err(error) => state.error = Some(error.to_string()),
            }
        });

        self.settle(result)
    }

    /// Forget every cached result; the next fetch goes to the network.
    pub fn invalidate_cache(&self) {
        self.cache_epoch.fetch_add(1, Ordering::SeqCst);
        self.lists.lock().clear();
        self.items.lock().clear();
        self.state.send_if_modified(|state| state.cache_key.take().is_some());
        log::debug!("{}: cache invalidated", self.name);
    }

    /// Current items grouped by category; missing categories group under
    /// [`UNCATEGORIZED`].
    pub fn items_by_category(&self) -> BTreeMap<String, Vec<T>> {
        group_by_category(self.state.borrow().items.iter().cloned())
    }

    /// Most recent failure, with its classification intact.
    pub fn last_error(&self) -> Option<AppError> {
        self.last_error.lock().clone()
    }

    pub fn clear_error(&self) {
        *self.last_error.lock() = None;
        self.state
            .send_if_modified(|state| state.error.take().is_some());
    }

    /// Back to the initial state; in-flight results are discarded.
    pub fn reset(&self) {
        for generation in [
            &self.list_generation,
            &self.item_generation,
            &self.search_generation,
            &self.featured_generation,
        ] {
            generation.fetch_add(1, Ordering::SeqCst);
        }
        self.cache_epoch.fetch_add(1, Ordering::SeqCst);
        self.lists.lock().clear();
        self.items.lock().clear();
        *self.last_request.lock() = None;
        *self.last_error.lock() = None;
        let in_flight = self.in_flight.load(Ordering::SeqCst);
        self.state.send_replace(StoreState {
            loading: in_flight > 0,
            ..StoreState::default()
        });
    }

    async fn call<R, F, Fut>(&self, action: &str, mut operation: F) -> Result<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R>>,
    {
        match &self.resilience {
            Some((handler, options)) => {
                let context = ErrorContext::new(self.name.as_str(), action);
                handler.run(&context, options, operation).await
            }
            None => operation().await,
        }
    }

    /// Cache `value` unless the caches were dropped since `epoch` was read.
    fn cache_if_current<V: Clone>(
        &self,
        cache: &Mutex<TtlCache<V>>,
        epoch: u64,
        key: &str,
        value: &V,
    ) {
        let mut cache = cache.lock();
        if self.cache_epoch.load(Ordering::SeqCst) != epoch {
            log::debug!("{}: not caching result fetched before invalidation", self.name);
            return;
        }
        cache.insert(key.to_string(), value.clone());
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            state.loading = true;
            state.error = None;
        });
    }

    fn finish(&self, apply: impl FnOnce(&mut StoreState<T>)) {
        self.state.send_modify(|state| {
            let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
            state.loading = remaining > 0;
            apply(state);
        });
    }

    fn settle<R>(&self, result: Result<R>) -> Option<R> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                log::warn!("{}: request failed: {}", self.name, error);
                *self.last_error.lock() = Some(error);
                None
            }
        }
    }

    fn apply_page(&self, request: &ListRequest, key: &str, page: &ListResponse<T>) {
        let now = self.clock.now();
        self.state
            .send_modify(|state| Self::write_page(state, request, key, page, now));
    }

    fn write_page(
        state: &mut StoreState<T>,
        request: &ListRequest,
        key: &str,
        page: &ListResponse<T>,
        now: DateTime<Utc>,
    ) {
        let params = request.params();
        state.items = page.items.clone();
        state.total = page.count;
        state.page = params.page.unwrap_or(1);
        state.page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        state.cache_key = Some(key.to_string());
        state.error = None;
        state.last_fetched = Some(now);
    }
}
