//! Per-domain caching stores.
//!
//! Stores sit between the REST clients and the rendering layer. Each one
//! keeps the last fetched page, pagination and loading/error flags, serves
//! repeated fetches from a private TTL cache, and exposes derived views
//! computed from its current state on every access.
//!
//! Stores are plain values built through [`Stores::new`]; there is no global
//! instance.

mod cache;
mod clock;
mod collection;
mod events;
mod news;
mod research;
mod services;

use std::sync::Arc;

pub use cache::{DEFAULT_TTL, TtlCache, cache_key};
pub use clock::{Clock, FixedClock, SystemClock};
pub use collection::{
    CollectionStore, DEFAULT_PAGE_SIZE, FetchOptions, ListRequest, LoadStatus, StoreState,
    UNCATEGORIZED, group_by_category,
};
pub use events::EventsStore;
pub use news::NewsStore;
pub use research::ResearchStore;
pub use services::ServicesStore;

use crate::client::{ApiClients, ContentApi, Transport};
use crate::error::Result;
use crate::models::{Config, ContentEntity, Event, NewsArticle, ResearchArticle, Service};
use crate::resilience::{ErrorHandler, RetryOptions};

/// One isolated store per content domain.
#[derive(Clone)]
pub struct Stores {
    pub events: Arc<EventsStore>,
    pub news: Arc<NewsStore>,
    pub services: Arc<ServicesStore>,
    pub research: Arc<ResearchStore>,
}

impl Stores {
    /// Build fresh stores over `transport`, each with its own cache.
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        StoresBuilder::new(config).build(transport)
    }

    /// Like [`Stores::new`], with every fetch routed through `handler`
    /// using the `[retry]` settings.
    pub fn with_error_handling(
        config: &Config,
        transport: Arc<dyn Transport>,
        handler: ErrorHandler,
    ) -> Result<Self> {
        StoresBuilder::new(config)
            .error_handler(handler)
            .build(transport)
    }
}

/// Optional collaborators shared by every store.
pub struct StoresBuilder<'a> {
    config: &'a Config,
    clock: Arc<dyn Clock>,
    handler: Option<ErrorHandler>,
}

impl<'a> StoresBuilder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            handler: None,
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn build(self, transport: Arc<dyn Transport>) -> Result<Stores> {
        let clients = ApiClients::new(self.config, transport)?;
        log::debug!(
            "Creating stores (cache ttl {:?}, error handling {})",
            self.config.cache.ttl(),
            if self.handler.is_some() { "on" } else { "off" }
        );

        Ok(Stores {
            events: Arc::new(EventsStore::from_collection(
                self.collection::<Event>("EventsStore", Arc::new(clients.events)),
            )),
            news: Arc::new(NewsStore::from_collection(
                self.collection::<NewsArticle>("NewsStore", Arc::new(clients.news)),
            )),
            services: Arc::new(ServicesStore::from_collection(
                self.collection::<Service>("ServicesStore", Arc::new(clients.services)),
            )),
            research: Arc::new(ResearchStore::from_collection(
                self.collection::<ResearchArticle>("ResearchStore", Arc::new(clients.research)),
            )),
        })
    }

    fn collection<T: ContentEntity>(
        &self,
        name: &str,
        api: Arc<dyn ContentApi<T>>,
    ) -> CollectionStore<T> {
        let store = CollectionStore::new(name, api, self.config.cache.ttl())
            .with_clock(Arc::clone(&self.clock));
        match &self.handler {
            Some(handler) => {
                store.with_error_handling(handler.clone(), RetryOptions::from(&self.config.retry))
            }
            None => store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::testing::MockTransport;
    use crate::models::QueryParams;
    use chrono::NaiveDate;
    use serde_json::json;

    fn config() -> Config {
        let mut config = Config::default();
        config.api.base_url = "https://api.example.org".to_string();
        config
    }

    #[tokio::test]
    async fn test_stores_are_isolated() {
        let transport = Arc::new(MockTransport::new().json(
            200,
            json!({"events": [{"id": "1", "slug": "s", "title": "t", "event_date": "2025-06-01"}], "count": 1}),
        ));
        let first = Stores::new(&config(), transport.clone()).unwrap();
        let second = Stores::new(&config(), transport.clone()).unwrap();

        first
            .events
            .fetch_events(QueryParams::page(1, 10), FetchOptions::cached())
            .await
            .unwrap();
        second
            .events
            .fetch_events(QueryParams::page(1, 10), FetchOptions::cached())
            .await
            .unwrap();

        assert_eq!(transport.call_count(), 2);
        assert!(second.news.snapshot().items.is_empty());
        assert_eq!(
            transport.last_url().as_deref(),
            Some("https://api.example.org/api/v1/events?page=1&pageSize=10")
        );
    }

    #[tokio::test]
    async fn test_builder_injects_clock() {
        let transport = Arc::new(MockTransport::new().json(
            200,
            json!({"events": [{"id": "1", "slug": "s", "title": "t", "event_date": "2024-05-31"}], "count": 1}),
        ));
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let stores = StoresBuilder::new(&config())
            .clock(Arc::new(FixedClock::on(today)))
            .build(transport)
            .unwrap();

        stores
            .events
            .fetch_events(QueryParams::default(), FetchOptions::fresh())
            .await;

        assert_eq!(stores.events.past_events().len(), 1);
        assert!(stores.events.upcoming_events().is_empty());
    }
}
