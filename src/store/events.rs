// src/store/events.rs

//! Events store with date-window views.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use super::clock::Clock;
use super::collection::{CollectionStore, FetchOptions};
use crate::client::ContentApi;
use crate::models::{Event, ListResponse, QueryParams};

pub struct EventsStore {
    inner: CollectionStore<Event>,
}

impl EventsStore {
    pub fn new(api: Arc<dyn ContentApi<Event>>, ttl: Duration) -> Self {
        Self {
            inner: CollectionStore::new("EventsStore", api, ttl),
        }
    }

    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: self.inner.with_clock(clock),
        }
    }

    pub fn from_collection(inner: CollectionStore<Event>) -> Self {
        Self { inner }
    }

    pub async fn fetch_events(
        &self,
        params: QueryParams,
        options: FetchOptions,
    ) -> Option<ListResponse<Event>> {
        self.inner.fetch(params, options).await
    }

    /// Loaded events on or after today, soonest first.
    pub fn upcoming_events(&self) -> Vec<Event> {
        let today = self.clock().today();
        let mut events: Vec<Event> = self
            .snapshot()
            .items
            .into_iter()
            .filter(|event| event.is_upcoming(today))
            .collect();
        events.sort_by_key(|event| event.event_date);
        events
    }

    /// Loaded events before today, most recent first.
    pub fn past_events(&self) -> Vec<Event> {
        let today = self.clock().today();
        let mut events: Vec<Event> = self
            .snapshot()
            .items
            .into_iter()
            .filter(|event| !event.is_upcoming(today))
            .collect();
        events.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        events
    }

    pub fn events_by_category(&self) -> BTreeMap<String, Vec<Event>> {
        self.items_by_category()
    }
}

impl Deref for EventsStore {
    type Target = CollectionStore<Event>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::clock::FixedClock;
    use crate::store::collection::testing::{FakeApi, page};
    use chrono::NaiveDate;

    fn event(slug: &str, date: &str, category: Option<&str>) -> Event {
        serde_json::from_value(serde_json::json!({
            "id": slug,
            "slug": slug,
            "title": slug,
            "event_date": date,
            "category": category,
        }))
        .unwrap()
    }

    fn store(api: FakeApi<Event>) -> EventsStore {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        EventsStore::new(Arc::new(api), Duration::from_secs(300))
            .with_clock(Arc::new(FixedClock::on(today)))
    }

    #[tokio::test]
    async fn test_upcoming_and_past_split_on_today() {
        let future = event("launch", "2025-06-01", Some("conference"));
        let past = event("retro", "2023-06-01", None);
        let store = store(FakeApi::new().reply(page(vec![future.clone(), past.clone()], 2)));

        store
            .fetch_events(QueryParams::page(1, 10), FetchOptions::fresh())
            .await
            .unwrap();

        assert_eq!(store.upcoming_events(), vec![future]);
        assert_eq!(store.past_events(), vec![past]);
    }

    #[tokio::test]
    async fn test_event_today_counts_as_upcoming() {
        let today = event("today", "2024-06-01", None);
        let store = store(FakeApi::new().reply(page(vec![today.clone()], 1)));

        store
            .fetch_events(QueryParams::default(), FetchOptions::fresh())
            .await;

        assert_eq!(store.upcoming_events(), vec![today]);
        assert!(store.past_events().is_empty());
    }

    #[tokio::test]
    async fn test_views_follow_state() {
        let store = store(
            FakeApi::new()
                .reply(page(
                    vec![
                        event("a", "2025-01-01", Some("webinar")),
                        event("b", "2025-02-01", Some("conference")),
                        event("c", "2023-02-01", None),
                    ],
                    3,
                ))
                .reply(page(vec![], 0)),
        );

        store
            .fetch_events(QueryParams::page(1, 10), FetchOptions::fresh())
            .await;
        let groups = store.events_by_category();
        assert_eq!(
            groups.keys().collect::<Vec<_>>(),
            vec!["conference", "uncategorized", "webinar"]
        );
        assert_eq!(store.upcoming_events().len(), 2);

        store
            .fetch_events(QueryParams::page(2, 10), FetchOptions::fresh())
            .await;
        assert!(store.upcoming_events().is_empty());
        assert!(store.events_by_category().is_empty());
    }
}
