// src/store/services.rs

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use super::collection::{CollectionStore, FetchOptions};
use crate::client::ContentApi;
use crate::models::{ListResponse, QueryParams, Service};

pub struct ServicesStore {
    inner: CollectionStore<Service>,
}

impl ServicesStore {
    pub fn new(api: Arc<dyn ContentApi<Service>>, ttl: Duration) -> Self {
        Self {
            inner: CollectionStore::new("ServicesStore", api, ttl),
        }
    }

    pub fn from_collection(inner: CollectionStore<Service>) -> Self {
        Self { inner }
    }

    pub async fn fetch_services(
        &self,
        params: QueryParams,
        options: FetchOptions,
    ) -> Option<ListResponse<Service>> {
        self.inner.fetch(params, options).await
    }

    /// Services per category, each group in display order.
    pub fn services_by_category(&self) -> BTreeMap<String, Vec<Service>> {
        let mut groups = self.items_by_category();
        for services in groups.values_mut() {
            services.sort_by_key(|service| service.display_order);
        }
        groups
    }
}

impl Deref for ServicesStore {
    type Target = CollectionStore<Service>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
