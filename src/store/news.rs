// src/store/news.rs

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use super::collection::{CollectionStore, FetchOptions};
use crate::client::ContentApi;
use crate::models::{ListResponse, NewsArticle, QueryParams};

/// News articles and press releases.
pub struct NewsStore {
    inner: CollectionStore<NewsArticle>,
}

impl NewsStore {
    pub fn new(api: Arc<dyn ContentApi<NewsArticle>>, ttl: Duration) -> Self {
        Self {
            inner: CollectionStore::new("NewsStore", api, ttl),
        }
    }

    pub fn from_collection(inner: CollectionStore<NewsArticle>) -> Self {
        Self { inner }
    }

    pub async fn fetch_news(
        &self,
        params: QueryParams,
        options: FetchOptions,
    ) -> Option<ListResponse<NewsArticle>> {
        self.inner.fetch(params, options).await
    }

    pub fn articles_by_category(&self) -> BTreeMap<String, Vec<NewsArticle>> {
        self.items_by_category()
    }

    /// Up to `n` loaded articles, newest first; undated ones last.
    pub fn latest(&self, n: usize) -> Vec<NewsArticle> {
        let mut articles = self.snapshot().items;
        articles.sort_by_key(|article| Reverse(article.published_at));
        articles.truncate(n);
        articles
    }
}

impl Deref for NewsStore {
    type Target = CollectionStore<NewsArticle>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
