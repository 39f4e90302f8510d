// src/store/research.rs

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;

use super::collection::{CollectionStore, FetchOptions};
use crate::client::ContentApi;
use crate::models::{ListResponse, QueryParams, ResearchArticle};

/// Research papers, reports and briefs.
pub struct ResearchStore {
    inner: CollectionStore<ResearchArticle>,
}

impl ResearchStore {
    pub fn new(api: Arc<dyn ContentApi<ResearchArticle>>, ttl: Duration) -> Self {
        Self {
            inner: CollectionStore::new("ResearchStore", api, ttl),
        }
    }

    pub fn from_collection(inner: CollectionStore<ResearchArticle>) -> Self {
        Self { inner }
    }

    pub async fn fetch_research(
        &self,
        params: QueryParams,
        options: FetchOptions,
    ) -> Option<ListResponse<ResearchArticle>> {
        self.inner.fetch(params, options).await
    }

    pub fn articles_by_category(&self) -> BTreeMap<String, Vec<ResearchArticle>> {
        self.items_by_category()
    }

    /// Articles per publication year. Unpublished articles are left out.
    pub fn articles_by_year(&self) -> BTreeMap<i32, Vec<ResearchArticle>> {
        let mut years: BTreeMap<i32, Vec<ResearchArticle>> = BTreeMap::new();
        for article in self.snapshot().items {
            if let Some(published_at) = article.published_at {
                years.entry(published_at.year()).or_default().push(article);
            }
        }
        years
    }
}

impl Deref for ResearchStore {
    type Target = CollectionStore<ResearchArticle>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::collection::testing::{FakeApi, page};

    fn article(slug: &str, category: Option<&str>, published_at: Option<&str>) -> ResearchArticle {
        serde_json::from_value(serde_json::json!({
            "id": slug,
            "slug": slug,
            "title": slug,
            "abstract": "",
            "category": category,
            "published_at": published_at,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_grouped_by_year_and_category() {
        let api = FakeApi::new().reply(page(
            vec![
                article("a", Some("policy"), Some("2023-03-01T00:00:00Z")),
                article("b", Some("policy"), Some("2024-07-15T00:00:00Z")),
                article("c", None, Some("2024-01-02T00:00:00Z")),
                article("draft", None, None),
            ],
            4,
        ));
        let store = ResearchStore::new(Arc::new(api), Duration::from_secs(300));

        store
            .fetch_research(QueryParams::default(), FetchOptions::fresh())
            .await;

        let years = store.articles_by_year();
        assert_eq!(years.keys().copied().collect::<Vec<_>>(), vec![2023, 2024]);
        assert_eq!(years[&2024].len(), 2);

        let categories = store.articles_by_category();
        assert_eq!(categories["policy"].len(), 2);
        assert_eq!(categories["uncategorized"].len(), 2);
    }
}
