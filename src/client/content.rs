// src/client/content.rs

//! Domain REST clients for the content collections.
//!
//! Each operation maps typed parameters to exactly one HTTP call through
//! [`RestClient`]. No caching happens here, and no retries beyond what the
//! base client does.

use std::marker::PhantomData;

use async_trait::async_trait;

use super::rest::{RequestOptions, RestClient, encode_segment};
use crate::error::{AppError, Result};
use crate::models::{
    ContentEntity, Event, ItemResponse, ListResponse, NewsArticle, QueryParams, ResearchArticle,
    Service,
};

/// Read operations offered by every content collection.
#[async_trait]
pub trait ContentApi<T: ContentEntity>: Send + Sync {
    /// `GET /api/v1/<domain>`
    async fn list(&self, params: &QueryParams) -> Result<ListResponse<T>>;

    /// `GET /api/v1/<domain>/slug/{slug}`
    async fn get_by_slug(&self, slug: &str) -> Result<ItemResponse<T>>;

    /// `GET /api/v1/<domain>/{id}`
    async fn get_by_id(&self, id: &str) -> Result<ItemResponse<T>>;

    /// `GET /api/v1/<domain>/category/{category}`
    async fn list_by_category(
        &self,
        category: &str,
        params: &QueryParams,
    ) -> Result<ListResponse<T>>;

    /// `GET /api/v1/<domain>/search?q=...`
    async fn search(&self, query: &str, params: &QueryParams) -> Result<ListResponse<T>>;

    /// `GET /api/v1/<domain>/published`
    async fn list_published(&self, params: &QueryParams) -> Result<ListResponse<T>>;

    /// `GET /api/v1/<domain>?featured=true`
    async fn list_featured(&self, params: &QueryParams) -> Result<ListResponse<T>>;
}

/// REST client for one content collection.
#[derive(Clone)]
pub struct ContentClient<T> {
    rest: RestClient,
    _entity: PhantomData<fn() -> T>,
}

pub type EventsClient = ContentClient<Event>;
pub type NewsClient = ContentClient<NewsArticle>;
pub type ServicesClient = ContentClient<Service>;
pub type ResearchClient = ContentClient<ResearchArticle>;

impl<T: ContentEntity> ContentClient<T> {
    pub fn new(rest: RestClient) -> Self {
        Self {
            rest,
            _entity: PhantomData,
        }
    }

    /// Collection root, e.g. `/api/v1/events`.
    pub fn collection_path() -> String {
        format!("/api/v1/{}", T::PATH)
    }

    fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation(format!(
                "{} {} is required",
                T::SINGULAR,
                field
            )));
        }
        Ok(trimmed)
    }

    async fn fetch_list(&self, path: &str, params: &QueryParams) -> Result<ListResponse<T>> {
        let path = params.append_to(path)?;
        let value = self.rest.request_value(&path, RequestOptions::get()).await?;
        ListResponse::from_envelope(value)
    }

    async fn fetch_item(&self, path: &str) -> Result<ItemResponse<T>> {
        let value = self.rest.request_value(path, RequestOptions::get()).await?;
        ItemResponse::from_envelope(value)
    }
}

#[async_trait]
impl<T: ContentEntity> ContentApi<T> for ContentClient<T> {
    async fn list(&self, params: &QueryParams) -> Result<ListResponse<T>> {
        self.fetch_list(&Self::collection_path(), params).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<ItemResponse<T>> {
        let slug = Self::required("slug", slug)?;
        let path = format!("{}/slug/{}", Self::collection_path(), encode_segment(slug));
        self.fetch_item(&path).await
    }

    async fn get_by_id(&self, id: &str) -> Result<ItemResponse<T>> {
        let id = Self::required("id", id)?;
        let path = format!("{}/{}", Self::collection_path(), encode_segment(id));
        self.fetch_item(&path).await
    }

    async fn list_by_category(
        &self,
        category: &str,
        params: &QueryParams,
    ) -> Result<ListResponse<T>> {
        let category = Self::required("category", category)?;
        let path = format!(
            "{}/category/{}",
            Self::collection_path(),
            encode_segment(category)
        );
        self.fetch_list(&path, params).await
    }

    async fn search(&self, query: &str, params: &QueryParams) -> Result<ListResponse<T>> {
        let query = Self::required("search query", query)?;
        let params = params.clone().with_query(query);
        let path = format!("{}/search", Self::collection_path());
        self.fetch_list(&path, &params).await
    }

    async fn list_published(&self, params: &QueryParams) -> Result<ListResponse<T>> {
        let path = format!("{}/published", Self::collection_path());
        self.fetch_list(&path, params).await
    }

    async fn list_featured(&self, params: &QueryParams) -> Result<ListResponse<T>> {
        let params = params.clone().with_featured(true);
        self.fetch_list(&Self::collection_path(), &params).await
    }
}
