// src/models/mod.rs

//! Domain models for the content client.
//!
//! Entities, query parameters, wire envelopes, form payloads and
//! configuration, organized by their primary purpose.

mod config;
mod entity;
mod envelope;
mod event;
mod forms;
mod news;
mod query;
mod research;
mod service;

// Re-export all public types
pub use config::{
    ApiConfig, CacheConfig, Config, ENV_BASE_URL, ENV_CACHE_TTL_SECS, ENV_RETRY_ATTEMPTS,
    ENV_TIMEOUT_MS, EndpointConfig, EndpointOverride, RetryConfig,
};
pub use entity::{Audit, ContentEntity, PublishStatus};
pub use envelope::{ErrorBody, ItemResponse, ListResponse};
pub use event::Event;
pub use forms::{
    BusinessInquiry, DonationInquiry, InquiryResponse, MediaInquiry, NewsletterResponse,
    SubscribeRequest, validate_email,
};
pub use news::NewsArticle;
pub use query::QueryParams;
pub use research::ResearchArticle;
pub use service::Service;
