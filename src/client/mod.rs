//! REST clients for the content backend.
//!
//! - `transport`: the HTTP primitive (`Transport`, `ReqwestTransport`)
//! - `rest`: base client with timeout and transport-level retries
//! - `content`: events, news, services and research collections
//! - `newsletter`, `inquiry`: form submission services

mod content;
mod inquiry;
mod newsletter;
mod rest;
pub mod transport;

use std::sync::Arc;

pub use content::{
    ContentApi, ContentClient, EventsClient, NewsClient, ResearchClient, ServicesClient,
};
pub use inquiry::{InquiryApi, InquiryClient};
pub use newsletter::{NewsletterApi, NewsletterClient};
pub use rest::{Backoff, RequestOptions, RestClient, encode_segment};
pub use transport::{HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};

use crate::error::Result;
use crate::models::Config;

/// Every client, each configured from its own `[endpoints.<domain>]` entry.
#[derive(Clone)]
pub struct ApiClients {
    pub events: EventsClient,
    pub news: NewsClient,
    pub services: ServicesClient,
    pub research: ResearchClient,
    pub newsletter: NewsletterClient,
    pub inquiries: InquiryClient,
}

impl ApiClients {
    /// Build all clients over a shared transport.
    pub fn new(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let rest = |domain: &str| RestClient::new(Arc::clone(&transport), &config.endpoint(domain));

        Ok(Self {
            events: ContentClient::new(rest("events")?),
            news: ContentClient::new(rest("news")?),
            services: ContentClient::new(rest("services")?),
            research: ContentClient::new(rest("research")?),
            newsletter: NewsletterClient::new(rest("newsletter")?),
            inquiries: InquiryClient::new(rest("inquiries")?),
        })
    }

    /// Build all clients over a `reqwest` transport.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.api.user_agent)?;
        Self::new(config, Arc::new(transport))
    }
}
