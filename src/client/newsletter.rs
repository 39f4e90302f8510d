// src/client/newsletter.rs

//! Newsletter subscription client.

use async_trait::async_trait;

use super::rest::{RequestOptions, RestClient, encode_segment};
use crate::error::{AppError, Result};
use crate::models::{NewsletterResponse, SubscribeRequest, validate_email};

const SUBSCRIBE_PATH: &str = "/api/newsletter/subscribe";
const UNSUBSCRIBE_PATH: &str = "/api/newsletter/unsubscribe";
const CONFIRM_PATH: &str = "/api/newsletter/confirm";

/// Newsletter operations.
#[async_trait]
pub trait NewsletterApi: Send + Sync {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<NewsletterResponse>;
    async fn unsubscribe(&self, email: &str) -> Result<NewsletterResponse>;
    async fn confirm(&self, token: &str) -> Result<NewsletterResponse>;
}

/// REST client for the newsletter service.
#[derive(Clone)]
pub struct NewsletterClient {
    rest: RestClient,
}

impl NewsletterClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl NewsletterApi for NewsletterClient {
    async fn subscribe(&self, request: &SubscribeRequest) -> Result<NewsletterResponse> {
        request.validate()?;
        let request = SubscribeRequest {
            email: request.email.trim().to_string(),
            ..request.clone()
        };
        let options = RequestOptions::post_json(&request)?;
        self.rest.request(SUBSCRIBE_PATH, options).await
    }

    async fn unsubscribe(&self, email: &str) -> Result<NewsletterResponse> {
        validate_email(email)?;
        let options = RequestOptions::post_json(&serde_json::json!({ "email": email.trim() }))?;
        self.rest.request(UNSUBSCRIBE_PATH, options).await
    }

    async fn confirm(&self, token: &str) -> Result<NewsletterResponse> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::validation("confirmation token is required"));
        }
        let path = format!("{}/{}", CONFIRM_PATH, encode_segment(token));
        self.rest.request(&path, RequestOptions::get()).await
    }
}
