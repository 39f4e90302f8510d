// src/client/inquiry.rs

//! Inquiry submission client (business, media, donations).
//!
//! Submissions are POSTs and therefore never retried by the base client.

use async_trait::async_trait;

use super::rest::{RequestOptions, RestClient};
use crate::error::Result;
use crate::models::{BusinessInquiry, DonationInquiry, InquiryResponse, MediaInquiry};

const INQUIRIES_PATH: &str = "/api/v1/inquiries";

/// Inquiry submission operations.
#[async_trait]
pub trait InquiryApi: Send + Sync {
    async fn submit_business(&self, inquiry: &BusinessInquiry) -> Result<InquiryResponse>;
    async fn submit_media(&self, inquiry: &MediaInquiry) -> Result<InquiryResponse>;
    async fn submit_donation(&self, inquiry: &DonationInquiry) -> Result<InquiryResponse>;
}

/// REST client for the inquiry services.
#[derive(Clone)]
pub struct InquiryClient {
    rest: RestClient,
}

impl InquiryClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    async fn submit<B: serde::Serialize + Sync>(
        &self,
        kind: &str,
        body: &B,
    ) -> Result<InquiryResponse> {
        let path = format!("{INQUIRIES_PATH}/{kind}");
        let response: InquiryResponse = self
            .rest
            .request(&path, RequestOptions::post_json(body)?)
            .await?;
        log::info!("Submitted {} inquiry {}", kind, response.id);
        Ok(response)
    }
}

#[async_trait]
impl InquiryApi for InquiryClient {
    async fn submit_business(&self, inquiry: &BusinessInquiry) -> Result<InquiryResponse> {
        inquiry.validate()?;
        self.submit("business", inquiry).await
    }

    async fn submit_media(&self, inquiry: &MediaInquiry) -> Result<InquiryResponse> {
        inquiry.validate()?;
        self.submit("media", inquiry).await
    }

    async fn submit_donation(&self, inquiry: &DonationInquiry) -> Result<InquiryResponse> {
        inquiry.validate()?;
        self.submit("donations", inquiry).await
    }
}
