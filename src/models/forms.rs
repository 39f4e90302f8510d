//! Form submissions: newsletter sign-ups and inquiries.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Check an email address for basic shape.
pub fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(AppError::validation("email is required"));
    }
    if !EMAIL.is_match(email.trim()) {
        return Err(AppError::validation(format!("invalid email address: {email}")));
    }
    Ok(())
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Newsletter subscription request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubscribeRequest {
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Page or campaign the sign-up came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SubscribeRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            source: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email)
    }
}

/// Newsletter endpoint reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsletterResponse {
    pub success: bool,

    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub correlation_id: Option<String>,
}

/// Inquiry from a prospective business partner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessInquiry {
    pub name: String,
    pub email: String,
    pub organization: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Service the inquiry is about
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    pub message: String,
}

impl BusinessInquiry {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        validate_email(&self.email)?;
        require("organization", &self.organization)?;
        require("message", &self.message)
    }
}

/// Press or media request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaInquiry {
    pub name: String,
    pub email: String,
    pub outlet: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<chrono::NaiveDate>,

    pub message: String,
}

impl MediaInquiry {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        validate_email(&self.email)?;
        require("outlet", &self.outlet)?;
        require("message", &self.message)
    }
}

/// Donation pledge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DonationInquiry {
    pub name: String,
    pub email: String,

    /// Amount in major currency units
    pub amount: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub recurring: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_currency() -> String {
    "USD".into()
}

impl DonationInquiry {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        validate_email(&self.email)?;
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(AppError::validation("amount must be greater than zero"));
        }
        if self.currency.len() != 3 {
            return Err(AppError::validation(format!(
                "currency must be a 3-letter code, got {:?}",
                self.currency
            )));
        }
        Ok(())
    }
}

/// Reply to an inquiry submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InquiryResponse {
    pub id: String,

    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub correlation_id: Option<String>,
}
