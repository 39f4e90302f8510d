//! News article records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Audit, ContentEntity};

/// A news article or press release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewsArticle {
    pub id: String,
    pub slug: String,
    pub title: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub featured: bool,

    #[serde(flatten)]
    pub audit: Audit,
}

impl ContentEntity for NewsArticle {
    const PATH: &'static str = "news";
    const PLURAL: &'static str = "news";
    const SINGULAR: &'static str = "article";

    fn id(&self) -> &str {
        &self.id
    }

    fn slug(&self) -> &str {
        &self.slug
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn audit(&self) -> &Audit {
        &self.audit
    }
}
