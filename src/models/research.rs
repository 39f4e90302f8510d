//! Research publication records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Audit, ContentEntity};

/// A research paper, report or brief.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResearchArticle {
    pub id: String,
    pub slug: String,
    pub title: String,

    #[serde(default, rename = "abstract")]
    pub summary: String,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub document_url: Option<String>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub featured: bool,

    #[serde(flatten)]
    pub audit: Audit,
}

impl ContentEntity for ResearchArticle {
    const PATH: &'static str = "research";
    const PLURAL: &'static str = "research";
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
