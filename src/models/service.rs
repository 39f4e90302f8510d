//! Service offering records.

use serde::{Deserialize, Serialize};

use super::entity::{Audit, ContentEntity};

/// A service offered by the organization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub id: String,
    pub slug: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub features: Vec<String>,

    /// Ordering hint for listings; lower first
    #[serde(default)]
    pub display_order: i32,

    #[serde(default)]
    pub featured: bool,

    #[serde(flatten)]
    pub audit: Audit,
}

impl ContentEntity for Service {
    const PATH: &'static str = "services";
    const PLURAL: &'static str = "services";
    const SINGULAR: &'static str = "service";

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
