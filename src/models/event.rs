//! Event records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::{Audit, ContentEntity};

/// A scheduled event (conference, workshop, webinar, ...).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: String,
    pub slug: String,
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Calendar day the event takes place
    pub event_date: NaiveDate,

    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub location: Option<String>,

    /// Event type, e.g. `conference` or `webinar`
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub registration_url: Option<String>,

    #[serde(default)]
    pub featured: bool,

    #[serde(flatten)]
    pub audit: Audit,
}

impl Event {
    /// Whether the event starts on or after `today`.
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.event_date >= today
    }
}

impl ContentEntity for Event {
    const PATH: &'static str = "events";
    const PLURAL: &'static str = "events";
    const SINGULAR: &'static str = "event";

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
