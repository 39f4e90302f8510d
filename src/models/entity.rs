//! Fields and behavior shared by every content entity.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Publishing lifecycle of a content record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublishStatus {
    Draft,
    #[default]
    Published,
    Archived,
}

/// Audit trail carried by every record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Audit {
    #[serde(default)]
    pub status: PublishStatus,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub created_by: Option<String>,

    #[serde(default)]
    pub updated_by: Option<String>,

    /// Soft-delete flag
    #[serde(default)]
    pub is_deleted: bool,
}

/// A record served by one of the content endpoints.
///
/// The associated constants describe the wire layout: `PATH` is the
/// collection segment under `/api/v1/`, `PLURAL`/`SINGULAR` are the
/// envelope keys of list and single-item responses.
pub trait ContentEntity: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    const PATH: &'static str;
    const PLURAL: &'static str;
    const SINGULAR: &'static str;

    fn id(&self) -> &str;
    fn slug(&self) -> &str;
    fn category(&self) -> Option<&str>;
    fn audit(&self) -> &Audit;

    /// Visible to readers: published and not soft-deleted.
    fn is_visible(&self) -> bool {
        let audit = self.audit();
        audit.status == PublishStatus::Published && !audit.is_deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        let status: PublishStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status, PublishStatus::Archived);
        assert_eq!(
            serde_json::to_string(&PublishStatus::Draft).unwrap(),
            "\"draft\""
        );
    }

    #[test]
    fn test_audit_defaults_when_absent() {
        let audit: Audit = serde_json::from_str("{}").unwrap();
        assert_eq!(audit.status, PublishStatus::Published);
        assert!(!audit.is_deleted);
        assert!(audit.created_at.is_none());
    }
}
