//! Query parameters for list endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::entity::PublishStatus;
use crate::error::Result;

/// Pagination, filter and sort options for a list request.
///
/// Serialized in field order; unset fields are omitted from the query
/// string rather than sent empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Free-text query for the search endpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
}

impl QueryParams {
    /// Params for a single page.
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_featured(mut self, featured: bool) -> Self {
        self.featured = Some(featured);
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    /// Encode as a query string without the leading `?`.
    pub fn to_query_string(&self) -> Result<String> {
        Ok(serde_urlencoded::to_string(self)?)
    }

    /// Append the encoded parameters to `path`.
    pub fn append_to(&self, path: &str) -> Result<String> {
        let query = self.to_query_string()?;
        if query.is_empty() {
            return Ok(path.to_string());
        }
        let sep = if path.contains('?') { '&' } else { '?' };
        Ok(format!("{path}{sep}{query}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_pairs(query: &str) -> Vec<(String, String)> {
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn test_query_string_round_trip() {
        let params = QueryParams {
            page: Some(2),
            page_size: Some(25),
            category: Some("policy & law".to_string()),
            status: Some(PublishStatus::Published),
            featured: Some(true),
            date_from: NaiveDate::from_ymd_opt(2025, 1, 1),
            sort_by: Some("-event_date".to_string()),
            ..QueryParams::default()
        };

        let query = params.to_query_string().unwrap();
        let pairs = parse_pairs(&query);

        assert_eq!(
            pairs,
            vec![
                ("page".to_string(), "2".to_string()),
                ("pageSize".to_string(), "25".to_string()),
                ("category".to_string(), "policy & law".to_string()),
                ("status".to_string(), "published".to_string()),
                ("featured".to_string(), "true".to_string()),
                ("dateFrom".to_string(), "2025-01-01".to_string()),
                ("sortBy".to_string(), "-event_date".to_string()),
            ]
        );

        let decoded: QueryParams = serde_urlencoded::from_str(&query).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_absent_keys_omitted() {
        let query = QueryParams::page(1, 10).to_query_string().unwrap();
        assert_eq!(query, "page=1&pageSize=10");
        assert!(!query.contains("undefined"));
        assert!(!query.contains("category"));
    }

    #[test]
    fn test_append_to_path() {
        let params = QueryParams::default();
        assert_eq!(params.append_to("/api/v1/news").unwrap(), "/api/v1/news");

        let params = QueryParams::default().with_featured(true);
        assert_eq!(
            params.append_to("/api/v1/news?x=1").unwrap(),
            "/api/v1/news?x=1&featured=true"
        );
    }
}
