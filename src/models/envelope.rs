//! Response envelopes returned by the content backend.
//!
//! List endpoints answer `{ <plural>: [...], count, correlation_id }`,
//! single-item endpoints answer `{ <singular>: {...}, correlation_id }`.
//! The collection key differs per domain, so envelopes are decoded from a
//! JSON value with the key supplied by [`ContentEntity`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::ContentEntity;
use crate::error::{AppError, Result};

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub count: u64,
    pub correlation_id: Option<String>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            correlation_id: None,
        }
    }
}

impl<T: ContentEntity> ListResponse<T> {
    /// Decode a list envelope keyed by `T::PLURAL`.
    pub fn from_envelope(value: Value) -> Result<Self> {
        let mut object = into_object(value)?;
        let items: Vec<T> = take_field(&mut object, T::PLURAL)?;
        let count = object
            .get("count")
            .and_then(Value::as_u64)
            .unwrap_or(items.len() as u64);
        Ok(Self {
            items,
            count,
            correlation_id: correlation_id(&object),
        })
    }
}

/// A single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemResponse<T> {
    pub item: T,
    pub correlation_id: Option<String>,
}

impl<T: ContentEntity> ItemResponse<T> {
    /// Decode a single-item envelope keyed by `T::SINGULAR`.
    pub fn from_envelope(value: Value) -> Result<Self> {
        let mut object = into_object(value)?;
        let item = take_field(&mut object, T::SINGULAR)?;
        Ok(Self {
            item,
            correlation_id: correlation_id(&object),
        })
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default, alias = "detail", alias = "error")]
    pub message: Option<String>,
    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl ErrorBody {
    /// Best-effort parse; an unreadable body yields an empty `ErrorBody`.
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }
}

type Object = serde_json::Map<String, Value>;

fn into_object(value: Value) -> Result<Object> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::decode(format!(
            "expected JSON object envelope, got {other}"
        ))),
    }
}

fn take_field<T: DeserializeOwned>(object: &mut Object, key: &str) -> Result<T> {
    let value = object
        .remove(key)
        .ok_or_else(|| AppError::decode(format!("response envelope has no `{key}` field")))?;
    serde_json::from_value(value).map_err(|e| AppError::decode(format!("`{key}`: {e}")))
}

fn correlation_id(object: &Object) -> Option<String> {
    object
        .get("correlation_id")
        .and_then(Value::as_str)
        .map(str::to_string)
}
