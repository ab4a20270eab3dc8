//! Request DTOs for the admin API

use serde::Deserialize;

use crate::error::{CacheError, Result};

/// Body of `POST /cache/:domain/invalidate`. Exactly one of `key` or `tag`
/// must be set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidationTarget {
    Key(String),
    Tag(String),
}

impl InvalidateRequest {
    pub fn into_target(self) -> Result<InvalidationTarget> {
        match (self.key, self.tag) {
            (Some(key), None) if !key.is_empty() => Ok(InvalidationTarget::Key(key)),
            (None, Some(tag)) if !tag.is_empty() => Ok(InvalidationTarget::Tag(tag)),
            (Some(_), Some(_)) => Err(CacheError::InvalidRequest(
                "Specify either key or tag, not both".to_string(),
            )),
            (None, None) => Err(CacheError::InvalidRequest(
                "One of key or tag is required".to_string(),
            )),
            _ => Err(CacheError::InvalidRequest(
                "Key or tag cannot be empty".to_string(),
            )),
        }
    }
}
