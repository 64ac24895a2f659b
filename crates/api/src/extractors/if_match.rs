//! Optimistic concurrency precondition from `If-Match`.
//!
//! Records expose their version as the ETag `"<version>"`; clients echo it
//! back in `If-Match` to make an update conditional.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::IF_MATCH, request::Parts},
};

use crate::error::ApiError;

/// Version the caller expects the record to be at, if it sent one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedVersion(pub Option<u64>);

/// Formats a record version as an ETag value.
pub fn etag(version: u64) -> String {
    format!("\"{}\"", version)
}

fn parse_if_match(raw: &str) -> Result<Option<u64>, ApiError> {
    let raw = raw.trim();
    if raw == "*" {
        return Ok(None);
    }
    let raw = raw.strip_prefix("W/").unwrap_or(raw);
    let raw = raw.trim_matches('"');
    raw.parse::<u64>()
        .map(Some)
        .map_err(|_| ApiError::Validation("If-Match must carry a record version".to_string()))
}

#[async_trait]
impl<S> FromRequestParts<S> for ExpectedVersion
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.headers.get(IF_MATCH) {
            None => Ok(ExpectedVersion(None)),
            Some(value) => {
                let raw = value
                    .to_str()
                    .map_err(|_| ApiError::Validation("If-Match must be ASCII".to_string()))?;
                Ok(ExpectedVersion(parse_if_match(raw)?))
            }
        }
    }
}
