//! Cursor-based pagination utilities.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde_json::Value;
use thiserror::Error;

/// Default page size when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Hard cap on page size.
pub const MAX_PAGE_SIZE: usize = 200;

/// Error type for cursor operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("Invalid cursor format")]
    InvalidFormat,
    #[error("Invalid cursor encoding")]
    InvalidEncoding,
    #[error("Invalid ID in cursor")]
    InvalidId,
}

/// Position of the last record of a page: its value for the ordered field
/// and its id (the tie-breaker for records sharing a sort value).
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    pub sort_value: Value,
    pub id: String,
}

/// Encodes a cursor from the ordered field's value and the document id.
///
/// The cursor format is: base64(json([sort_value, id]))
pub fn encode_cursor(sort_value: &Value, id: &str) -> String {
    let raw = Value::Array(vec![sort_value.clone(), Value::String(id.to_string())]);
    URL_SAFE_NO_PAD.encode(raw.to_string().as_bytes())
}

/// Decodes a cursor produced by [`encode_cursor`].
pub fn decode_cursor(cursor: &str) -> Result<Cursor, CursorError> {
    let decoded = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| CursorError::InvalidEncoding)?;

    let parsed: Value = serde_json::from_slice(&decoded).map_err(|_| CursorError::InvalidFormat)?;

    let mut parts = match parsed {
        Value::Array(parts) if parts.len() == 2 => parts,
        _ => return Err(CursorError::InvalidFormat),
    };

    let id = match parts.pop() {
        Some(Value::String(id)) if !id.is_empty() => id,
        _ => return Err(CursorError::InvalidId),
    };
    let sort_value = parts.pop().ok_or(CursorError::InvalidFormat)?;

    Ok(Cursor { sort_value, id })
}

/// Clamps a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(requested: Option<usize>) -> usize {
    requested
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE)
}
