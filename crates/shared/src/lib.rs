//! Shared utilities and common types for the campus admin backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cursor encoding for paginated listings
//! - Identifier and language-code validation
//! - Timestamp normalization helpers
//! - Clearable PATCH fields

pub mod pagination;
pub mod patch;
pub mod time;
pub mod validation;
