//! Custom Axum extractors.
//!
//! Extractors for parsing and validating request data.

pub mod actor;
pub mod if_match;
pub mod validated_json;

pub use actor::{Actor, ACTOR_ID_HEADER};
pub use if_match::ExpectedVersion;
pub use validated_json::ValidatedJson;
