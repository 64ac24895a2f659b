//! Acting user extractor.
//!
//! Identity is verified upstream; this service only records who made a
//! change, taken from a header the gateway sets.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::ApiError;

/// Header carrying the verified user id of the caller.
pub const ACTOR_ID_HEADER: &str = "X-Actor-Id";

/// The user performing the request, if the gateway supplied one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actor(pub Option<String>);

impl Actor {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_ID_HEADER) else {
            return Ok(Actor(None));
        };

        let actor = value
            .to_str()
            .map_err(|_| ApiError::Validation(format!("{} must be ASCII", ACTOR_ID_HEADER)))?
            .trim();

        shared::validation::validate_document_id(actor)
            .map_err(|_| ApiError::Validation(format!("Invalid {} header", ACTOR_ID_HEADER)))?;

        Ok(Actor(Some(actor.to_string())))
    }
}
