//! JSON body extractor that also runs `validator` rules.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use domain::models::RequiresDefaultLanguage;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

/// A request body that parsed and passed validation.
///
/// Required multilingual fields are checked against the configured default
/// language. Malformed JSON and rule violations both become a 400 in the
/// standard error envelope.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T> FromRequest<AppState> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + RequiresDefaultLanguage,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
        value.validate()?;
        value.check_default_language(&state.config.i18n.default_language)?;
        Ok(ValidatedJson(value))
    }
}
