//! User profile endpoint handlers.
//!
//! Profiles are mirrored from the identity provider and stored under its
//! user id.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::models::user_profile::SaveUserProfileRequest;
use domain::models::{Record, UserProfile};
use persistence::repositories::UserProfileRepository;
use tracing::info;

use crate::app::AppState;
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Actor, ValidatedJson};
use crate::middleware::metrics::record_resource_write;
use crate::routes::resources::version_headers;

/// Create or replace the profile for an identity provider user.
///
/// PUT /api/v1/users/:id
pub async fn save_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<SaveUserProfileRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<Record<UserProfile>>>), ApiError> {
    shared::validation::validate_document_id(&user_id)
        .map_err(|_| ApiError::Validation("Invalid user id".to_string()))?;

    let repo = UserProfileRepository::new(state.store.clone());
    let profile = UserProfile::from(request);
    let (record, created) = repo.save(&user_id, &profile, actor.id()).await?;

    let (status, operation, message) = if created {
        (StatusCode::CREATED, "create", "User profile created")
    } else {
        (StatusCode::OK, "update", "User profile updated")
    };
    info!(user_id = %user_id, created, "User profile saved");
    record_resource_write("user", operation);

    Ok((
        status,
        version_headers(record.version),
        Json(ApiResponse::with_message(record, message)),
    ))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<(HeaderMap, Json<ApiResponse<Record<UserProfile>>>), ApiError> {
    let repo = UserProfileRepository::new(state.store.clone());
    let record = repo.get_by_id(&user_id).await?;
    Ok((version_headers(record.version), Json(ApiResponse::ok(record))))
}
