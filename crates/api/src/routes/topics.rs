//! Topic creation, which must reference a live course.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::models::topic::{CreateTopicRequest, LocalizedTopic};
use domain::models::{Resource, Topic};
use persistence::repositories::TopicRepository;

use crate::app::AppState;
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Actor, ValidatedJson};
use crate::routes::courses::require_active_course;
use crate::routes::resources::{created_response, RecordView};

/// POST /api/v1/topics
pub async fn create_topic(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateTopicRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<RecordView<Topic, LocalizedTopic>>>), ApiError> {
    require_active_course(&state, &request.course_id).await?;

    let repo = TopicRepository::new(state.store.clone());
    let record = repo.create(&Topic::from_create(request), actor.id()).await?;
    created_response(record)
}
