//! Course endpoint handlers that go beyond generic CRUD.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use domain::models::{Resource, Topic};
use persistence::repositories::{CourseRepository, TopicRepository};
use shared::pagination::decode_cursor;
use std::collections::HashMap;
use tracing::info;

use crate::app::AppState;
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::middleware::metrics::record_resource_write;
use crate::routes::resources::{page_view, ListData, ListParams, RecordView};

type TopicView = RecordView<Topic, <Topic as Resource>::Localized>;

/// Delete a course and all of its topics atomically.
///
/// DELETE /api/v1/courses/:id
pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let repo = CourseRepository::new(state.store.clone());
    if !repo.exists(&course_id).await? {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    let topics_removed = repo.delete_with_topics(&course_id).await?;

    info!(course_id = %course_id, topics_removed, "Course deleted");
    record_resource_write("course", "delete");
    Ok(Json(ApiResponse::with_message(
        serde_json::json!({ "topicsRemoved": topics_removed }),
        "Course deleted",
    )))
}

/// Active topics of a course in syllabus order.
///
/// GET /api/v1/courses/:id/topics?lang=&limit=&cursor=
pub async fn list_course_topics(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<ApiResponse<ListData<TopicView>>>, ApiError> {
    let params = ListParams::parse(raw, &[])?;

    let courses = CourseRepository::new(state.store.clone());
    if !courses.exists(&course_id).await? {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    let cursor = params.cursor.as_deref().map(decode_cursor).transpose()?;
    let topics = TopicRepository::new(state.store.clone());
    let page = topics
        .list_for_course(&course_id, cursor, params.limit)
        .await?;

    let languages = params.lang.as_deref().map(|l| state.language_context(Some(l)));
    Ok(Json(ApiResponse::ok(page_view(page, languages.as_ref()))))
}

/// Fails with a validation error unless `course_id` names a live course.
pub async fn require_active_course(state: &AppState, course_id: &str) -> Result<(), ApiError> {
    let repo = CourseRepository::new(state.store.clone());
    match repo.find_by_id(course_id).await? {
        Some(course) if course.is_active() => Ok(()),
        _ => Err(ApiError::Validation(format!(
            "courseId: no active course with id {}",
            course_id
        ))),
    }
}
