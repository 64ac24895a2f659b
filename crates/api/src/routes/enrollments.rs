//! Enrollment writes.
//!
//! A student holds at most one seat (pending or active enrollment) per
//! course. The check runs on create and on every write that can put an
//! enrollment back into a seat-holding state.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::models::enrollment::{
    CreateEnrollmentRequest, LocalizedEnrollment, UpdateEnrollmentRequest,
};
use domain::models::{Enrollment, Resource};
use persistence::repositories::EnrollmentRepository;
use tracing::{info, warn};

use crate::app::AppState;
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{Actor, ExpectedVersion, ValidatedJson};
use crate::middleware::metrics::record_resource_write;
use crate::routes::courses::require_active_course;
use crate::routes::resources::{created_response, version_headers, view, RecordView};

type EnrollmentView = RecordView<Enrollment, LocalizedEnrollment>;

/// Fails with a conflict when some enrollment other than `own_id` already
/// holds the student's seat in the course.
async fn ensure_seat_free(
    repo: &EnrollmentRepository,
    student_id: &str,
    course_id: &str,
    own_id: Option<&str>,
) -> Result<(), ApiError> {
    match repo.find_seat(student_id, course_id).await? {
        Some(existing) if Some(existing.id.as_str()) != own_id => {
            warn!(
                student_id = %student_id,
                course_id = %course_id,
                existing_id = %existing.id,
                "Duplicate enrollment rejected"
            );
            Err(ApiError::Conflict(format!(
                "Student already holds enrollment {} in this course",
                existing.id
            )))
        }
        _ => Ok(()),
    }
}

/// POST /api/v1/enrollments
pub async fn create_enrollment(
    State(state): State<AppState>,
    actor: Actor,
    ValidatedJson(request): ValidatedJson<CreateEnrollmentRequest>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<EnrollmentView>>), ApiError> {
    require_active_course(&state, &request.course_id).await?;

    let repo = EnrollmentRepository::new(state.store.clone());
    if request.status.holds_seat() {
        ensure_seat_free(&repo, &request.student_id, &request.course_id, None).await?;
    }

    let record = repo
        .create(&Enrollment::from_create(request), actor.id())
        .await?;
    created_response(record)
}

/// PATCH /api/v1/enrollments/:id
pub async fn update_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    actor: Actor,
    ExpectedVersion(expected): ExpectedVersion,
    ValidatedJson(request): ValidatedJson<UpdateEnrollmentRequest>,
) -> Result<(HeaderMap, Json<ApiResponse<EnrollmentView>>), ApiError> {
    let repo = EnrollmentRepository::new(state.store.clone());
    let current = repo.get_by_id(&id).await?;

    let takes_seat = request.status.is_some_and(|status| status.holds_seat());
    if takes_seat && current.is_active() {
        ensure_seat_free(
            &repo,
            &current.fields.student_id,
            &current.fields.course_id,
            Some(&id),
        )
        .await?;
    }

    let record = repo
        .update_with_version(&id, &request, expected, actor.id())
        .await?;

    info!(id = %record.id, version = record.version, "Enrollment updated");
    record_resource_write(Enrollment::NAME, "update");
    Ok((
        version_headers(record.version),
        Json(ApiResponse::with_message(view(record, None), "Enrollment updated")),
    ))
}

/// POST /api/v1/enrollments/:id/restore
pub async fn restore_enrollment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    actor: Actor,
) -> Result<Json<ApiResponse<EnrollmentView>>, ApiError> {
    let repo = EnrollmentRepository::new(state.store.clone());
    let current = repo.get_by_id(&id).await?;

    if current.fields.status.holds_seat() {
        ensure_seat_free(
            &repo,
            &current.fields.student_id,
            &current.fields.course_id,
            Some(&id),
        )
        .await?;
    }

    let record = repo.restore(&id, actor.id()).await?;

    info!(id = %id, "Enrollment restored");
    record_resource_write(Enrollment::NAME, "restore");
    Ok(Json(ApiResponse::with_message(view(record, None), "Enrollment restored")))
}
