//! Integration tests for enrollment endpoints.
//!
//! Tests cover:
//! - POST /api/v1/enrollments (one seat per student and course)
//! - PATCH /api/v1/enrollments/:id and POST .../restore (seat stays unique)
//! - GET /api/v1/enrollments?studentId=

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_enroll_student() {
    let app = TestApp::new();
    let course_id = app.create_course("MATH101").await;

    let (status, _, body) = app
        .post(
            "/api/v1/enrollments",
            json!({"studentId": "student-1", "courseId": course_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["studentId"], "student-1");
    assert!(body["data"]["enrolledAt"].is_i64());
}

#[tokio::test]
async fn test_duplicate_enrollment_returns_409() {
    let app = TestApp::new();
    let course_id = app.create_course("MATH101").await;
    let payload = json!({"studentId": "student-1", "courseId": course_id, "status": "active"});

    let (status, _, _) = app.post("/api/v1/enrollments", payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = app.post("/api/v1/enrollments", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    // A different student is unaffected.
    let (status, _, _) = app
        .post(
            "/api/v1/enrollments",
            json!({"studentId": "student-2", "courseId": course_id}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_re_enroll_after_withdrawal() {
    let app = TestApp::new();
    let course_id = app.create_course("MATH101").await;
    let payload = json!({"studentId": "student-1", "courseId": course_id});

    let (_, _, body) = app.post("/api/v1/enrollments", payload.clone()).await;
    let enrollment_id = body["data"]["id"].as_str().unwrap();

    let (status, _, body) = app
        .patch(
            &format!("/api/v1/enrollments/{enrollment_id}"),
            json!({"status": "withdrawn"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "withdrawn");

    let (status, _, _) = app.post("/api/v1/enrollments", payload).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_reactivating_withdrawn_enrollment_conflicts_with_seat() {
    let app = TestApp::new();
    let course_id = app.create_course("MATH101").await;
    let payload = json!({"studentId": "student-1", "courseId": course_id});

    let (_, _, body) = app.post("/api/v1/enrollments", payload.clone()).await;
    let old_id = body["data"]["id"].as_str().unwrap().to_string();
    app.patch(
        &format!("/api/v1/enrollments/{old_id}"),
        json!({"status": "withdrawn"}),
    )
    .await;

    let (status, _, body) = app.post("/api/v1/enrollments", payload).await;
    assert_eq!(status, StatusCode::CREATED);
    let seat_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _, body) = app
        .patch(
            &format!("/api/v1/enrollments/{old_id}"),
            json!({"status": "active"}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert!(body["message"].as_str().unwrap().contains(&seat_id));

    // The seat holder itself can move between seat-holding states.
    let (status, _, body) = app
        .patch(
            &format!("/api/v1/enrollments/{seat_id}"),
            json!({"status": "active"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "active");
}

#[tokio::test]
async fn test_restore_conflicts_with_newer_seat() {
    let app = TestApp::new();
    let course_id = app.create_course("MATH101").await;
    let payload = json!({"studentId": "student-1", "courseId": course_id});

    let (_, _, body) = app.post("/api/v1/enrollments", payload.clone()).await;
    let old_id = body["data"]["id"].as_str().unwrap().to_string();
    let (status, _, _) = app
        .post(&format!("/api/v1/enrollments/{old_id}/deactivate"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = app.post("/api/v1/enrollments", payload).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, body) = app
        .post(&format!("/api/v1/enrollments/{old_id}/restore"), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_list_enrollments_by_student() {
    let app = TestApp::new();
    let math = app.create_course("MATH101").await;
    let physics = app.create_course("PHYS101").await;

    for (student, course) in [("student-1", &math), ("student-1", &physics), ("student-2", &math)] {
        let (status, _, _) = app
            .post(
                "/api/v1/enrollments",
                json!({"studentId": student, "courseId": course}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _, body) = app.get("/api/v1/enrollments?studentId=student-1").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|e| e["studentId"] == "student-1"));
}

#[tokio::test]
async fn test_enrollment_requires_existing_course() {
    let app = TestApp::new();
    let (status, _, _) = app
        .post(
            "/api/v1/enrollments",
            json!({"studentId": "student-1", "courseId": "nope"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
