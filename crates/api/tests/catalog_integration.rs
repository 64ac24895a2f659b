//! Integration tests for the generic catalog endpoints, exercised through
//! programs and courses.
//!
//! Tests cover:
//! - POST/GET/PATCH/DELETE /api/v1/programs
//! - Optimistic concurrency via ETag / If-Match
//! - Soft delete and restore
//! - Cursor pagination and field filters
//! - Language resolution with ?lang= and the configured default language

mod common;

use axum::http::{header, Method, StatusCode};
use common::{json_request, program_payload, test_config, TestApp, ACTOR};
use persistence::DocumentStore;
use serde_json::json;
use std::collections::HashSet;

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_create_then_get_program() {
    let app = TestApp::new();

    let (status, headers, body) = app.post("/api/v1/programs", program_payload("BSC101")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Program created");
    assert_eq!(headers[header::ETAG], "\"1\"");

    let data = &body["data"];
    let id = data["id"].as_str().unwrap();
    assert_eq!(data["code"], "BSC101");
    assert_eq!(data["version"], 1);
    assert_eq!(data["isActive"], true);
    assert_eq!(data["createdBy"], ACTOR);
    assert_eq!(data["createdAt"], data["updatedAt"]);

    let (status, _, body) = app.get(&format!("/api/v1/programs/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["durationYears"], 3);
    assert!(body["data"].get("localized").is_none());
}

#[tokio::test]
async fn test_update_program_bumps_version_and_timestamp() {
    let app = TestApp::new();
    let (_, _, created) = app.post("/api/v1/programs", program_payload("BSC101")).await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, headers, body) = app
        .patch(&format!("/api/v1/programs/{id}"), json!({"durationYears": 4}))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(headers[header::ETAG], "\"2\"");
    assert_eq!(body["data"]["durationYears"], 4);
    assert_eq!(body["data"]["code"], "BSC101");
    assert_eq!(body["data"]["version"], 2);
    assert!(
        body["data"]["updatedAt"].as_i64().unwrap() > created["data"]["updatedAt"].as_i64().unwrap()
    );
    assert_eq!(body["data"]["createdAt"], created["data"]["createdAt"]);
}

#[tokio::test]
async fn test_update_missing_program_returns_404() {
    let app = TestApp::new();
    let (status, _, body) = app
        .patch("/api/v1/programs/missing", json!({"durationYears": 4}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_delete_program_then_get_returns_404() {
    let app = TestApp::new();
    let (_, _, created) = app.post("/api/v1/programs", program_payload("BSC101")).await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, _, body) = app.delete(&format!("/api/v1/programs/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Program deleted");

    let (status, _, _) = app.get(&format!("/api/v1/programs/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = app.delete(&format!("/api/v1/programs/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_create_rejects_invalid_payload() {
    let app = TestApp::new();
    let (status, _, body) = app
        .post(
            "/api/v1/programs",
            json!({"name": {"te": "కార్యక్రమం"}, "code": "bad code", "durationYears": 3}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation_error");
    let message = body["message"].as_str().unwrap();
    assert!(message.contains("code"), "{message}");
    assert!(message.contains("name"), "{message}");
}

#[tokio::test]
async fn test_create_rejects_malformed_json() {
    let app = TestApp::new();
    let (status, _, body) = app
        .post("/api/v1/programs", json!({"code": "BSC101"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_list_rejects_unknown_query_parameter() {
    let app = TestApp::new();
    let (status, _, body) = app.get("/api/v1/programs?colour=blue").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("colour"));
}

// =============================================================================
// Optimistic concurrency
// =============================================================================

#[tokio::test]
async fn test_if_match_with_stale_version_returns_409() {
    let app = TestApp::new();
    let (_, _, created) = app.post("/api/v1/programs", program_payload("BSC101")).await;
    let id = created["data"]["id"].as_str().unwrap();
    let uri = format!("/api/v1/programs/{id}");

    // First writer wins with the current version.
    let mut request = json_request(Method::PATCH, &uri, json!({"durationYears": 4}));
    request
        .headers_mut()
        .insert(header::IF_MATCH, "\"1\"".parse().unwrap());
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    // Second writer still holds version 1.
    let mut request = json_request(Method::PATCH, &uri, json!({"durationYears": 5}));
    request
        .headers_mut()
        .insert(header::IF_MATCH, "\"1\"".parse().unwrap());
    let (status, _, body) = app.send(request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let (_, _, body) = app.get(&uri).await;
    assert_eq!(body["data"]["durationYears"], 4);
    assert_eq!(body["data"]["version"], 2);
}

// =============================================================================
// Soft delete
// =============================================================================

#[tokio::test]
async fn test_deactivated_program_hidden_from_list_until_restored() {
    let app = TestApp::new();
    let (_, _, created) = app.post("/api/v1/programs", program_payload("BSC101")).await;
    let id = created["data"]["id"].as_str().unwrap();
    app.post("/api/v1/programs", program_payload("BA202")).await;

    let (status, _, body) = app
        .post(&format!("/api/v1/programs/{id}/deactivate"), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isActive"], false);

    let (_, _, body) = app.get("/api/v1/programs").await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["code"], "BA202");

    let (_, _, body) = app.get("/api/v1/programs?includeInactive=true").await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);

    // Direct reads still see it.
    let (status, _, _) = app.get(&format!("/api/v1/programs/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    app.post(&format!("/api/v1/programs/{id}/restore"), json!({}))
        .await;
    let (_, _, body) = app.get("/api/v1/programs").await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_cursor_pagination_visits_every_program_once() {
    let app = TestApp::new();
    let mut created = HashSet::new();
    for i in 0..5 {
        let (_, _, body) = app
            .post("/api/v1/programs", program_payload(&format!("BSC10{i}")))
            .await;
        created.insert(body["data"]["id"].as_str().unwrap().to_string());
    }

    let mut seen = Vec::new();
    let mut uri = "/api/v1/programs?limit=2".to_string();
    loop {
        let (status, _, body) = app.get(&uri).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let items = body["data"]["items"].as_array().unwrap();
        assert!(items.len() <= 2);
        seen.extend(items.iter().map(|i| i["id"].as_str().unwrap().to_string()));
        match body["data"]["nextCursor"].as_str() {
            Some(cursor) => uri = format!("/api/v1/programs?limit=2&cursor={cursor}"),
            None => break,
        }
    }

    assert_eq!(seen.len(), 5);
    assert_eq!(seen.into_iter().collect::<HashSet<_>>(), created);
}

#[tokio::test]
async fn test_list_rejects_garbage_cursor() {
    let app = TestApp::new();
    let (status, _, _) = app.get("/api/v1/programs?cursor=not-a-cursor").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_on_code() {
    let app = TestApp::new();
    app.post("/api/v1/programs", program_payload("BSC101")).await;
    app.post("/api/v1/programs", program_payload("BA202")).await;

    let (_, _, body) = app.get("/api/v1/programs?code=BA202").await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["code"], "BA202");
}

// =============================================================================
// Localization
// =============================================================================

#[tokio::test]
async fn test_lang_parameter_adds_localized_block() {
    let app = TestApp::new();
    let id = app.create_course("MATH101").await;

    let (_, _, body) = app.get(&format!("/api/v1/courses/{id}?lang=te")).await;
    let localized = &body["data"]["localized"];
    assert_eq!(localized["title"], "రేఖీయ బీజగణితం");
    // No Telugu description, so English is used.
    assert_eq!(localized["description"], "Vectors and matrices");
    assert_eq!(localized["availableLanguages"], json!(["en", "te"]));

    // Hindi is supported but missing, so it falls back to the default.
    let (_, _, body) = app.get(&format!("/api/v1/courses/{id}?lang=hi")).await;
    assert_eq!(body["data"]["localized"]["title"], "Linear Algebra");

    // Unsupported languages resolve as the default.
    let (_, _, body) = app.get(&format!("/api/v1/courses?lang=fr")).await;
    assert_eq!(body["data"]["items"][0]["localized"]["title"], "Linear Algebra");
}

#[tokio::test]
async fn test_legacy_plain_string_field_is_accepted() {
    let app = TestApp::new();
    let (status, _, body) = app
        .post(
            "/api/v1/programs",
            json!({"name": "Diploma in Agriculture", "code": "DAG100", "durationYears": 2}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let id = body["data"]["id"].as_str().unwrap();

    let (_, _, body) = app.get(&format!("/api/v1/programs/{id}?lang=te")).await;
    assert_eq!(body["data"]["name"], "Diploma in Agriculture");
    assert_eq!(body["data"]["localized"]["name"], "Diploma in Agriculture");
    assert_eq!(body["data"]["localized"]["availableLanguages"], json!(["en"]));
}

#[tokio::test]
async fn test_required_text_follows_configured_default_language() {
    let mut config = test_config();
    config.i18n.default_language = "te".to_string();
    let app = TestApp::with_config(config);

    let (status, _, body) = app
        .post(
            "/api/v1/programs",
            json!({"name": {"te": "వ్యవసాయ డిప్లొమా"}, "code": "DAG100", "durationYears": 2}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, _, body) = app
        .post(
            "/api/v1/programs",
            json!({"name": {"en": "Diploma in Agriculture"}, "code": "DAG200", "durationYears": 2}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("'te'"));
}

#[tokio::test]
async fn test_update_without_default_language_rejected() {
    let app = TestApp::new();
    let (_, _, body) = app.post("/api/v1/programs", program_payload("BSC101")).await;
    let id = body["data"]["id"].as_str().unwrap();

    let (status, _, body) = app
        .patch(
            &format!("/api/v1/programs/{id}"),
            json!({"name": {"hi": "विज्ञान स्नातक"}}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("'en'"));
}

#[tokio::test]
async fn test_malformed_stored_text_reads_as_empty() {
    let app = TestApp::new();
    let mut data = serde_json::Map::new();
    data.insert("title".to_string(), json!({"en": 42}));
    data.insert("code".to_string(), json!("OLD100"));
    data.insert("description".to_string(), json!(["not", "text"]));
    data.insert("createdAt".to_string(), json!(1_700_000_000_000_000_i64));
    data.insert("updatedAt".to_string(), json!(1_700_000_000_000_000_i64));
    data.insert("isActive".to_string(), json!(true));
    data.insert("version".to_string(), json!(1));
    app.store.set("courses", "legacy-course", data).await.unwrap();

    let (status, _, body) = app.get("/api/v1/courses/legacy-course?lang=te").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["localized"]["title"], "");
    assert_eq!(body["data"]["localized"]["description"], "");
    assert_eq!(body["data"]["code"], "OLD100");
}
