//! Upload slot protocol.

use axum::http::{StatusCode, header};
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_upload_creates_pending_private_resume() {
    let app = TestApp::new().await;
    let student = app.student();

    let id = app.upload_resume(&student, 4096).await;

    let response = app
        .request("GET", &format!("/api/resumes/{id}"), None, Some(&student))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let resume = response.data();
    assert_eq!(resume["owner_id"], student.id().to_string());
    assert_eq!(resume["visibility"], "private");
    assert_eq!(resume["scan_status"], "pending");
    assert_eq!(resume["size_bytes"], 4096);
    assert!(resume.get("object_key").is_none());
}

#[tokio::test]
async fn test_upload_token_is_single_use() {
    let app = TestApp::new().await;
    let student = app.student();

    let slot = app
        .request(
            "POST",
            "/api/resumes/upload-slots",
            Some(json!({ "content_type": "application/pdf" })),
            Some(&student),
        )
        .await;
    let url = slot.data()["upload_url"].as_str().unwrap().to_string();
    app.blob("PUT", &url, Some("application/pdf"), vec![1; 64])
        .await;

    let confirm = json!({
        "token": slot.data()["token"],
        "filename": "cv.pdf",
        "size_bytes": 64,
        "mime_type": "application/pdf",
    });
    let first = app
        .request("POST", "/api/resumes/confirm", Some(confirm.clone()), Some(&student))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .request("POST", "/api/resumes/confirm", Some(confirm), Some(&student))
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.error(), "TOKEN_INVALID");
}

#[tokio::test]
async fn test_upload_token_is_bound_to_its_owner() {
    let app = TestApp::new().await;
    let owner = app.student();
    let other = app.student();

    let slot = app
        .request(
            "POST",
            "/api/resumes/upload-slots",
            Some(json!({ "content_type": "application/pdf" })),
            Some(&owner),
        )
        .await;

    let response = app
        .request(
            "POST",
            "/api/resumes/confirm",
            Some(json!({
                "token": slot.data()["token"],
                "filename": "cv.pdf",
                "size_bytes": 64,
                "mime_type": "application/pdf",
            })),
            Some(&other),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error(), "TOKEN_OWNER_MISMATCH");
}

#[tokio::test]
async fn test_disallowed_mime_type_is_rejected() {
    let app = TestApp::new().await;
    let student = app.student();

    let response = app
        .request(
            "POST",
            "/api/resumes/upload-slots",
            Some(json!({ "content_type": "image/png" })),
            Some(&student),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_daily_quota_returns_retry_after() {
    let app = TestApp::with_config(|c| c.upload.daily_quota = 1).await;
    let student = app.student();
    app.upload_resume(&student, 128).await;

    let response = app
        .request(
            "POST",
            "/api/resumes/upload-slots",
            Some(json!({ "content_type": "application/pdf" })),
            Some(&student),
        )
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.error(), "QUOTA_EXCEEDED");
    assert!(response.headers.contains_key(header::RETRY_AFTER));
    assert!(response.body["retry_after_seconds"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_signed_put_enforces_content_type() {
    let app = TestApp::new().await;
    let student = app.student();

    let slot = app
        .request(
            "POST",
            "/api/resumes/upload-slots",
            Some(json!({ "content_type": "application/pdf" })),
            Some(&student),
        )
        .await;
    let url = slot.data()["upload_url"].as_str().unwrap().to_string();

    let (status, _, _) = app
        .blob("PUT", &url, Some("text/html"), b"<script>".to_vec())
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_confirm_without_uploaded_object_fails() {
    let app = TestApp::new().await;
    let student = app.student();

    let slot = app
        .request(
            "POST",
            "/api/resumes/upload-slots",
            Some(json!({ "content_type": "application/pdf" })),
            Some(&student),
        )
        .await;

    let response = app
        .request(
            "POST",
            "/api/resumes/confirm",
            Some(json!({
                "token": slot.data()["token"],
                "filename": "cv.pdf",
                "size_bytes": 64,
                "mime_type": "application/pdf",
            })),
            Some(&student),
        )
        .await;
    assert!(response.status.is_client_error(), "{:?}", response.body);

    let list = app.request("GET", "/api/resumes", None, Some(&student)).await;
    assert_eq!(list.data().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_requests_without_token_are_unauthenticated() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/resumes", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error(), "AUTHENTICATION");
}
