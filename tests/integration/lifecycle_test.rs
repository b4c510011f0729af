//! Owner lifecycle operations and the scanner callback.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_only_one_primary_resume_per_owner() {
    let app = TestApp::new().await;
    let student = app.student();
    let first = app.upload_resume(&student, 128).await;
    let second = app.upload_resume(&student, 128).await;

    let response = app
        .request(
            "POST",
            &format!("/api/resumes/{second}/primary"),
            None,
            Some(&student),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let list = app.request("GET", "/api/resumes", None, Some(&student)).await;
    let resumes = list.data().as_array().unwrap();
    assert_eq!(resumes.len(), 2);
    let primaries: Vec<_> = resumes
        .iter()
        .filter(|r| r["is_primary"] == true)
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(primaries, vec![second.to_string()]);
    assert!(resumes.iter().any(|r| r["id"] == first.to_string()));
}

#[tokio::test]
async fn test_invalid_visibility_is_rejected() {
    let app = TestApp::new().await;
    let student = app.student();
    let id = app.upload_resume(&student, 128).await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/resumes/{id}/visibility"),
            Some(json!({ "visibility": "everyone" })),
            Some(&student),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "INVALID_INPUT");
}

#[tokio::test]
async fn test_delete_removes_record_and_object() {
    let app = TestApp::new().await;
    let student = app.student();
    let id = app.upload_resume(&student, 128).await;
    let link = app.issue_link(&student, id, "view", None).await;
    let url = link.data()["url"].as_str().unwrap().to_string();

    let other = app.student();
    let denied = app
        .request("DELETE", &format!("/api/resumes/{id}"), None, Some(&other))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let deleted = app
        .request("DELETE", &format!("/api/resumes/{id}"), None, Some(&student))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let missing = app
        .request("GET", &format!("/api/resumes/{id}"), None, Some(&student))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let (status, _, _) = app.blob("GET", &url, None, Vec::new()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_scan_verdict_requires_service_identity() {
    let app = TestApp::new().await;
    let student = app.student();
    let id = app.upload_resume(&student, 128).await;

    let denied = app
        .request(
            "POST",
            "/api/internal/scan-verdicts",
            Some(json!({ "resume_id": id, "scan_status": "clean" })),
            Some(&student),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let pending = app.scan(id, "pending").await;
    assert_eq!(pending.status, StatusCode::BAD_REQUEST);

    let clean = app.scan(id, "clean").await;
    assert_eq!(clean.status, StatusCode::OK);
    assert_eq!(clean.data()["scan_status"], "clean");
}
