//! Signed link issuance: grant model, audit log and rate limiting.

use axum::http::{StatusCode, header};
use serde_json::json;
use uuid::Uuid;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_application_grant_allows_download() {
    let app = TestApp::new().await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&student).await;

    let visibility = app
        .request(
            "PATCH",
            &format!("/api/resumes/{resume_id}/visibility"),
            Some(json!({ "visibility": "private" })),
            Some(&student),
        )
        .await;
    assert_eq!(visibility.status, StatusCode::OK);

    let application_id = Uuid::new_v4();
    let pipeline = app.service();
    let applied = app
        .request(
            "POST",
            "/api/internal/application-links",
            Some(json!({
                "resume_id": resume_id,
                "company_id": recruiter.company_id(),
                "application_id": application_id,
                "posting_id": Uuid::new_v4(),
            })),
            Some(&pipeline),
        )
        .await;
    assert_eq!(applied.status, StatusCode::OK, "{:?}", applied.body);

    let link = app
        .issue_link(&recruiter, resume_id, "download", Some(application_id))
        .await;
    assert_eq!(link.status, StatusCode::OK, "{:?}", link.body);
    assert_eq!(link.data()["expires_in"], 300);

    let logs = app
        .state
        .repos
        .access_logs
        .list_for_resume(resume_id)
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].company_id, recruiter.company_id());
    assert_eq!(logs[0].actor_id, recruiter.id());
    assert_eq!(logs[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert_ne!(logs[0].token_hash, link.data()["url"].as_str().unwrap());

    let resume = app
        .request("GET", &format!("/api/resumes/{resume_id}"), None, Some(&student))
        .await;
    assert_eq!(resume.data()["downloads_count"], 1);
    assert_eq!(resume.data()["views_count"], 0);

    let url = link.data()["url"].as_str().unwrap();
    let (status, headers, body) = app.blob("GET", url, None, Vec::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.len(), 2 * 1024 * 1024);
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("resume.pdf"));
}

#[tokio::test]
async fn test_company_without_grant_is_forbidden_and_not_logged() {
    let app = TestApp::new().await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&student).await;

    let link = app.issue_link(&recruiter, resume_id, "view", None).await;
    assert_eq!(link.status, StatusCode::FORBIDDEN);
    assert_eq!(link.error(), "FORBIDDEN");
    assert_eq!(app.log_count(resume_id).await, 0);
}

#[tokio::test]
async fn test_rate_limit_allows_fifty_per_window() {
    let app = TestApp::new().await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&student).await;
    app.share(&student, resume_id, recruiter.company_id(), "view")
        .await;

    for attempt in 1..=50 {
        let link = app.issue_link(&recruiter, resume_id, "view", None).await;
        assert_eq!(link.status, StatusCode::OK, "attempt {attempt}: {:?}", link.body);
    }

    let limited = app.issue_link(&recruiter, resume_id, "view", None).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.error(), "RATE_LIMITED");
    let retry_after: u64 = limited.headers[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!((1..=3600).contains(&retry_after));
    assert_eq!(app.log_count(resume_id).await, 50);

    // The window is per (resume, company).
    let other = app.recruiter();
    app.share(&student, resume_id, other.company_id(), "view")
        .await;
    let link = app.issue_link(&other, resume_id, "view", None).await;
    assert_eq!(link.status, StatusCode::OK);
}

#[tokio::test]
async fn test_counter_limiter_matches_audit_log_limiter() {
    let app = TestApp::with_config(|c| {
        c.access.rate_limiter = resumevault_core::config::RateLimiterBackend::Counter;
        c.access.rate_limit_max = 3;
    })
    .await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&student).await;
    app.share(&student, resume_id, recruiter.company_id(), "view")
        .await;

    for _ in 0..3 {
        let link = app.issue_link(&recruiter, resume_id, "view", None).await;
        assert_eq!(link.status, StatusCode::OK);
    }
    let limited = app.issue_link(&recruiter, resume_id, "view", None).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.log_count(resume_id).await, 3);
}

#[tokio::test]
async fn test_public_resume_requires_clean_scan() {
    let app = TestApp::new().await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.upload_resume(&student, 512).await;

    app.request(
        "PATCH",
        &format!("/api/resumes/{resume_id}/visibility"),
        Some(json!({ "visibility": "public" })),
        Some(&student),
    )
    .await;

    let pending = app.issue_link(&recruiter, resume_id, "download", None).await;
    assert_eq!(pending.status, StatusCode::FORBIDDEN);

    assert_eq!(app.scan(resume_id, "clean").await.status, StatusCode::OK);
    let clean = app.issue_link(&recruiter, resume_id, "download", None).await;
    assert_eq!(clean.status, StatusCode::OK);
}

#[tokio::test]
async fn test_owner_links_bypass_scan_and_are_not_logged() {
    let app = TestApp::new().await;
    let student = app.student();
    let resume_id = app.upload_resume(&student, 512).await;

    let view = app.issue_link(&student, resume_id, "view", None).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.data()["expires_in"], 3600);

    let download = app.issue_link(&student, resume_id, "download", None).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(app.log_count(resume_id).await, 0);
}

#[tokio::test]
async fn test_view_share_does_not_permit_download() {
    let app = TestApp::new().await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&student).await;
    app.share(&student, resume_id, recruiter.company_id(), "view")
        .await;

    let view = app.issue_link(&recruiter, resume_id, "view", None).await;
    assert_eq!(view.status, StatusCode::OK);
    let url = view.data()["url"].as_str().unwrap();
    let (_, headers, _) = app.blob("GET", url, None, Vec::new()).await;
    assert_eq!(headers[header::CONTENT_DISPOSITION], "inline");

    let download = app.issue_link(&recruiter, resume_id, "download", None).await;
    assert_eq!(download.status, StatusCode::FORBIDDEN);
    assert_eq!(app.log_count(resume_id).await, 1);
}

#[tokio::test]
async fn test_application_context_must_match() {
    let app = TestApp::new().await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&student).await;

    let link = app
        .issue_link(&recruiter, resume_id, "view", Some(Uuid::new_v4()))
        .await;
    assert_eq!(link.status, StatusCode::FORBIDDEN);
    assert!(link.body["message"].as_str().unwrap().contains("application_mismatch"));
}

#[tokio::test]
async fn test_students_cannot_read_other_students_resumes() {
    let app = TestApp::new().await;
    let owner = app.student();
    let other = app.student();
    let resume_id = app.clean_resume(&owner).await;

    let link = app.issue_link(&other, resume_id, "view", None).await;
    assert_eq!(link.status, StatusCode::FORBIDDEN);

    let missing = app.issue_link(&other, Uuid::new_v4(), "view", None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tampered_blob_url_is_rejected() {
    let app = TestApp::new().await;
    let student = app.student();
    let resume_id = app.upload_resume(&student, 512).await;

    let link = app.issue_link(&student, resume_id, "view", None).await;
    let url = link.data()["url"].as_str().unwrap();
    let tampered = url.replace("method=GET", "method=PUT");

    let (status, _, _) = app
        .blob("PUT", &tampered, Some("application/pdf"), vec![0; 8])
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_access_type_is_invalid_input() {
    let app = TestApp::new().await;
    let student = app.student();
    let resume_id = app.upload_resume(&student, 512).await;

    let link = app.issue_link(&student, resume_id, "print", None).await;
    assert_eq!(link.status, StatusCode::BAD_REQUEST);
    assert_eq!(link.error(), "INVALID_INPUT");
}
