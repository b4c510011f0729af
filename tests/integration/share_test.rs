//! Explicit shares and application grants.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_duplicate_share_conflicts_until_revoked() {
    let app = TestApp::new().await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&student).await;
    app.share(&student, resume_id, recruiter.company_id(), "download")
        .await;

    let duplicate = app
        .request(
            "POST",
            &format!("/api/resumes/{resume_id}/shares"),
            Some(json!({ "company_id": recruiter.company_id(), "access_level": "view" })),
            Some(&student),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let revoked = app
        .request(
            "DELETE",
            &format!("/api/resumes/{resume_id}/shares/{}", recruiter.company_id()),
            None,
            Some(&student),
        )
        .await;
    assert_eq!(revoked.status, StatusCode::OK);

    let link = app.issue_link(&recruiter, resume_id, "view", None).await;
    assert_eq!(link.status, StatusCode::FORBIDDEN);

    app.share(&student, resume_id, recruiter.company_id(), "view")
        .await;
    let shares = app
        .request(
            "GET",
            &format!("/api/resumes/{resume_id}/shares"),
            None,
            Some(&student),
        )
        .await;
    let shares = shares.data().as_array().unwrap();
    assert_eq!(shares.len(), 1);
    assert_eq!(shares[0]["access_level"], "view");
    assert_eq!(shares[0]["source"], "explicit");
}

#[tokio::test]
async fn test_only_owner_can_share() {
    let app = TestApp::new().await;
    let owner = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&owner).await;

    let response = app
        .request(
            "POST",
            &format!("/api/resumes/{resume_id}/shares"),
            Some(json!({ "company_id": recruiter.company_id(), "access_level": "download" })),
            Some(&recruiter),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_share_expiry_is_validated() {
    let app = TestApp::new().await;
    let student = app.student();
    let resume_id = app.clean_resume(&student).await;

    let response = app
        .request(
            "POST",
            &format!("/api/resumes/{resume_id}/shares"),
            Some(json!({
                "company_id": Uuid::new_v4(),
                "access_level": "view",
                "expires_in_days": 0,
            })),
            Some(&student),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "INVALID_INPUT");
    assert!(response.body.get("details").is_some());
}

#[tokio::test]
async fn test_rejected_resume_cannot_be_shared() {
    let app = TestApp::new().await;
    let student = app.student();
    let resume_id = app.upload_resume(&student, 256).await;
    assert_eq!(app.scan(resume_id, "rejected").await.status, StatusCode::OK);

    let response = app
        .request(
            "POST",
            &format!("/api/resumes/{resume_id}/shares"),
            Some(json!({ "company_id": Uuid::new_v4(), "access_level": "view" })),
            Some(&student),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.error(), "SCAN_NOT_CLEAN");
}

#[tokio::test]
async fn test_application_link_is_idempotent_and_service_only() {
    let app = TestApp::new().await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&student).await;
    let body = json!({
        "resume_id": resume_id,
        "company_id": recruiter.company_id(),
        "application_id": Uuid::new_v4(),
    });

    let denied = app
        .request(
            "POST",
            "/api/internal/application-links",
            Some(body.clone()),
            Some(&student),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let pipeline = app.service();
    for _ in 0..2 {
        let response = app
            .request(
                "POST",
                "/api/internal/application-links",
                Some(body.clone()),
                Some(&pipeline),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let shares = app
        .state
        .repos
        .shares
        .list_for_resume(resume_id)
        .await
        .unwrap();
    assert_eq!(shares.len(), 1);

    // The standing grant allows access without an application context.
    let link = app.issue_link(&recruiter, resume_id, "download", None).await;
    assert_eq!(link.status, StatusCode::OK);
}
