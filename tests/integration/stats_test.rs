//! Asynchronous stats aggregation.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use uuid::Uuid;

use resumevault_entity::access::{AccessType, CreateAccessLog};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_stats_follow_the_access_log() {
    let app = TestApp::new().await;
    let student = app.student();
    let first = app.recruiter();
    let second = app.recruiter();
    let resume_id = app.clean_resume(&student).await;
    app.share(&student, resume_id, first.company_id(), "download")
        .await;
    app.share(&student, resume_id, second.company_id(), "view")
        .await;

    for _ in 0..2 {
        app.issue_link(&first, resume_id, "view", None).await;
    }
    app.issue_link(&first, resume_id, "download", None).await;
    app.issue_link(&second, resume_id, "view", None).await;

    let before = app
        .request(
            "GET",
            &format!("/api/resumes/{resume_id}/stats"),
            None,
            Some(&student),
        )
        .await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.data()["total_views"], 0);
    assert!(before.data()["computed_at"].is_null());

    // Concurrent enqueues collapse into one pending recompute.
    assert_eq!(app.runner.drain().await.unwrap(), 1);

    let after = app
        .request(
            "GET",
            &format!("/api/resumes/{resume_id}/stats"),
            None,
            Some(&student),
        )
        .await;
    let stats = after.data();
    assert_eq!(stats["total_views"], 3);
    assert_eq!(stats["total_downloads"], 1);
    assert_eq!(stats["unique_viewers"], 2);
    assert_eq!(stats["unique_downloaders"], 1);
    assert_eq!(stats["companies"].as_array().unwrap().len(), 2);
    assert!(stats["computed_at"].is_string());
}

#[tokio::test]
async fn test_recompute_is_idempotent() {
    let app = TestApp::new().await;
    let student = app.student();
    let resume_id = app.clean_resume(&student).await;
    let company_id = Uuid::new_v4();

    for days_ago in [3, 2, 1] {
        app.state
            .repos
            .access_logs
            .append(&CreateAccessLog {
                resume_id,
                company_id,
                actor_id: Uuid::new_v4(),
                access_type: AccessType::View,
                accessed_at: Utc::now() - Duration::days(days_ago),
                ip_address: None,
                user_agent: None,
                token_hash: "0".repeat(64),
            })
            .await
            .unwrap();
    }

    let first = app.state.stats.recompute(resume_id).await.unwrap().unwrap();
    let second = app.state.stats.recompute(resume_id).await.unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(first.total_views, 3);
}

#[tokio::test]
async fn test_stats_are_owner_only() {
    let app = TestApp::new().await;
    let student = app.student();
    let recruiter = app.recruiter();
    let resume_id = app.clean_resume(&student).await;

    let response = app
        .request(
            "GET",
            &format!("/api/resumes/{resume_id}/stats"),
            None,
            Some(&recruiter),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let admin = app.admin();
    let response = app
        .request(
            "GET",
            &format!("/api/resumes/{resume_id}/stats"),
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}
