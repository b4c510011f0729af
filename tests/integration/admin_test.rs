//! Administrative surface and health.

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use uuid::Uuid;

use resumevault_entity::access::{AccessType, CreateAccessLog};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_purge_requires_admin_and_recomputes_stats() {
    let app = TestApp::new().await;
    let student = app.student();
    let resume_id = app.clean_resume(&student).await;

    for days_ago in [400, 10] {
        app.state
            .repos
            .access_logs
            .append(&CreateAccessLog {
                resume_id,
                company_id: Uuid::new_v4(),
                actor_id: Uuid::new_v4(),
                access_type: AccessType::Download,
                accessed_at: Utc::now() - Duration::days(days_ago),
                ip_address: None,
                user_agent: None,
                token_hash: "f".repeat(64),
            })
            .await
            .unwrap();
    }

    let denied = app
        .request(
            "DELETE",
            "/api/admin/access-logs?older_than_days=365",
            None,
            Some(&student),
        )
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(app.log_count(resume_id).await, 2);

    let admin = app.admin();
    let purged = app
        .request(
            "DELETE",
            "/api/admin/access-logs?older_than_days=365",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(purged.status, StatusCode::OK, "{:?}", purged.body);
    assert_eq!(purged.data()["affected_resumes"], 1);
    assert_eq!(app.log_count(resume_id).await, 1);

    assert_eq!(app.runner.drain().await.unwrap(), 1);
    let stats = app
        .request(
            "GET",
            &format!("/api/resumes/{resume_id}/stats"),
            None,
            Some(&student),
        )
        .await;
    assert_eq!(stats.data()["total_downloads"], 1);
}

#[tokio::test]
async fn test_purge_rejects_zero_days() {
    let app = TestApp::new().await;
    let admin = app.admin();
    let response = app
        .request(
            "DELETE",
            "/api/admin/access-logs?older_than_days=0",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_purge_rejects_oversized_window() {
    let app = TestApp::new().await;
    let admin = app.admin();
    let response = app
        .request(
            "DELETE",
            "/api/admin/access-logs?older_than_days=4294967295",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_reports_dependencies() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"], true);
    assert_eq!(response.data()["storage"], true);
}
