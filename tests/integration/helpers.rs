//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use resumevault_api::app::{build_app, open_repositories};
use resumevault_api::state::AppState;
use resumevault_auth::jwt::IdentityClaims;
use resumevault_cache::CacheManager;
use resumevault_core::config::{AppConfig, DatabaseBackend};
use resumevault_entity::identity::{Identity, Role};
use resumevault_storage::StorageManager;
use resumevault_worker::jobs::default_executor;
use resumevault_worker::{JobQueue, WorkerRunner};

const JWT_SECRET: &str = "integration-test-secret";
const BLOB_HOST: &str = "http://resumevault.test";

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct Actor {
    pub identity: Identity,
    pub token: String,
}

impl Actor {
    pub fn id(&self) -> Uuid {
        self.identity.subject_id
    }

    /// The company a recruiter acts for.
    pub fn company_id(&self) -> Uuid {
        self.identity.company_id.unwrap_or(self.identity.subject_id)
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state for direct repository access
    pub state: AppState,
    /// Runs queued background jobs on demand
    pub runner: WorkerRunner,
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application with adjusted configuration
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let mut config = AppConfig::default();
        config.database.backend = DatabaseBackend::Memory;
        config.cache.provider = "memory".to_string();
        config.storage.provider = "local".to_string();
        config.storage.local.root_path = dir.path().to_string_lossy().to_string();
        config.storage.local.public_base_url = format!("{BLOB_HOST}/blob");
        config.storage.local.signing_secret = "integration-signing-secret".to_string();
        config.identity.jwt_secret = JWT_SECRET.to_string();
        config.worker.enabled = false;
        config.worker.retry_base_delay_ms = 1;
        adjust(&mut config);

        let repos = open_repositories(&config)
            .await
            .expect("Failed to open repositories");
        let cache = CacheManager::new(&config.cache)
            .await
            .expect("Failed to init cache");
        let storage = Arc::new(
            StorageManager::new(&config.storage)
                .await
                .expect("Failed to init storage"),
        );
        let queue = Arc::new(JobQueue::new(
            repos.jobs.clone(),
            config.worker.stats_max_attempts,
        ));

        let state = AppState::new(config.clone(), repos, cache, storage, queue.clone());
        let runner = WorkerRunner::new(
            queue,
            Arc::new(default_executor(
                (*state.stats).clone(),
                (*state.retention).clone(),
            )),
            config.worker.clone(),
            "integration".to_string(),
        );

        Self {
            router: build_app(state.clone()),
            state,
            runner,
            _dir: dir,
        }
    }

    fn actor(identity: Identity) -> Actor {
        let now = Utc::now().timestamp();
        let claims = IdentityClaims {
            sub: identity.subject_id,
            role: identity.role,
            org: identity.company_id,
            iat: now,
            exp: now + 3600,
            iss: None,
            aud: None,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
        )
        .expect("Failed to sign test token");
        Actor { identity, token }
    }

    pub fn student(&self) -> Actor {
        Self::actor(Identity::new(Uuid::new_v4(), Role::Student))
    }

    pub fn recruiter(&self) -> Actor {
        Self::actor(Identity::company(Uuid::new_v4(), Uuid::new_v4()))
    }

    pub fn service(&self) -> Actor {
        Self::actor(Identity::new(Uuid::new_v4(), Role::Service))
    }

    pub fn admin(&self) -> Actor {
        Self::actor(Identity::new(Uuid::new_v4(), Role::Admin))
    }

    /// Make a JSON request against the API
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        actor: Option<&Actor>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("User-Agent", "resumevault-integration")
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1");

        if let Some(actor) = actor {
            req = req.header("Authorization", format!("Bearer {}", actor.token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Follow a signed blob URL.
    pub async fn blob(
        &self,
        method: &str,
        url: &str,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> (StatusCode, HeaderMap, Bytes) {
        let path = url
            .strip_prefix(BLOB_HOST)
            .expect("Signed URL should point at the test blob host");

        let mut req = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            req = req.header("Content-Type", content_type);
        }
        let req = req
            .body(Body::from(data))
            .expect("Failed to build blob request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send blob request");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read blob body");
        (status, headers, bytes)
    }

    /// Run the full upload protocol and return the new resume's id.
    pub async fn upload_resume(&self, student: &Actor, size: usize) -> Uuid {
        let slot = self
            .request(
                "POST",
                "/api/resumes/upload-slots",
                Some(json!({ "content_type": "application/pdf" })),
                Some(student),
            )
            .await;
        assert_eq!(slot.status, StatusCode::OK, "slot: {:?}", slot.body);

        let url = slot.data()["upload_url"].as_str().unwrap().to_string();
        let (status, _, _) = self
            .blob("PUT", &url, Some("application/pdf"), vec![b'%'; size])
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let confirm = self
            .request(
                "POST",
                "/api/resumes/confirm",
                Some(json!({
                    "token": slot.data()["token"],
                    "filename": "resume.pdf",
                    "size_bytes": size,
                    "mime_type": "application/pdf",
                })),
                Some(student),
            )
            .await;
        assert_eq!(confirm.status, StatusCode::OK, "confirm: {:?}", confirm.body);
        confirm.id()
    }

    /// Deliver a scanner verdict.
    pub async fn scan(&self, resume_id: Uuid, verdict: &str) -> TestResponse {
        let scanner = self.service();
        self.request(
            "POST",
            "/api/internal/scan-verdicts",
            Some(json!({ "resume_id": resume_id, "scan_status": verdict })),
            Some(&scanner),
        )
        .await
    }

    /// Upload and mark clean.
    pub async fn clean_resume(&self, student: &Actor) -> Uuid {
        let id = self.upload_resume(student, 2 * 1024 * 1024).await;
        assert_eq!(self.scan(id, "clean").await.status, StatusCode::OK);
        id
    }

    pub async fn issue_link(
        &self,
        actor: &Actor,
        resume_id: Uuid,
        access_type: &str,
        application_id: Option<Uuid>,
    ) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/resumes/{resume_id}/links"),
            Some(json!({ "access_type": access_type, "application_id": application_id })),
            Some(actor),
        )
        .await
    }

    pub async fn share(&self, owner: &Actor, resume_id: Uuid, company_id: Uuid, level: &str) {
        let response = self
            .request(
                "POST",
                &format!("/api/resumes/{resume_id}/shares"),
                Some(json!({ "company_id": company_id, "access_level": level })),
                Some(owner),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "share: {:?}", response.body);
    }

    pub async fn log_count(&self, resume_id: Uuid) -> usize {
        self.state
            .repos
            .access_logs
            .list_for_resume(resume_id)
            .await
            .unwrap()
            .len()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// The `data.id` member parsed as a UUID.
    pub fn id(&self) -> Uuid {
        self.data()["id"].as_str().unwrap().parse().unwrap()
    }

    /// The error code of a failure body.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
