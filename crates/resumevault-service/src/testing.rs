//! Shared fixtures for service unit tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;
use uuid::Uuid;

use resumevault_auth::limiter;
use resumevault_auth::policy::GrantEvaluator;
use resumevault_cache::CacheManager;
use resumevault_cache::memory::MemoryCacheProvider;
use resumevault_core::config::AppConfig;
use resumevault_core::result::AppResult;
use resumevault_core::traits::queue::RecomputeQueue;
use resumevault_database::MemoryDatabase;
use resumevault_database::repositories::Repositories;
use resumevault_entity::resume::{CreateResume, Resume, ScanStatus, Visibility};
use resumevault_storage::providers::LocalStorageProvider;
use resumevault_storage::{BlobSigner, StorageManager};

use crate::{
    LinkIssuer, ResumeService, RetentionService, ShareService, StatsService, UploadTokenManager,
};

/// Queue that remembers what was enqueued.
#[derive(Debug, Default)]
pub(crate) struct RecordingQueue {
    enqueued: Mutex<Vec<Uuid>>,
}

impl RecordingQueue {
    pub(crate) async fn enqueued(&self) -> Vec<Uuid> {
        self.enqueued.lock().await.clone()
    }
}

#[async_trait]
impl RecomputeQueue for RecordingQueue {
    async fn enqueue_recompute(&self, resume_id: Uuid) -> AppResult<()> {
        self.enqueued.lock().await.push(resume_id);
        Ok(())
    }
}

pub(crate) struct Harness {
    pub db: Arc<MemoryDatabase>,
    pub repos: Repositories,
    pub cache: CacheManager,
    pub storage: Arc<StorageManager>,
    pub local: Arc<LocalStorageProvider>,
    pub queue: Arc<RecordingQueue>,
    pub config: AppConfig,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub(crate) async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub(crate) async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        adjust(&mut config);

        let db = Arc::new(MemoryDatabase::new());
        let repos = Repositories::memory(db.clone());
        let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
            &config.cache.memory,
            config.cache.default_ttl_seconds,
        )));

        let dir = tempfile::tempdir().unwrap();
        let signer = BlobSigner::new("test-signing-secret", "http://localhost:8080/blob").unwrap();
        let local = Arc::new(
            LocalStorageProvider::new(dir.path().to_str().unwrap(), signer)
                .await
                .unwrap(),
        );
        let storage = Arc::new(StorageManager::with_local(
            local.clone(),
            Duration::from_secs(5),
        ));

        Self {
            db,
            repos,
            cache,
            storage,
            local,
            queue: Arc::new(RecordingQueue::default()),
            config,
            _dir: dir,
        }
    }

    pub(crate) fn upload_manager(&self) -> UploadTokenManager {
        UploadTokenManager::new(
            self.repos.resumes.clone(),
            self.cache.clone(),
            self.storage.clone(),
            self.config.upload.clone(),
        )
    }

    pub(crate) fn resume_service(&self) -> ResumeService {
        ResumeService::new(
            self.repos.resumes.clone(),
            self.storage.clone(),
            self.upload_manager(),
            self.config.upload.clone(),
        )
    }

    pub(crate) fn share_service(&self) -> ShareService {
        ShareService::new(
            self.repos.resumes.clone(),
            self.repos.shares.clone(),
            self.repos.applications.clone(),
        )
    }

    pub(crate) fn link_issuer(&self) -> LinkIssuer {
        LinkIssuer::new(
            self.repos.resumes.clone(),
            self.repos.access_logs.clone(),
            GrantEvaluator::new(self.repos.shares.clone(), self.repos.applications.clone()),
            limiter::from_config(
                &self.config.access,
                self.repos.access_logs.clone(),
                self.cache.clone(),
            ),
            self.storage.clone(),
            self.queue.clone(),
            self.config.access.clone(),
        )
    }

    pub(crate) fn stats_service(&self) -> StatsService {
        StatsService::new(
            self.repos.resumes.clone(),
            self.repos.access_logs.clone(),
            self.repos.stats.clone(),
        )
    }

    pub(crate) fn retention_service(&self) -> RetentionService {
        RetentionService::new(self.repos.access_logs.clone(), self.queue.clone())
    }

    /// Write `size` bytes at `key`, as a client's signed PUT would.
    pub(crate) async fn put_object(&self, key: &str, size: usize) {
        self.local
            .write_object(key, Bytes::from(vec![b'%'; size]))
            .await
            .unwrap();
    }

    pub(crate) async fn seed_resume(&self, owner_id: Uuid) -> Resume {
        self.seed_resume_with(owner_id, Visibility::Private, ScanStatus::Clean)
            .await
    }

    pub(crate) async fn seed_resume_with(
        &self,
        owner_id: Uuid,
        visibility: Visibility,
        scan_status: ScanStatus,
    ) -> Resume {
        let object_key = format!("resumes/{owner_id}/{}.pdf", Uuid::new_v4());
        self.put_object(&object_key, 1024).await;
        self.repos
            .resumes
            .create(&CreateResume {
                owner_id,
                object_key,
                filename: "resume.pdf".to_string(),
                size_bytes: 1024,
                mime_type: "application/pdf".to_string(),
                visibility,
                scan_status,
                is_primary: false,
            })
            .await
            .unwrap()
    }
}
