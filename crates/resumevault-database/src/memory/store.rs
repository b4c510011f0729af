//! Memory-backed tables and trait implementations.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_entity::access::{AccessType, CreateAccessLog, ResumeAccessLog};
use resumevault_entity::application::Application;
use resumevault_entity::job::{CreateJob, Job, JobStatus};
use resumevault_entity::resume::{CreateResume, Resume, ScanStatus, Visibility};
use resumevault_entity::share::{AccessLevel, CreateShare, ResumeShare, ShareSource};
use resumevault_entity::stats::{ResumeStats, StatsRecord};

use crate::repositories::{
    AccessLogRepository, ApplicationRepository, JobRepository, ResumeRepository,
    ShareRepository, StatsRepository, WindowUsage,
};

#[derive(Debug, Default)]
struct Tables {
    resumes: HashMap<Uuid, Resume>,
    shares: HashMap<(Uuid, Uuid), ResumeShare>,
    access_logs: Vec<ResumeAccessLog>,
    stats: HashMap<Uuid, StatsRecord>,
    applications: HashMap<Uuid, Application>,
    jobs: HashMap<Uuid, Job>,
}

/// In-process database.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: RwLock<Tables>,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of access log rows for a resume.
    pub async fn access_log_count(&self, resume_id: Uuid) -> usize {
        let tables = self.tables.read().await;
        tables
            .access_logs
            .iter()
            .filter(|log| log.resume_id == resume_id)
            .count()
    }

    /// Number of share rows for a resume.
    pub async fn share_count(&self, resume_id: Uuid) -> usize {
        let tables = self.tables.read().await;
        tables
            .shares
            .keys()
            .filter(|(resume, _)| *resume == resume_id)
            .count()
    }

    /// All jobs, oldest first.
    pub async fn jobs(&self) -> Vec<Job> {
        let tables = self.tables.read().await;
        let mut jobs: Vec<Job> = tables.jobs.values().cloned().collect();
        jobs.sort_by_key(|job| (job.created_at, job.id));
        jobs
    }
}

fn demote_primary(tables: &mut Tables, owner_id: Uuid, except: Option<Uuid>) {
    for resume in tables.resumes.values_mut() {
        if resume.owner_id == owner_id && Some(resume.id) != except {
            resume.is_primary = false;
        }
    }
}

#[async_trait]
impl ResumeRepository for MemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resume>> {
        Ok(self.tables.read().await.resumes.get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Resume>> {
        let tables = self.tables.read().await;
        let mut resumes: Vec<Resume> = tables
            .resumes
            .values()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        resumes.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        Ok(resumes)
    }

    async fn count_uploaded_since(&self, owner_id: Uuid, since: DateTime<Utc>) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .resumes
            .values()
            .filter(|r| r.owner_id == owner_id && r.uploaded_at >= since)
            .count() as u64)
    }

    async fn has_primary(&self, owner_id: Uuid) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .resumes
            .values()
            .any(|r| r.owner_id == owner_id && r.is_primary))
    }

    async fn create(&self, data: &CreateResume) -> AppResult<Resume> {
        let mut tables = self.tables.write().await;
        if tables
            .resumes
            .values()
            .any(|r| r.object_key == data.object_key)
        {
            return Err(AppError::conflict("storage object already bound to a resume"));
        }
        if data.is_primary {
            demote_primary(&mut tables, data.owner_id, None);
        }
        let resume = Resume {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            object_key: data.object_key.clone(),
            filename: data.filename.clone(),
            size_bytes: data.size_bytes,
            mime_type: data.mime_type.clone(),
            visibility: data.visibility,
            scan_status: data.scan_status,
            is_primary: data.is_primary,
            views_count: 0,
            downloads_count: 0,
            uploaded_at: Utc::now(),
            last_viewed_at: None,
            last_downloaded_at: None,
        };
        tables.resumes.insert(resume.id, resume.clone());
        Ok(resume)
    }

    async fn set_visibility(&self, id: Uuid, visibility: Visibility) -> AppResult<Option<Resume>> {
        let mut tables = self.tables.write().await;
        Ok(tables.resumes.get_mut(&id).map(|resume| {
            resume.visibility = visibility;
            resume.clone()
        }))
    }

    async fn set_primary(&self, owner_id: Uuid, id: Uuid) -> AppResult<Resume> {
        let mut tables = self.tables.write().await;
        match tables.resumes.get(&id) {
            Some(resume) if resume.owner_id == owner_id => {}
            _ => return Err(AppError::not_found(format!("Resume {id} not found"))),
        }
        demote_primary(&mut tables, owner_id, Some(id));
        let resume = tables
            .resumes
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Resume {id} not found")))?;
        resume.is_primary = true;
        Ok(resume.clone())
    }

    async fn set_scan_status(&self, id: Uuid, status: ScanStatus) -> AppResult<Option<Resume>> {
        let mut tables = self.tables.write().await;
        Ok(tables.resumes.get_mut(&id).map(|resume| {
            resume.scan_status = status;
            resume.clone()
        }))
    }

    async fn record_access(
        &self,
        id: Uuid,
        access_type: AccessType,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(resume) = tables.resumes.get_mut(&id) {
            let (counter, last) = match access_type {
                AccessType::View => (&mut resume.views_count, &mut resume.last_viewed_at),
                AccessType::Download => {
                    (&mut resume.downloads_count, &mut resume.last_downloaded_at)
                }
            };
            *counter += 1;
            *last = Some(last.map_or(at, |prev| prev.max(at)));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.resumes.remove(&id).is_none() {
            return Ok(false);
        }
        tables.shares.retain(|(resume_id, _), _| *resume_id != id);
        tables.access_logs.retain(|log| log.resume_id != id);
        tables.stats.remove(&id);
        tables.applications.retain(|_, app| app.resume_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ShareRepository for MemoryDatabase {
    async fn find(&self, resume_id: Uuid, company_id: Uuid) -> AppResult<Option<ResumeShare>> {
        let tables = self.tables.read().await;
        Ok(tables.shares.get(&(resume_id, company_id)).cloned())
    }

    async fn list_for_resume(&self, resume_id: Uuid) -> AppResult<Vec<ResumeShare>> {
        let tables = self.tables.read().await;
        let mut shares: Vec<ResumeShare> = tables
            .shares
            .values()
            .filter(|s| s.resume_id == resume_id)
            .cloned()
            .collect();
        shares.sort_by_key(|s| (s.created_at, s.id));
        Ok(shares)
    }

    async fn create_or_replace_expired(&self, data: &CreateShare) -> AppResult<Option<ResumeShare>> {
        let mut tables = self.tables.write().await;
        let key = (data.resume_id, data.company_id);
        if tables.shares.get(&key).is_some_and(ResumeShare::is_active) {
            return Ok(None);
        }
        let share = ResumeShare {
            id: Uuid::new_v4(),
            resume_id: data.resume_id,
            owner_id: data.owner_id,
            company_id: data.company_id,
            access_level: data.access_level,
            source: data.source,
            expires_at: data.expires_at,
            created_at: Utc::now(),
        };
        tables.shares.insert(key, share.clone());
        Ok(Some(share))
    }

    async fn upsert_application_grant(&self, data: &CreateShare) -> AppResult<ResumeShare> {
        let mut tables = self.tables.write().await;
        let share = tables
            .shares
            .entry((data.resume_id, data.company_id))
            .and_modify(|existing| {
                existing.access_level = AccessLevel::Download;
                existing.expires_at = None;
            })
            .or_insert_with(|| ResumeShare {
                id: Uuid::new_v4(),
                resume_id: data.resume_id,
                owner_id: data.owner_id,
                company_id: data.company_id,
                access_level: AccessLevel::Download,
                source: ShareSource::Application,
                expires_at: None,
                created_at: Utc::now(),
            });
        Ok(share.clone())
    }

    async fn delete(&self, resume_id: Uuid, company_id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.shares.remove(&(resume_id, company_id)).is_some())
    }
}

#[async_trait]
impl AccessLogRepository for MemoryDatabase {
    async fn append(&self, data: &CreateAccessLog) -> AppResult<ResumeAccessLog> {
        let log = ResumeAccessLog {
            id: Uuid::new_v4(),
            resume_id: data.resume_id,
            company_id: data.company_id,
            actor_id: data.actor_id,
            access_type: data.access_type,
            accessed_at: data.accessed_at,
            ip_address: data.ip_address.clone(),
            user_agent: data.user_agent.clone(),
            token_hash: data.token_hash.clone(),
        };
        self.tables.write().await.access_logs.push(log.clone());
        Ok(log)
    }

    async fn list_for_resume(&self, resume_id: Uuid) -> AppResult<Vec<ResumeAccessLog>> {
        let tables = self.tables.read().await;
        let mut logs: Vec<ResumeAccessLog> = tables
            .access_logs
            .iter()
            .filter(|log| log.resume_id == resume_id)
            .cloned()
            .collect();
        logs.sort_by_key(|log| (log.accessed_at, log.id));
        Ok(logs)
    }

    async fn window_usage(
        &self,
        resume_id: Uuid,
        company_id: Uuid,
        since: DateTime<Utc>,
    ) -> AppResult<WindowUsage> {
        let tables = self.tables.read().await;
        let mut usage = WindowUsage::default();
        for log in tables.access_logs.iter().filter(|log| {
            log.resume_id == resume_id && log.company_id == company_id && log.accessed_at > since
        }) {
            usage.count += 1;
            usage.oldest = Some(usage.oldest.map_or(log.accessed_at, |o| o.min(log.accessed_at)));
        }
        Ok(usage)
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<Uuid>> {
        let mut tables = self.tables.write().await;
        let mut affected = BTreeSet::new();
        tables.access_logs.retain(|log| {
            if log.accessed_at < cutoff {
                affected.insert(log.resume_id);
                false
            } else {
                true
            }
        });
        Ok(affected.into_iter().collect())
    }
}

#[async_trait]
impl StatsRepository for MemoryDatabase {
    async fn upsert(&self, stats: &ResumeStats, computed_at: DateTime<Utc>) -> AppResult<StatsRecord> {
        let mut tables = self.tables.write().await;
        let record = StatsRecord {
            resume_id: stats.resume_id,
            stats: Json(stats.clone()),
            computed_at,
        };
        if tables.resumes.contains_key(&stats.resume_id) {
            tables.stats.insert(stats.resume_id, record.clone());
        }
        Ok(record)
    }

    async fn find(&self, resume_id: Uuid) -> AppResult<Option<StatsRecord>> {
        Ok(self.tables.read().await.stats.get(&resume_id).cloned())
    }
}

#[async_trait]
impl ApplicationRepository for MemoryDatabase {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Application>> {
        Ok(self.tables.read().await.applications.get(&id).cloned())
    }

    async fn exists_for(&self, resume_id: Uuid, company_id: Uuid) -> AppResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .values()
            .any(|app| app.resume_id == resume_id && app.company_id == company_id))
    }

    async fn record(&self, application: &Application) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .applications
            .entry(application.id)
            .or_insert_with(|| application.clone());
        Ok(())
    }
}

#[async_trait]
impl JobRepository for MemoryDatabase {
    async fn create(&self, data: &CreateJob) -> AppResult<Option<Job>> {
        let mut tables = self.tables.write().await;
        if let Some(key) = &data.dedup_key {
            let pending = tables
                .jobs
                .values()
                .any(|job| job.status == JobStatus::Pending && job.dedup_key.as_ref() == Some(key));
            if pending {
                return Ok(None);
            }
        }
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            job_type: data.job_type.clone(),
            payload: data.payload.clone(),
            status: JobStatus::Pending,
            attempts: 0,
            max_attempts: data.max_attempts,
            dedup_key: data.dedup_key.clone(),
            run_at: data.run_at.unwrap_or(now),
            last_error: None,
            created_at: now,
            updated_at: now,
        };
        tables.jobs.insert(job.id, job.clone());
        Ok(Some(job))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Job>> {
        Ok(self.tables.read().await.jobs.get(&id).cloned())
    }

    async fn claim_next(&self) -> AppResult<Option<Job>> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let next = tables
            .jobs
            .values()
            .filter(|job| job.status == JobStatus::Pending && job.run_at <= now)
            .min_by_key(|job| (job.run_at, job.created_at, job.id))
            .map(|job| job.id);

        Ok(next.and_then(|id| {
            tables.jobs.get_mut(&id).map(|job| {
                job.status = JobStatus::Running;
                job.attempts += 1;
                job.updated_at = now;
                job.clone()
            })
        }))
    }

    async fn complete(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(job) = tables.jobs.get_mut(&id) {
            job.status = JobStatus::Completed;
            job.last_error = None;
            job.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn fail(&self, id: Uuid, error: &str) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(job) = tables.jobs.get_mut(&id) {
            job.status = JobStatus::Failed;
            job.last_error = Some(error.to_string());
            job.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn reschedule(&self, id: Uuid, run_at: DateTime<Utc>, error: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let Some(key) = tables.jobs.get(&id).map(|job| job.dedup_key.clone()) else {
            return Ok(false);
        };
        if let Some(key) = key {
            let superseded = tables.jobs.values().any(|other| {
                other.id != id
                    && other.status == JobStatus::Pending
                    && other.dedup_key.as_ref() == Some(&key)
            });
            if superseded {
                return Ok(false);
            }
        }
        if let Some(job) = tables.jobs.get_mut(&id) {
            job.status = JobStatus::Pending;
            job.run_at = run_at;
            job.last_error = Some(error.to_string());
            job.updated_at = Utc::now();
        }
        Ok(true)
    }

    async fn count_by_status(&self, status: JobStatus) -> AppResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables.jobs.values().filter(|job| job.status == status).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_resume(owner_id: Uuid, key: &str, is_primary: bool) -> CreateResume {
        CreateResume {
            owner_id,
            object_key: key.to_string(),
            filename: "resume.pdf".to_string(),
            size_bytes: 1024,
            mime_type: "application/pdf".to_string(),
            visibility: Visibility::Private,
            scan_status: ScanStatus::Clean,
            is_primary,
        }
    }

    #[tokio::test]
    async fn test_set_primary_leaves_exactly_one() {
        let db = MemoryDatabase::new();
        let owner = Uuid::new_v4();
        let r1 = ResumeRepository::create(&db, &new_resume(owner, "a", true)).await.unwrap();
        let r2 = ResumeRepository::create(&db, &new_resume(owner, "b", false)).await.unwrap();

        db.set_primary(owner, r2.id).await.unwrap();

        let resumes = db.list_by_owner(owner).await.unwrap();
        let primaries: Vec<Uuid> = resumes.iter().filter(|r| r.is_primary).map(|r| r.id).collect();
        assert_eq!(primaries, vec![r2.id]);
        assert_ne!(r1.id, r2.id);
    }

    #[tokio::test]
    async fn test_set_primary_rejects_foreign_resume() {
        let db = MemoryDatabase::new();
        let owner = Uuid::new_v4();
        let resume = ResumeRepository::create(&db, &new_resume(owner, "a", true)).await.unwrap();
        let err = db.set_primary(Uuid::new_v4(), resume.id).await.unwrap_err();
        assert_eq!(err.kind, resumevault_core::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_shares_and_logs() {
        let db = MemoryDatabase::new();
        let owner = Uuid::new_v4();
        let company = Uuid::new_v4();
        let resume = ResumeRepository::create(&db, &new_resume(owner, "a", true)).await.unwrap();
        db.upsert_application_grant(&CreateShare {
            resume_id: resume.id,
            owner_id: owner,
            company_id: company,
            access_level: AccessLevel::Download,
            source: ShareSource::Application,
            expires_at: None,
        })
        .await
        .unwrap();
        db.append(&CreateAccessLog {
            resume_id: resume.id,
            company_id: company,
            actor_id: company,
            access_type: AccessType::View,
            accessed_at: Utc::now(),
            ip_address: None,
            user_agent: None,
            token_hash: "h".to_string(),
        })
        .await
        .unwrap();

        assert!(ResumeRepository::delete(&db, resume.id).await.unwrap());
        assert_eq!(db.share_count(resume.id).await, 0);
        assert_eq!(db.access_log_count(resume.id).await, 0);
    }

    #[tokio::test]
    async fn test_purge_reports_each_resume_once() {
        let db = MemoryDatabase::new();
        let owner = Uuid::new_v4();
        let old = ResumeRepository::create(&db, &new_resume(owner, "a", true)).await.unwrap();
        let fresh = ResumeRepository::create(&db, &new_resume(owner, "b", false)).await.unwrap();
        let log = |resume_id: Uuid, days_ago: i64| CreateAccessLog {
            resume_id,
            company_id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            access_type: AccessType::Download,
            accessed_at: Utc::now() - chrono::Duration::days(days_ago),
            ip_address: None,
            user_agent: None,
            token_hash: "h".to_string(),
        };
        for entry in [log(old.id, 90), log(old.id, 60), log(old.id, 1), log(fresh.id, 1)] {
            db.append(&entry).await.unwrap();
        }

        let affected = db
            .delete_older_than(Utc::now() - chrono::Duration::days(30))
            .await
            .unwrap();
        assert_eq!(affected, vec![old.id]);
        assert_eq!(db.access_log_count(old.id).await, 1);
        assert_eq!(db.access_log_count(fresh.id).await, 1);
    }

    #[tokio::test]
    async fn test_pending_jobs_are_coalesced_by_key() {
        let db = MemoryDatabase::new();
        let job = CreateJob {
            job_type: "stats_recompute".to_string(),
            payload: serde_json::json!({}),
            max_attempts: 3,
            dedup_key: Some("stats:x".to_string()),
            run_at: None,
        };
        assert!(JobRepository::create(&db, &job).await.unwrap().is_some());
        assert!(JobRepository::create(&db, &job).await.unwrap().is_none());

        let claimed = db.claim_next().await.unwrap().unwrap();
        assert_eq!(claimed.attempts, 1);
        // Once running, a new request may queue behind it.
        assert!(JobRepository::create(&db, &job).await.unwrap().is_some());
        assert!(!db.reschedule(claimed.id, Utc::now(), "boom").await.unwrap());
    }
}
