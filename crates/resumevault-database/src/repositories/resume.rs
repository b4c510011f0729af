//! Resume repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use resumevault_core::error::{AppError, ErrorKind};
use resumevault_core::result::AppResult;
use resumevault_entity::access::AccessType;
use resumevault_entity::resume::{CreateResume, Resume, ScanStatus, Visibility};

use super::map_write_error;

/// Persistence operations on resume records.
#[async_trait]
pub trait ResumeRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a resume by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resume>>;

    /// List an owner's resumes, newest first.
    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Resume>>;

    /// Count resumes an owner created at or after `since`.
    async fn count_uploaded_since(&self, owner_id: Uuid, since: DateTime<Utc>) -> AppResult<u64>;

    /// Whether the owner currently has a primary resume.
    async fn has_primary(&self, owner_id: Uuid) -> AppResult<bool>;

    /// Insert a resume. When `is_primary` is set, the owner's other resumes
    /// are demoted in the same unit of work.
    async fn create(&self, data: &CreateResume) -> AppResult<Resume>;

    /// Update visibility. Returns `None` if the resume does not exist.
    async fn set_visibility(&self, id: Uuid, visibility: Visibility) -> AppResult<Option<Resume>>;

    /// Make `id` the owner's only primary resume.
    async fn set_primary(&self, owner_id: Uuid, id: Uuid) -> AppResult<Resume>;

    /// Update the scan verdict. Returns `None` if the resume does not exist.
    async fn set_scan_status(&self, id: Uuid, status: ScanStatus) -> AppResult<Option<Resume>>;

    /// Bump the counter and timestamp for one granted company access.
    async fn record_access(
        &self,
        id: Uuid,
        access_type: AccessType,
        at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Delete a resume together with its shares, access logs, stats and
    /// application references. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// PostgreSQL resume repository.
#[derive(Debug, Clone)]
pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    /// Create a new resume repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resume>> {
        sqlx::query_as::<_, Resume>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("Failed to find resume"))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> AppResult<Vec<Resume>> {
        sqlx::query_as::<_, Resume>(
            "SELECT * FROM resumes WHERE owner_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list resumes"))
    }

    async fn count_uploaded_since(&self, owner_id: Uuid, since: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM resumes WHERE owner_id = $1 AND uploaded_at >= $2",
        )
        .bind(owner_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to count uploads"))?;
        Ok(count as u64)
    }

    async fn has_primary(&self, owner_id: Uuid) -> AppResult<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM resumes WHERE owner_id = $1 AND is_primary)",
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to check primary resume"))
    }

    async fn create(&self, data: &CreateResume) -> AppResult<Resume> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        lock_owner(&mut tx, data.owner_id).await?;

        if data.is_primary {
            sqlx::query("UPDATE resumes SET is_primary = FALSE WHERE owner_id = $1 AND is_primary")
                .bind(data.owner_id)
                .execute(&mut *tx)
                .await
                .map_err(db_err("Failed to demote primary resume"))?;
        }

        let resume = sqlx::query_as::<_, Resume>(
            "INSERT INTO resumes (owner_id, object_key, filename, size_bytes, mime_type, \
             visibility, scan_status, is_primary) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.owner_id)
        .bind(&data.object_key)
        .bind(&data.filename)
        .bind(data.size_bytes)
        .bind(&data.mime_type)
        .bind(data.visibility)
        .bind(data.scan_status)
        .bind(data.is_primary)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Failed to create resume",
                "storage object already bound to a resume",
            )
        })?;

        tx.commit()
            .await
            .map_err(db_err("Failed to commit resume"))?;
        Ok(resume)
    }

    async fn set_visibility(&self, id: Uuid, visibility: Visibility) -> AppResult<Option<Resume>> {
        sqlx::query_as::<_, Resume>(
            "UPDATE resumes SET visibility = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(visibility)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update visibility"))
    }

    async fn set_primary(&self, owner_id: Uuid, id: Uuid) -> AppResult<Resume> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("Failed to begin transaction"))?;

        lock_owner(&mut tx, owner_id).await?;

        sqlx::query(
            "UPDATE resumes SET is_primary = FALSE \
             WHERE owner_id = $1 AND is_primary AND id <> $2",
        )
        .bind(owner_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_err("Failed to demote primary resume"))?;

        let resume = sqlx::query_as::<_, Resume>(
            "UPDATE resumes SET is_primary = TRUE WHERE id = $1 AND owner_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to set primary resume", "primary resume changed concurrently"))?;

        match resume {
            Some(resume) => {
                tx.commit()
                    .await
                    .map_err(db_err("Failed to commit primary resume"))?;
                Ok(resume)
            }
            None => {
                tx.rollback()
                    .await
                    .map_err(db_err("Failed to roll back primary resume"))?;
                Err(AppError::not_found(format!("Resume {id} not found")))
            }
        }
    }

    async fn set_scan_status(&self, id: Uuid, status: ScanStatus) -> AppResult<Option<Resume>> {
        sqlx::query_as::<_, Resume>(
            "UPDATE resumes SET scan_status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("Failed to update scan status"))
    }

    async fn record_access(
        &self,
        id: Uuid,
        access_type: AccessType,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        let sql = match access_type {
            AccessType::View => {
                "UPDATE resumes SET views_count = views_count + 1, \
                 last_viewed_at = GREATEST(COALESCE(last_viewed_at, $2), $2) WHERE id = $1"
            }
            AccessType::Download => {
                "UPDATE resumes SET downloads_count = downloads_count + 1, \
                 last_downloaded_at = GREATEST(COALESCE(last_downloaded_at, $2), $2) WHERE id = $1"
            }
        };
        sqlx::query(sql)
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to record resume access"))?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        // Shares, logs, stats and applications cascade via foreign keys.
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete resume"))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Serialize primary-flag transitions per owner for the rest of the transaction.
async fn lock_owner(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    owner_id: Uuid,
) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
        .bind(owner_id)
        .execute(&mut **tx)
        .await
        .map_err(db_err("Failed to lock owner"))?;
    Ok(())
}
