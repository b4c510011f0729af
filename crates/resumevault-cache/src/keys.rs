//! Cache key builders for all ResumeVault cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use uuid::Uuid;

/// Prefix applied to all ResumeVault cache keys.
const PREFIX: &str = "rv";

// ── Upload keys ────────────────────────────────────────────

/// Cache key for an upload token binding.
pub fn upload_token(token: &str) -> String {
    format!("{PREFIX}:upload:token:{token}")
}

// ── Access keys ────────────────────────────────────────────

/// Cache key for the fixed-window access counter of a (resume, company) pair.
pub fn access_window(resume_id: Uuid, company_id: Uuid) -> String {
    format!("{PREFIX}:access:window:{resume_id}:{company_id}")
}
