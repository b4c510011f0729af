//! Signed blob endpoints served when the local storage provider is active.
//!
//! These stand in for the object store's presigned URLs: the query string
//! carries the method, expiry, optional content type/disposition, and an
//! HMAC over all of them.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;
use resumevault_storage::SignedBlobRequest;
use resumevault_storage::providers::LocalStorageProvider;

use crate::dto::request::BlobQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /blob/{*key}
pub async fn download_blob(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<BlobQuery>,
) -> Result<Response, ApiError> {
    let local = local_provider(&state)?;
    let request = verified(local, key, query, "GET")?;

    let data = local.read_object(&request.key).await?;

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type_for(&request.key)),
    );
    if let Some(disposition) = request.decoded_disposition()? {
        let value = HeaderValue::from_str(&disposition)
            .map_err(|_| AppError::invalid_input("Invalid content disposition"))?;
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("private, no-store"));
    Ok(response)
}

/// PUT /blob/{*key}
pub async fn upload_blob(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<BlobQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let local = local_provider(&state)?;
    let request = verified(local, key, query, "PUT")?;

    if let Some(expected) = request.decoded_content_type()? {
        let actual = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !actual.eq_ignore_ascii_case(&expected) {
            return Err(AppError::forbidden(format!(
                "Content-Type must be '{expected}' for this upload URL"
            ))
            .into());
        }
    }

    let max = state.config.upload.max_size_bytes;
    if body.is_empty() || body.len() as u64 > max {
        return Err(AppError::invalid_input(format!(
            "Upload must be between 1 and {max} bytes"
        ))
        .into());
    }

    local.write_object(&request.key, body).await?;
    Ok(StatusCode::CREATED)
}

fn local_provider(state: &AppState) -> AppResult<&LocalStorageProvider> {
    state
        .storage
        .local()
        .map(|local| local.as_ref())
        .ok_or_else(|| AppError::not_found("Blob endpoint is not enabled"))
}

fn verified(
    local: &LocalStorageProvider,
    key: String,
    query: BlobQuery,
    method: &str,
) -> AppResult<SignedBlobRequest> {
    if !query.method.eq_ignore_ascii_case(method) {
        return Err(AppError::forbidden(format!(
            "URL was not signed for {method}"
        )));
    }
    let request = SignedBlobRequest {
        key,
        method: query.method,
        expires: query.expires,
        content_type: query.ct,
        disposition: query.cd,
        signature: query.sig,
    };
    local.signer().verify(&request, Utc::now())?;
    Ok(request)
}

fn content_type_for(key: &str) -> &'static str {
    match key.rsplit_once('.').map(|(_, ext)| ext) {
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}
