//! HMAC-SHA256 signing of local blob URLs.
//!
//! URL shape: `{base_url}/{key}?method=GET&expires={unix}&sig={b64}` plus
//! optional `ct` (PUT content type) and `cd` (GET content disposition),
//! both base64url encoded. The signature covers every parameter.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeZone, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;

type HmacSha256 = Hmac<Sha256>;

/// The parameters of a signed blob request as received by the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedBlobRequest {
    /// Object key.
    pub key: String,
    /// HTTP method the URL was signed for.
    pub method: String,
    /// Unix expiry timestamp.
    pub expires: i64,
    /// Base64url content type (PUT).
    pub content_type: Option<String>,
    /// Base64url content disposition (GET).
    pub disposition: Option<String>,
    /// Base64url signature.
    pub signature: String,
}

impl SignedBlobRequest {
    /// Decoded content type, if the URL restricts it.
    pub fn decoded_content_type(&self) -> AppResult<Option<String>> {
        self.content_type.as_deref().map(decode_param).transpose()
    }

    /// Decoded content disposition header value, if any.
    pub fn decoded_disposition(&self) -> AppResult<Option<String>> {
        self.disposition.as_deref().map(decode_param).transpose()
    }
}

/// Signs and verifies local blob URLs.
#[derive(Clone)]
pub struct BlobSigner {
    secret: Vec<u8>,
    base_url: String,
}

impl std::fmt::Debug for BlobSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BlobSigner {
    /// Create a signer. `base_url` is the URL prefix under which the API
    /// serves `/blob/{key}`.
    pub fn new(secret: &str, base_url: &str) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::configuration("storage.local.signing_secret is empty"));
        }
        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build a signed URL.
    pub fn sign_url(
        &self,
        key: &str,
        method: &str,
        expires_at: DateTime<Utc>,
        content_type: Option<&str>,
        disposition: Option<&str>,
    ) -> AppResult<String> {
        let expires = expires_at.timestamp();
        let ct = content_type.map(encode_param);
        let cd = disposition.map(encode_param);
        let sig = self.signature(key, method, expires, ct.as_deref(), cd.as_deref())?;

        let mut url = format!(
            "{}/{}?method={method}&expires={expires}",
            self.base_url,
            key.trim_start_matches('/')
        );
        if let Some(ct) = ct {
            url.push_str(&format!("&ct={ct}"));
        }
        if let Some(cd) = cd {
            url.push_str(&format!("&cd={cd}"));
        }
        url.push_str(&format!("&sig={sig}"));
        Ok(url)
    }

    /// Verify signature and expiry of a received request.
    pub fn verify(&self, request: &SignedBlobRequest, now: DateTime<Utc>) -> AppResult<()> {
        let expected_tag = URL_SAFE_NO_PAD
            .decode(&request.signature)
            .map_err(|_| AppError::forbidden("Malformed blob signature"))?;

        let mut mac = self.mac()?;
        mac.update(
            canonical(
                &request.key,
                &request.method,
                request.expires,
                request.content_type.as_deref(),
                request.disposition.as_deref(),
            )
            .as_bytes(),
        );
        mac.verify_slice(&expected_tag)
            .map_err(|_| AppError::forbidden("Invalid blob signature"))?;

        let expires_at = Utc
            .timestamp_opt(request.expires, 0)
            .single()
            .ok_or_else(|| AppError::forbidden("Invalid blob expiry"))?;
        if expires_at <= now {
            return Err(AppError::forbidden("Blob URL has expired"));
        }
        Ok(())
    }

    fn signature(
        &self,
        key: &str,
        method: &str,
        expires: i64,
        ct: Option<&str>,
        cd: Option<&str>,
    ) -> AppResult<String> {
        let mut mac = self.mac()?;
        mac.update(canonical(key, method, expires, ct, cd).as_bytes());
        Ok(URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    fn mac(&self) -> AppResult<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AppError::internal(format!("Invalid HMAC key: {e}")))
    }
}

fn canonical(key: &str, method: &str, expires: i64, ct: Option<&str>, cd: Option<&str>) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}",
        method.to_ascii_uppercase(),
        key.trim_start_matches('/'),
        expires,
        ct.unwrap_or(""),
        cd.unwrap_or("")
    )
}

fn encode_param(value: &str) -> String {
    URL_SAFE_NO_PAD.encode(value.as_bytes())
}

fn decode_param(value: &str) -> AppResult<String> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|_| AppError::invalid_input("Malformed blob URL parameter"))?;
    String::from_utf8(bytes).map_err(|_| AppError::invalid_input("Malformed blob URL parameter"))
}
