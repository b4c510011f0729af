//! Upload input validation.

use resumevault_core::error::AppError;
use resumevault_core::result::AppResult;

/// Longest accepted filename, in characters.
pub const MAX_FILENAME_LEN: usize = 255;

/// Reject MIME types outside the configured whitelist.
pub fn validate_mime_type(mime_type: &str, allowed: &[String]) -> AppResult<()> {
    let normalized = mime_type.trim().to_ascii_lowercase();
    if allowed.iter().any(|m| m.eq_ignore_ascii_case(&normalized)) {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "Unsupported file type '{mime_type}'. Allowed: PDF, DOC, DOCX"
        )))
    }
}

/// Reject empty files and files over the ceiling.
pub fn validate_size(size_bytes: u64, max_size_bytes: u64) -> AppResult<()> {
    if size_bytes == 0 {
        return Err(AppError::invalid_input("File is empty"));
    }
    if size_bytes > max_size_bytes {
        return Err(AppError::invalid_input(format!(
            "File size {size_bytes} exceeds the maximum of {max_size_bytes} bytes"
        )));
    }
    Ok(())
}

/// Validate a display filename. It is never used to build a storage key.
pub fn validate_filename(filename: &str) -> AppResult<()> {
    let trimmed = filename.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("Filename must not be empty"));
    }
    if trimmed.chars().count() > MAX_FILENAME_LEN {
        return Err(AppError::invalid_input(format!(
            "Filename exceeds {MAX_FILENAME_LEN} characters"
        )));
    }
    if trimmed
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control())
    {
        return Err(AppError::invalid_input(
            "Filename must not contain path separators or control characters",
        ));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(AppError::invalid_input("Invalid filename"));
    }
    Ok(())
}

/// File extension used for storage keys of a whitelisted MIME type.
pub fn extension_for(mime_type: &str) -> &'static str {
    match mime_type.trim().to_ascii_lowercase().as_str() {
        "application/pdf" => "pdf",
        "application/msword" => "doc",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => "docx",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec![
            "application/pdf".to_string(),
            "application/msword".to_string(),
        ]
    }

    #[test]
    fn test_mime_whitelist() {
        assert!(validate_mime_type("application/pdf", &allowed()).is_ok());
        assert!(validate_mime_type("Application/PDF", &allowed()).is_ok());
        assert!(validate_mime_type("image/png", &allowed()).is_err());
    }

    #[test]
    fn test_size_ceiling() {
        assert!(validate_size(10 * 1024 * 1024, 10 * 1024 * 1024).is_ok());
        assert!(validate_size(10 * 1024 * 1024 + 1, 10 * 1024 * 1024).is_err());
        assert!(validate_size(0, 100).is_err());
    }

    #[test]
    fn test_filename_rules() {
        assert!(validate_filename("Jane Doe - CV.pdf").is_ok());
        assert!(validate_filename("../../etc/passwd").is_err());
        assert!(validate_filename("a\\b.pdf").is_err());
        assert!(validate_filename("   ").is_err());
        assert!(validate_filename(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_extension_for_known_types() {
        assert_eq!(extension_for("application/pdf"), "pdf");
        assert_eq!(extension_for("application/msword"), "doc");
        assert_eq!(extension_for("text/plain"), "bin");
    }
}
