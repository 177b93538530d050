//! Room-photo upload validation and object-key layout.
//!
//! Validation runs before any storage or database write: an oversized or
//! non-image upload must not create or mutate a preference row.

use crate::errors::AppError;

/// Maximum accepted room-photo size: 10 MB.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn validate_upload(content_type: Option<&str>, size: usize) -> Result<(), AppError> {
    let content_type =
        content_type.ok_or_else(|| AppError::Validation("File must be an image".to_string()))?;
    if !content_type.starts_with("image/") {
        return Err(AppError::Validation("File must be an image".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "File size must be less than 10MB".to_string(),
        ));
    }
    Ok(())
}

/// Object key: `room-photos/{visitor}/{millis}.{ext}`, extension taken from
/// the MIME subtype with a jpg fallback.
pub fn object_key(visitor_id: &str, content_type: &str, timestamp_millis: i64) -> String {
    let ext = content_type.split('/').nth(1).unwrap_or("jpg");
    format!("room-photos/{visitor_id}/{timestamp_millis}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_image_under_limit() {
        assert!(validate_upload(Some("image/jpeg"), 5 * 1024 * 1024).is_ok());
    }

    #[test]
    fn test_rejects_oversized_image() {
        // 11MB must fail before any write happens
        assert!(validate_upload(Some("image/jpeg"), 11 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_rejects_exact_limit_plus_one() {
        assert!(validate_upload(Some("image/png"), MAX_UPLOAD_BYTES + 1).is_err());
        assert!(validate_upload(Some("image/png"), MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_rejects_non_image_mime() {
        assert!(validate_upload(Some("application/pdf"), 1024).is_err());
        assert!(validate_upload(None, 1024).is_err());
    }

    #[test]
    fn test_object_key_layout() {
        assert_eq!(
            object_key("v1", "image/png", 1700000000000),
            "room-photos/v1/1700000000000.png"
        );
    }

    #[test]
    fn test_object_key_falls_back_to_jpg() {
        assert_eq!(object_key("v1", "image", 42), "room-photos/v1/42.jpg");
    }
}
