use axum::http::HeaderMap;

use crate::errors::AppError;

/// Header carrying the opaque client-generated visitor token.
/// There is no account system; this is the only identity in the product.
pub const VISITOR_HEADER: &str = "x-visitor-id";

pub fn optional_visitor(headers: &HeaderMap) -> Option<String> {
    headers
        .get(VISITOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

pub fn require_visitor(headers: &HeaderMap) -> Result<String, AppError> {
    optional_visitor(headers)
        .ok_or_else(|| AppError::Validation("Visitor ID required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_optional_visitor_present() {
        let mut headers = HeaderMap::new();
        headers.insert(VISITOR_HEADER, HeaderValue::from_static("v_abc123"));
        assert_eq!(optional_visitor(&headers).as_deref(), Some("v_abc123"));
    }

    #[test]
    fn test_optional_visitor_absent() {
        assert_eq!(optional_visitor(&HeaderMap::new()), None);
    }

    #[test]
    fn test_empty_header_treated_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(VISITOR_HEADER, HeaderValue::from_static(""));
        assert_eq!(optional_visitor(&headers), None);
        assert!(require_visitor(&headers).is_err());
    }
}
