//! Standardized API response types (RFC 7807 compliant for errors).

use serde::{Deserialize, Serialize};

/// Standard successful API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

/// One field-level validation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrorDto {
    pub field: String,
    pub message: String,
}

/// Outcome envelope of the publish endpoints: `{success, slug}` or
/// `{success: false, error, errors?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldErrorDto>>,
}

impl PublishResponse {
    pub fn published(slug: impl Into<String>) -> Self {
        Self {
            success: true,
            slug: Some(slug.into()),
            error: None,
            errors: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            slug: None,
            error: Some(error.into()),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldErrorDto>) -> Self {
        if !errors.is_empty() {
            self.errors = Some(errors);
        }
        self
    }
}

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Request ID for debugging purposes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            request_id: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_error_fields() {
        let json = serde_json::to_value(PublishResponse::published("hello")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "slug": "hello"}));
    }

    #[test]
    fn test_failure_envelope_lists_field_errors() {
        let response = PublishResponse::failed("validation failed").with_errors(vec![FieldErrorDto {
            field: "title".into(),
            message: "title is required".into(),
        }]);
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"][0]["field"], "title");
        assert!(json.get("slug").is_none());
    }

    #[test]
    fn test_problem_type_is_renamed() {
        let json = serde_json::to_value(ErrorResponse::new(404, "Not Found")).unwrap();
        assert_eq!(json["type"], "about:blank");
        assert!(json.get("detail").is_none());
    }
}
