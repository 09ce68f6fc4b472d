//! Uniform response envelope
//!
//! Every endpoint answers with
//! `{"success": bool, "data"?: ..., "meta"?: {...}, "message"?: "...", "error"?: "CODE"}`.
//! Absent fields are omitted.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::{Paginated, PaginationMeta};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Present on paginated lists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Machine-readable error code, e.g. `NOT_FOUND`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            meta: None,
            message: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            meta: None,
            message: Some(message.into()),
            error: Some(code.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload, e.g. after a delete.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            meta: None,
            message: Some(message.into()),
            error: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn paginated(page: Paginated<T>) -> Self {
        Self {
            success: true,
            data: Some(page.items),
            meta: Some(page.meta),
            message: None,
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_are_omitted() {
        let body = serde_json::to_value(ApiResponse::success(7)).unwrap();
        assert_eq!(body, json!({"success": true, "data": 7}));

        let body = serde_json::to_value(ApiResponse::message("Player deleted")).unwrap();
        assert_eq!(body, json!({"success": true, "message": "Player deleted"}));
    }

    #[test]
    fn paginated_carries_camel_case_meta() {
        let page = Paginated::new(vec!["a", "b"], PaginationMeta::new(45, 2, 20));
        let body = serde_json::to_value(ApiResponse::paginated(page)).unwrap();
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": ["a", "b"],
                "meta": {"page": 2, "limit": 20, "total": 45, "totalPages": 3}
            })
        );
    }

    #[test]
    fn error_has_code_and_message() {
        let body = serde_json::to_value(ApiResponse::<()>::error("NOT_FOUND", "Player not found")).unwrap();
        assert_eq!(
            body,
            json!({"success": false, "message": "Player not found", "error": "NOT_FOUND"})
        );
    }
}
