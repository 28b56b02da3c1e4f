use crate::utils::pagination::PaginationMeta;
use serde::Serialize;

/// Uniform response envelope used by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }

    pub fn paginated(message: impl Into<String>, data: T, meta: PaginationMeta) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            meta: Some(meta),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            meta: None,
        }
    }
}

impl ApiResponse<String> {
    pub fn failure(message: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: detail,
            meta: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_absent_fields() {
        let value = serde_json::to_value(ApiResponse::message("Shift deleted successfully")).unwrap();
        assert_eq!(
            value,
            json!({"success": true, "message": "Shift deleted successfully"})
        );
    }

    #[test]
    fn paginated_carries_meta() {
        let meta = PaginationMeta::new(25, 10, 3);
        let value = serde_json::to_value(ApiResponse::paginated("ok", vec![1, 2, 3], meta)).unwrap();
        assert_eq!(
            value["meta"],
            json!({"current_page": 3, "per_page": 10, "total_items": 25, "total_pages": 3})
        );
    }
}
