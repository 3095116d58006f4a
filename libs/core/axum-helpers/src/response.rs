//! Success envelopes.
//!
//! ```json
//! {"success": true, "data": {...}}
//! {"success": true, "count": 2, "total": 2, "page": 1, "pages": 1, "data": [...]}
//! {"success": true, "message": "Product permanently deleted"}
//! ```

use query_filter::Page;
use serde::Serialize;
use utoipa::ToSchema;

/// Single-entity response
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// One page of a list
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse<T> {
    pub success: bool,
    /// Records on this page
    pub count: usize,
    /// Records matching the filter across all pages
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: &Page) -> Self {
        Self {
            success: true,
            count: data.len(),
            total,
            page: page.number,
            pages: page.pages(total),
            data,
        }
    }
}

/// Delete confirmation; logical deletes echo the updated record
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> DeleteResponse<T> {
    pub fn removed(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn deactivated(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}
