//! Pagination parameters shared by every list endpoint

use database_layer::Page;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::error::{api_success_with_meta, ApiResponse, PaginationInfo, ResponseMetadata};

/// Standard pagination parameters for list endpoints
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema, Clone, Copy)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    #[param(example = 1, minimum = 1)]
    pub page: Option<u32>,

    #[param(example = 10, minimum = 1, maximum = 100)]
    pub per_page: Option<u32>,
}

impl PaginationParams {
    /// Normalized page (defaults 1 and 10, size clamped to 1..=100)
    #[must_use]
    pub fn page(self) -> Page {
        Page::new(self.page, self.per_page)
    }

    /// Create response metadata with pagination info
    #[must_use]
    pub fn to_metadata(self, total_count: i64) -> ResponseMetadata {
        let page = self.page();
        let total_pages = page.total_pages(total_count);

        ResponseMetadata {
            pagination: Some(PaginationInfo {
                page: page.number(),
                per_page: page.per_page(),
                total_pages,
                has_next: page.number() < total_pages,
                has_previous: page.number() > 1,
            }),
            total_count: Some(total_count),
            request_id: None,
        }
    }

    /// Wrap data with pagination metadata
    pub fn wrap_response<T>(self, data: T, total_count: i64) -> ApiResponse<T> {
        api_success_with_meta(data, self.to_metadata(total_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let page = PaginationParams::default().page();
        assert_eq!(page.number(), 1);
        assert_eq!(page.per_page(), 10);
    }

    #[test]
    fn test_page_size_is_clamped() {
        let params = PaginationParams { page: Some(0), per_page: Some(500) };
        assert_eq!(params.page().number(), 1);
        assert_eq!(params.page().per_page(), 100);
    }

    #[test]
    fn test_metadata_middle_page() {
        let params = PaginationParams { page: Some(2), per_page: Some(10) };
        let pagination = params.to_metadata(35).pagination.unwrap();
        assert_eq!(pagination.total_pages, 4);
        assert!(pagination.has_next);
        assert!(pagination.has_previous);
    }

    #[test]
    fn test_metadata_last_page() {
        let params = PaginationParams { page: Some(4), per_page: Some(10) };
        let metadata = params.to_metadata(35);
        assert_eq!(metadata.total_count, Some(35));
        assert!(!metadata.pagination.unwrap().has_next);
    }
}
