//! Common DTOs used across the API

use callstats_analytics::{paginate, PageMeta};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Create a success response with data
    pub fn success(data: T) -> Self {
        Self { data }
    }
}

/// One page of rows plus its metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginatedResponse<T> {
    /// Rows on this page
    pub data: Vec<T>,
    /// Pagination metadata
    pub pagination: PageMeta,
}

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    /// Page number (zero-based); stale values clamp to the last page
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub page: u64,

    /// Items per page
    #[serde(default = "default_per_page", deserialize_with = "deserialize_number_from_string")]
    #[validate(range(min = 1, max = 1000))]
    pub per_page: u64,
}

/// Deserialize a number from either a string or a number
fn deserialize_number_from_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct U64OrStringVisitor;

    impl<'de> Visitor<'de> for U64OrStringVisitor {
        type Value = u64;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a non-negative integer or a string containing one")
        }

        fn visit_i64<E>(self, value: i64) -> Result<u64, E>
        where
            E: de::Error,
        {
            u64::try_from(value).map_err(de::Error::custom)
        }

        fn visit_u64<E>(self, value: u64) -> Result<u64, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_str<E>(self, value: &str) -> Result<u64, E>
        where
            E: de::Error,
        {
            value.trim().parse::<u64>().map_err(de::Error::custom)
        }
    }

    deserializer.deserialize_any(U64OrStringVisitor)
}

fn default_per_page() -> u64 {
    10
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: default_per_page(),
        }
    }
}

impl PaginationParams {
    /// Zero-based page index
    #[inline]
    pub fn page_index(&self) -> usize {
        usize::try_from(self.page).unwrap_or(usize::MAX)
    }

    /// Rows per page
    #[inline]
    pub fn page_size(&self) -> usize {
        usize::try_from(self.per_page).unwrap_or(usize::MAX)
    }

    /// Cut one page out of `items`
    pub fn paginate<T: Clone>(&self, items: &[T]) -> PaginatedResponse<T> {
        let page = paginate(items, self.page_index(), self.page_size());
        PaginatedResponse {
            data: page.items,
            pagination: page.meta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let params = PaginationParams::default();
        assert_eq!(params.page_index(), 0);
        assert_eq!(params.page_size(), 10);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_pagination_bounds() {
        let params = PaginationParams {
            page: 0,
            per_page: 0,
        };
        assert!(params.validate().is_err());

        let params = PaginationParams {
            page: 0,
            per_page: 1001,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_numbers_or_strings() {
        let params: PaginationParams =
            serde_json::from_str(r#"{"page": "2", "per_page": 25}"#).unwrap();
        assert_eq!(params.page, 2);
        assert_eq!(params.per_page, 25);

        assert!(serde_json::from_str::<PaginationParams>(r#"{"page": -1}"#).is_err());
    }

    #[test]
    fn test_paginate_clamps() {
        let params = PaginationParams {
            page: 9,
            per_page: 2,
        };
        let response = params.paginate(&[1, 2, 3]);

        assert_eq!(response.data, vec![3]);
        assert_eq!(response.pagination.page, 1);
        assert_eq!(response.pagination.total_pages, 2);
    }

    #[test]
    fn test_api_response() {
        let json = serde_json::to_value(ApiResponse::success("test")).unwrap();
        assert_eq!(json, serde_json::json!({"data": "test"}));
    }
}
