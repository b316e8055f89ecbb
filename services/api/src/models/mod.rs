//! API models for entities, request payloads, and response payloads

pub mod contribution;
pub mod dashboard;
pub mod department;
pub mod event;
pub mod report;
pub mod signup;
pub mod user;

use serde::Serialize;

/// Generic paginated response wrapper
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

/// Normalize pagination parameters and compute the row offset
pub fn page_params(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> (u32, u32, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, 100);
    let offset = (page - 1) as i64 * limit as i64;
    (page, limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults() {
        let (page, limit, offset) = page_params(None, None, 12);
        assert_eq!((page, limit, offset), (1, 12, 0));
    }

    #[test]
    fn test_page_params_clamps_limit_and_page() {
        let (page, limit, offset) = page_params(Some(0), Some(500), 12);
        assert_eq!((page, limit, offset), (1, 100, 0));

        let (page, limit, offset) = page_params(Some(3), Some(25), 12);
        assert_eq!((page, limit, offset), (3, 25, 50));
    }
}
