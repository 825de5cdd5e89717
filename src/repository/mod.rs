pub mod admin_repo;
pub mod application_repo;
pub mod contact_repo;
pub mod job_repo;
pub mod mongo;
pub mod repository_error;
pub mod user_repo;

/// Offset pagination passed down to `find`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: i64,
}

impl Page {
    /// `page` is 1-based; zero is treated as the first page.
    pub fn new(page: u64, limit: u64) -> Self {
        let limit = limit.max(1);
        Page {
            skip: page.saturating_sub(1) * limit,
            limit: limit as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn test_page_offsets() {
        assert_eq!(Page::new(1, 10), Page { skip: 0, limit: 10 });
        assert_eq!(Page::new(3, 10), Page { skip: 20, limit: 10 });
        assert_eq!(Page::new(0, 0), Page { skip: 0, limit: 1 });
    }
}
