use serde::Deserialize;
use utoipa::ToSchema;

const fn default_page() -> u64 {
    1
}

#[derive(Debug, Deserialize, ToSchema, PartialEq, Eq, Clone, Copy)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u64,
    pub page_size: Option<u64>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: None,
        }
    }
}

impl Pagination {
    pub fn with_default_page_size(page: u64) -> Self {
        Self {
            page,
            page_size: None,
        }
    }

    pub fn with_page_size(page: u64, page_size: u64) -> Self {
        Self {
            page,
            page_size: Some(page_size),
        }
    }

    /// Resolves this request into an offset/limit pair that storage backends can use directly.
    /// Pages are 1-based; page 0 is treated as the first page.
    pub fn bounds(&self, default_page_size: u64) -> PageBounds {
        let limit = self.page_size.unwrap_or(default_page_size).min(i64::MAX as u64);
        let offset = self.page.saturating_sub(1).saturating_mul(limit);

        PageBounds {
            offset: offset.min(i64::MAX as u64) as i64,
            limit: limit as i64,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PageBounds {
    pub offset: i64,
    pub limit: i64,
}

impl PageBounds {
    pub fn offset_usize(&self) -> usize {
        usize::try_from(self.offset).unwrap_or(usize::MAX)
    }

    pub fn limit_usize(&self) -> usize {
        usize::try_from(self.limit).unwrap_or(usize::MAX)
    }
}
