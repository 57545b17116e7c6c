use serde::{Deserialize, Serialize};

/// Page envelope returned by the search endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_no: u32,
    pub page_size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page_no: u32, page_size: u32, total_elements: i64) -> Self {
        let size = i64::from(page_size.max(1));
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + size - 1) / size
        };
        let last = i64::from(page_no) >= total_pages - 1;
        Self {
            content,
            page_no,
            page_size,
            total_elements,
            total_pages,
            last,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_no: self.page_no,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            last: self.last,
        }
    }
}
