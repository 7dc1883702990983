//! Page-number pagination.
//!
//! Remote listings are numbered from page 1. A page shorter than the
//! requested size is the last one; a full page means "ask for the next".

use std::future::Future;

/// Cursor over page numbers of one listing. Nothing is fetched by the
/// cursor itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page: u32,
    per_page: u32,
    exhausted: bool,
}

impl Paginator {
    pub fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: per_page.max(1),
            exhausted: false,
        }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Page to fetch next, or `None` once a short page has been seen.
    pub fn next_page(&self) -> Option<u32> {
        (!self.exhausted).then_some(self.page)
    }

    /// Record the size of the page just fetched.
    pub fn advance(&mut self, len: usize) {
        if len < self.per_page as usize {
            self.exhausted = true;
        } else {
            self.page += 1;
        }
    }
}

/// Fetch every page of a listing and concatenate the items.
pub async fn collect_pages<T, E, F, Fut>(per_page: u32, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut pages = Paginator::new(per_page);
    let mut items = Vec::new();
    while let Some(page) = pages.next_page() {
        let batch = fetch(page).await?;
        tracing::debug!(page, len = batch.len(), "fetched page");
        pages.advance(batch.len());
        items.extend(batch);
    }
    Ok(items)
}
