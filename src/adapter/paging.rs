//! Page-at-a-time lazy discovery shared by the press adapters.

use std::collections::VecDeque;

use crate::error::ScrapeError;
use crate::{Query, Reference};

/// Which search pages a query needs, for a source with a fixed page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    /// Zero-based index of the first page to fetch.
    pub first_page: usize,
    /// Number of pages to walk at most.
    pub page_count: usize,
    /// Raw items before `first_page` that are never fetched.
    pub pre_skipped: usize,
}

impl PageWindow {
    /// Pages covering `skip_count + target_count` items, plus one slack page for
    /// results the adapter filters out.
    pub fn for_query(query: &Query, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let first_page = query.skip_count / per_page;
        let pre_skipped = first_page * per_page;
        let wanted = (query.skip_count - pre_skipped).saturating_add(query.target_count);
        let page_count = if query.target_count == 0 {
            0
        } else {
            wanted.div_ceil(per_page).saturating_add(1)
        };
        Self {
            first_page,
            page_count,
            pre_skipped,
        }
    }
}

/// Iterator that fetches one page at a time and yields its references.
/// Ends on an empty page, after the window, or after the first error.
pub struct PagedReferences<F> {
    fetch: F,
    next_page: usize,
    end_page: usize,
    buffer: VecDeque<Reference>,
    done: bool,
}

impl<F> PagedReferences<F>
where
    F: FnMut(usize) -> Result<Vec<Reference>, ScrapeError>,
{
    /// `fetch` receives zero-based page indices from the window.
    pub fn new(window: PageWindow, fetch: F) -> Self {
        Self {
            fetch,
            next_page: window.first_page,
            end_page: window.first_page.saturating_add(window.page_count),
            buffer: VecDeque::new(),
            done: false,
        }
    }
}

impl<F> Iterator for PagedReferences<F>
where
    F: FnMut(usize) -> Result<Vec<Reference>, ScrapeError>,
{
    type Item = Result<Reference, ScrapeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(reference) = self.buffer.pop_front() {
                return Some(Ok(reference));
            }
            if self.done || self.next_page >= self.end_page {
                return None;
            }
            let page = self.next_page;
            self.next_page += 1;
            match (self.fetch)(page) {
                Ok(refs) if refs.is_empty() => {
                    log::debug!("Page {} is empty; end of results", page);
                    self.done = true;
                }
                Ok(refs) => self.buffer.extend(refs),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
