//! Pagination state.

use serde::{Deserialize, Serialize};

use crate::model::TableRow;

use super::axis::Outbox;
use super::{Table, TableInner};

/// Current page, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

/// Number of pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCount {
    Known(usize),
    /// Manual pagination without a total; rows are shown without page-count UI.
    Unknown,
}

impl PageCount {
    /// Interpret a caller-supplied page count; negative means unknown.
    pub fn from_manual(count: i64) -> Self {
        usize::try_from(count).map_or(Self::Unknown, Self::Known)
    }

    /// Page count of `rows` client-side rows; always at least one page.
    pub fn for_rows(rows: usize, page_size: usize) -> Self {
        Self::Known(rows.div_ceil(page_size.max(1)).max(1))
    }

    pub fn known(&self) -> Option<usize> {
        match self {
            Self::Known(n) => Some(*n),
            Self::Unknown => None,
        }
    }
}

impl<T: TableRow> TableInner<T> {
    /// Go back to the first page after a filter or search change.
    pub fn reset_page(&mut self, outbox: &mut Outbox) {
        if self.manual.pagination {
            return;
        }
        let current = *self.pagination.get();
        if current.page_index != 0 {
            self.pagination
                .set(Pagination::new(0, current.page_size), outbox);
        }
    }

    pub fn page_count(&self, filtered: usize) -> PageCount {
        if self.manual.pagination {
            self.page_count
                .map_or(PageCount::Unknown, PageCount::from_manual)
        } else {
            PageCount::for_rows(filtered, self.pagination.get().page_size)
        }
    }
}

impl<T: TableRow> Table<T> {
    pub fn pagination(&self) -> Pagination {
        self.read(|inner| *inner.pagination.get())
    }

    /// Current page count.
    pub fn page_count(&self) -> PageCount {
        self.inner
            .read()
            .map(|g| {
                let filtered = if g.manual.pagination {
                    0
                } else {
                    g.filtered_rows().len()
                };
                g.page_count(filtered)
            })
            .unwrap_or(PageCount::Unknown)
    }

    /// Go to a page. Known page counts bound the index.
    pub fn set_page_index(&self, page_index: usize) -> bool {
        let count = self.page_count();
        self.update(|inner, outbox| {
            let current = *inner.pagination.get();
            let page_index = match count {
                PageCount::Known(n) => page_index.min(n.saturating_sub(1)),
                PageCount::Unknown => page_index,
            };
            if page_index == current.page_index {
                return false;
            }
            inner
                .pagination
                .set(Pagination::new(page_index, current.page_size), outbox);
            true
        })
        .unwrap_or(false)
    }

    /// Change the page size; the page index goes back to 0.
    pub fn set_page_size(&self, page_size: usize) {
        let page_size = page_size.max(1);
        self.update(|inner, outbox| {
            if inner.pagination.get().page_size != page_size || inner.pagination.get().page_index != 0
            {
                inner.pagination.set(Pagination::new(0, page_size), outbox);
            }
        });
    }

    /// Update the caller-supplied page count (`-1` = unknown).
    pub fn set_page_count(&self, count: i64) {
        self.update(|inner, _| inner.page_count = Some(count));
    }

    pub fn can_next_page(&self) -> bool {
        let index = self.pagination().page_index;
        match self.page_count() {
            PageCount::Known(n) => index + 1 < n,
            PageCount::Unknown => true,
        }
    }

    pub fn can_previous_page(&self) -> bool {
        self.pagination().page_index > 0
    }

    pub fn next_page(&self) -> bool {
        self.can_next_page() && self.set_page_index(self.pagination().page_index + 1)
    }

    pub fn previous_page(&self) -> bool {
        let index = self.pagination().page_index;
        index > 0 && self.set_page_index(index - 1)
    }
}
