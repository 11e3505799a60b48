//! Row data and the derived row model.

use crate::model::TableRow;

use super::filtering::{matches_search, passes_filters};
use super::pagination::{PageCount, Pagination};
use super::sorting::sort_rows;
use super::{Table, TableInner};

/// Rows ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct RowModel<T> {
    /// Rows of the current page, sorted.
    pub rows: Vec<T>,
    /// Rows passing filters and search, all pages included. Under manual
    /// pagination this is the length of the supplied page.
    pub filtered_count: usize,
    pub page_count: PageCount,
    /// Pagination with the page index bounded by the page count.
    pub pagination: Pagination,
}

/// What the body of the table shows.
#[derive(Debug, Clone, PartialEq)]
pub enum RowView<T> {
    /// The last fetch failed. Shown even when stale rows are present.
    Error(String),
    /// Loading with nothing to show yet.
    Loading,
    /// No row passes filters and search.
    Empty,
    Rows(RowModel<T>),
}

impl<T: TableRow> TableInner<T> {
    /// Rows passing the client-side filters and search, sorted.
    pub fn filtered_rows(&self) -> Vec<&T> {
        let filters = self.filters.get();
        let needle = self.search.get().trim().to_lowercase();

        let mut rows: Vec<&T> = self
            .rows
            .iter()
            .filter(|row| self.manual.filtering || passes_filters(*row, filters, &self.columns))
            .filter(|row| {
                self.manual.search || needle.is_empty() || matches_search(*row, &needle, &self.columns)
            })
            .collect();

        if !self.manual.sorting {
            sort_rows(&mut rows, self.sorting.get(), &self.columns);
        }
        rows
    }

    /// Rows of the current page.
    pub fn page_rows(&self) -> Vec<&T> {
        let rows = self.filtered_rows();
        if self.manual.pagination {
            return rows;
        }
        let pagination = self.bounded_pagination(rows.len());
        rows.into_iter()
            .skip(pagination.page_index * pagination.page_size)
            .take(pagination.page_size)
            .collect()
    }

    fn bounded_pagination(&self, filtered: usize) -> Pagination {
        let mut pagination = *self.pagination.get();
        if let PageCount::Known(count) = self.page_count(filtered)
            && !self.manual.pagination
        {
            pagination.page_index = pagination.page_index.min(count - 1);
        }
        pagination
    }

    pub fn row_model(&self) -> RowModel<T> {
        let filtered = self.filtered_rows();
        let filtered_count = filtered.len();
        let page_count = self.page_count(filtered_count);
        let pagination = self.bounded_pagination(filtered_count);

        let rows = if self.manual.pagination {
            filtered.into_iter().cloned().collect()
        } else {
            filtered
                .into_iter()
                .skip(pagination.page_index * pagination.page_size)
                .take(pagination.page_size)
                .cloned()
                .collect()
        };

        RowModel {
            rows,
            filtered_count,
            page_count,
            pagination,
        }
    }

    pub fn row_view(&self) -> RowView<T> {
        if let Some(error) = &self.load.error {
            return RowView::Error(error.clone());
        }
        if self.load.loading && self.rows.is_empty() {
            return RowView::Loading;
        }
        let model = self.row_model();
        if model.rows.is_empty() {
            RowView::Empty
        } else {
            RowView::Rows(model)
        }
    }
}

impl<T: TableRow> Table<T> {
    /// Number of rows in the row array.
    pub fn len(&self) -> usize {
        self.read(|inner| inner.rows.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The row array as supplied.
    pub fn rows(&self) -> Vec<T> {
        self.read(|inner| inner.rows.clone())
    }

    /// Find a row by ID.
    pub fn find_row(&self, id: &str) -> Option<(usize, T)> {
        self.inner.read().ok().and_then(|g| {
            g.rows
                .iter()
                .enumerate()
                .find(|(_, row)| row.id() == id)
                .map(|(i, row)| (i, row.clone()))
        })
    }

    /// Replace the row array.
    ///
    /// Selection and expansion are keyed by id and persist. Sizing is recomputed.
    pub fn set_rows(&self, rows: Vec<T>) {
        self.update(|inner, _| {
            inner.rows = rows;
            inner.recompute_sizing();
        });
    }

    /// Derived rows of the current page.
    pub fn row_model(&self) -> Option<RowModel<T>> {
        self.inner.read().ok().map(|g| g.row_model())
    }

    /// What the table body shows, with the error slot taking precedence.
    pub fn row_view(&self) -> RowView<T> {
        self.inner
            .read()
            .map(|g| g.row_view())
            .unwrap_or_else(|_| RowView::Error("table state poisoned".to_string()))
    }

    /// Ids of the rows on the current page.
    pub fn page_row_ids(&self) -> Vec<String> {
        self.read(|inner| inner.page_rows().iter().map(|row| row.id()).collect())
    }
}
