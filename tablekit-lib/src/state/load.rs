//! Loading flag and error slot.

use crate::model::TableRow;

use super::Table;

/// Fetch status of the row data, set by the owner of the rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadState {
    pub loading: bool,
    pub error: Option<String>,
}

impl<T: TableRow> Table<T> {
    pub fn load_state(&self) -> LoadState {
        self.read(|inner| inner.load.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.read(|inner| inner.load.loading)
    }

    pub fn set_loading(&self, loading: bool) {
        self.update(|inner, _| inner.load.loading = loading);
    }

    /// Set or clear the error slot. An error hides the rows until cleared.
    pub fn set_error(&self, error: Option<String>) {
        if let Some(error) = &error {
            log::warn!("[table] {} load failed: {}", self.id(), error);
        }
        self.update(|inner, _| inner.load.error = error);
    }

    /// Replace the rows after a successful fetch: clears loading and error.
    pub fn finish_loading(&self, rows: Vec<T>) {
        self.update(|inner, _| {
            inner.load = LoadState::default();
            inner.rows = rows;
            inner.recompute_sizing();
        });
    }
}
