//! Column filters and global search.

use std::collections::BTreeMap;

use futures::future::join_all;

use crate::columns::ColumnSet;
use crate::filter::{FilterValue, PagedAutocomplete};
use crate::model::TableRow;

use super::Table;

/// Whether `row` passes every column filter.
///
/// Filters on unknown or unfilterable columns are ignored.
pub(super) fn passes_filters<T: TableRow>(
    row: &T,
    filters: &BTreeMap<String, FilterValue>,
    columns: &ColumnSet<T>,
) -> bool {
    filters.iter().all(|(column_id, value)| {
        match columns.get(column_id) {
            Some(column) if column.enable_column_filter && !column.is_synthetic() => column
                .filter_match
                .matches(row, &column.cell_text(row), value),
            _ => true,
        }
    })
}

/// Whether any searchable column of `row` contains `needle` (lowercased).
pub(super) fn matches_search<T: TableRow>(row: &T, needle: &str, columns: &ColumnSet<T>) -> bool {
    columns
        .iter()
        .filter(|column| column.enable_searching && !column.is_synthetic())
        .any(|column| column.cell_text(row).to_lowercase().contains(needle))
}

impl<T: TableRow> Table<T> {
    /// All active column filters.
    pub fn filters(&self) -> BTreeMap<String, FilterValue> {
        self.read(|inner| inner.filters.get().clone())
    }

    /// A column's filter value; `None` when the column is not filtered.
    pub fn filter(&self, column_id: &str) -> Option<FilterValue> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.filters.get().get(column_id).cloned())
    }

    /// Set (`Some`) or remove (`None`) a column filter.
    ///
    /// A change resets the page index unless pagination is manual.
    /// Selecting an id a paged picker has not loaded starts a lookup of its
    /// label in the background when a tokio runtime is available.
    pub fn set_filter(&self, column_id: &str, value: Option<FilterValue>) {
        let applied = self.update(|inner, outbox| {
            let mut next = inner.filters.get().clone();
            let changed = match &value {
                Some(value) => {
                    next.insert(column_id.to_string(), value.clone()).as_ref() != Some(value)
                }
                None => next.remove(column_id).is_some(),
            };
            if !changed {
                return false;
            }
            log::debug!("[table] filter {} -> {:?}", column_id, next.get(column_id));
            let applied = inner.filters.set(next, outbox);
            inner.reset_page(outbox);
            applied
        });
        if applied == Some(true) && matches!(value, Some(FilterValue::Value(_))) {
            self.spawn_label_refresh();
        }
    }

    /// Remove every column filter.
    pub fn clear_filters(&self) {
        self.update(|inner, outbox| {
            if inner.filters.get().is_empty() {
                return;
            }
            inner.filters.set(BTreeMap::new(), outbox);
            inner.reset_page(outbox);
        });
    }

    /// Paged pickers whose column is filtered by an id, with that column.
    fn id_filtered_pickers(&self) -> Vec<(String, PagedAutocomplete)> {
        self.read(|inner| {
            inner
                .filters
                .get()
                .iter()
                .filter(|(_, value)| value.as_value().is_some())
                .filter_map(|(column_id, _)| {
                    let widget = inner.columns.get(column_id)?.filter_widget.as_ref()?;
                    Some((column_id.clone(), widget.as_autocomplete()?.clone()))
                })
                .collect()
        })
    }

    /// Look up the label of every paged-picker filter whose selected id is
    /// outside the loaded items.
    ///
    /// Runs after every applied column build, so a table created with a
    /// filtered deep link shows the selected label once its filters resolve.
    /// Failed lookups are logged and leave the label empty.
    pub async fn refresh_filter_labels(&self) {
        let pickers = self.id_filtered_pickers();
        let results = join_all(pickers.iter().map(|(column_id, picker)| async move {
            (column_id, picker.ensure_selected(&self.filter_binding(column_id)).await)
        }))
        .await;
        for (column_id, result) in results {
            if let Err(e) = result {
                log::warn!("[table] label lookup for filter {} failed: {}", column_id, e);
            }
        }
    }

    /// Run [`refresh_filter_labels`](Self::refresh_filter_labels) on the
    /// current runtime, if there is one.
    pub(super) fn spawn_label_refresh(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            log::debug!("[table] no runtime, filter labels not refreshed");
            return;
        };
        let table = self.clone();
        handle.spawn(async move { table.refresh_filter_labels().await });
    }

    pub fn global_search(&self) -> String {
        self.read(|inner| inner.search.get().clone())
    }

    /// Set the free-text search.
    ///
    /// A change resets the page index unless pagination is manual.
    pub fn set_global_search(&self, text: impl Into<String>) {
        let text = text.into();
        self.update(|inner, outbox| {
            if *inner.search.get() == text {
                return;
            }
            inner.search.set(text, outbox);
            inner.reset_page(outbox);
        });
    }
}
