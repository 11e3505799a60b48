//! Row selection.
//!
//! Selection is keyed by row id, so it survives row array replacement.

use std::collections::BTreeSet;

use crate::model::TableRow;

use super::axis::Outbox;
use super::{Table, TableInner};

/// ID-based selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<String>,
    /// Anchor for range selection.
    anchor: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// A working copy of `selected` with the given range anchor.
    pub fn from_parts(selected: BTreeSet<String>, anchor: Option<String>) -> Self {
        Self { selected, anchor }
    }

    pub fn into_parts(self) -> (BTreeSet<String>, Option<String>) {
        (self.selected, self.anchor)
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Toggle one id. Returns whether it is now selected.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.anchor = Some(id.to_string());
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.to_string());
            true
        }
    }

    /// Select every id from the anchor to `target` in `ordered`.
    ///
    /// Without an anchor (or when either end is missing) only `target` is added.
    pub fn range_select(&mut self, target: &str, ordered: &[String]) -> Vec<String> {
        let anchor = self.anchor.clone().unwrap_or_else(|| target.to_string());
        let anchor_pos = ordered.iter().position(|id| *id == anchor);
        let target_pos = ordered.iter().position(|id| id == target);

        let range = match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => &ordered[a.min(t)..=a.max(t)],
            _ => &[],
        };

        let mut added = Vec::new();
        if range.is_empty() {
            if self.selected.insert(target.to_string()) {
                added.push(target.to_string());
            }
        } else {
            for id in range {
                if self.selected.insert(id.clone()) {
                    added.push(id.clone());
                }
            }
        }
        self.anchor = Some(target.to_string());
        added
    }

    /// Select all of `ids`. Returns the newly selected ones.
    pub fn select_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        ids.into_iter()
            .filter(|id| self.selected.insert((*id).clone()))
            .cloned()
            .collect()
    }

    /// Deselect all of `ids`.
    pub fn deselect_all<'a>(&mut self, ids: impl IntoIterator<Item = &'a String>) {
        for id in ids {
            self.selected.remove(id);
        }
    }

    /// Clear the selection. Returns the deselected ids.
    pub fn clear(&mut self) -> Vec<String> {
        self.anchor = None;
        std::mem::take(&mut self.selected).into_iter().collect()
    }
}

/// Aggregate state of a group of checkboxes (the header checkbox).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

impl<T: TableRow> TableInner<T> {
    /// Queue `on_row_select` with the selected rows present in the row array.
    pub(super) fn notify_selection(
        &self,
        on_select: Option<&super::RowsCallback<T>>,
        outbox: &mut Outbox,
    ) {
        let Some(on_select) = on_select else {
            return;
        };
        let rows: Vec<T> = self
            .rows
            .iter()
            .filter(|row| self.selection.get().contains(&row.id()))
            .cloned()
            .collect();
        let on_select = on_select.clone();
        outbox.push(move || on_select(rows));
    }
}

impl<T: TableRow> Table<T> {
    /// Selected row ids.
    pub fn selected_ids(&self) -> BTreeSet<String> {
        self.read(|inner| inner.selection.get().clone())
    }

    /// Selected rows present in the row array.
    pub fn selected_rows(&self) -> Vec<T> {
        self.read(|inner| {
            inner
                .rows
                .iter()
                .filter(|row| inner.selection.get().contains(&row.id()))
                .cloned()
                .collect()
        })
    }

    pub fn is_selected(&self, row_id: &str) -> bool {
        self.read(|inner| inner.selection.get().contains(row_id))
    }

    /// Toggle one row. Returns `false` if row selection is disabled, or if
    /// the id is neither in the row array nor already selected.
    ///
    /// Ids selected while their rows were loaded stay selected after the rows
    /// are replaced (another page in manual pagination) and can still be
    /// deselected; an owner presets other ids through a controlled selection.
    pub fn toggle_row_selection(&self, row_id: &str) -> bool {
        self.change_selection(|inner, selection| {
            let loaded = inner.rows.iter().any(|row| row.id() == row_id);
            if !loaded && !selection.is_selected(row_id) {
                return false;
            }
            selection.toggle(row_id);
            true
        })
    }

    /// Extend the selection from the last toggled row to `row_id`, over the
    /// current page in display order.
    pub fn range_select(&self, row_id: &str) -> bool {
        self.change_selection(|inner, selection| {
            let ordered: Vec<String> = inner.page_rows().iter().map(|row| row.id()).collect();
            selection.range_select(row_id, &ordered);
            true
        })
    }

    /// Select every row of the current page, or deselect them all when they
    /// are all selected already. Rows on other pages are untouched.
    pub fn toggle_page_selection(&self) -> bool {
        self.change_selection(|inner, selection| {
            let ids: Vec<String> = inner.page_rows().iter().map(|row| row.id()).collect();
            if !ids.is_empty() && ids.iter().all(|id| selection.is_selected(id)) {
                selection.deselect_all(&ids);
            } else {
                selection.select_all(&ids);
            }
            true
        })
    }

    /// Clear the whole selection.
    pub fn deselect_all(&self) -> bool {
        self.change_selection(|_, selection| {
            selection.clear();
            true
        })
    }

    /// State of the header checkbox for the current page.
    pub fn page_check_state(&self) -> CheckState {
        self.inner
            .read()
            .map(|g| {
                let page = g.page_rows();
                let selected = page
                    .iter()
                    .filter(|row| g.selection.get().contains(&row.id()))
                    .count();
                match selected {
                    0 => CheckState::Unchecked,
                    n if n == page.len() => CheckState::Checked,
                    _ => CheckState::Indeterminate,
                }
            })
            .unwrap_or(CheckState::Unchecked)
    }

    /// Run `f` on a working copy of the selection, then apply or forward it.
    ///
    /// `f` returns `false` to reject the gesture.
    fn change_selection(&self, f: impl FnOnce(&TableInner<T>, &mut Selection) -> bool) -> bool {
        self.update(|inner, outbox| {
            if !inner.features().row_selection {
                return false;
            }
            let mut working = Selection::from_parts(
                inner.selection.get().clone(),
                inner.selection_anchor.clone(),
            );
            if !f(inner, &mut working) {
                return false;
            }
            let (next, anchor) = working.into_parts();
            inner.selection_anchor = anchor;
            if next != *inner.selection.get() && inner.selection.set(next, outbox) {
                log::debug!("[table] {} rows selected", inner.selection.get().len());
                inner.notify_selection(self.hooks.on_row_select.as_ref(), outbox);
            }
            true
        })
        .unwrap_or(false)
    }

    /// Replace the whole selection, for example to clear it after a bulk
    /// action. Ids need not be in the row array.
    pub fn set_selection(&self, ids: BTreeSet<String>) -> bool {
        self.change_selection(|_, selection| {
            *selection = Selection::from_parts(ids, selection.anchor().map(str::to_string));
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_toggle_sets_anchor() {
        let mut selection = Selection::new();
        assert!(selection.toggle("a"));
        assert_eq!(selection.anchor(), Some("a"));
        assert!(!selection.toggle("a"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_range_select_from_anchor() {
        let ordered = ids(&["a", "b", "c", "d"]);
        let mut selection = Selection::new();
        selection.toggle("d");
        let added = selection.range_select("b", &ordered);
        assert_eq!(added, ids(&["b", "c"]));
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn test_range_select_without_anchor() {
        let mut selection = Selection::new();
        assert_eq!(selection.range_select("x", &ids(&["a"])), ids(&["x"]));
    }
}
