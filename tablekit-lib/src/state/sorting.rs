//! Sorting state and client-side sorting.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::columns::ColumnSet;
use crate::model::TableRow;

use super::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortEntry {
    pub column_id: String,
    pub direction: SortDirection,
}

impl SortEntry {
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Next sorting after toggling `column_id`: unsorted, ascending, descending,
/// then unsorted again. A different column starts over at ascending.
pub fn next_sorting(current: &[SortEntry], column_id: &str) -> Vec<SortEntry> {
    match current.iter().find(|e| e.column_id == column_id) {
        None => vec![SortEntry::asc(column_id)],
        Some(e) if e.direction == SortDirection::Asc => vec![SortEntry::desc(column_id)],
        Some(_) => Vec::new(),
    }
}

/// A cell's numeric value; non-finite parses ("NaN", "inf") count as text.
fn numeric(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Compare two cell texts.
///
/// Numbers sort before text and compare numerically; text compares
/// case-insensitively. This is a total order, so mixed columns sort
/// consistently.
pub fn compare_cells(a: &str, b: &str) -> Ordering {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// Stable sort of `rows` by the first entry of `sorting`.
pub(super) fn sort_rows<T: TableRow>(
    rows: &mut [&T],
    sorting: &[SortEntry],
    columns: &ColumnSet<T>,
) {
    let Some(entry) = sorting.first() else {
        return;
    };
    let Some(column) = columns.get(&entry.column_id) else {
        return;
    };
    rows.sort_by(|a, b| {
        let ordering = compare_cells(&column.cell_text(a), &column.cell_text(b));
        match entry.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

impl<T: TableRow> Table<T> {
    pub fn sorting(&self) -> Vec<SortEntry> {
        self.read(|inner| inner.sorting.get().clone())
    }

    /// Direction the column is currently sorted in.
    pub fn sort_direction(&self, column_id: &str) -> Option<SortDirection> {
        self.inner.read().ok().and_then(|g| {
            g.sorting
                .get()
                .iter()
                .find(|e| e.column_id == column_id)
                .map(|e| e.direction)
        })
    }

    /// Cycle a column's sort. Ignored for columns that cannot be sorted.
    pub fn toggle_sort(&self, column_id: &str) -> bool {
        self.update(|inner, outbox| {
            if !inner
                .columns
                .get(column_id)
                .is_some_and(|c| c.enable_sorting)
            {
                return false;
            }
            let next = next_sorting(inner.sorting.get(), column_id);
            log::debug!("[table] sort {} -> {:?}", column_id, next);
            inner.sorting.set(next, outbox);
            true
        })
        .unwrap_or(false)
    }

    /// Replace the sorting.
    pub fn set_sorting(&self, sorting: Vec<SortEntry>) {
        self.update(|inner, outbox| {
            inner.sorting.set(sorting, outbox);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle() {
        let s1 = next_sorting(&[], "price");
        assert_eq!(s1, vec![SortEntry::asc("price")]);
        let s2 = next_sorting(&s1, "price");
        assert_eq!(s2, vec![SortEntry::desc("price")]);
        assert!(next_sorting(&s2, "price").is_empty());
        assert_eq!(next_sorting(&s2, "title"), vec![SortEntry::asc("title")]);
    }

    #[test]
    fn test_compare_cells() {
        assert_eq!(compare_cells("9", "10"), Ordering::Less);
        assert_eq!(compare_cells("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_cells("10", "abc"), Ordering::Less);
    }

    #[test]
    fn test_mixed_cells_are_ordered_consistently() {
        // Numbers first, then text, whatever the pair.
        assert_eq!(compare_cells("10", "1a"), Ordering::Less);
        assert_eq!(compare_cells("9", "1a"), Ordering::Less);
        assert_eq!(compare_cells("12 kg", "5"), Ordering::Greater);
        assert_eq!(compare_cells("NaN", "3"), Ordering::Greater);
        assert_eq!(compare_cells("NaN", "nan"), Ordering::Equal);

        let mut cells = vec!["1a", "NaN", "10", "N", "9", "12 kg", "-2.5", "Na", "inf"];
        cells.sort_by(|a, b| compare_cells(a, b));
        assert_eq!(
            cells,
            vec!["-2.5", "9", "10", "12 kg", "1a", "inf", "N", "Na", "NaN"]
        );
        for pair in cells.windows(2) {
            assert_ne!(compare_cells(pair[0], pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&SortEntry::desc("price")).unwrap();
        assert_eq!(json, r#"{"column_id":"price","direction":"desc"}"#);
    }
}
