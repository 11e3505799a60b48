//! Drag-reorder coordination.
//!
//! A single drag surface carries both column-header drags and row drags. The
//! dragged id tells them apart: ids present in the column order are columns,
//! anything else is a row.

use crate::columns::ColumnSet;
use crate::model::TableRow;

/// A finished drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    /// Id of the dragged item.
    pub active: String,
    /// Id of the item it was dropped on, if any.
    pub over: Option<String>,
}

impl DragEnd {
    pub fn new(active: impl Into<String>, over: impl Into<String>) -> Self {
        Self {
            active: active.into(),
            over: Some(over.into()),
        }
    }

    /// A drag dropped outside any target.
    pub fn cancelled(active: impl Into<String>) -> Self {
        Self {
            active: active.into(),
            over: None,
        }
    }
}

/// Why a drag had no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragIgnored {
    /// Dropped outside any target.
    NoTarget,
    /// Dropped on itself.
    SameItem,
    /// The target is not an item of the same kind.
    UnknownTarget(String),
    /// A pinned (non-reorderable) column was involved.
    Pinned(String),
    /// Column reordering is disabled.
    ColumnReorderingDisabled,
    /// Row reordering is disabled or no row setter is installed.
    RowReorderingUnavailable,
}

/// Result of handling a drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// A column moved between positions of the column order.
    ColumnMoved { from: usize, to: usize },
    /// A row moved; the new row array went to the row setter.
    RowMoved { from: usize, to: usize },
    Ignored(DragIgnored),
}

/// Move the item at `from` to `to`, shifting the items in between.
pub fn move_item<V>(items: &mut Vec<V>, from: usize, to: usize) {
    if from == to || from >= items.len() || to >= items.len() {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Whether `active` refers to a column.
pub fn is_column_drag(order: &[String], active: &str) -> bool {
    order.iter().any(|id| id == active)
}

/// Compute the column order after dropping `active` on `over`.
///
/// Only reorderable columns move; pinned columns keep their slots and the
/// reorderable columns shift around them.
pub fn reorder_columns<T>(
    order: &[String],
    columns: &ColumnSet<T>,
    drag: &DragEnd,
) -> Result<(Vec<String>, usize, usize), DragIgnored> {
    let over = check_target(drag)?;
    if !columns.features().column_reordering {
        return Err(DragIgnored::ColumnReorderingDisabled);
    }
    let from = position(order, &drag.active)?;
    let to = position(order, over)?;
    for id in [drag.active.as_str(), over] {
        if !columns.is_reorderable(id) {
            return Err(DragIgnored::Pinned(id.to_string()));
        }
    }

    let slots: Vec<usize> = order
        .iter()
        .enumerate()
        .filter(|(_, id)| columns.is_reorderable(id))
        .map(|(i, _)| i)
        .collect();
    let mut movable: Vec<String> = slots.iter().map(|&i| order[i].clone()).collect();
    let sub_from = slots.iter().position(|&i| i == from);
    let sub_to = slots.iter().position(|&i| i == to);
    if let (Some(sub_from), Some(sub_to)) = (sub_from, sub_to) {
        move_item(&mut movable, sub_from, sub_to);
    }

    let mut next = order.to_vec();
    for (slot, id) in slots.into_iter().zip(movable) {
        next[slot] = id;
    }
    Ok((next, from, to))
}

/// Compute the row array after dropping row `active` on row `over`.
pub fn reorder_rows<T: TableRow>(
    rows: &[T],
    drag: &DragEnd,
) -> Result<(Vec<T>, usize, usize), DragIgnored> {
    let over = check_target(drag)?;
    let from = rows
        .iter()
        .position(|row| row.id() == drag.active)
        .ok_or_else(|| DragIgnored::UnknownTarget(drag.active.clone()))?;
    let to = rows
        .iter()
        .position(|row| row.id() == over)
        .ok_or_else(|| DragIgnored::UnknownTarget(over.to_string()))?;

    let mut next = rows.to_vec();
    move_item(&mut next, from, to);
    Ok((next, from, to))
}

fn check_target(drag: &DragEnd) -> Result<&str, DragIgnored> {
    let over = drag.over.as_deref().ok_or(DragIgnored::NoTarget)?;
    if over == drag.active {
        return Err(DragIgnored::SameItem);
    }
    Ok(over)
}

fn position(order: &[String], id: &str) -> Result<usize, DragIgnored> {
    order
        .iter()
        .position(|o| o == id)
        .ok_or_else(|| DragIgnored::UnknownTarget(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SizingConfig;
    use crate::model::{ColumnDef, TableFeatures};
    use serde_json::{Value, json};

    fn columns(defs: &[ColumnDef<Value>]) -> ColumnSet<Value> {
        ColumnSet::unresolved(
            defs,
            TableFeatures::new().column_reordering().row_selection(),
            &SizingConfig::default(),
        )
        .unwrap()
    }

    fn ids(order: &[&str]) -> Vec<String> {
        order.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_move_item() {
        let mut items = vec![1, 2, 3, 4];
        move_item(&mut items, 0, 2);
        assert_eq!(items, vec![2, 3, 1, 4]);
        move_item(&mut items, 3, 0);
        assert_eq!(items, vec![4, 2, 3, 1]);
        move_item(&mut items, 0, 9);
        assert_eq!(items, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_pinned_columns_hold_their_slots() {
        let set = columns(&[
            ColumnDef::new("a"),
            ColumnDef::new("pinned").reorderable(false),
            ColumnDef::new("b"),
            ColumnDef::new("c"),
        ]);
        let order = set.ids();

        let (next, from, to) = reorder_columns(&order, &set, &DragEnd::new("a", "c")).unwrap();
        assert_eq!(next, ids(&["__interactions", "b", "pinned", "c", "a"]));
        assert_eq!((from, to), (1, 4));

        assert_eq!(
            reorder_columns(&order, &set, &DragEnd::new("a", "pinned")),
            Err(DragIgnored::Pinned("pinned".into()))
        );
        assert_eq!(
            reorder_columns(&order, &set, &DragEnd::new("a", "__interactions")),
            Err(DragIgnored::Pinned("__interactions".into()))
        );
    }

    #[test]
    fn test_noop_drags() {
        let set = columns(&[ColumnDef::new("a"), ColumnDef::new("b")]);
        let order = set.ids();
        assert_eq!(
            reorder_columns(&order, &set, &DragEnd::new("a", "a")),
            Err(DragIgnored::SameItem)
        );
        assert_eq!(
            reorder_columns(&order, &set, &DragEnd::cancelled("a")),
            Err(DragIgnored::NoTarget)
        );
        assert_eq!(
            reorder_columns(&order, &set, &DragEnd::new("a", "zzz")),
            Err(DragIgnored::UnknownTarget("zzz".into()))
        );
    }

    #[test]
    fn test_row_reorder() {
        let rows = vec![json!({"id": "r1"}), json!({"id": "r2"}), json!({"id": "r3"})];
        let (next, from, to) = reorder_rows(&rows, &DragEnd::new("r3", "r1")).unwrap();
        let next_ids: Vec<String> = next.iter().map(TableRow::id).collect();
        assert_eq!(next_ids, ids(&["r3", "r1", "r2"]));
        assert_eq!((from, to), (2, 0));
        assert!(matches!(
            reorder_rows(&rows, &DragEnd::new("r1", "nope")),
            Err(DragIgnored::UnknownTarget(_))
        ));
    }
}
