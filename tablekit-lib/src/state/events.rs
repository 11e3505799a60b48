//! Gesture handling: row clicks, drags, expansion and row menus.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::drag::{DragEnd, DragIgnored, DragOutcome, is_column_drag, reorder_columns, reorder_rows};
use crate::error::MenuError;
use crate::menu::{MenuItem, RowMenuProvider};
use crate::model::TableRow;

use super::Table;

impl<T: TableRow> Table<T> {
    /// Fire `on_row_click` for a row. Returns `false` for unknown rows.
    pub fn click_row(&self, row_id: &str) -> bool {
        let Some((_, row)) = self.find_row(row_id) else {
            return false;
        };
        if let Some(on_click) = &self.hooks.on_row_click {
            on_click(row);
        }
        true
    }

    /// Apply a finished drag.
    ///
    /// Column drags update the column order. Row drags hand the reordered
    /// row array to the row setter; the rows themselves change only when the
    /// owner passes them back.
    pub fn handle_drag_end(&self, drag: &DragEnd) -> DragOutcome {
        let outcome = self
            .update(|inner, outbox| {
                let order = inner.effective_order();
                if is_column_drag(&order, &drag.active) {
                    return match reorder_columns(&order, &inner.columns, drag) {
                        Ok((next, from, to)) => {
                            if inner.order.set(next, outbox) {
                                inner.recompute_sizing();
                            }
                            DragOutcome::ColumnMoved { from, to }
                        }
                        Err(reason) => DragOutcome::Ignored(reason),
                    };
                }

                let setter = match &self.hooks.row_setter {
                    Some(setter) if inner.features().row_reordering => Arc::clone(setter),
                    _ => return DragOutcome::Ignored(DragIgnored::RowReorderingUnavailable),
                };
                match reorder_rows(&inner.rows, drag) {
                    Ok((next, from, to)) => {
                        outbox.push(move || setter(next));
                        DragOutcome::RowMoved { from, to }
                    }
                    Err(reason) => DragOutcome::Ignored(reason),
                }
            })
            .unwrap_or(DragOutcome::Ignored(DragIgnored::NoTarget));

        log::debug!("[table] drag {:?} -> {:?}", drag, outcome);
        outcome
    }

    // -------------------------------------------------------------------------
    // Expansion
    // -------------------------------------------------------------------------

    /// Toggle a row's expansion. Returns `false` if expansion is disabled.
    pub fn toggle_expand(&self, row_id: &str) -> bool {
        self.update(|inner, _| {
            if !inner.features().row_expansion {
                return false;
            }
            if !inner.expanded.remove(row_id) {
                inner.expanded.insert(row_id.to_string());
            }
            true
        })
        .unwrap_or(false)
    }

    pub fn is_expanded(&self, row_id: &str) -> bool {
        self.read(|inner| inner.expanded.contains(row_id))
    }

    pub fn expanded_ids(&self) -> BTreeSet<String> {
        self.read(|inner| inner.expanded.clone())
    }

    /// Expanded content of an expanded row.
    pub fn expanded_content(&self, row_id: &str) -> Option<String> {
        if !self.is_expanded(row_id) {
            return None;
        }
        let render = self.hooks.expanded_content.as_ref()?;
        let (_, row) = self.find_row(row_id)?;
        Some(render(&row))
    }

    // -------------------------------------------------------------------------
    // Row menus
    // -------------------------------------------------------------------------

    pub fn has_action_menu(&self) -> bool {
        self.hooks.action_menu.is_some()
    }

    pub fn has_context_menu(&self) -> bool {
        self.hooks.context_menu.is_some()
    }

    /// Items of a row's action menu.
    pub async fn row_actions(&self, row_id: &str) -> Result<Vec<MenuItem>, MenuError> {
        let provider = self
            .hooks
            .action_menu
            .clone()
            .ok_or(MenuError::NoProvider("action"))?;
        self.menu_items(provider, row_id).await
    }

    /// Items of a row's context menu.
    pub async fn row_context_menu(&self, row_id: &str) -> Result<Vec<MenuItem>, MenuError> {
        let provider = self
            .hooks
            .context_menu
            .clone()
            .ok_or(MenuError::NoProvider("context"))?;
        self.menu_items(provider, row_id).await
    }

    async fn menu_items(
        &self,
        provider: Arc<dyn RowMenuProvider<T>>,
        row_id: &str,
    ) -> Result<Vec<MenuItem>, MenuError> {
        let (_, row) = self
            .find_row(row_id)
            .ok_or_else(|| MenuError::RowNotFound(row_id.to_string()))?;
        Ok(provider.menu_items(&row).await?)
    }
}
