//! Column set, order, visibility and sizing state.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::columns::{ColumnSet, build_columns, validate_ids};
use crate::error::ColumnError;
use crate::model::{ColumnDef, ColumnDescriptor, TableFeatures, TableRow};
use crate::sizing::{SizingInput, base_widths, fill_last_column, visible_order};

use super::axis::Outbox;
use super::{Table, TableInner};

/// Fit a stored column order to a column set.
///
/// An order naming exactly the set's ids is kept. Otherwise pinned
/// (non-reorderable) columns take their declared slots, and the remaining
/// slots are filled by the movable ids of the stored order, in stored order,
/// followed by new movable ids in declared order.
pub(crate) fn reconcile_order<T>(order: &[String], columns: &ColumnSet<T>) -> Vec<String> {
    let ids = columns.ids();
    if order.len() == ids.len() && ids.iter().all(|id| order.contains(id)) {
        return order.to_vec();
    }

    let movable = |id: &str| columns.get(id).is_some_and(|c| c.enable_reordering);
    let mut kept: Vec<&String> = Vec::new();
    for id in order {
        if movable(id.as_str()) && !kept.contains(&id) {
            kept.push(id);
        }
    }
    let fresh = ids
        .iter()
        .filter(|id| movable(id.as_str()) && !order.contains(*id));
    let mut fill = kept.into_iter().chain(fresh);

    ids.iter()
        .map(|id| {
            if movable(id.as_str()) {
                fill.next().unwrap_or(id).clone()
            } else {
                id.clone()
            }
        })
        .collect()
}

impl<T: TableRow> TableInner<T> {
    /// Column order fitted to the current column set.
    pub fn effective_order(&self) -> Vec<String> {
        reconcile_order(self.order.get(), &self.columns)
    }

    pub fn install_columns(&mut self, columns: ColumnSet<T>, outbox: &mut Outbox) {
        let mut visibility = self.visibility.get().clone();
        for column in columns.iter() {
            if self.seen.insert(column.id.clone()) && column.default_hidden && column.enable_hiding
            {
                visibility.entry(column.id.clone()).or_insert(false);
            }
        }
        // Seeding is not a user change, so it is never forwarded.
        if visibility != *self.visibility.get() {
            self.visibility.receive(visibility);
        }
        self.columns = columns;

        let order = self.effective_order();
        if order != *self.order.get() {
            log::debug!("[table] column order re-initialized: {:?}", order);
            self.order.set(order, outbox);
        }
        self.recompute_sizing();
    }

    /// Recompute every width.
    pub fn recompute_sizing(&mut self) {
        let order = self.effective_order();
        let base = base_widths(&SizingInput {
            columns: &self.columns,
            rows: &self.rows,
            container_width: self.container_width,
            order: &order,
            visibility: self.visibility.get(),
            user_sizes: self.user_sizes.get(),
            config: &self.config.sizing,
        });
        self.base_widths = base;
        self.refill_with(&order);
    }

    /// Re-run only the fill step over the base widths.
    pub fn refill(&mut self) {
        let order = self.effective_order();
        self.refill_with(&order);
    }

    fn refill_with(&mut self, order: &[String]) {
        let mut widths = self.base_widths.clone();
        let visible = visible_order(&self.columns, order, self.visibility.get());
        fill_last_column(
            &mut widths,
            &self.columns,
            &visible,
            self.container_width,
            &self.config.sizing,
        );
        self.widths = widths;
    }

    fn visible_columns(&self) -> Vec<ColumnDescriptor<T>> {
        self.effective_order()
            .iter()
            .filter_map(|id| self.columns.get(id))
            .filter(|column| column.is_visible_in(self.visibility.get()))
            .cloned()
            .collect()
    }
}

impl<T: TableRow> Table<T> {
    // -------------------------------------------------------------------------
    // Column set
    // -------------------------------------------------------------------------

    /// The current column set.
    pub fn columns(&self) -> Option<ColumnSet<T>> {
        self.inner.read().ok().map(|g| g.columns.clone())
    }

    /// A column by id.
    pub fn column(&self, id: &str) -> Option<ColumnDescriptor<T>> {
        self.inner.read().ok().and_then(|g| g.columns.get(id).cloned())
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<ColumnDescriptor<T>> {
        self.read(|inner| inner.visible_columns())
    }

    /// Replace the declared columns and features, resolving filters.
    ///
    /// Returns `Ok(false)` when a later rebuild started before this one
    /// finished; the result is then discarded. A rebuild rejected for its
    /// ids does not supersede one in flight.
    pub async fn rebuild_columns(
        &self,
        columns: Vec<ColumnDef<T>>,
        features: TableFeatures,
    ) -> Result<bool, ColumnError> {
        self.rebuild(Arc::new(columns), features).await
    }

    /// Resolve the filters of the current declared columns.
    pub async fn resolve_filters(&self) -> Result<bool, ColumnError> {
        let current = self
            .inner
            .read()
            .ok()
            .map(|g| (Arc::clone(&g.declared), g.features()));
        match current {
            Some((declared, features)) => self.rebuild(declared, features).await,
            None => Ok(false),
        }
    }

    async fn rebuild(
        &self,
        declared: Arc<Vec<ColumnDef<T>>>,
        features: TableFeatures,
    ) -> Result<bool, ColumnError> {
        validate_ids(&declared)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let features = self.hooks.apply_features(features);
        let config = self.config();
        log::debug!("[table] {} rebuilding columns (generation {})", self.id(), generation);

        let set = build_columns(&declared, features, &config).await?;

        let applied = self.update(|inner, outbox| {
            let current = self.generation.load(Ordering::SeqCst);
            if current != generation {
                log::debug!(
                    "[table] discarding column set of generation {} (current {})",
                    generation,
                    current
                );
                return false;
            }
            inner.declared = declared;
            inner.install_columns(set, outbox);
            true
        });
        let applied = applied.unwrap_or(false);
        if applied {
            self.refresh_filter_labels().await;
        }
        Ok(applied)
    }

    // -------------------------------------------------------------------------
    // Order
    // -------------------------------------------------------------------------

    /// Column ids in display order.
    pub fn column_order(&self) -> Vec<String> {
        self.read(|inner| inner.effective_order())
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    pub fn is_column_visible(&self, id: &str) -> bool {
        self.read(|inner| {
            inner
                .columns
                .get(id)
                .is_some_and(|column| column.is_visible_in(inner.visibility.get()))
        })
    }

    /// Show or hide a column. Returns `false` if the column cannot be hidden.
    pub fn set_column_visibility(&self, id: &str, visible: bool) -> bool {
        self.update(|inner, outbox| {
            if !inner.columns.get(id).is_some_and(|c| c.enable_hiding) {
                return false;
            }
            let mut next = inner.visibility.get().clone();
            next.insert(id.to_string(), visible);
            if inner.visibility.set(next, outbox) {
                inner.recompute_sizing();
            }
            true
        })
        .unwrap_or(false)
    }

    pub fn toggle_column_visibility(&self, id: &str) -> bool {
        let visible = self.is_column_visible(id);
        self.set_column_visibility(id, !visible)
    }

    // -------------------------------------------------------------------------
    // Sizing
    // -------------------------------------------------------------------------

    /// Computed widths of every column.
    pub fn column_widths(&self) -> BTreeMap<String, u32> {
        self.read(|inner| inner.widths.clone())
    }

    pub fn column_width(&self, id: &str) -> Option<u32> {
        self.inner.read().ok().and_then(|g| g.widths.get(id).copied())
    }

    pub fn container_width(&self) -> Option<u32> {
        self.inner.read().ok().and_then(|g| g.container_width)
    }

    /// Update the available width and recompute sizing.
    pub fn set_container_width(&self, width: u32) {
        self.update(|inner, _| {
            if inner.container_width != Some(width) {
                inner.container_width = Some(width);
                inner.recompute_sizing();
            }
        });
    }

    /// Resize a column to `width`, clamped to the configured bounds.
    ///
    /// The user width replaces a declared size. Only the fill step is
    /// re-run. Returns `false` when resizing is disabled or the column is
    /// synthetic.
    pub fn resize_column(&self, id: &str, width: u32) -> bool {
        self.update(|inner, outbox| {
            if !inner.features().column_resizing {
                return false;
            }
            let Some(column) = inner.columns.get(id) else {
                return false;
            };
            if column.is_synthetic() {
                return false;
            }

            let width = inner.config.sizing.clamp(width);
            let mut sizes = inner.user_sizes.get().clone();
            sizes.insert(id.to_string(), width);
            if inner.user_sizes.set(sizes, outbox) {
                inner.base_widths.insert(id.to_string(), width);
                inner.refill();
            }
            true
        })
        .unwrap_or(false)
    }

    /// Drop a user width, returning the column to its computed width.
    pub fn reset_column_size(&self, id: &str) {
        self.update(|inner, outbox| {
            let mut sizes = inner.user_sizes.get().clone();
            if sizes.remove(id).is_some() && inner.user_sizes.set(sizes, outbox) {
                inner.recompute_sizing();
            }
        });
    }
}
