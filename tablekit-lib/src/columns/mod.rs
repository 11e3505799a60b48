//! Column set construction.
//!
//! A [`ColumnSet`] is the normalized, ordered list of column descriptors the
//! rest of the engine works with: the declared columns, each carrying its
//! resolved filter widget, plus the synthetic interactions and actions
//! columns implied by the enabled features.

use std::collections::HashSet;

use futures::future::join_all;

use crate::config::{SizingConfig, TableConfig};
use crate::error::ColumnError;
use crate::filter::{FilterKind, FilterWidget, ResolveCache, resolve_filter};
use crate::model::{
    ACTIONS_COLUMN_ID, ColumnDef, ColumnDescriptor, INTERACTIONS_COLUMN_ID, SyntheticColumn,
    TableFeatures,
};

/// An immutable, built set of columns.
pub struct ColumnSet<T> {
    columns: Vec<ColumnDescriptor<T>>,
    features: TableFeatures,
}

impl<T> ColumnSet<T> {
    /// An empty set.
    pub fn empty(features: TableFeatures) -> Self {
        Self {
            columns: Vec::new(),
            features,
        }
    }

    /// Build a set whose asynchronous filters are not resolved yet.
    ///
    /// Custom filters resolve immediately; distinct and paged filters stay
    /// without a widget until the set is rebuilt with [`build_columns`].
    pub fn unresolved(
        declared: &[ColumnDef<T>],
        features: TableFeatures,
        sizing: &SizingConfig,
    ) -> Result<Self, ColumnError> {
        validate_ids(declared)?;
        let widgets = declared
            .iter()
            .map(|def| match &def.filter {
                FilterKind::Custom(custom) => Ok(Some(FilterWidget::Custom(custom.clone()))),
                _ => Ok(None),
            })
            .collect();
        Ok(assemble(declared, widgets, features, sizing))
    }

    /// All columns in declared order, synthetic columns included.
    pub fn columns(&self) -> &[ColumnDescriptor<T>] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDescriptor<T>> {
        self.columns.iter()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn features(&self) -> TableFeatures {
        self.features
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor<T>> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Column ids in declared order.
    pub fn ids(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.id.clone()).collect()
    }

    /// Whether the column can be moved by a column drag.
    pub fn is_reorderable(&self, id: &str) -> bool {
        self.features.column_reordering && self.get(id).is_some_and(|c| c.enable_reordering)
    }
}

impl<T> Clone for ColumnSet<T> {
    fn clone(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            features: self.features,
        }
    }
}

impl<T> std::fmt::Debug for ColumnSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnSet")
            .field("columns", &self.columns)
            .field("features", &self.features)
            .finish()
    }
}

/// Build a column set, resolving every declared filter concurrently.
///
/// A column whose filter fails to resolve is kept without a filter widget and
/// with `enable_column_filter` turned off; the failure is logged and the rest
/// of the set is unaffected. Duplicate or reserved ids fail the whole build.
pub async fn build_columns<T>(
    declared: &[ColumnDef<T>],
    features: TableFeatures,
    config: &TableConfig,
) -> Result<ColumnSet<T>, ColumnError> {
    validate_ids(declared)?;

    let cache = ResolveCache::new();
    let resolved = join_all(declared.iter().map(|def| {
        resolve_filter(&def.id, &def.filter, &cache, &config.autocomplete)
    }))
    .await;

    let widgets = declared
        .iter()
        .zip(resolved)
        .map(|(def, result)| {
            result.map_err(|source| {
                let err = ColumnError::FilterResolution {
                    column: def.id.clone(),
                    source,
                };
                log::warn!("[columns] {}", err);
                err
            })
        })
        .collect();

    log::debug!(
        "[columns] built {} declared columns ({} distinct sources fetched)",
        declared.len(),
        cache.len()
    );
    Ok(assemble(declared, widgets, features, &config.sizing))
}

pub(crate) fn validate_ids<T>(declared: &[ColumnDef<T>]) -> Result<(), ColumnError> {
    let mut seen = HashSet::with_capacity(declared.len());
    for def in declared {
        if def.id == INTERACTIONS_COLUMN_ID || def.id == ACTIONS_COLUMN_ID {
            return Err(ColumnError::ReservedId(def.id.clone()));
        }
        if !seen.insert(def.id.as_str()) {
            return Err(ColumnError::DuplicateId(def.id.clone()));
        }
    }
    Ok(())
}

fn assemble<T>(
    declared: &[ColumnDef<T>],
    widgets: Vec<Result<Option<FilterWidget>, ColumnError>>,
    features: TableFeatures,
    sizing: &SizingConfig,
) -> ColumnSet<T> {
    let mut columns = Vec::with_capacity(declared.len() + 2);

    if features.has_interactions() {
        columns.push(ColumnDescriptor::synthetic(
            SyntheticColumn::Interactions,
            interactions_width(features, sizing),
        ));
    }

    for (def, widget) in declared.iter().zip(widgets) {
        let column = match widget {
            Ok(widget) => ColumnDescriptor::from_def(def, widget),
            Err(_) => {
                let mut column = ColumnDescriptor::from_def(def, None);
                column.enable_column_filter = false;
                column
            }
        };
        columns.push(column);
    }

    if features.row_actions {
        columns.push(ColumnDescriptor::synthetic(
            SyntheticColumn::Actions,
            sizing.actions_width,
        ));
    }

    ColumnSet { columns, features }
}

/// Width of the interactions column: the sum of its enabled sub-controls.
pub fn interactions_width(features: TableFeatures, sizing: &SizingConfig) -> u32 {
    let mut width = 0;
    if features.row_reordering {
        width += sizing.row_handle_width;
    }
    if features.row_selection {
        width += sizing.checkbox_width;
    }
    if features.row_expansion {
        width += sizing.expand_toggle_width;
    }
    width
}
