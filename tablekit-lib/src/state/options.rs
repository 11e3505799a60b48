//! Table construction options and callbacks.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::config::TableConfig;
use crate::filter::FilterValue;
use crate::menu::RowMenuProvider;
use crate::model::{ColumnDef, ManualFlags, TableFeatures, TableRow};

use super::axis::Controlled;
use super::pagination::Pagination;
use super::sorting::SortEntry;

/// Callback receiving one row.
pub type RowCallback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Callback receiving a row list.
pub type RowsCallback<T> = Arc<dyn Fn(Vec<T>) + Send + Sync>;

/// Produces the expanded content of a row.
pub type ExpandedContent<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// Container dimensions passed through to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    pub height: Option<u32>,
    pub max_height: Option<u32>,
}

pub(crate) struct TableHooks<T: TableRow> {
    pub on_row_click: Option<RowCallback<T>>,
    pub on_row_select: Option<RowsCallback<T>>,
    pub row_setter: Option<RowsCallback<T>>,
    pub action_menu: Option<Arc<dyn RowMenuProvider<T>>>,
    pub context_menu: Option<Arc<dyn RowMenuProvider<T>>>,
    pub expanded_content: Option<ExpandedContent<T>>,
}

impl<T: TableRow> TableHooks<T> {
    /// The actions column follows the presence of an action menu provider.
    pub fn apply_features(&self, features: TableFeatures) -> TableFeatures {
        TableFeatures {
            row_actions: self.action_menu.is_some(),
            ..features
        }
    }
}

impl<T: TableRow> Default for TableHooks<T> {
    fn default() -> Self {
        Self {
            on_row_click: None,
            on_row_select: None,
            row_setter: None,
            action_menu: None,
            context_menu: None,
            expanded_content: None,
        }
    }
}

impl<T: TableRow> fmt::Debug for TableHooks<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHooks")
            .field("on_row_click", &self.on_row_click.is_some())
            .field("on_row_select", &self.on_row_select.is_some())
            .field("row_setter", &self.row_setter.is_some())
            .field("action_menu", &self.action_menu.is_some())
            .field("context_menu", &self.context_menu.is_some())
            .field("expanded_content", &self.expanded_content.is_some())
            .finish()
    }
}

/// Everything a [`Table`](super::Table) is created from.
///
/// Each state axis is internal unless a controlled pair is supplied for it.
///
/// # Example
///
/// ```
/// use serde_json::Value;
/// use tablekit_lib::model::{ColumnDef, ManualFlags, TableFeatures};
/// use tablekit_lib::state::{Pagination, Table, TableOptions};
///
/// let options = TableOptions::<Value>::new(vec![ColumnDef::new("title")])
///     .features(TableFeatures::new().row_selection())
///     .manual(ManualFlags::all())
///     .controlled_pagination(Pagination::new(0, 25), |next| {
///         println!("fetch page {}", next.page_index);
///     })
///     .page_count(-1);
/// let table = Table::new(options).unwrap();
/// ```
pub struct TableOptions<T: TableRow> {
    pub(super) columns: Vec<ColumnDef<T>>,
    pub(super) rows: Vec<T>,
    pub(super) features: TableFeatures,
    pub(super) manual: ManualFlags,
    pub(super) config: TableConfig,
    pub(super) sorting: Option<Controlled<Vec<SortEntry>>>,
    pub(super) filters: Option<Controlled<BTreeMap<String, FilterValue>>>,
    pub(super) search: Option<Controlled<String>>,
    pub(super) pagination: Option<Controlled<Pagination>>,
    pub(super) order: Option<Controlled<Vec<String>>>,
    pub(super) selection: Option<Controlled<BTreeSet<String>>>,
    pub(super) visibility: Option<Controlled<BTreeMap<String, bool>>>,
    pub(super) sizing: Option<Controlled<BTreeMap<String, u32>>>,
    pub(super) page_count: Option<i64>,
    pub(super) container_width: Option<u32>,
    pub(super) layout: Layout,
    pub(super) hooks: TableHooks<T>,
}

impl<T: TableRow> TableOptions<T> {
    pub fn new(columns: Vec<ColumnDef<T>>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            features: TableFeatures::default(),
            manual: ManualFlags::default(),
            config: TableConfig::default(),
            sorting: None,
            filters: None,
            search: None,
            pagination: None,
            order: None,
            selection: None,
            visibility: None,
            sizing: None,
            page_count: None,
            container_width: None,
            layout: Layout::default(),
            hooks: TableHooks::default(),
        }
    }

    pub fn rows(mut self, rows: Vec<T>) -> Self {
        self.rows = rows;
        self
    }

    pub fn features(mut self, features: TableFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn manual(mut self, manual: ManualFlags) -> Self {
        self.manual = manual;
        self
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    // -------------------------------------------------------------------------
    // Controlled axes
    // -------------------------------------------------------------------------

    pub fn controlled_sorting(
        mut self,
        value: Vec<SortEntry>,
        on_change: impl Fn(Vec<SortEntry>) + Send + Sync + 'static,
    ) -> Self {
        self.sorting = Some(Controlled::new(value, on_change));
        self
    }

    pub fn controlled_filters(
        mut self,
        value: BTreeMap<String, FilterValue>,
        on_change: impl Fn(BTreeMap<String, FilterValue>) + Send + Sync + 'static,
    ) -> Self {
        self.filters = Some(Controlled::new(value, on_change));
        self
    }

    pub fn controlled_search(
        mut self,
        value: impl Into<String>,
        on_change: impl Fn(String) + Send + Sync + 'static,
    ) -> Self {
        self.search = Some(Controlled::new(value.into(), on_change));
        self
    }

    pub fn controlled_pagination(
        mut self,
        value: Pagination,
        on_change: impl Fn(Pagination) + Send + Sync + 'static,
    ) -> Self {
        self.pagination = Some(Controlled::new(value, on_change));
        self
    }

    pub fn controlled_order(
        mut self,
        value: Vec<String>,
        on_change: impl Fn(Vec<String>) + Send + Sync + 'static,
    ) -> Self {
        self.order = Some(Controlled::new(value, on_change));
        self
    }

    /// Controlled row selection, keyed by row id.
    pub fn controlled_selection(
        mut self,
        value: BTreeSet<String>,
        on_change: impl Fn(BTreeSet<String>) + Send + Sync + 'static,
    ) -> Self {
        self.selection = Some(Controlled::new(value, on_change));
        self
    }

    /// Controlled column visibility. Default-hidden columns missing from the
    /// map are hidden the first time they appear.
    pub fn controlled_visibility(
        mut self,
        value: BTreeMap<String, bool>,
        on_change: impl Fn(BTreeMap<String, bool>) + Send + Sync + 'static,
    ) -> Self {
        self.visibility = Some(Controlled::new(value, on_change));
        self
    }

    /// Controlled user column widths.
    pub fn controlled_sizing(
        mut self,
        value: BTreeMap<String, u32>,
        on_change: impl Fn(BTreeMap<String, u32>) + Send + Sync + 'static,
    ) -> Self {
        self.sizing = Some(Controlled::new(value, on_change));
        self
    }

    /// Page count for manual pagination; `-1` means unknown.
    pub fn page_count(mut self, page_count: i64) -> Self {
        self.page_count = Some(page_count);
        self
    }

    // -------------------------------------------------------------------------
    // Layout
    // -------------------------------------------------------------------------

    pub fn container_width(mut self, width: u32) -> Self {
        self.container_width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.layout.height = Some(height);
        self
    }

    pub fn max_height(mut self, max_height: u32) -> Self {
        self.layout.max_height = Some(max_height);
        self
    }

    // -------------------------------------------------------------------------
    // Callbacks and providers
    // -------------------------------------------------------------------------

    pub fn on_row_click(mut self, f: impl Fn(T) + Send + Sync + 'static) -> Self {
        self.hooks.on_row_click = Some(Arc::new(f));
        self
    }

    /// Called with the selected rows present in the row array after every
    /// selection change.
    pub fn on_row_select(mut self, f: impl Fn(Vec<T>) + Send + Sync + 'static) -> Self {
        self.hooks.on_row_select = Some(Arc::new(f));
        self
    }

    /// Receives the reordered row array after a row drag.
    pub fn row_setter(mut self, f: impl Fn(Vec<T>) + Send + Sync + 'static) -> Self {
        self.hooks.row_setter = Some(Arc::new(f));
        self
    }

    /// Install the row-action menu; this adds the actions column.
    pub fn action_menu(mut self, provider: impl RowMenuProvider<T> + 'static) -> Self {
        self.hooks.action_menu = Some(Arc::new(provider));
        self
    }

    pub fn context_menu(mut self, provider: impl RowMenuProvider<T> + 'static) -> Self {
        self.hooks.context_menu = Some(Arc::new(provider));
        self
    }

    pub fn expanded_content(mut self, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.hooks.expanded_content = Some(Arc::new(f));
        self
    }
}

impl<T: TableRow> fmt::Debug for TableOptions<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("features", &self.features)
            .field("manual", &self.manual)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}
