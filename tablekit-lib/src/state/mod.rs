//! Table state store.
//!
//! [`Table`] owns the state of one table instance: the built column set, the
//! current rows and every state axis (sorting, filters, search, pagination,
//! selection, visibility, order, sizing, expansion, load state). Axes backed
//! by a [`Controlled`] pair are forwarded to their owner instead of being
//! applied; the rest are applied immediately.
//!
//! Clones share state. Callbacks always run after the state lock is released,
//! so they may call back into the table.

mod axis;
mod columns;
mod events;
mod filtering;
mod load;
mod options;
mod pagination;
mod rows;
mod selection;
mod sorting;

pub use axis::{ChangeFn, Controlled};
pub use load::LoadState;
pub use options::{ExpandedContent, Layout, RowCallback, RowsCallback, TableOptions};
pub use pagination::{PageCount, Pagination};
pub use rows::{RowModel, RowView};
pub use selection::{CheckState, Selection};
pub use sorting::{SortDirection, SortEntry};

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::columns::ColumnSet;
use crate::config::TableConfig;
use crate::error::TableError;
use crate::filter::{FilterBinding, FilterTarget, FilterValue, FilterView, FilterWidget};
use crate::model::{ColumnDef, ManualFlags, TableFeatures, TableRow};

use axis::{Axis, Outbox};
use options::TableHooks;

/// Unique identifier for a Table instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(usize);

impl TableId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__table_{}", self.0)
    }
}

/// Serializable snapshot of a table's state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    pub sorting: Vec<SortEntry>,
    pub column_filters: BTreeMap<String, FilterValue>,
    pub global_search: String,
    pub pagination: Pagination,
    pub row_selection: BTreeSet<String>,
    pub column_visibility: BTreeMap<String, bool>,
    pub column_order: Vec<String>,
    /// Computed widths, fill step included.
    pub column_sizing: BTreeMap<String, u32>,
    pub expanded: BTreeSet<String>,
}

/// A value pushed by the owner of a controlled axis.
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    Sorting(Vec<SortEntry>),
    Filters(BTreeMap<String, FilterValue>),
    Search(String),
    Pagination(Pagination),
    Order(Vec<String>),
    /// Selected row ids.
    Selection(BTreeSet<String>),
    Visibility(BTreeMap<String, bool>),
    /// User column widths.
    Sizing(BTreeMap<String, u32>),
    /// Manual page count; `-1` means unknown.
    PageCount(i64),
}

/// Internal state for the Table.
pub(super) struct TableInner<T: TableRow> {
    /// Declared columns of the current set, kept for re-resolution.
    pub declared: Arc<Vec<ColumnDef<T>>>,
    pub columns: ColumnSet<T>,
    pub manual: ManualFlags,
    pub config: TableConfig,
    pub rows: Vec<T>,
    pub sorting: Axis<Vec<SortEntry>>,
    pub filters: Axis<BTreeMap<String, FilterValue>>,
    pub search: Axis<String>,
    pub pagination: Axis<Pagination>,
    /// Caller-supplied page count (manual pagination).
    pub page_count: Option<i64>,
    pub selection: Axis<BTreeSet<String>>,
    /// Anchor of range selection; not part of the shared state.
    pub selection_anchor: Option<String>,
    pub visibility: Axis<BTreeMap<String, bool>>,
    /// Column ids seen by any column set, for default-hidden seeding.
    pub seen: HashSet<String>,
    pub order: Axis<Vec<String>>,
    /// User widths from resizes.
    pub user_sizes: Axis<BTreeMap<String, u32>>,
    /// Widths before the fill step.
    pub base_widths: BTreeMap<String, u32>,
    /// Widths after the fill step.
    pub widths: BTreeMap<String, u32>,
    pub container_width: Option<u32>,
    pub layout: Layout,
    pub expanded: BTreeSet<String>,
    pub load: LoadState,
}

impl<T: TableRow> TableInner<T> {
    pub fn features(&self) -> TableFeatures {
        self.columns.features()
    }

    fn snapshot(&self) -> TableState {
        TableState {
            sorting: self.sorting.get().clone(),
            column_filters: self.filters.get().clone(),
            global_search: self.search.get().clone(),
            pagination: *self.pagination.get(),
            row_selection: self.selection.get().clone(),
            column_visibility: self.visibility.get().clone(),
            column_order: self.effective_order(),
            column_sizing: self.widths.clone(),
            expanded: self.expanded.clone(),
        }
    }
}

/// Headless state engine for one data table.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use tablekit_lib::model::ColumnDef;
/// use tablekit_lib::state::{RowView, Table, TableOptions};
///
/// let table = Table::new(
///     TableOptions::new(vec![ColumnDef::new("title"), ColumnDef::new("price")]).rows(vec![
///         json!({ "id": "1", "title": "Desk lamp", "price": 25 }),
///         json!({ "id": "2", "title": "Armchair", "price": 140 }),
///     ]),
/// )
/// .unwrap();
///
/// table.toggle_sort("price");
/// table.toggle_sort("price");
/// let RowView::Rows(model) = table.row_view() else { panic!() };
/// assert_eq!(model.rows[0]["title"], "Armchair");
/// ```
pub struct Table<T: TableRow> {
    id: TableId,
    pub(super) inner: Arc<RwLock<TableInner<T>>>,
    pub(super) dirty: Arc<AtomicBool>,
    /// Generation of the latest column rebuild.
    pub(super) generation: Arc<AtomicU64>,
    pub(super) hooks: Arc<TableHooks<T>>,
}

impl<T: TableRow> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
            dirty: Arc::clone(&self.dirty),
            generation: Arc::clone(&self.generation),
            hooks: Arc::clone(&self.hooks),
        }
    }
}

impl<T: TableRow> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl<T: TableRow> Table<T> {
    /// Create a table.
    ///
    /// Custom filters are available immediately; distinct and paged filters
    /// are resolved by [`resolve_filters`](Self::resolve_filters).
    pub fn new(options: TableOptions<T>) -> Result<Self, TableError> {
        options.config.validate()?;
        let features = options.hooks.apply_features(options.features);
        let columns = ColumnSet::unresolved(&options.columns, features, &options.config.sizing)?;
        let default_pagination = Pagination::new(0, options.config.default_page_size);

        let mut inner = TableInner {
            declared: Arc::new(options.columns),
            columns: ColumnSet::empty(features),
            manual: options.manual,
            config: options.config,
            rows: options.rows,
            sorting: Axis::new(options.sorting, Vec::new()),
            filters: Axis::new(options.filters, BTreeMap::new()),
            search: Axis::new(options.search, String::new()),
            pagination: Axis::new(options.pagination, default_pagination),
            page_count: options.page_count,
            selection: Axis::new(options.selection, BTreeSet::new()),
            selection_anchor: None,
            visibility: Axis::new(options.visibility, BTreeMap::new()),
            seen: HashSet::new(),
            order: Axis::new(options.order, Vec::new()),
            user_sizes: Axis::new(options.sizing, BTreeMap::new()),
            base_widths: BTreeMap::new(),
            widths: BTreeMap::new(),
            container_width: options.container_width,
            layout: options.layout,
            expanded: BTreeSet::new(),
            load: LoadState::default(),
        };
        // Initial order is not a user change; owners learn it from `state()`.
        let mut outbox = Outbox::default();
        inner.install_columns(columns, &mut outbox);

        let id = TableId::new();
        log::debug!(
            "[table] created {} with {} columns, {} rows",
            id,
            inner.columns.len(),
            inner.rows.len()
        );
        Ok(Self {
            id,
            inner: Arc::new(RwLock::new(inner)),
            dirty: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            hooks: Arc::new(options.hooks),
        })
    }

    /// Get the unique ID.
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Check if the table needs re-rendering.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    /// Mutate state under the write lock, then run the queued callbacks.
    ///
    /// Returns `None` if the lock is poisoned.
    pub(super) fn update<R>(
        &self,
        f: impl FnOnce(&mut TableInner<T>, &mut Outbox) -> R,
    ) -> Option<R> {
        let mut outbox = Outbox::default();
        let result = {
            let mut guard = self.inner.write().ok()?;
            let result = f(&mut guard, &mut outbox);
            self.dirty.store(true, Ordering::SeqCst);
            result
        };
        outbox.deliver();
        Some(result)
    }

    /// Read state, falling back to the default if the lock is poisoned.
    pub(super) fn read<R: Default>(&self, f: impl FnOnce(&TableInner<T>) -> R) -> R {
        self.inner.read().map(|g| f(&g)).unwrap_or_default()
    }

    /// Snapshot of every state axis.
    pub fn state(&self) -> TableState {
        self.read(|inner| inner.snapshot())
    }

    pub fn features(&self) -> TableFeatures {
        self.read(|inner| inner.features())
    }

    pub fn manual(&self) -> ManualFlags {
        self.read(|inner| inner.manual)
    }

    pub fn config(&self) -> TableConfig {
        self.read(|inner| inner.config.clone())
    }

    pub fn layout(&self) -> Layout {
        self.read(|inner| inner.layout)
    }

    pub fn set_layout(&self, layout: Layout) {
        self.update(|inner, _| inner.layout = layout);
    }

    /// Apply a value pushed by the owner of a controlled axis.
    ///
    /// Received filters start the label lookup of paged pickers, as
    /// [`set_filter`](Self::set_filter) does.
    pub fn receive(&self, update: StateUpdate) {
        log::debug!("[table] {} received {:?}", self.id, update);
        let refresh_labels = matches!(update, StateUpdate::Filters(_));
        self.update(|inner, outbox| match update {
            StateUpdate::Sorting(sorting) => inner.sorting.receive(sorting),
            StateUpdate::Filters(filters) => inner.filters.receive(filters),
            StateUpdate::Search(search) => inner.search.receive(search),
            StateUpdate::Pagination(pagination) => inner.pagination.receive(pagination),
            StateUpdate::PageCount(count) => inner.page_count = Some(count),
            StateUpdate::Order(order) => {
                inner.order.receive(order);
                inner.recompute_sizing();
            }
            StateUpdate::Selection(ids) => {
                if ids != *inner.selection.get() {
                    inner.selection.receive(ids);
                    inner.notify_selection(self.hooks.on_row_select.as_ref(), outbox);
                }
            }
            StateUpdate::Visibility(visibility) => {
                inner.visibility.receive(visibility);
                inner.recompute_sizing();
            }
            StateUpdate::Sizing(sizes) => {
                inner.user_sizes.receive(sizes);
                inner.recompute_sizing();
            }
        });
        if refresh_labels {
            self.spawn_label_refresh();
        }
    }

    // -------------------------------------------------------------------------
    // Filter widgets
    // -------------------------------------------------------------------------

    /// Bind a column's filter value for a widget.
    pub fn filter_binding<'a>(&'a self, column_id: &'a str) -> FilterBinding<'a> {
        FilterBinding::new(column_id, self)
    }

    /// The resolved filter widget of a column.
    pub fn filter_widget(&self, column_id: &str) -> Option<FilterWidget> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.columns.get(column_id)?.filter_widget.clone())
    }

    /// Describe a column's filter control, or `None` if it shows no filter.
    pub fn filter_view(&self, column_id: &str) -> Option<FilterView> {
        let shown = self.read(|inner| {
            inner
                .columns
                .get(column_id)
                .is_some_and(|column| column.shows_filter())
        });
        if !shown {
            return None;
        }
        let widget = self.filter_widget(column_id)?;
        Some(widget.view(&self.filter_binding(column_id)))
    }
}

impl<T: TableRow> FilterTarget for Table<T> {
    fn filter_value(&self, column_id: &str) -> Option<FilterValue> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.filters.get().get(column_id).cloned())
    }

    fn set_filter_value(&self, column_id: &str, value: Option<FilterValue>) {
        self.set_filter(column_id, value);
    }
}
