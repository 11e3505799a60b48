//! Column definitions and built column descriptors.

use std::fmt;
use std::sync::Arc;

use crate::filter::{FilterKind, FilterValue, FilterWidget};

use super::row::{TableRow, display_text};

/// Horizontal alignment for column content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Rendering hints passed through to the renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Cell content alignment.
    pub align: Alignment,
    /// Header label justification.
    pub justify: Alignment,
    /// Whether overflowing cell text is truncated with an ellipsis.
    pub truncate: bool,
}

impl Default for ColumnMeta {
    fn default() -> Self {
        Self {
            align: Alignment::Left,
            justify: Alignment::Left,
            truncate: true,
        }
    }
}

/// Function extracting a cell's text from a row.
pub type AccessorFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Predicate used by custom client-side filters.
pub type FilterPredicate<T> = Arc<dyn Fn(&T, &FilterValue) -> bool + Send + Sync>;

/// How a column's value is read from a row.
pub enum Accessor<T> {
    /// Look the column id up as a path.
    Id,
    /// Look up a dotted path (`"seller.name"`).
    Key(String),
    /// Compute the value.
    Fn(AccessorFn<T>),
}

impl<T: TableRow> Accessor<T> {
    /// Text of the cell for `row`.
    ///
    /// Any lookup failure yields an empty string.
    pub fn text(&self, column_id: &str, row: &T) -> String {
        let value = match self {
            Self::Id => row.field(column_id),
            Self::Key(path) => row.field(path),
            Self::Fn(f) => return f(row).unwrap_or_default(),
        };
        value.map(|v| display_text(&v)).unwrap_or_default()
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Id => Self::Id,
            Self::Key(path) => Self::Key(path.clone()),
            Self::Fn(f) => Self::Fn(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id => f.write_str("Id"),
            Self::Key(path) => f.debug_tuple("Key").field(path).finish(),
            Self::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}

/// How a column filter value is matched client-side.
pub enum FilterMatch<T> {
    /// Case-insensitive equality with the cell text.
    Equals,
    /// Case-insensitive substring match on the cell text.
    Contains,
    /// Custom predicate over the row.
    Custom(FilterPredicate<T>),
}

impl<T: TableRow> FilterMatch<T> {
    /// Whether `row` (with cell text `text`) passes `value`.
    ///
    /// An explicit-null filter matches rows whose cell is empty.
    pub fn matches(&self, row: &T, text: &str, value: &FilterValue) -> bool {
        match (self, value) {
            (Self::Custom(predicate), value) => predicate(row, value),
            (_, FilterValue::Null) => text.is_empty(),
            (Self::Equals, FilterValue::Value(v)) => text.to_lowercase() == v.to_lowercase(),
            (Self::Contains, FilterValue::Value(v)) => {
                text.to_lowercase().contains(&v.to_lowercase())
            }
        }
    }
}

impl<T> Clone for FilterMatch<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Equals => Self::Equals,
            Self::Contains => Self::Contains,
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

impl<T> fmt::Debug for FilterMatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals => f.write_str("Equals"),
            Self::Contains => f.write_str("Contains"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Engine-injected columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticColumn {
    /// Row drag handle, selection checkbox and expand toggle.
    Interactions,
    /// Row action menu.
    Actions,
}

impl SyntheticColumn {
    /// Reserved id of the synthetic column.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Interactions => INTERACTIONS_COLUMN_ID,
            Self::Actions => ACTIONS_COLUMN_ID,
        }
    }
}

/// Id of the synthetic interactions column.
pub const INTERACTIONS_COLUMN_ID: &str = "__interactions";

/// Id of the synthetic actions column.
pub const ACTIONS_COLUMN_ID: &str = "__actions";

/// Declarative column configuration.
///
/// # Examples
///
/// ```
/// use tablekit_lib::model::{Alignment, ColumnDef};
/// use serde_json::Value;
///
/// let columns: Vec<ColumnDef<Value>> = vec![
///     ColumnDef::new("title").header("Title"),
///     ColumnDef::new("seller").accessor_key("seller.name").searchable(false),
///     ColumnDef::new("price").size(120).align(Alignment::Right),
/// ];
/// ```
pub struct ColumnDef<T> {
    /// Unique, stable column id.
    pub id: String,
    /// Value accessor.
    pub accessor: Accessor<T>,
    /// Header label (falls back to the id).
    pub header: Option<String>,
    /// Explicit width in pixels.
    pub size: Option<u32>,
    pub enable_sorting: bool,
    pub enable_column_filter: bool,
    pub enable_hiding: bool,
    pub enable_reordering: bool,
    pub enable_searching: bool,
    /// Hidden the first time this column id is seen.
    pub default_hidden: bool,
    /// Filter widget kind.
    pub filter: FilterKind,
    /// Client-side filter predicate.
    pub filter_match: FilterMatch<T>,
    /// Rendering hints.
    pub meta: ColumnMeta,
}

impl<T> ColumnDef<T> {
    /// Create a column reading its value from the row path equal to `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            accessor: Accessor::Id,
            header: None,
            size: None,
            enable_sorting: true,
            enable_column_filter: true,
            enable_hiding: true,
            enable_reordering: true,
            enable_searching: true,
            default_hidden: false,
            filter: FilterKind::None,
            filter_match: FilterMatch::Equals,
            meta: ColumnMeta::default(),
        }
    }

    /// Set the header label.
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Read the value from a dotted path.
    pub fn accessor_key(mut self, path: impl Into<String>) -> Self {
        self.accessor = Accessor::Key(path.into());
        self
    }

    /// Compute the value with a function.
    pub fn accessor_fn(mut self, f: impl Fn(&T) -> Option<String> + Send + Sync + 'static) -> Self {
        self.accessor = Accessor::Fn(Arc::new(f));
        self
    }

    /// Set an explicit width. Explicit widths bypass content estimation.
    pub fn size(mut self, px: u32) -> Self {
        self.size = Some(px);
        self
    }

    pub fn sortable(mut self, enabled: bool) -> Self {
        self.enable_sorting = enabled;
        self
    }

    pub fn filterable(mut self, enabled: bool) -> Self {
        self.enable_column_filter = enabled;
        self
    }

    pub fn hideable(mut self, enabled: bool) -> Self {
        self.enable_hiding = enabled;
        self
    }

    pub fn reorderable(mut self, enabled: bool) -> Self {
        self.enable_reordering = enabled;
        self
    }

    pub fn searchable(mut self, enabled: bool) -> Self {
        self.enable_searching = enabled;
        self
    }

    /// Hide the column on first mount.
    pub fn default_hidden(mut self) -> Self {
        self.default_hidden = true;
        self
    }

    /// Set the filter widget kind.
    pub fn filter(mut self, kind: FilterKind) -> Self {
        self.filter = kind;
        self
    }

    /// Set the client-side filter predicate.
    pub fn filter_match(mut self, filter_match: FilterMatch<T>) -> Self {
        self.filter_match = filter_match;
        self
    }

    pub fn align(mut self, align: Alignment) -> Self {
        self.meta.align = align;
        self
    }

    pub fn justify(mut self, justify: Alignment) -> Self {
        self.meta.justify = justify;
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.meta.truncate = truncate;
        self
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("accessor", &self.accessor)
            .field("size", &self.size)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// A built column: declared configuration plus its resolved filter widget.
pub struct ColumnDescriptor<T> {
    pub id: String,
    pub accessor: Accessor<T>,
    pub header: Option<String>,
    pub size: Option<u32>,
    pub enable_sorting: bool,
    pub enable_column_filter: bool,
    pub enable_hiding: bool,
    pub enable_reordering: bool,
    pub enable_searching: bool,
    pub default_hidden: bool,
    /// Resolved widget; `None` when the column has no filter or resolution failed.
    pub filter_widget: Option<FilterWidget>,
    pub filter_match: FilterMatch<T>,
    pub meta: ColumnMeta,
    /// Set for engine-injected columns.
    pub synthetic: Option<SyntheticColumn>,
}

impl<T> ColumnDescriptor<T> {
    /// Build a descriptor from a declared column and its resolved widget.
    pub fn from_def(def: &ColumnDef<T>, filter_widget: Option<FilterWidget>) -> Self {
        Self {
            id: def.id.clone(),
            accessor: def.accessor.clone(),
            header: def.header.clone(),
            size: def.size,
            enable_sorting: def.enable_sorting,
            enable_column_filter: def.enable_column_filter,
            enable_hiding: def.enable_hiding,
            enable_reordering: def.enable_reordering,
            enable_searching: def.enable_searching,
            default_hidden: def.default_hidden,
            filter_widget,
            filter_match: def.filter_match.clone(),
            meta: def.meta,
            synthetic: None,
        }
    }

    /// Build a synthetic column of fixed width.
    ///
    /// Synthetic columns cannot be sorted, filtered, hidden, reordered or searched.
    pub fn synthetic(kind: SyntheticColumn, width: u32) -> Self {
        Self {
            id: kind.id().to_string(),
            accessor: Accessor::Fn(Arc::new(|_| None)),
            header: Some(String::new()),
            size: Some(width),
            enable_sorting: false,
            enable_column_filter: false,
            enable_hiding: false,
            enable_reordering: false,
            enable_searching: false,
            default_hidden: false,
            filter_widget: None,
            filter_match: FilterMatch::Equals,
            meta: ColumnMeta::default(),
            synthetic: Some(kind),
        }
    }

    /// Header label, falling back to the column id.
    pub fn header_label(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.id)
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic.is_some()
    }

    /// Whether the header shows a filter button.
    pub fn shows_filter(&self) -> bool {
        self.enable_column_filter && self.filter_widget.is_some()
    }

    /// Whether the column is visible under `visibility`.
    ///
    /// Columns that cannot be hidden are always visible; others default to visible.
    pub fn is_visible_in(&self, visibility: &std::collections::BTreeMap<String, bool>) -> bool {
        !self.enable_hiding || visibility.get(&self.id).copied().unwrap_or(true)
    }
}

impl<T: TableRow> ColumnDescriptor<T> {
    /// Text of this column's cell for `row`.
    pub fn cell_text(&self, row: &T) -> String {
        self.accessor.text(&self.id, row)
    }
}

impl<T> Clone for ColumnDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            accessor: self.accessor.clone(),
            header: self.header.clone(),
            size: self.size,
            enable_sorting: self.enable_sorting,
            enable_column_filter: self.enable_column_filter,
            enable_hiding: self.enable_hiding,
            enable_reordering: self.enable_reordering,
            enable_searching: self.enable_searching,
            default_hidden: self.default_hidden,
            filter_widget: self.filter_widget.clone(),
            filter_match: self.filter_match.clone(),
            meta: self.meta,
            synthetic: self.synthetic,
        }
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("synthetic", &self.synthetic)
            .field("filter_widget", &self.filter_widget)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_accessor_fallbacks() {
        let row = json!({ "id": "1", "title": "Lamp", "seller": { "name": "Bo" } });
        let by_id: Accessor<Value> = Accessor::Id;
        let by_key: Accessor<Value> = Accessor::Key("seller.name".into());
        let failing: Accessor<Value> = Accessor::Fn(Arc::new(|_| None));

        assert_eq!(by_id.text("title", &row), "Lamp");
        assert_eq!(by_key.text("seller", &row), "Bo");
        assert_eq!(by_id.text("missing", &row), "");
        assert_eq!(failing.text("computed", &row), "");
    }

    #[test]
    fn test_filter_match_null_and_case() {
        let row = json!({ "id": "1" });
        let equals: FilterMatch<Value> = FilterMatch::Equals;
        let contains: FilterMatch<Value> = FilterMatch::Contains;

        assert!(equals.matches(&row, "Active", &FilterValue::value("active")));
        assert!(!equals.matches(&row, "Inactive", &FilterValue::value("active")));
        assert!(contains.matches(&row, "Inactive", &FilterValue::value("ACT")));
        assert!(equals.matches(&row, "", &FilterValue::Null));
        assert!(!contains.matches(&row, "x", &FilterValue::Null));
    }

    #[test]
    fn test_synthetic_columns_disable_everything() {
        let column: ColumnDescriptor<Value> =
            ColumnDescriptor::synthetic(SyntheticColumn::Actions, 56);
        assert_eq!(column.id, ACTIONS_COLUMN_ID);
        assert_eq!(column.size, Some(56));
        assert!(!column.enable_sorting && !column.enable_hiding && !column.enable_reordering);
        assert!(!column.shows_filter());
    }
}
