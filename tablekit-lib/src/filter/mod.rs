//! Column filter kinds, values and resolved widgets.
//!
//! A column declares a [`FilterKind`]. When the column set is built, the kind is
//! resolved into a [`FilterWidget`] bound (through a [`FilterBinding`]) to the
//! column's live filter value in the table.

mod distinct;
mod paged;
mod resolver;

pub use distinct::{ANY_OPTION, DistinctSource, SelectFilter};
pub use paged::{
    AutocompleteItem, AutocompleteOption, AutocompletePhase, AutocompleteView, PagedAutocomplete,
    PagedSource,
};
pub use resolver::{ResolveCache, resolve_filter};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Token used for an explicit-null filter when the value crosses the
/// controlled-state boundary.
pub const NULL_TOKEN: &str = "__null__";

/// A column's filter value.
///
/// Absence of a filter is represented by the column having no entry (or
/// `None`), which is distinct from an explicit null filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterValue {
    /// Match rows whose value is absent/null.
    Null,
    /// Match a concrete value or id.
    Value(String),
}

impl FilterValue {
    /// Creates a concrete filter value.
    pub fn value(value: impl Into<String>) -> Self {
        Self::Value(value.into())
    }

    /// The concrete value, if any.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Null => None,
            Self::Value(v) => Some(v),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Wire token: [`NULL_TOKEN`] for null, the value otherwise.
    pub fn to_token(&self) -> &str {
        match self {
            Self::Null => NULL_TOKEN,
            Self::Value(v) => v,
        }
    }

    /// Parses a wire token.
    pub fn from_token(token: &str) -> Self {
        if token == NULL_TOKEN {
            Self::Null
        } else {
            Self::Value(token.to_string())
        }
    }
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.to_token())
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self::from_token(&token))
    }
}

/// Read/write access to per-column filter values.
///
/// Implemented by [`Table`](crate::state::Table); widgets only ever talk to
/// the table through this trait.
pub trait FilterTarget: Send + Sync {
    /// Current filter value for a column (`None` = no filter).
    fn filter_value(&self, column_id: &str) -> Option<FilterValue>;

    /// Set or clear (`None`) a column's filter.
    fn set_filter_value(&self, column_id: &str, value: Option<FilterValue>);
}

/// A widget's view of one column's live filter value.
#[derive(Clone, Copy)]
pub struct FilterBinding<'a> {
    column_id: &'a str,
    target: &'a dyn FilterTarget,
}

impl<'a> FilterBinding<'a> {
    /// Bind `column_id` on `target`.
    pub fn new(column_id: &'a str, target: &'a dyn FilterTarget) -> Self {
        Self { column_id, target }
    }

    pub fn column_id(&self) -> &str {
        self.column_id
    }

    /// Current value (`None` = no filter).
    pub fn current(&self) -> Option<FilterValue> {
        self.target.filter_value(self.column_id)
    }

    /// Set or clear the value.
    pub fn set(&self, value: Option<FilterValue>) {
        self.target.set_filter_value(self.column_id, value);
    }

    /// Clear the filter.
    pub fn clear(&self) {
        self.set(None);
    }
}

impl fmt::Debug for FilterBinding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterBinding")
            .field("column_id", &self.column_id)
            .finish_non_exhaustive()
    }
}

/// Headless description of a filter control, consumed by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterView {
    /// Single-select over fixed options.
    Select {
        options: Vec<String>,
        selected: String,
    },
    /// Searchable, incrementally loaded picker.
    Autocomplete(AutocompleteView),
    /// Free text input.
    Text { value: String, placeholder: String },
}

/// Render function of a custom filter.
pub type FilterRender = Arc<dyn Fn(&FilterBinding<'_>) -> FilterView + Send + Sync>;

/// A caller-supplied filter control.
#[derive(Clone)]
pub struct CustomFilter(pub FilterRender);

impl CustomFilter {
    pub fn new(render: impl Fn(&FilterBinding<'_>) -> FilterView + Send + Sync + 'static) -> Self {
        Self(Arc::new(render))
    }
}

impl fmt::Debug for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomFilter(..)")
    }
}

/// Options of a distinct-values filter.
#[derive(Clone)]
pub struct DistinctOptions {
    pub source: Arc<dyn DistinctSource>,
}

impl DistinctOptions {
    pub fn new(source: impl DistinctSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl fmt::Debug for DistinctOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistinctOptions").finish_non_exhaustive()
    }
}

/// Options of a paged-autocomplete filter.
#[derive(Clone)]
pub struct PagedOptions {
    pub source: Arc<dyn PagedSource>,
    /// Offer an explicit-null sentinel.
    pub nullable: bool,
    /// Label of the null sentinel.
    pub null_value_label: String,
    /// Items per page; the table config's page size when `None`.
    pub page_size: Option<usize>,
}

impl PagedOptions {
    pub fn new(source: impl PagedSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            nullable: false,
            null_value_label: "None".to_string(),
            page_size: None,
        }
    }

    /// Offer an explicit-null option labelled `label`.
    pub fn nullable(mut self, label: impl Into<String>) -> Self {
        self.nullable = true;
        self.null_value_label = label.into();
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

impl fmt::Debug for PagedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagedOptions")
            .field("nullable", &self.nullable)
            .field("null_value_label", &self.null_value_label)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Declared filter kind of a column.
#[derive(Debug, Clone, Default)]
pub enum FilterKind {
    /// No filter.
    #[default]
    None,
    /// Caller-supplied control, resolved synchronously.
    Custom(CustomFilter),
    /// Single-select over the source's distinct values.
    Distinct(DistinctOptions),
    /// Searchable, paged picker.
    PagedAutocomplete(PagedOptions),
}

/// A resolved filter control bound to a column.
#[derive(Debug, Clone)]
pub enum FilterWidget {
    Custom(CustomFilter),
    Select(SelectFilter),
    Autocomplete(PagedAutocomplete),
}

impl FilterWidget {
    /// Describe the control for the column bound by `binding`.
    pub fn view(&self, binding: &FilterBinding<'_>) -> FilterView {
        match self {
            Self::Custom(custom) => (custom.0)(binding),
            Self::Select(select) => select.view(binding),
            Self::Autocomplete(autocomplete) => FilterView::Autocomplete(autocomplete.view(binding)),
        }
    }

    pub fn as_select(&self) -> Option<&SelectFilter> {
        match self {
            Self::Select(select) => Some(select),
            _ => None,
        }
    }

    pub fn as_autocomplete(&self) -> Option<&PagedAutocomplete> {
        match self {
            Self::Autocomplete(autocomplete) => Some(autocomplete),
            _ => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryTarget;
    use super::*;

    #[test]
    fn test_explicit_null_survives_serde() {
        let mut filters = std::collections::BTreeMap::new();
        filters.insert("seller".to_string(), FilterValue::Null);
        filters.insert("status".to_string(), FilterValue::value("active"));

        let json = serde_json::to_string(&filters).unwrap();
        assert_eq!(json, r#"{"seller":"__null__","status":"active"}"#);

        let back: std::collections::BTreeMap<String, FilterValue> =
            serde_json::from_str(&json).unwrap();
        assert_eq!(back, filters);
        assert!(!back.contains_key("category"));
    }

    #[test]
    fn test_custom_filter_reads_binding() {
        let target = MemoryTarget::default();
        let binding = FilterBinding::new("title", &target);
        let widget = FilterWidget::Custom(CustomFilter::new(|binding| FilterView::Text {
            value: binding
                .current()
                .and_then(|v| v.as_value().map(str::to_string))
                .unwrap_or_default(),
            placeholder: format!("Filter {}", binding.column_id()),
        }));

        binding.set(Some(FilterValue::value("lamp")));
        assert_eq!(
            widget.view(&binding),
            FilterView::Text {
                value: "lamp".into(),
                placeholder: "Filter title".into()
            }
        );
    }
}
