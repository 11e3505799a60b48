//! TableRow trait and row value helpers.

use serde_json::Value;

/// Trait for records that can be displayed as rows in a [`Table`](crate::state::Table).
///
/// Rows are opaque to the engine apart from their id and path lookups used for
/// default value extraction, client-side filtering, sorting, search and width
/// estimation.
///
/// # Example
///
/// ```
/// use tablekit_lib::model::TableRow;
/// use serde_json::{json, Value};
///
/// #[derive(Clone)]
/// struct Listing {
///     id: u64,
///     title: String,
/// }
///
/// impl TableRow for Listing {
///     fn id(&self) -> String {
///         self.id.to_string()
///     }
///
///     fn field(&self, path: &str) -> Option<Value> {
///         match path {
///             "title" => Some(json!(self.title)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait TableRow: Send + Sync + Clone + 'static {
    /// Unique identifier for this row.
    ///
    /// Used for stable selection, expansion and reordering across row mutations.
    fn id(&self) -> String;

    /// Look up a value by dotted path (`"seller.name"`).
    ///
    /// Returns `None` when the path does not resolve.
    fn field(&self, path: &str) -> Option<Value>;
}

impl TableRow for Value {
    fn id(&self) -> String {
        match self.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }

    fn field(&self, path: &str) -> Option<Value> {
        lookup_path(self, path).cloned()
    }
}

/// Traverse a JSON value by dotted path.
///
/// Numeric segments index into arrays. Empty segments never match.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        if segment.is_empty() {
            return None;
        }
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Text shown for a cell value.
///
/// Strings render without quotes, `null` renders empty, and composite values
/// render as compact JSON.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}
