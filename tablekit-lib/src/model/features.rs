//! Feature and manual-mode flags.

/// Optional table features.
///
/// Feature flags change the shape of the column set (synthetic columns) and
/// which gestures the table accepts, so changing them requires a column rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TableFeatures {
    /// Rows can be dragged to reorder them.
    pub row_reordering: bool,
    /// Rows carry a selection checkbox.
    pub row_selection: bool,
    /// Rows can be expanded to show extra content.
    pub row_expansion: bool,
    /// Columns can be dragged to reorder them.
    pub column_reordering: bool,
    /// Columns can be resized by the user.
    pub column_resizing: bool,
    /// Column widths are estimated from content.
    pub auto_sizing: bool,
    /// A row-action menu provider is installed.
    pub row_actions: bool,
}

impl TableFeatures {
    /// Creates a feature set with everything disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable row drag reordering.
    pub fn row_reordering(mut self) -> Self {
        self.row_reordering = true;
        self
    }

    /// Enable row selection.
    pub fn row_selection(mut self) -> Self {
        self.row_selection = true;
        self
    }

    /// Enable row expansion.
    pub fn row_expansion(mut self) -> Self {
        self.row_expansion = true;
        self
    }

    /// Enable column drag reordering.
    pub fn column_reordering(mut self) -> Self {
        self.column_reordering = true;
        self
    }

    /// Enable column resizing.
    pub fn column_resizing(mut self) -> Self {
        self.column_resizing = true;
        self
    }

    /// Enable content-driven auto-sizing.
    pub fn auto_sizing(mut self) -> Self {
        self.auto_sizing = true;
        self
    }

    /// Mark that a row-action menu provider is installed.
    pub fn row_actions(mut self) -> Self {
        self.row_actions = true;
        self
    }

    /// Whether the synthetic interactions column is needed.
    pub fn has_interactions(&self) -> bool {
        self.row_reordering || self.row_selection || self.row_expansion
    }
}

/// Axes whose computation happens outside the engine.
///
/// A manual axis is never computed client-side: the caller is expected to
/// return rows that already reflect it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualFlags {
    /// Rows are already the requested page; the caller supplies the page count.
    pub pagination: bool,
    /// Rows are already sorted.
    pub sorting: bool,
    /// Rows are already filtered by column filters.
    pub filtering: bool,
    /// Rows are already filtered by the global search text.
    pub search: bool,
}

impl ManualFlags {
    /// Everything computed by the caller (server-driven table).
    pub fn all() -> Self {
        Self {
            pagination: true,
            sorting: true,
            filtering: true,
            search: true,
        }
    }
}
