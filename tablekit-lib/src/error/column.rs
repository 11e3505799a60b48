//! Column model error types

use super::FetchError;

/// Errors that can occur while building a column set.
#[derive(Debug, thiserror::Error)]
pub enum ColumnError {
    /// Two declared columns share the same id.
    #[error("duplicate column id: {0}")]
    DuplicateId(String),

    /// A declared column uses an id reserved for synthetic columns.
    #[error("column id {0} is reserved")]
    ReservedId(String),

    /// A column's filter widget could not be resolved.
    ///
    /// Column builds never return this; it is logged and the column degrades
    /// to having no filter.
    #[error("filter for column {column} failed to resolve: {source}")]
    FilterResolution {
        /// Column whose filter failed.
        column: String,
        /// Underlying fetch failure.
        #[source]
        source: FetchError,
    },
}
