//! Row menu error types

use super::FetchError;

/// Errors raised while resolving a row's action or context menu.
#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    /// No row with the given id is loaded.
    #[error("row not found: {0}")]
    RowNotFound(String),

    /// No provider is installed for the requested menu.
    #[error("no {0} menu provider installed")]
    NoProvider(&'static str),

    /// The provider failed.
    #[error("menu provider failed: {0}")]
    Provider(#[from] FetchError),
}
