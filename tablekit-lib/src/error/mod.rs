//! Error types

mod column;
mod config;
mod fetch;
mod menu;

pub use column::*;
pub use config::*;
pub use fetch::*;
pub use menu::*;

/// Top-level error for table operations.
///
/// Most engine operations never fail (sizing, drag handling, state toggles);
/// the fallible ones are column rebuilds, remote fetches, menu resolution and
/// configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A column set could not be built.
    #[error(transparent)]
    Column(#[from] ColumnError),

    /// A remote fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A row menu could not be resolved.
    #[error(transparent)]
    Menu(#[from] MenuError),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
