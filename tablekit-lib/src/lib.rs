//! Headless data table engine
//!
//! State and algorithms behind an admin-dashboard data table: sorting, column
//! filters with remote-backed filter widgets, pagination, search, selection,
//! expansion, drag reordering, column visibility and content-aware column
//! sizing. Rendering is left to the caller.

pub mod columns;
pub mod config;
pub mod drag;
pub mod error;
pub mod filter;
pub mod menu;
pub mod model;
pub mod sizing;
pub mod state;

pub use error::TableError;
pub use state::{Table, TableOptions};
