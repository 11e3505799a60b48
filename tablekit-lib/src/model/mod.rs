//! Row, column and feature data model.

mod column;
mod features;
mod row;

pub use column::*;
pub use features::*;
pub use row::*;
