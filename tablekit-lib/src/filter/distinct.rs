//! Distinct-values single-select filter.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;

use super::{FilterBinding, FilterValue, FilterView};

/// Option that clears the filter.
pub const ANY_OPTION: &str = "any";

/// Source of the distinct values offered by a select filter.
#[async_trait]
pub trait DistinctSource: Send + Sync {
    /// Fetch the distinct values of the column.
    async fn options(&self) -> Result<Vec<String>, FetchError>;
}

/// A single-select filter over a fixed value list.
///
/// The recognized options are `"any"` followed by the distinct values.
/// Choosing `"any"` removes the column's filter rather than storing the
/// literal string.
#[derive(Debug, Clone)]
pub struct SelectFilter {
    values: Arc<Vec<String>>,
}

impl SelectFilter {
    /// Create a select filter over already fetched values.
    pub fn new(values: Arc<Vec<String>>) -> Self {
        Self { values }
    }

    /// The distinct values, without the `"any"` option.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// All options in display order.
    pub fn options(&self) -> Vec<String> {
        std::iter::once(ANY_OPTION.to_string())
            .chain(self.values.iter().cloned())
            .collect()
    }

    /// The currently selected option.
    pub fn selected(&self, binding: &FilterBinding<'_>) -> String {
        match binding.current() {
            Some(FilterValue::Value(value)) => value,
            _ => ANY_OPTION.to_string(),
        }
    }

    /// Choose an option. Returns `false` if the option is not recognized.
    pub fn choose(&self, binding: &FilterBinding<'_>, option: &str) -> bool {
        if option == ANY_OPTION {
            binding.clear();
            return true;
        }
        if !self.values.iter().any(|v| v == option) {
            log::debug!(
                "[filter] ignoring unknown option {:?} for column {}",
                option,
                binding.column_id()
            );
            return false;
        }
        binding.set(Some(FilterValue::value(option)));
        true
    }

    pub(super) fn view(&self, binding: &FilterBinding<'_>) -> FilterView {
        FilterView::Select {
            options: self.options(),
            selected: self.selected(binding),
        }
    }
}
