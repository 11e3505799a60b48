//! Row action and context menus.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::model::TableRow;

/// One entry of a row menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub disabled: bool,
    /// Rendered with a warning style (delete, ban, ...).
    #[serde(default)]
    pub destructive: bool,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            disabled: false,
            destructive: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// Provides the menu for a row.
///
/// Providers may compute items synchronously or fetch them; either way the
/// table awaits the result.
#[async_trait]
pub trait RowMenuProvider<T: TableRow>: Send + Sync {
    async fn menu_items(&self, row: &T) -> Result<Vec<MenuItem>, FetchError>;
}

/// A provider backed by a plain function.
pub struct StaticMenu<F>(pub F);

#[async_trait]
impl<T, F> RowMenuProvider<T> for StaticMenu<F>
where
    T: TableRow,
    F: Fn(&T) -> Vec<MenuItem> + Send + Sync,
{
    async fn menu_items(&self, row: &T) -> Result<Vec<MenuItem>, FetchError> {
        Ok((self.0)(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_static_menu() {
        let menu = StaticMenu(|row: &Value| {
            let mut items = vec![MenuItem::new("edit", "Edit")];
            if row["status"] == "active" {
                items.push(MenuItem::new("suspend", "Suspend").destructive());
            }
            items
        });
        let items = menu
            .menu_items(&json!({ "id": "1", "status": "active" }))
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[1].destructive);
    }
}
