use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use tablekit_lib::error::FetchError;
use tablekit_lib::filter::{
    ANY_OPTION, DistinctOptions, DistinctSource, FilterKind, FilterValue, FilterView,
};
use tablekit_lib::model::{ColumnDef, TableFeatures};
use tablekit_lib::state::{Table, TableOptions};

struct Values {
    values: Vec<&'static str>,
    delay: Option<Duration>,
}

impl Values {
    fn new(values: Vec<&'static str>) -> Self {
        Self {
            values,
            delay: None,
        }
    }
}

#[async_trait]
impl DistinctSource for Values {
    async fn options(&self) -> Result<Vec<String>, FetchError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.values.iter().map(|v| v.to_string()).collect())
    }
}

struct Broken;

#[async_trait]
impl DistinctSource for Broken {
    async fn options(&self) -> Result<Vec<String>, FetchError> {
        Err(FetchError::source("category service unavailable"))
    }
}

fn rows() -> Vec<Value> {
    vec![
        json!({ "id": "l-1", "title": "Desk lamp", "status": "active", "category": "home" }),
        json!({ "id": "l-2", "title": "Bike", "status": "sold", "category": "sport" }),
        json!({ "id": "l-3", "title": "Kettle", "status": "active", "category": "home" }),
    ]
}

fn columns() -> Vec<ColumnDef<Value>> {
    vec![
        ColumnDef::new("title"),
        ColumnDef::new("status").filter(FilterKind::Distinct(DistinctOptions::new(Values::new(
            vec!["active", "sold"],
        )))),
        ColumnDef::new("category").filter(FilterKind::Distinct(DistinctOptions::new(Broken))),
    ]
}

#[tokio::test]
async fn test_failed_filter_only_affects_its_column() {
    let table = Table::new(TableOptions::new(columns()).rows(rows())).unwrap();
    assert!(table.resolve_filters().await.unwrap());

    let status = table.column("status").unwrap();
    assert!(status.shows_filter());
    let select = status.filter_widget.as_ref().and_then(|w| w.as_select()).unwrap();
    assert_eq!(select.values(), ["active", "sold"]);

    let category = table.column("category").unwrap();
    assert!(category.filter_widget.is_none());
    assert!(!category.enable_column_filter);
    assert_eq!(table.filter_view("category"), None);

    assert_eq!(table.column_order(), vec!["title", "status", "category"]);
}

#[tokio::test]
async fn test_select_filter_drives_rows() {
    let table = Table::new(TableOptions::new(columns()).rows(rows())).unwrap();
    table.resolve_filters().await.unwrap();

    let widget = table.filter_widget("status").unwrap();
    let select = widget.as_select().unwrap();
    let binding = table.filter_binding("status");

    assert!(select.choose(&binding, "sold"));
    assert_eq!(table.filter("status"), Some(FilterValue::value("sold")));
    assert_eq!(table.page_row_ids(), vec!["l-2"]);
    assert_eq!(
        table.filter_view("status"),
        Some(FilterView::Select {
            options: vec!["any".into(), "active".into(), "sold".into()],
            selected: "sold".into(),
        })
    );

    assert!(select.choose(&binding, ANY_OPTION));
    assert_eq!(table.filter("status"), None);
    assert!(table.filters().is_empty());
    assert_eq!(table.page_row_ids().len(), 3);
}

#[tokio::test]
async fn test_filters_unresolved_before_first_build() {
    let table = Table::new(TableOptions::new(columns())).unwrap();
    assert!(table.filter_widget("status").is_none());
    assert_eq!(table.filter_view("status"), None);
}

#[tokio::test]
async fn test_stale_rebuild_is_discarded() {
    let table: Table<Value> = Table::new(TableOptions::new(columns())).unwrap();

    let slow = vec![
        ColumnDef::new("title"),
        ColumnDef::new("status").filter(FilterKind::Distinct(DistinctOptions::new(Values {
            values: vec!["draft"],
            delay: Some(Duration::from_millis(50)),
        }))),
    ];
    let fast = vec![ColumnDef::new("title"), ColumnDef::new("price")];

    let (slow, fast) = tokio::join!(
        table.rebuild_columns(slow, TableFeatures::new()),
        table.rebuild_columns(fast, TableFeatures::new().row_selection()),
    );
    assert!(!slow.unwrap());
    assert!(fast.unwrap());

    assert_eq!(
        table.column_order(),
        vec!["__interactions", "title", "price"]
    );
    assert!(table.features().row_selection);
    assert!(table.column("status").is_none());
}

#[tokio::test]
async fn test_rebuild_rejects_duplicate_ids() {
    let table: Table<Value> = Table::new(TableOptions::new(columns())).unwrap();
    let result = table
        .rebuild_columns(
            vec![ColumnDef::new("title"), ColumnDef::new("title")],
            TableFeatures::new(),
        )
        .await;
    assert!(result.is_err());
    // The previous column set stays.
    assert_eq!(table.column_order(), vec!["title", "status", "category"]);
}

#[tokio::test]
async fn test_rejected_rebuild_does_not_supersede_one_in_flight() {
    let table: Table<Value> = Table::new(TableOptions::new(columns())).unwrap();

    let slow = vec![
        ColumnDef::new("title"),
        ColumnDef::new("status").filter(FilterKind::Distinct(DistinctOptions::new(Values {
            values: vec!["draft"],
            delay: Some(Duration::from_millis(50)),
        }))),
    ];
    let duplicate = vec![ColumnDef::new("price"), ColumnDef::new("price")];

    let (slow, duplicate) = tokio::join!(
        table.rebuild_columns(slow, TableFeatures::new()),
        table.rebuild_columns(duplicate, TableFeatures::new()),
    );
    assert!(duplicate.is_err());
    assert!(slow.unwrap());

    assert_eq!(table.column_order(), vec!["title", "status"]);
    let select = table
        .filter_widget("status")
        .and_then(|widget| widget.as_select().cloned())
        .unwrap();
    assert_eq!(select.values(), ["draft"]);
}
