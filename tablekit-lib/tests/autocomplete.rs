use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tablekit_lib::error::FetchError;
use tablekit_lib::filter::{
    AutocompleteItem, AutocompletePhase, FilterBinding, FilterKind, FilterTarget, FilterValue,
    PagedAutocomplete, PagedOptions, PagedSource,
};
use tablekit_lib::model::ColumnDef;
use tablekit_lib::state::{StateUpdate, Table, TableOptions};

/// 45 sellers. Later pages start one item early so merges see a duplicate.
struct Sellers {
    total: usize,
    slow_search: Option<&'static str>,
    slow_page: Option<usize>,
    fail: bool,
    lookups: Arc<AtomicUsize>,
}

impl Sellers {
    fn new() -> Self {
        Self {
            total: 45,
            slow_search: None,
            slow_page: None,
            fail: false,
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn matching(&self, search: &str) -> Vec<AutocompleteItem> {
        let needle = search.to_lowercase();
        (0..self.total)
            .map(|i| AutocompleteItem::new(format!("s-{}", i), format!("Seller {}", i)))
            .filter(|item| item.label.to_lowercase().contains(&needle))
            .collect()
    }

    async fn delay(&self, search: &str) {
        if self.slow_search == Some(search) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

#[async_trait]
impl PagedSource for Sellers {
    async fn count(&self, search: &str) -> Result<usize, FetchError> {
        if self.fail {
            return Err(FetchError::source("seller service unavailable"));
        }
        self.delay(search).await;
        Ok(self.matching(search).len())
    }

    async fn fetch_page(
        &self,
        search: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<AutocompleteItem>, FetchError> {
        if self.fail {
            return Err(FetchError::source("seller service unavailable"));
        }
        self.delay(search).await;
        if self.slow_page == Some(page) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let start = (page * page_size).saturating_sub(if page > 0 { 1 } else { 0 });
        Ok(self
            .matching(search)
            .into_iter()
            .skip(start)
            .take(page_size)
            .collect())
    }

    async fn fetch_selected_by_id(&self, id: &str) -> Result<Option<AutocompleteItem>, FetchError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.matching("").into_iter().find(|item| item.id == id))
    }
}

fn picker(source: Sellers) -> PagedAutocomplete {
    PagedAutocomplete::new(PagedOptions::new(source), 20)
}

async fn seller_table(options: PagedOptions) -> Table<Value> {
    let columns = vec![
        ColumnDef::new("title"),
        ColumnDef::new("seller").filter(FilterKind::PagedAutocomplete(options)),
    ];
    let table = Table::new(TableOptions::new(columns)).unwrap();
    assert!(table.resolve_filters().await.unwrap());
    table
}

/// Wait for a background label lookup to land.
async fn settled_label(picker: &PagedAutocomplete, binding: &FilterBinding<'_>) -> Option<String> {
    for _ in 0..20 {
        if let Some(label) = picker.selected_label(binding) {
            return Some(label);
        }
        tokio::task::yield_now().await;
    }
    None
}

fn seller_picker(table: &Table<Value>) -> PagedAutocomplete {
    table
        .filter_widget("seller")
        .and_then(|widget| widget.as_autocomplete().cloned())
        .expect("seller column has a paged picker")
}

#[tokio::test]
async fn test_load_more_before_search_is_noop() {
    let picker = picker(Sellers::new());
    assert_eq!(picker.phase(), AutocompletePhase::Idle);
    assert!(!picker.load_more().await.unwrap());
}

#[tokio::test]
async fn test_search_replaces_and_load_more_merges() {
    let picker = picker(Sellers::new());

    picker.search("").await.unwrap();
    assert_eq!(picker.phase(), AutocompletePhase::Ready);
    assert_eq!(picker.items().len(), 20);
    assert_eq!(picker.total(), 45);
    assert!(picker.has_more());

    assert!(picker.load_more().await.unwrap());
    let items = picker.items();
    // Page 1 repeats s-19; it is merged once.
    assert_eq!(items.len(), 39);
    assert_eq!(items.iter().filter(|item| item.id == "s-19").count(), 1);
    assert_eq!(picker.page(), 1);

    assert!(picker.load_more().await.unwrap());
    assert_eq!(picker.items().len(), 45);
    assert!(!picker.has_more());
    assert!(!picker.load_more().await.unwrap());

    // A new search starts over at page 0.
    picker.search("seller 4").await.unwrap();
    assert_eq!(picker.page(), 0);
    assert_eq!(picker.total(), 6);
    let labels: Vec<String> = picker.items().into_iter().map(|item| item.label).collect();
    assert_eq!(
        labels,
        vec!["Seller 4", "Seller 40", "Seller 41", "Seller 42", "Seller 43", "Seller 44"]
    );
}

#[tokio::test]
async fn test_slow_search_is_discarded() {
    let picker = picker(Sellers {
        slow_search: Some("Seller 1"),
        ..Sellers::new()
    });

    let (slow, fast) = tokio::join!(picker.search("Seller 1"), picker.search("Seller 4"));
    assert!(slow.unwrap_err().is_superseded());
    fast.unwrap();

    assert_eq!(picker.search_text(), "Seller 4");
    assert_eq!(picker.total(), 6);
    assert!(picker.items().iter().all(|item| item.label.starts_with("Seller 4")));
}

#[tokio::test]
async fn test_cancel_discards_in_flight_search() {
    let picker = picker(Sellers {
        slow_search: Some("Seller 1"),
        ..Sellers::new()
    });

    let (result, _) = tokio::join!(picker.search("Seller 1"), async { picker.cancel() });
    assert!(result.unwrap_err().is_superseded());
    assert_eq!(picker.phase(), AutocompletePhase::Idle);
    assert!(picker.items().is_empty());
}

#[tokio::test]
async fn test_failed_search_is_reported() {
    let picker = picker(Sellers {
        fail: true,
        ..Sellers::new()
    });

    let err = picker.search("").await.unwrap_err();
    assert!(!err.is_superseded());
    assert_eq!(picker.phase(), AutocompletePhase::Failed);
    assert_eq!(
        picker.error().as_deref(),
        Some("source error: seller service unavailable")
    );
}

#[tokio::test]
async fn test_reselecting_clears_filter() {
    let table = seller_table(PagedOptions::new(Sellers::new())).await;
    let picker = seller_picker(&table);
    let binding = table.filter_binding("seller");

    // Resolution ran the initial empty search.
    assert_eq!(picker.items().len(), 20);

    picker.select(&binding, "s-3");
    assert_eq!(table.filter("seller"), Some(FilterValue::value("s-3")));
    assert_eq!(picker.selected_label(&binding).as_deref(), Some("Seller 3"));

    picker.select(&binding, "s-7");
    assert_eq!(table.filter("seller"), Some(FilterValue::value("s-7")));

    picker.select(&binding, "s-7");
    assert_eq!(table.filter("seller"), None);
}

#[tokio::test]
async fn test_nullable_picker_offers_null_first() {
    let table = seller_table(PagedOptions::new(Sellers::new()).nullable("No seller")).await;
    let picker = seller_picker(&table);
    let binding = table.filter_binding("seller");

    let view = picker.view(&binding);
    assert_eq!(view.options.len(), 21);
    assert_eq!(view.options[0].id, None);
    assert_eq!(view.options[0].label, "No seller");
    assert!(!view.options[0].selected);

    assert!(picker.select_null(&binding));
    assert_eq!(table.filter("seller"), Some(FilterValue::Null));
    let view = picker.view(&binding);
    assert!(view.options[0].selected);
    assert_eq!(view.selected_label.as_deref(), Some("No seller"));

    assert!(picker.select_null(&binding));
    assert_eq!(table.filter("seller"), None);
}

#[tokio::test]
async fn test_non_nullable_picker_rejects_null() {
    let table = seller_table(PagedOptions::new(Sellers::new())).await;
    let picker = seller_picker(&table);
    let binding = table.filter_binding("seller");

    assert!(!picker.select_null(&binding));
    assert_eq!(table.filter("seller"), None);
    assert!(picker.view(&binding).options.iter().all(|o| o.id.is_some()));
}

#[tokio::test]
async fn test_load_more_superseded_by_search_is_discarded() {
    let picker = picker(Sellers {
        slow_page: Some(1),
        ..Sellers::new()
    });
    picker.search("").await.unwrap();

    let (more, search) = tokio::join!(picker.load_more(), picker.search("Seller 4"));
    assert!(more.unwrap_err().is_superseded());
    search.unwrap();

    // Exactly page 0 of the new search; nothing of the stale page 1.
    assert_eq!(picker.page(), 0);
    assert_eq!(picker.items(), Sellers::new().matching("Seller 4"));
    assert!(!picker.view(&FilterBinding::new("seller", &NoFilter)).loading_more);
}

struct NoFilter;

impl FilterTarget for NoFilter {
    fn filter_value(&self, _: &str) -> Option<FilterValue> {
        None
    }

    fn set_filter_value(&self, _: &str, _: Option<FilterValue>) {}
}

#[tokio::test]
async fn test_deep_linked_filter_shows_label_after_resolve() {
    let source = Sellers::new();
    let lookups = Arc::clone(&source.lookups);
    let columns = vec![
        ColumnDef::new("title"),
        ColumnDef::new("seller").filter(FilterKind::PagedAutocomplete(PagedOptions::new(source))),
    ];
    let preset = BTreeMap::from([("seller".to_string(), FilterValue::value("s-40"))]);
    let table: Table<Value> =
        Table::new(TableOptions::new(columns).controlled_filters(preset, |_| {})).unwrap();

    assert!(table.resolve_filters().await.unwrap());
    let picker = seller_picker(&table);
    // s-40 is not on the first page of 20.
    assert!(picker.items().iter().all(|item| item.id != "s-40"));
    assert_eq!(
        picker.selected_label(&table.filter_binding("seller")).as_deref(),
        Some("Seller 40")
    );
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_selected_outside_window_is_looked_up_once() {
    let source = Sellers::new();
    let lookups = Arc::clone(&source.lookups);
    let table = seller_table(PagedOptions::new(source)).await;
    let picker = seller_picker(&table);
    let binding = table.filter_binding("seller");

    table.set_filter("seller", Some(FilterValue::value("s-40")));
    assert_eq!(
        settled_label(&picker, &binding).await.as_deref(),
        Some("Seller 40")
    );
    assert_eq!(lookups.load(Ordering::SeqCst), 1);

    let item = picker.ensure_selected(&binding).await.unwrap();
    assert_eq!(item, Some(AutocompleteItem::new("s-40", "Seller 40")));
    assert_eq!(lookups.load(Ordering::SeqCst), 1);

    // Items already loaded need no lookup.
    table.set_filter("seller", Some(FilterValue::value("s-2")));
    assert_eq!(settled_label(&picker, &binding).await.as_deref(), Some("Seller 2"));
    picker.ensure_selected(&binding).await.unwrap();
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_received_filter_is_looked_up() {
    let source = Sellers::new();
    let lookups = Arc::clone(&source.lookups);
    let columns = vec![
        ColumnDef::new("seller").filter(FilterKind::PagedAutocomplete(PagedOptions::new(source))),
    ];
    let table: Table<Value> =
        Table::new(TableOptions::new(columns).controlled_filters(BTreeMap::new(), |_| {}))
            .unwrap();
    table.resolve_filters().await.unwrap();
    let picker = seller_picker(&table);

    table.receive(StateUpdate::Filters(BTreeMap::from([(
        "seller".to_string(),
        FilterValue::value("s-33"),
    )])));
    assert_eq!(
        settled_label(&picker, &table.filter_binding("seller")).await.as_deref(),
        Some("Seller 33")
    );
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}
