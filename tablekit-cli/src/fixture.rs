//! In-memory marketplace listings and the filter sources behind them.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tablekit_lib::error::FetchError;
use tablekit_lib::filter::{
    AutocompleteItem, DistinctOptions, DistinctSource, FilterKind, FilterValue, PagedOptions,
    PagedSource,
};
use tablekit_lib::model::{Alignment, ColumnDef, FilterMatch, TableRow};

const SELLERS: &[(&str, &str)] = &[
    ("s-1", "Ada's Attic"),
    ("s-2", "Bikes by Bram"),
    ("s-3", "Copper Kettle Co."),
    ("s-4", "Dune Vintage"),
    ("s-5", "Elm Street Books"),
    ("s-6", "Fjord Outdoor"),
];

const TITLES: &[&str] = &[
    "Brass desk lamp",
    "Road bike, 56cm frame",
    "Enamel kettle",
    "Wool coat",
    "First edition atlas",
    "Canvas tent (2 person)",
    "Oak side table",
    "Leather satchel",
];

/// Generate `count` listings. Every seventh listing has no seller.
pub fn listings(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            let seller = if i % 7 == 6 {
                Value::Null
            } else {
                let (id, name) = SELLERS[i % SELLERS.len()];
                json!({ "id": id, "name": name })
            };
            let status = match i % 3 {
                0 => "active",
                1 => "sold",
                _ => "draft",
            };
            json!({
                "id": format!("l-{:03}", i),
                "title": TITLES[i % TITLES.len()],
                "seller": seller,
                "status": status,
                "price": 15 + (i * 37) % 480,
                "notes": format!("Imported from batch {}", i / 10),
            })
        })
        .collect()
}

/// Distinct values of one field over the fixture rows.
pub struct FieldValues {
    rows: Arc<Vec<Value>>,
    path: &'static str,
}

impl FieldValues {
    pub fn new(rows: Arc<Vec<Value>>, path: &'static str) -> Self {
        Self { rows, path }
    }
}

#[async_trait]
impl DistinctSource for FieldValues {
    async fn options(&self) -> Result<Vec<String>, FetchError> {
        let values: BTreeSet<String> = self
            .rows
            .iter()
            .filter_map(|row| row.field(self.path))
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect();
        log::debug!("[fixture] {} distinct values for {}", values.len(), self.path);
        Ok(values.into_iter().collect())
    }
}

/// Seller directory searched by name.
pub struct SellerDirectory;

impl SellerDirectory {
    fn matching(search: &str) -> Vec<AutocompleteItem> {
        let needle = search.to_lowercase();
        SELLERS
            .iter()
            .filter(|(_, name)| name.to_lowercase().contains(&needle))
            .map(|(id, name)| AutocompleteItem::new(*id, *name))
            .collect()
    }
}

#[async_trait]
impl PagedSource for SellerDirectory {
    async fn count(&self, search: &str) -> Result<usize, FetchError> {
        Ok(Self::matching(search).len())
    }

    async fn fetch_page(
        &self,
        search: &str,
        page: usize,
        page_size: usize,
    ) -> Result<Vec<AutocompleteItem>, FetchError> {
        Ok(Self::matching(search)
            .into_iter()
            .skip(page * page_size)
            .take(page_size)
            .collect())
    }

    async fn fetch_selected_by_id(&self, id: &str) -> Result<Option<AutocompleteItem>, FetchError> {
        Ok(Self::matching("").into_iter().find(|item| item.id == id))
    }
}

/// Matches the seller filter against the seller id rather than the shown name.
fn seller_matches(row: &Value, value: &FilterValue) -> bool {
    let id = row
        .field("seller.id")
        .and_then(|id| id.as_str().map(str::to_string));
    match value {
        FilterValue::Null => id.is_none(),
        FilterValue::Value(wanted) => id.as_deref() == Some(wanted.as_str()),
    }
}

pub fn columns(rows: Arc<Vec<Value>>) -> Vec<ColumnDef<Value>> {
    vec![
        ColumnDef::new("title").header("Title").reorderable(false),
        ColumnDef::new("seller")
            .header("Seller")
            .accessor_key("seller.name")
            .filter(FilterKind::PagedAutocomplete(
                PagedOptions::new(SellerDirectory)
                    .nullable("No seller")
                    .page_size(4),
            ))
            .filter_match(FilterMatch::Custom(Arc::new(seller_matches))),
        ColumnDef::new("status")
            .header("Status")
            .filter(FilterKind::Distinct(DistinctOptions::new(FieldValues::new(
                rows, "status",
            )))),
        ColumnDef::new("price")
            .header("Price")
            .align(Alignment::Right)
            .searchable(false),
        ColumnDef::new("notes").header("Notes").default_hidden(),
    ]
}
