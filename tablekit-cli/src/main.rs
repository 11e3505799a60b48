mod fixture;
mod render;

use std::fs::File;
use std::sync::Arc;

use serde_json::Value;
use simplelog::{Config, LevelFilter, WriteLogger};
use tablekit_lib::config::TableConfig;
use tablekit_lib::drag::DragEnd;
use tablekit_lib::filter::FilterValue;
use tablekit_lib::menu::{MenuItem, StaticMenu};
use tablekit_lib::model::{TableFeatures, TableRow};
use tablekit_lib::{Table, TableError, TableOptions};

fn load_config() -> Result<TableConfig, TableError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading config from {}", path);
            Ok(TableConfig::from_file(path)?)
        }
        None => Ok(TableConfig::default()),
    }
}

fn listing_menu(row: &Value) -> Vec<MenuItem> {
    let status = row.field("status").and_then(|s| s.as_str().map(str::to_string));
    let mut items = vec![MenuItem::new("edit", "Edit listing")];
    if status.as_deref() == Some("sold") {
        items.push(MenuItem::new("relist", "Relist").disabled());
    }
    items.push(MenuItem::new("delete", "Delete").destructive());
    items
}

async fn run() -> Result<(), TableError> {
    let config = load_config()?;
    let rows = Arc::new(fixture::listings(42));

    let table = Table::new(
        TableOptions::new(fixture::columns(Arc::clone(&rows)))
            .rows(rows.to_vec())
            .config(config)
            .features(
                TableFeatures::new()
                    .row_selection()
                    .row_expansion()
                    .column_reordering()
                    .column_resizing()
                    .auto_sizing(),
            )
            .container_width(1200)
            .on_row_select(|rows| log::info!("{} rows selected", rows.len()))
            .action_menu(StaticMenu(listing_menu))
            .expanded_content(|row| format!("  notes: {}", row.field("notes").unwrap_or_default())),
    )?;
    table.resolve_filters().await?;

    println!("== All listings");
    render::print_page(&table);

    println!("\n== Active listings, most expensive first");
    if let Some(select) = table.filter_widget("status").and_then(|w| w.as_select().cloned()) {
        select.choose(&table.filter_binding("status"), "active");
    }
    table.toggle_sort("price");
    table.toggle_sort("price");
    render::print_page(&table);

    println!("\n== Listings by seller \"kettle\", price moved before seller");
    if let Some(picker) = table
        .filter_widget("seller")
        .and_then(|w| w.as_autocomplete().cloned())
    {
        let binding = table.filter_binding("seller");
        picker.search("kettle").await?;
        if let Some(item) = picker.items().first() {
            picker.select(&binding, &item.id);
        }
        log::info!("seller filter: {:?}", picker.selected_label(&binding));
    }
    table.handle_drag_end(&DragEnd::new("price", "seller"));
    if let Some(first) = table.page_row_ids().first() {
        table.toggle_row_selection(first);
        table.toggle_expand(first);
    }
    render::print_page(&table);
    if let Some(first) = table.page_row_ids().first()
        && let Some(content) = table.expanded_content(first)
    {
        println!("{}", content);
    }

    println!("\n== Listings without a seller");
    table.clear_filters();
    table.set_filter("seller", Some(FilterValue::Null));
    render::print_page(&table);

    if let Some(first) = table.page_row_ids().first() {
        let labels: Vec<String> = table
            .row_actions(first)
            .await?
            .into_iter()
            .map(|item| item.label)
            .collect();
        println!("\nactions for {}: {}", first, labels.join(", "));
    }

    println!("\nwidths: {:?}", table.column_widths());
    Ok(())
}

#[tokio::main]
async fn main() {
    let log_file = match File::create("tablekit-cli.log") {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: failed to create log file: {}", e);
            return;
        }
    };
    if let Err(e) = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file) {
        eprintln!("Error: failed to initialize logger: {}", e);
    }

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
    }
}
