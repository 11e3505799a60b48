//! Plain-text rendering of a table's current page.

use serde_json::Value;
use tablekit_lib::Table;
use tablekit_lib::model::{Alignment, ColumnDescriptor, SyntheticColumn, TableRow};
use tablekit_lib::state::{PageCount, RowView};
use unicode_width::UnicodeWidthStr;

/// Pixels per terminal cell when turning column widths into text widths.
const CELL_PX: u32 = 8;

fn cell_width(px: u32) -> usize {
    (px / CELL_PX).max(3) as usize
}

/// Fit `text` into `width` cells, truncating with an ellipsis.
fn fit(text: &str, width: usize, align: Alignment) -> String {
    let mut out = String::new();
    if text.width() > width {
        let mut used = 0;
        for ch in text.chars() {
            let w = ch.to_string().width();
            if used + w + 1 > width {
                break;
            }
            out.push(ch);
            used += w;
        }
        out.push('…');
        used += 1;
        return out + &" ".repeat(width.saturating_sub(used));
    }
    let pad = " ".repeat(width - text.width());
    match align {
        Alignment::Right => pad + text,
        Alignment::Center => {
            let left = pad.len() / 2;
            format!("{}{}{}", &pad[..left], text, &pad[left..])
        }
        Alignment::Left => out + text + &pad,
    }
}

fn interactions_cell(table: &Table<Value>, row_id: &str) -> String {
    let features = table.features();
    let mut cell = String::new();
    if features.row_reordering {
        cell.push_str("::");
    }
    if features.row_selection {
        cell.push_str(if table.is_selected(row_id) { "[x]" } else { "[ ]" });
    }
    if features.row_expansion {
        cell.push_str(if table.is_expanded(row_id) { "v" } else { ">" });
    }
    cell
}

fn cell(table: &Table<Value>, column: &ColumnDescriptor<Value>, row: &Value) -> String {
    match column.synthetic {
        Some(SyntheticColumn::Interactions) => interactions_cell(table, &row.id()),
        Some(SyntheticColumn::Actions) => "...".to_string(),
        None => column.cell_text(row),
    }
}

/// Print the header and the body of the current page.
pub fn print_page(table: &Table<Value>) {
    let columns = table.visible_columns();
    let widths = table.column_widths();
    let width_of = |id: &str| cell_width(widths.get(id).copied().unwrap_or(0));

    let header: Vec<String> = columns
        .iter()
        .map(|column| {
            let mut label = column.header_label().to_string();
            if let Some(direction) = table.sort_direction(&column.id) {
                label.push_str(&format!(" ({:?})", direction).to_lowercase());
            }
            if table.filter(&column.id).is_some() {
                label.push_str(" *");
            }
            fit(&label, width_of(&column.id), column.meta.justify)
        })
        .collect();
    println!("{}", header.join(" | "));
    println!("{}", "-".repeat(header.iter().map(|h| h.width() + 3).sum::<usize>()));

    match table.row_view() {
        RowView::Error(error) => println!("error: {}", error),
        RowView::Loading => println!("loading..."),
        RowView::Empty => println!("no rows"),
        RowView::Rows(model) => {
            for row in &model.rows {
                let line: Vec<String> = columns
                    .iter()
                    .map(|column| {
                        let text = cell(table, column, row);
                        fit(&text, width_of(&column.id), column.meta.align)
                    })
                    .collect();
                println!("{}", line.join(" | "));
            }
            let pages = match model.page_count {
                PageCount::Known(count) => count.to_string(),
                PageCount::Unknown => "?".to_string(),
            };
            println!(
                "page {} of {} ({} matching rows)",
                model.pagination.page_index + 1,
                pages,
                model.filtered_count
            );
        }
    }
}
