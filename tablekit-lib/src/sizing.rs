//! Column sizing engine.
//!
//! Widths are resolved per column in priority order: a user resize, then an
//! explicit declared size, then a content estimate (with auto-sizing) or a
//! flat default. Computed widths are clamped to the configured bounds, and a
//! final fill step stretches the last visible column over the leftover
//! container width.

use std::collections::BTreeMap;

use unicode_width::UnicodeWidthStr;

use crate::columns::ColumnSet;
use crate::config::SizingConfig;
use crate::model::{ColumnDescriptor, TableFeatures, TableRow};

/// Everything the sizing pass reads.
#[derive(Debug)]
pub struct SizingInput<'a, T> {
    pub columns: &'a ColumnSet<T>,
    /// Rows sampled for content estimates; only the leading ones are read.
    pub rows: &'a [T],
    /// Available width; the fill step is skipped when unknown.
    pub container_width: Option<u32>,
    /// Current column order.
    pub order: &'a [String],
    pub visibility: &'a BTreeMap<String, bool>,
    /// Widths set by user resizes.
    pub user_sizes: &'a BTreeMap<String, u32>,
    pub config: &'a SizingConfig,
}

/// Estimated pixel width of a text run.
pub fn text_width(text: &str, config: &SizingConfig) -> u32 {
    let glyphs = UnicodeWidthStr::width(text) as f32;
    (glyphs * config.glyph_width).ceil() as u32 + config.text_padding
}

/// Header width: the label plus an allowance per control shown in the header.
pub fn header_width<T>(
    column: &ColumnDescriptor<T>,
    features: TableFeatures,
    config: &SizingConfig,
) -> u32 {
    let mut width = text_width(column.header_label(), config);
    if features.column_reordering && column.enable_reordering {
        width += config.drag_handle_allowance;
    }
    if column.enable_sorting {
        width += config.sort_button_allowance;
    }
    if column.shows_filter() {
        width += config.filter_button_allowance;
    }
    width
}

/// Content-driven width of a column, clamped to the configured bounds.
///
/// `first` marks the first visible data column, which reserves room for the
/// expand icon when row expansion is enabled.
pub fn estimate_width<T: TableRow>(
    column: &ColumnDescriptor<T>,
    rows: &[T],
    features: TableFeatures,
    first: bool,
    config: &SizingConfig,
) -> u32 {
    let content = rows
        .iter()
        .take(config.sample_rows)
        .map(|row| text_width(&column.cell_text(row), config))
        .max()
        .unwrap_or(0);

    let mut width = header_width(column, features, config).max(content);
    if first && features.row_expansion {
        width += config.expand_icon_allowance;
    }
    config.clamp(width)
}

/// Ids of the visible columns in display order.
pub fn visible_order<'a, T>(
    columns: &ColumnSet<T>,
    order: &'a [String],
    visibility: &BTreeMap<String, bool>,
) -> Vec<&'a str> {
    order
        .iter()
        .filter(|id| {
            columns
                .get(id)
                .is_some_and(|column| column.is_visible_in(visibility))
        })
        .map(String::as_str)
        .collect()
}

/// Compute every column's width, fill step included.
pub fn compute_sizing<T: TableRow>(input: &SizingInput<'_, T>) -> BTreeMap<String, u32> {
    let mut widths = base_widths(input);
    let visible = visible_order(input.columns, input.order, input.visibility);
    fill_last_column(
        &mut widths,
        input.columns,
        &visible,
        input.container_width,
        input.config,
    );
    widths
}

/// Per-column widths before the fill step.
pub fn base_widths<T: TableRow>(input: &SizingInput<'_, T>) -> BTreeMap<String, u32> {
    let features = input.columns.features();
    let visible = visible_order(input.columns, input.order, input.visibility);
    let first_data = visible
        .iter()
        .copied()
        .find(|id| input.columns.get(id).is_some_and(|c| !c.is_synthetic()));

    input
        .columns
        .iter()
        .map(|column| {
            let width = if let Some(&size) = input.user_sizes.get(&column.id) {
                size
            } else if let Some(size) = column.size {
                size
            } else if features.auto_sizing {
                let first = first_data == Some(column.id.as_str());
                estimate_width(column, input.rows, features, first, input.config)
            } else {
                input.config.clamp(input.config.default_width)
            };
            (column.id.clone(), width)
        })
        .collect()
}

/// Stretch the last visible data column over the leftover container width.
///
/// The target keeps at least its current width and never drops below the
/// configured floor. Synthetic columns count towards the occupied width but
/// are never stretched. Does nothing without a container width.
pub fn fill_last_column<T>(
    widths: &mut BTreeMap<String, u32>,
    columns: &ColumnSet<T>,
    visible: &[&str],
    container_width: Option<u32>,
    config: &SizingConfig,
) {
    let Some(container) = container_width else {
        return;
    };
    let Some(target) = visible
        .iter()
        .rev()
        .copied()
        .find(|id| columns.get(id).is_some_and(|c| !c.is_synthetic()))
    else {
        return;
    };

    let others: u32 = visible
        .iter()
        .filter(|id| **id != target)
        .map(|id| widths.get(*id).copied().unwrap_or(0))
        .sum();
    let current = widths.get(target).copied().unwrap_or(0);
    let filled = current
        .max(container.saturating_sub(others))
        .max(config.last_column_floor);

    if filled != current {
        log::debug!(
            "[sizing] fill {} {} -> {} (container {}, others {})",
            target,
            current,
            filled,
            container,
            others
        );
    }
    widths.insert(target.to_string(), filled);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnDef;
    use serde_json::{Value, json};

    fn set(defs: &[ColumnDef<Value>], features: TableFeatures) -> ColumnSet<Value> {
        ColumnSet::unresolved(defs, features, &SizingConfig::default()).unwrap()
    }

    fn run(
        columns: &ColumnSet<Value>,
        rows: &[Value],
        container: Option<u32>,
        config: &SizingConfig,
    ) -> BTreeMap<String, u32> {
        let order = columns.ids();
        compute_sizing(&SizingInput {
            columns,
            rows,
            container_width: container,
            order: &order,
            visibility: &BTreeMap::new(),
            user_sizes: &BTreeMap::new(),
            config,
        })
    }

    #[test]
    fn test_text_width_uses_display_columns() {
        let config = SizingConfig::default();
        assert_eq!(text_width("", &config), 32);
        assert_eq!(text_width("abcd", &config), 4 * 8 + 32);
        // Wide glyphs take two display columns.
        assert_eq!(text_width("日本", &config), 4 * 8 + 32);
    }

    #[test]
    fn test_explicit_size_then_fill() {
        let config = SizingConfig::default().with_default_width(200);
        let columns = set(
            &[ColumnDef::new("name"), ColumnDef::new("email").size(300)],
            TableFeatures::new(),
        );
        let widths = run(&columns, &[], Some(1000), &config);
        assert_eq!(widths["name"], 200);
        assert_eq!(widths["email"], 800);
    }

    #[test]
    fn test_user_size_overrides_declared_size() {
        let config = SizingConfig::default();
        let columns = set(
            &[ColumnDef::new("name"), ColumnDef::new("email").size(300)],
            TableFeatures::new(),
        );
        let order = columns.ids();
        let mut user_sizes = BTreeMap::new();
        user_sizes.insert("email".to_string(), 120);
        let widths = base_widths(&SizingInput {
            columns: &columns,
            rows: &[],
            container_width: None,
            order: &order,
            visibility: &BTreeMap::new(),
            user_sizes: &user_sizes,
            config: &config,
        });
        assert_eq!(widths["email"], 120);
        assert_eq!(widths["name"], 150);
    }

    #[test]
    fn test_estimate_samples_rows_and_clamps() {
        let config = SizingConfig::default();
        let columns = set(
            &[
                ColumnDef::new("id").sortable(false),
                ColumnDef::new("notes").sortable(false),
            ],
            TableFeatures::new().auto_sizing(),
        );
        let rows = vec![json!({ "id": "1", "notes": "x".repeat(200) })];
        let widths = run(&columns, &rows, None, &config);
        // Short content is lifted to the minimum, long content capped.
        assert_eq!(widths["id"], 80);
        assert_eq!(widths["notes"], 500);
    }

    #[test]
    fn test_header_allowances_only_for_shown_controls() {
        let config = SizingConfig::default();
        let columns = set(
            &[ColumnDef::new("condition_grade")],
            TableFeatures::new().column_reordering(),
        );
        let column = columns.get("condition_grade").unwrap();
        // Label + drag handle + sort; no filter widget resolved.
        assert_eq!(
            header_width(column, columns.features(), &config),
            text_width("condition_grade", &config) + 20 + 24
        );
    }

    #[test]
    fn test_first_column_reserves_expand_icon() {
        let config = SizingConfig::default();
        let features = TableFeatures::new().auto_sizing().row_expansion();
        let columns = set(
            &[
                ColumnDef::new("a").sortable(false),
                ColumnDef::new("b").sortable(false),
            ],
            features,
        );
        let rows = vec![json!({ "id": "1", "a": "x".repeat(10), "b": "x".repeat(10) })];
        let widths = run(&columns, &rows, None, &config);
        assert_eq!(widths["a"], widths["b"] + 24);
    }

    #[test]
    fn test_fill_sums_to_container_and_floor() {
        let config = SizingConfig::default();
        let columns = set(
            &[ColumnDef::new("a"), ColumnDef::new("b"), ColumnDef::new("c")],
            TableFeatures::new().row_selection().row_actions(),
        );
        let widths = run(&columns, &[], Some(900), &config);
        let visible: u32 = widths.values().sum();
        assert_eq!(visible, 900);
        // The actions column keeps its fixed width.
        assert_eq!(widths["__actions"], config.actions_width);

        // Too narrow: the last column keeps its own width.
        let widths = run(&columns, &[], Some(100), &config);
        assert_eq!(widths["c"], 150);
    }

    #[test]
    fn test_hidden_last_column_moves_fill() {
        let config = SizingConfig::default();
        let columns = set(
            &[ColumnDef::new("a"), ColumnDef::new("b")],
            TableFeatures::new(),
        );
        let order = columns.ids();
        let mut visibility = BTreeMap::new();
        visibility.insert("b".to_string(), false);
        let widths = compute_sizing(&SizingInput {
            columns: &columns,
            rows: &[],
            container_width: Some(600),
            order: &order,
            visibility: &visibility,
            user_sizes: &BTreeMap::new(),
            config: &config,
        });
        assert_eq!(widths["a"], 600);
        assert_eq!(widths["b"], 150);
    }
}
