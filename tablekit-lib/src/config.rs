//! Table configuration

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Configuration for the column sizing engine.
///
/// All widths are in pixels.
///
/// # Example
///
/// ```
/// use tablekit_lib::config::SizingConfig;
///
/// let config = SizingConfig::default()
///     .with_bounds(60, 400)
///     .with_default_width(120);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Width used for columns without an explicit size when auto-sizing is off.
    ///
    /// Default: 150
    pub default_width: u32,

    /// Lower clamp for computed widths.
    ///
    /// Default: 80
    pub min_width: u32,

    /// Upper clamp for computed widths.
    ///
    /// Default: 500
    pub max_width: u32,

    /// The last visible column never drops below this width.
    ///
    /// Default: 50
    pub last_column_floor: u32,

    /// Approximate width of one display column of text.
    ///
    /// Default: 8.0
    pub glyph_width: f32,

    /// Horizontal padding added to every text estimate.
    ///
    /// Default: 32
    pub text_padding: u32,

    /// Number of leading rows sampled for content estimates.
    ///
    /// Default: 10
    pub sample_rows: usize,

    /// Header allowance for the column drag handle.
    pub drag_handle_allowance: u32,
    /// Header allowance for the sort button.
    pub sort_button_allowance: u32,
    /// Header allowance for the filter button.
    pub filter_button_allowance: u32,
    /// Allowance reserved in the first column for the expand icon.
    pub expand_icon_allowance: u32,

    /// Interactions column: row drag handle.
    pub row_handle_width: u32,
    /// Interactions column: selection checkbox.
    pub checkbox_width: u32,
    /// Interactions column: expand toggle.
    pub expand_toggle_width: u32,

    /// Fixed width of the row actions column.
    pub actions_width: u32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            default_width: 150,
            min_width: 80,
            max_width: 500,
            last_column_floor: 50,
            glyph_width: 8.0,
            text_padding: 32,
            sample_rows: 10,
            drag_handle_allowance: 20,
            sort_button_allowance: 24,
            filter_button_allowance: 24,
            expand_icon_allowance: 24,
            row_handle_width: 28,
            checkbox_width: 32,
            expand_toggle_width: 32,
            actions_width: 56,
        }
    }
}

impl SizingConfig {
    /// Creates a sizing config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the clamp range for computed widths.
    pub fn with_bounds(mut self, min_width: u32, max_width: u32) -> Self {
        self.min_width = min_width;
        self.max_width = max_width;
        self
    }

    /// Sets the flat default width.
    pub fn with_default_width(mut self, width: u32) -> Self {
        self.default_width = width;
        self
    }

    /// Sets the approximate glyph width.
    pub fn with_glyph_width(mut self, width: f32) -> Self {
        self.glyph_width = width;
        self
    }

    /// Sets the number of sampled rows.
    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows;
        self
    }

    /// Clamps a computed width into `[min_width, max_width]`.
    pub fn clamp(&self, width: u32) -> u32 {
        width.clamp(self.min_width, self.max_width)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_width > self.max_width {
            return Err(ConfigError::invalid(
                "sizing.min_width",
                format!("{} exceeds max_width {}", self.min_width, self.max_width),
            ));
        }
        if !(self.glyph_width.is_finite() && self.glyph_width > 0.0) {
            return Err(ConfigError::invalid(
                "sizing.glyph_width",
                "must be a positive number",
            ));
        }
        Ok(())
    }
}

/// Configuration for paged-autocomplete filter widgets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AutocompleteConfig {
    /// Items requested per page.
    ///
    /// Default: 20
    pub page_size: usize,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

/// Top-level table configuration.
///
/// # Example
///
/// ```
/// use tablekit_lib::config::TableConfig;
///
/// let config = TableConfig::from_json(r#"{ "default_page_size": 25 }"#).unwrap();
/// assert_eq!(config.default_page_size, 25);
/// assert_eq!(config.sizing.max_width, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Column sizing settings.
    pub sizing: SizingConfig,
    /// Paged-autocomplete settings.
    pub autocomplete: AutocompleteConfig,
    /// Page size used when pagination is not supplied.
    pub default_page_size: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            sizing: SizingConfig::default(),
            autocomplete: AutocompleteConfig::default(),
            default_page_size: 10,
        }
    }
}

impl TableConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON config document.
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Sets the sizing config.
    pub fn with_sizing(mut self, sizing: SizingConfig) -> Self {
        self.sizing = sizing;
        self
    }

    /// Sets the default page size.
    pub fn with_default_page_size(mut self, page_size: usize) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// Sets the autocomplete page size.
    pub fn with_autocomplete_page_size(mut self, page_size: usize) -> Self {
        self.autocomplete.page_size = page_size;
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sizing.validate()?;
        if self.default_page_size == 0 {
            return Err(ConfigError::invalid("default_page_size", "must be at least 1"));
        }
        if self.autocomplete.page_size == 0 {
            return Err(ConfigError::invalid(
                "autocomplete.page_size",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TableConfig::from_json(r#"{ "sizing": { "min_width": 60 } }"#).unwrap();
        assert_eq!(config.sizing.min_width, 60);
        assert_eq!(config.sizing.max_width, 500);
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.autocomplete.page_size, 20);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let err = TableConfig::from_json(r#"{ "sizing": { "min_width": 600 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "sizing.min_width",
                ..
            }
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TableConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }
}
