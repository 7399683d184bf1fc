use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{GridError, Result};

/// Layout modes. Selected once per configuration; `GridLayout` builds the
/// matching engine at the start of every pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum LayoutMode {
    /// Shortest-column-first (or horizontal-order) column packing.
    #[default]
    Masonry,
    /// Left-to-right rows that wrap when the next item overflows.
    FitRows,
    /// Single stack, optionally aligned horizontally.
    Vertical,
}

impl FromStr for LayoutMode {
    type Err = GridError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "masonry" => Ok(Self::Masonry),
            "fitrows" | "fit-rows" | "fit_rows" => Ok(Self::FitRows),
            "vertical" => Ok(Self::Vertical),
            _ => Err(GridError::UnknownLayoutMode(s.to_string())),
        }
    }
}

/// A length that is either fixed or read from the outer width of an element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Measurement {
    Fixed(f64),
    Selector(String),
}

impl From<f64> for Measurement {
    fn from(v: f64) -> Self {
        Self::Fixed(v)
    }
}

impl From<&str> for Measurement {
    fn from(v: &str) -> Self {
        Self::Selector(v.to_string())
    }
}

/// Sort direction, either for every key or per key (missing keys ascend).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SortAscending {
    All(bool),
    PerKey(BTreeMap<String, bool>),
}

impl Default for SortAscending {
    fn default() -> Self {
        Self::All(true)
    }
}

impl SortAscending {
    pub fn is_ascending(&self, key: &str) -> bool {
        match self {
            Self::All(v) => *v,
            Self::PerKey(map) => map.get(key).copied().unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    #[serde(default)]
    pub layout_mode: LayoutMode,
    /// Only children matching this selector become items. None => all children.
    #[serde(default)]
    pub item_selector: Option<String>,
    /// Column width: fixed pixels or a sizer element selector. None => first item.
    #[serde(default)]
    pub column_width: Option<Measurement>,
    /// Horizontal space between columns (masonry) or items (fitRows).
    #[serde(default)]
    pub gutter: Option<Measurement>,
    /// Positions are measured from the left edge (false => right edge).
    #[serde(default = "default_true")]
    pub origin_left: bool,
    /// Positions are measured from the top edge (false => bottom edge).
    #[serde(default = "default_true")]
    pub origin_top: bool,
    /// Size the content width to the used columns; columns come from the parent's width.
    #[serde(default)]
    pub fit_width: bool,
    /// Place items left to right instead of into the shortest column.
    #[serde(default)]
    pub horizontal_order: bool,
    /// Vertical mode: 0.0 => left, 0.5 => centered, 1.0 => right.
    #[serde(default)]
    pub horizontal_alignment: f64,

    /// Filter selector; None or "*" keeps every item.
    #[serde(default)]
    pub filter: Option<String>,
    /// Sort keys, most significant first.
    #[serde(default)]
    pub sort_by: Vec<String>,
    #[serde(default)]
    pub sort_ascending: SortAscending,
    /// Named sort data specs: `"[attr] parseInt"`, `".selector parseFloat"`, ...
    #[serde(default)]
    pub get_sort_data: BTreeMap<String, String>,

    /// Selector for elements stamped at construction time.
    #[serde(default)]
    pub stamp: Option<String>,
    /// Relayout on container resize.
    #[serde(default = "default_true")]
    pub resize: bool,
    /// Quiet window for coalescing resize requests (milliseconds).
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::default(),
            item_selector: None,
            column_width: None,
            gutter: None,
            origin_left: true,
            origin_top: true,
            fit_width: false,
            horizontal_order: false,
            horizontal_alignment: 0.0,
            filter: None,
            sort_by: Vec::new(),
            sort_ascending: SortAscending::default(),
            get_sort_data: BTreeMap::new(),
            stamp: None,
            resize: true,
            resize_debounce_ms: default_resize_debounce_ms(),
        }
    }
}

/// Sort keys that need no `get_sort_data` entry.
pub const BUILTIN_SORT_KEYS: &[&str] = &["original-order", "random"];

impl GridConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - A fixed column width or gutter is negative or not finite
    /// - `horizontal_alignment` is outside `0.0..=1.0`
    /// - A sort key has no sort data spec
    /// - A sort data spec does not parse
    pub fn validate(&self) -> Result<()> {
        for (name, m) in [("columnWidth", &self.column_width), ("gutter", &self.gutter)] {
            if let Some(Measurement::Fixed(v)) = m {
                if !v.is_finite() || *v < 0.0 {
                    return Err(GridError::InvalidConfig(format!(
                        "{name} must be a finite, non-negative number (got {v})"
                    )));
                }
            }
            if let Some(Measurement::Selector(s)) = m {
                if s.trim().is_empty() {
                    return Err(GridError::InvalidConfig(format!(
                        "{name} selector is empty"
                    )));
                }
            }
        }

        if !(0.0..=1.0).contains(&self.horizontal_alignment) {
            return Err(GridError::InvalidConfig(format!(
                "horizontalAlignment must be within 0..=1 (got {})",
                self.horizontal_alignment
            )));
        }

        for spec in self.get_sort_data.values() {
            spec.parse::<crate::sort::SortDataSpec>()?;
        }
        for key in &self.sort_by {
            if !BUILTIN_SORT_KEYS.contains(&key.as_str()) && !self.get_sort_data.contains_key(key)
            {
                return Err(GridError::UnknownSortKey(key.clone()));
            }
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
fn default_resize_debounce_ms() -> u64 {
    100
}

/// Builder for `GridConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct GridConfigBuilder {
    cfg: GridConfig,
}

impl GridConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: GridConfig::default(),
        }
    }
    pub fn layout_mode(mut self, v: LayoutMode) -> Self {
        self.cfg.layout_mode = v;
        self
    }
    pub fn item_selector(mut self, v: impl Into<String>) -> Self {
        self.cfg.item_selector = Some(v.into());
        self
    }
    pub fn column_width(mut self, v: impl Into<Measurement>) -> Self {
        self.cfg.column_width = Some(v.into());
        self
    }
    pub fn gutter(mut self, v: impl Into<Measurement>) -> Self {
        self.cfg.gutter = Some(v.into());
        self
    }
    pub fn origin_left(mut self, v: bool) -> Self {
        self.cfg.origin_left = v;
        self
    }
    pub fn origin_top(mut self, v: bool) -> Self {
        self.cfg.origin_top = v;
        self
    }
    pub fn fit_width(mut self, v: bool) -> Self {
        self.cfg.fit_width = v;
        self
    }
    pub fn horizontal_order(mut self, v: bool) -> Self {
        self.cfg.horizontal_order = v;
        self
    }
    pub fn horizontal_alignment(mut self, v: f64) -> Self {
        self.cfg.horizontal_alignment = v;
        self
    }
    pub fn filter(mut self, v: impl Into<String>) -> Self {
        self.cfg.filter = Some(v.into());
        self
    }
    pub fn sort_by<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.cfg.sort_by = keys.into_iter().map(Into::into).collect();
        self
    }
    pub fn sort_ascending(mut self, v: SortAscending) -> Self {
        self.cfg.sort_ascending = v;
        self
    }
    pub fn sort_data(mut self, name: impl Into<String>, spec: impl Into<String>) -> Self {
        self.cfg.get_sort_data.insert(name.into(), spec.into());
        self
    }
    pub fn stamp(mut self, v: impl Into<String>) -> Self {
        self.cfg.stamp = Some(v.into());
        self
    }
    pub fn resize(mut self, v: bool) -> Self {
        self.cfg.resize = v;
        self
    }
    pub fn resize_debounce_ms(mut self, v: u64) -> Self {
        self.cfg.resize_debounce_ms = v;
        self
    }
    pub fn build(self) -> GridConfig {
        self.cfg
    }
}

impl GridConfig {
    /// Create a fluent builder for `GridConfig`.
    pub fn builder() -> GridConfigBuilder {
        GridConfigBuilder::new()
    }
}
