use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::config::SortAscending;
use crate::error::{GridError, Result};
use crate::host::ElementSource;

/// Where a sort value is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortSource {
    /// `[name]`: an attribute of the item element.
    Attribute(String),
    /// Any other selector: text of a matching descendant.
    Text(String),
}

/// Optional conversion applied to the raw string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortParser {
    ParseInt,
    ParseFloat,
}

impl FromStr for SortParser {
    type Err = GridError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "parseInt" => Ok(Self::ParseInt),
            "parseFloat" => Ok(Self::ParseFloat),
            other => Err(GridError::InvalidConfig(format!(
                "unknown sort data parser: {other}"
            ))),
        }
    }
}

/// Parsed form of a `get_sort_data` entry such as `"[data-weight] parseFloat"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortDataSpec {
    pub source: SortSource,
    pub parser: Option<SortParser>,
}

impl FromStr for SortDataSpec {
    type Err = GridError;
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let query = parts
            .next()
            .ok_or_else(|| GridError::InvalidConfig("empty sort data spec".into()))?;
        let parser = parts.next().map(str::parse).transpose()?;
        let source = match query.strip_prefix('[').and_then(|q| q.strip_suffix(']')) {
            Some(attr) if !attr.is_empty() => SortSource::Attribute(attr.to_string()),
            _ => SortSource::Text(query.to_string()),
        };
        Ok(Self { source, parser })
    }
}

impl SortDataSpec {
    /// Reads and converts the value for one item.
    pub fn read<K, S: ElementSource<K> + ?Sized>(&self, source: &S, key: &K) -> SortValue {
        let raw = match &self.source {
            SortSource::Attribute(name) => source.attribute(key, name),
            SortSource::Text(sel) => source.text(key, sel),
        };
        let Some(raw) = raw else {
            return SortValue::Missing;
        };
        match self.parser {
            None => SortValue::Text(raw),
            Some(SortParser::ParseInt) => parse_int(&raw)
                .map(|v| SortValue::Number(v as f64))
                .unwrap_or(SortValue::Missing),
            Some(SortParser::ParseFloat) => parse_float(&raw)
                .map(SortValue::Number)
                .unwrap_or(SortValue::Missing),
        }
    }
}

/// Leading integer of `s`, ignoring surrounding whitespace and trailing junk.
fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

/// Longest numeric prefix of `s` as a float, found in a single scan.
fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    let b = s.as_bytes();
    let digits = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };
    let mut end = 0;
    if matches!(b.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let int_end = digits(end);
    let mut mantissa = int_end - end;
    end = int_end;
    if b.get(end) == Some(&b'.') {
        let frac_end = digits(end + 1);
        mantissa += frac_end - end - 1;
        if mantissa > 0 {
            end = frac_end;
        }
    }
    if mantissa == 0 {
        return None;
    }
    // an exponent only counts when digits follow it
    if matches!(b.get(end), Some(b'e' | b'E')) {
        let mut i = end + 1;
        if matches!(b.get(i), Some(b'-' | b'+')) {
            i += 1;
        }
        let exp_end = digits(i);
        if exp_end > i {
            end = exp_end;
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A cached sort value. Missing values order first, then numbers, then text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SortValue {
    Missing,
    Number(f64),
    Text(String),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            Self::Missing => 0,
            Self::Number(_) => 1,
            Self::Text(_) => 2,
        }
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Per-item sort data, keyed by sort key name.
pub type SortData = BTreeMap<String, SortValue>;

/// Sort keys applied so far, most significant first. Always ends with
/// `original-order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortHistory {
    keys: Vec<String>,
}

impl Default for SortHistory {
    fn default() -> Self {
        Self {
            keys: vec!["original-order".to_string()],
        }
    }
}

impl SortHistory {
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Pushes `sort_by` in front unless the history already starts with it.
    pub fn apply(&mut self, sort_by: &[String]) {
        if sort_by.is_empty() {
            return;
        }
        let same = sort_by
            .iter()
            .zip(self.keys.iter())
            .all(|(a, b)| a == b)
            && sort_by.len() <= self.keys.len();
        if !same {
            let mut keys = sort_by.to_vec();
            keys.extend(self.keys.drain(..));
            self.keys = keys;
        }
    }

    /// Compares two items' sort data across the whole history.
    pub fn compare(&self, a: &SortData, b: &SortData, ascending: &SortAscending) -> Ordering {
        for key in &self.keys {
            let missing = SortValue::Missing;
            let va = a.get(key).unwrap_or(&missing);
            let vb = b.get(key).unwrap_or(&missing);
            let ord = va.compare(vb);
            if ord != Ordering::Equal {
                return if ascending.is_ascending(key) {
                    ord
                } else {
                    ord.reverse()
                };
            }
        }
        Ordering::Equal
    }
}
