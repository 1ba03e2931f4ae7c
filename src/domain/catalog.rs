//! Catalog entities
//!
//! Core records harvested from the remote movie catalog, plus the partition
//! and query types that scope a harvesting run.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Unique identifier of a catalog item.
///
/// The remote catalog uses integers, but string identifiers are accepted so
/// that other sources can plug in without lossy conversions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    /// Extract an identifier from a raw JSON value. Empty strings, floats with
    /// a fractional part and non-scalar values are not identifiers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Number),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Text(s.trim().to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// A movie record as harvested from the catalog.
///
/// Every field other than `id` is optional on the wire; absent or malformed
/// values are kept as `None` so that the filter rejects them instead of the
/// parser failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    /// Average score on a 0-10 scale
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Lower-cased keyword names, populated by keyword enrichment
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Label of the partition this item was harvested under
    #[serde(default)]
    pub partition: Option<String>,
}

impl CatalogItem {
    /// Minimal constructor, mostly useful for fakes and tests.
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            original_title: None,
            original_language: None,
            release_date: None,
            vote_average: None,
            vote_count: None,
            popularity: None,
            genre_ids: Vec::new(),
            keywords: Vec::new(),
            partition: None,
        }
    }

    /// Lenient conversion from one element of a page's `results` array.
    ///
    /// Returns `None` only when the record has no usable identifier; every
    /// other field degrades to its "missing" representation.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id").and_then(ItemId::from_value)?;

        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);

        let vote_count = obj.get("vote_count").and_then(|v| {
            v.as_u64()
                .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        });

        let genre_ids = obj
            .get("genre_ids")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_u64)
                    .filter_map(|g| u32::try_from(g).ok())
                    .collect()
            })
            .unwrap_or_default();

        let keywords = obj
            .get("keywords")
            .and_then(Value::as_array)
            .map(|kws| {
                kws.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            id,
            title: text("title").unwrap_or_default(),
            original_title: text("original_title"),
            original_language: text("original_language"),
            release_date: text("release_date"),
            vote_average: obj.get("vote_average").and_then(Value::as_f64),
            vote_count,
            popularity: obj.get("popularity").and_then(Value::as_f64),
            genre_ids,
            keywords,
            partition: None,
        })
    }

    /// Popularity used for ranking; missing popularity ranks last.
    pub fn popularity_score(&self) -> f64 {
        self.popularity.unwrap_or(0.0)
    }

    pub fn with_partition(mut self, label: &str) -> Self {
        self.partition = Some(label.to_string());
        self
    }
}

/// A harvesting scope, e.g. one decade of release dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub label: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl Partition {
    pub fn decade(label: impl Into<String>, start_year: i32, end_year: i32) -> Self {
        Self {
            label: label.into(),
            start_year: Some(start_year),
            end_year: Some(end_year),
        }
    }

    /// A partition without a date range ("bulk pull").
    pub fn unbounded(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start_year: None,
            end_year: None,
        }
    }
}

/// One logical query against the remote catalog, minus the page index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub genre_id: u32,
    pub partition: Partition,
}

impl CatalogQuery {
    pub fn new(genre_id: u32, partition: Partition) -> Self {
        Self { genre_id, partition }
    }
}

/// A single page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub items: Vec<CatalogItem>,
    pub total_pages: u32,
}

impl CatalogPage {
    /// The sentinel handed out when a request could not be completed:
    /// no items, a single page.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_pages: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Parse a `{ results: [...], total_pages: n }` payload. A missing
    /// `results` field is an empty page; a missing `total_pages` is 1.
    pub fn from_value(value: &Value) -> Self {
        let items = value
            .get("results")
            .and_then(Value::as_array)
            .map(|results| {
                results
                    .iter()
                    .filter_map(|raw| {
                        let item = CatalogItem::from_value(raw);
                        if item.is_none() {
                            tracing::debug!("Skipping catalog record without identifier");
                        }
                        item
                    })
                    .collect()
            })
            .unwrap_or_default();

        let total_pages = value
            .get("total_pages")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(1);

        Self { items, total_pages }
    }
}
