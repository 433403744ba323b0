//! Product state and snapshot types.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Stable product identifier, derived from the numeric path segment of the
/// product URL. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Derive an id from a product URL.
    ///
    /// Prefers the last all-digit path segment; falls back to the last digit
    /// run embedded in a segment (`item-12345.html` -> `12345`). Fails with
    /// `InvalidIdentifier` when the path carries no digits.
    pub fn from_url(url: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidIdentifier {
            url: url.to_string(),
        };

        let parsed = url::Url::parse(url).map_err(|_| invalid())?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.collect())
            .unwrap_or_default();

        if let Some(seg) = segments
            .iter()
            .rev()
            .find(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
        {
            return Ok(Self((*seg).to_string()));
        }

        segments
            .iter()
            .rev()
            .find_map(|s| last_digit_run(s))
            .map(Self)
            .ok_or_else(invalid)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

fn last_digit_run(segment: &str) -> Option<String> {
    let mut run = String::new();
    let mut last = None;
    for c in segment.chars() {
        if c.is_ascii_digit() {
            run.push(c);
        } else if !run.is_empty() {
            last = Some(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        last = Some(run);
    }
    last
}

/// Stock status of a single size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeStock {
    pub in_stock: bool,
    #[serde(default)]
    pub stock_label: String,
    #[serde(default)]
    pub variant_code: String,
}

/// Point-in-time stock-by-size view of one product.
pub type StockMap = HashMap<String, SizeStock>;

/// One fetched view of a product page: stock plus display metadata.
///
/// An empty size map is a valid snapshot (the page decoded but carried no
/// variant data).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub title: String,
    pub brand: String,
    pub price: String,
    pub original_price: String,
    pub image_url: String,
    pub sizes: StockMap,
}

/// The unit of monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub original_price: String,
    #[serde(default)]
    pub image_url: String,
    /// Empty set means "watch all sizes present on the page".
    #[serde(default)]
    pub watched_sizes: BTreeSet<String>,
    /// The last observed snapshot. Overwritten wholesale at the end of every
    /// check, never merged field-by-field.
    #[serde(default)]
    pub previous_stock: StockMap,
    /// Sizes already alerted and not yet back out of stock.
    #[serde(default)]
    pub notified_sizes: BTreeSet<String>,
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Product {
    /// Create a fresh product with no stock baseline. The first snapshot it
    /// is checked against therefore diffs every in-stock size from "absent".
    pub fn new(id: ProductId, url: impl Into<String>, watched_sizes: BTreeSet<String>) -> Self {
        Self {
            id,
            url: url.into(),
            title: String::new(),
            brand: String::new(),
            price: String::new(),
            original_price: String::new(),
            image_url: String::new(),
            watched_sizes,
            previous_stock: StockMap::new(),
            notified_sizes: BTreeSet::new(),
            added_at: Utc::now(),
            last_checked_at: None,
            last_error: None,
        }
    }

    /// Refresh display metadata from a snapshot: a new non-empty value
    /// replaces the old one, an empty value leaves the prior value intact.
    pub fn apply_metadata(&mut self, snapshot: &ProductSnapshot) {
        refresh(&mut self.title, &snapshot.title);
        refresh(&mut self.brand, &snapshot.brand);
        refresh(&mut self.price, &snapshot.price);
        refresh(&mut self.original_price, &snapshot.original_price);
        refresh(&mut self.image_url, &snapshot.image_url);
    }
}

fn refresh(field: &mut String, value: &str) {
    if !value.is_empty() {
        value.clone_into(field);
    }
}

/// Outcome of a single product check. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<StockMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    pub fn ok(sizes: StockMap) -> Self {
        Self {
            success: true,
            sizes: Some(sizes),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            sizes: None,
            error: Some(error.into()),
        }
    }
}
