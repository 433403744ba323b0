//! JSON document store for the product registry.
//!
//! The whole registry lives in one versioned JSON document. Writes go
//! through a temp-file-then-rename so a crash mid-write never corrupts the
//! document. Set-valued product fields land on disk as sorted arrays and are
//! rebuilt as sets on load.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Product, ProductId};
use crate::error::StoreError;
use crate::port::ProductStore;

/// Current store document format version.
const STORE_VERSION: &str = "1";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    /// Schema version for forward compatibility.
    version: String,
    #[serde(default)]
    products: Vec<Product>,
    updated_at: DateTime<Utc>,
}

pub struct JsonFileStore {
    path: PathBuf,
    /// Serializes read-modify-write sequences against the document.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    fn read_document(&self) -> Result<StoreDocument, StoreError> {
        if !self.path.exists() {
            return Ok(StoreDocument {
                version: STORE_VERSION.to_string(),
                products: Vec::new(),
                updated_at: Utc::now(),
            });
        }

        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_document(&self, products: Vec<Product>) -> Result<(), StoreError> {
        let document = StoreDocument {
            version: STORE_VERSION.to_string(),
            products,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&document)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to temp file first, then rename into place.
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;

        let cleanup_and_err = |e: std::io::Error| {
            let _ = fs::remove_file(&temp_path);
            e
        };

        file.write_all(json.as_bytes()).map_err(cleanup_and_err)?;
        file.sync_all().map_err(cleanup_and_err)?;
        fs::rename(&temp_path, &self.path).map_err(cleanup_and_err)?;

        debug!(path = %self.path.display(), "Store document written");
        Ok(())
    }
}

#[async_trait]
impl ProductStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read_document()?.products)
    }

    async fn upsert_all(&self, products: &[Product]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();

        let mut by_id: BTreeMap<ProductId, Product> = self
            .read_document()?
            .products
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        for product in products {
            by_id.insert(product.id.clone(), product.clone());
        }

        self.write_document(by_id.into_values().collect())
    }

    async fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();

        let mut products = self.read_document()?.products;
        products.retain(|p| &p.id != id);
        self.write_document(products)
    }
}
