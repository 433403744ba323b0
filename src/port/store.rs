//! Persistence port for the product registry.

use async_trait::async_trait;

use crate::domain::{Product, ProductId};
use crate::error::StoreError;

/// Durable mirror of the product registry.
///
/// The registry stays authoritative in memory for the lifetime of the
/// process; the store is reloaded at startup and upserted once per check
/// cycle. Writes are best-effort: a failed write leaves the durable copy at
/// most one cycle behind, and the next successful cycle re-derives correct
/// state from fresh snapshots.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Insert or replace every given product, keyed by id.
    async fn upsert_all(&self, products: &[Product]) -> Result<(), StoreError>;

    async fn delete(&self, id: &ProductId) -> Result<(), StoreError>;
}

/// In-memory-only mode: persistence configured away, every operation a
/// no-op. State does not survive a restart; nothing else changes.
pub struct NullStore;

#[async_trait]
impl ProductStore for NullStore {
    async fn load_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(Vec::new())
    }

    async fn upsert_all(&self, _products: &[Product]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn delete(&self, _id: &ProductId) -> Result<(), StoreError> {
        Ok(())
    }
}
