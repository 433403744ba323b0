//! In-memory product registry.
//!
//! Source of truth for product state during a run. Control operations and
//! the check cycle mutate entries in place through this map, so an update
//! landing between two cycles is never lost to a stale copy.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::{Product, ProductId};
use crate::error::{Error, Result};

#[derive(Default)]
pub struct ProductRegistry {
    products: DashMap<ProductId, Product>,
}

impl ProductRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a product that must not exist yet.
    pub fn insert_new(&self, product: Product) -> Result<()> {
        match self.products.entry(product.id.clone()) {
            Entry::Occupied(entry) => Err(Error::DuplicateProduct {
                id: entry.key().clone(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(product);
                Ok(())
            }
        }
    }

    /// Restore products loaded from the store, replacing any existing entry.
    pub fn restore(&self, products: Vec<Product>) {
        for product in products {
            self.products.insert(product.id.clone(), product);
        }
    }

    pub fn remove(&self, id: &ProductId) -> Result<Product> {
        self.products
            .remove(id)
            .map(|(_, product)| product)
            .ok_or_else(|| Error::NotFound { id: id.clone() })
    }

    pub fn contains(&self, id: &ProductId) -> bool {
        self.products.contains_key(id)
    }

    pub fn get(&self, id: &ProductId) -> Option<Product> {
        self.products.get(id).map(|entry| entry.value().clone())
    }

    /// Run a closure against the live entry, serialized against other access
    /// to the same product.
    pub fn with_product<T>(&self, id: &ProductId, f: impl FnOnce(&mut Product) -> T) -> Result<T> {
        match self.products.get_mut(id) {
            Some(mut entry) => Ok(f(&mut entry)),
            None => Err(Error::NotFound { id: id.clone() }),
        }
    }

    /// Consistent id snapshot for one cycle, in stable order.
    pub fn ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = self.products.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Clone of every product, in stable order.
    pub fn all(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.products.iter().map(|e| e.value().clone()).collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn product(id: &str) -> Product {
        Product::new(
            ProductId::from(id),
            format!("https://shop.example/products/{id}"),
            BTreeSet::new(),
        )
    }

    #[test]
    fn test_insert_new_rejects_duplicate_id() {
        let registry = ProductRegistry::new();
        registry.insert_new(product("100")).unwrap();

        let err = registry.insert_new(product("100")).unwrap_err();
        assert!(matches!(err, Error::DuplicateProduct { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_with_product_mutates_the_live_entry() {
        let registry = ProductRegistry::new();
        registry.insert_new(product("100")).unwrap();

        registry
            .with_product(&ProductId::from("100"), |p| {
                p.watched_sizes.insert("M".to_string());
            })
            .unwrap();

        let stored = registry.get(&ProductId::from("100")).unwrap();
        assert!(stored.watched_sizes.contains("M"));
    }

    #[test]
    fn test_with_product_reports_not_found() {
        let registry = ProductRegistry::new();
        let err = registry.with_product(&ProductId::from("404"), |_| ()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn test_remove_returns_the_product() {
        let registry = ProductRegistry::new();
        registry.insert_new(product("100")).unwrap();

        let removed = registry.remove(&ProductId::from("100")).unwrap();
        assert_eq!(removed.id.as_str(), "100");
        assert!(registry.is_empty());

        assert!(registry.remove(&ProductId::from("100")).is_err());
    }

    #[test]
    fn test_ids_are_stable_ordered() {
        let registry = ProductRegistry::new();
        registry.insert_new(product("300")).unwrap();
        registry.insert_new(product("100")).unwrap();
        registry.insert_new(product("200")).unwrap();

        let ids: Vec<String> = registry.ids().iter().map(|i| i.to_string()).collect();
        assert_eq!(ids, vec!["100", "200", "300"]);
    }
}
