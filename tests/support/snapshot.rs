//! Builders for snapshots and watch sets.

use std::collections::BTreeSet;

use restockd::domain::{ProductSnapshot, SizeStock};

/// Build a snapshot with the given title and `(size, in_stock, label)`
/// entries.
pub fn snapshot(title: &str, entries: &[(&str, bool, &str)]) -> ProductSnapshot {
    ProductSnapshot {
        title: title.to_string(),
        brand: "Acme".to_string(),
        price: "99.95".to_string(),
        original_price: String::new(),
        image_url: String::new(),
        sizes: entries
            .iter()
            .map(|(size, in_stock, label)| {
                (
                    size.to_string(),
                    SizeStock {
                        in_stock: *in_stock,
                        stock_label: label.to_string(),
                        variant_code: format!("sku-{size}"),
                    },
                )
            })
            .collect(),
    }
}

pub fn watched(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}
