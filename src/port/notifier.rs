//! Notifier port for restock alerts.

use tracing::info;

use crate::domain::{Product, Restock};

/// Payload for a single restock alert.
#[derive(Debug, Clone)]
pub struct RestockAlert {
    pub product_id: String,
    pub title: String,
    pub brand: String,
    pub size: String,
    pub price: String,
    pub stock_label: String,
    pub url: String,
    pub image_url: String,
}

impl RestockAlert {
    #[must_use]
    pub fn new(product: &Product, restock: &Restock) -> Self {
        Self {
            product_id: product.id.to_string(),
            title: product.title.clone(),
            brand: product.brand.clone(),
            size: restock.size.clone(),
            price: product.price.clone(),
            stock_label: restock.stock.stock_label.clone(),
            url: product.url.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

/// Trait for restock alert sinks.
///
/// Delivery is fire-and-forget relative to the check cycle: `notify` must
/// return quickly, and a failed delivery is logged by the implementation and
/// never retried. Slow transports should hand the alert to a background
/// task.
pub trait Notifier: Send + Sync {
    fn notify(&self, alert: RestockAlert);
}

/// Logs every alert through tracing. Always registered.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, alert: RestockAlert) {
        info!(
            product_id = %alert.product_id,
            title = %alert.title,
            size = %alert.size,
            stock = %alert.stock_label,
            "Restock alert"
        );
    }
}

/// Discards every alert.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _alert: RestockAlert) {}
}

/// Fan-out to every registered notifier.
#[derive(Default)]
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Notifier for NotifierRegistry {
    fn notify(&self, alert: RestockAlert) {
        for notifier in &self.notifiers {
            notifier.notify(alert.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting(Arc<AtomicUsize>);

    impl Notifier for Counting {
        fn notify(&self, _alert: RestockAlert) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn alert() -> RestockAlert {
        RestockAlert {
            product_id: "18205".into(),
            title: "Runner GT".into(),
            brand: "Acme".into(),
            size: "M".into(),
            price: "99.95".into(),
            stock_label: "3 in stock".into(),
            url: "https://shop.example/products/18205".into(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_registry_fans_out_to_every_notifier() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(Counting(count.clone())));
        registry.register(Box::new(Counting(count.clone())));
        registry.register(Box::new(NullNotifier));

        registry.notify(alert());

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_empty_registry_is_a_no_op() {
        let registry = NotifierRegistry::new();
        assert!(registry.is_empty());
        registry.notify(alert());
    }
}
