//! Monitor service: scheduling, checks, and control operations.

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::domain::{diff_stock, CheckResult, Product, ProductId, ProductSnapshot};
use crate::error::{Error, Result};
use crate::monitor::ProductRegistry;
use crate::port::{Notifier, NotifierRegistry, ProductStore, RestockAlert, SnapshotSource};

/// Cadence settings for the scheduler.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between check cycles.
    pub poll_interval: Duration,
    /// Delay between consecutive product checks within a cycle.
    pub pacing_delay: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            pacing_delay: Duration::from_secs(1),
        }
    }
}

/// The engine. Owns the registry and the scheduler; the control surface
/// holds it behind an `Arc` and calls the operations below.
pub struct MonitorService {
    registry: ProductRegistry,
    source: Arc<dyn SnapshotSource>,
    store: Arc<dyn ProductStore>,
    notifiers: Arc<NotifierRegistry>,
    config: MonitorConfig,
    /// Serializes scheduled cycles and ad-hoc force checks: one check at a
    /// time, matching the strictly sequential reference behavior.
    check_gate: tokio::sync::Mutex<()>,
    /// Shutdown signal of the scheduler task while one is running. The slot
    /// doubles as the "is running" flag; start/stop race through this lock.
    scheduler: parking_lot::Mutex<Option<Arc<Notify>>>,
    /// Self-handle for spawning the scheduler task.
    weak: Weak<MonitorService>,
}

impl MonitorService {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        store: Arc<dyn ProductStore>,
        notifiers: Arc<NotifierRegistry>,
        config: MonitorConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            registry: ProductRegistry::new(),
            source,
            store,
            notifiers,
            config,
            check_gate: tokio::sync::Mutex::new(()),
            scheduler: parking_lot::Mutex::new(None),
            weak: weak.clone(),
        })
    }

    /// Restore the registry from the store. Returns the number of products
    /// loaded.
    pub async fn load(&self) -> Result<usize> {
        let products = self.store.load_all().await?;
        let count = products.len();
        self.registry.restore(products);
        if count > 0 {
            info!(products = count, "Registry restored from store");
        }
        Ok(count)
    }

    /// Start the scheduler: one cycle immediately, then repeating at the
    /// poll interval. No-op if already running.
    pub fn start(&self) {
        let mut slot = self.scheduler.lock();
        if slot.is_some() {
            return;
        }
        let Some(service) = self.weak.upgrade() else {
            return;
        };

        let shutdown = Arc::new(Notify::new());
        tokio::spawn(run_scheduler(service, Arc::clone(&shutdown)));
        *slot = Some(shutdown);

        info!(interval = ?self.config.poll_interval, "Monitor started");
    }

    /// Stop scheduling further cycles. An in-flight cycle finishes; nothing
    /// is cancelled mid-check. No-op if not running.
    pub fn stop(&self) {
        let shutdown = self.scheduler.lock().take();
        if let Some(shutdown) = shutdown {
            shutdown.notify_one();
            info!("Monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.lock().is_some()
    }

    /// Register a product: derive its id, fetch the initial snapshot, and
    /// run the first diff pass against an empty baseline (so sizes already
    /// in stock alert immediately). Ensures the scheduler is running.
    pub async fn add(&self, url: &str, watched_sizes: BTreeSet<String>) -> Result<Product> {
        let id = ProductId::from_url(url)?;
        if self.registry.contains(&id) {
            return Err(Error::DuplicateProduct { id });
        }

        let snapshot = match self.source.fetch(url).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_parse() => {
                warn!(product_id = %id, error = %e, "Initial payload malformed, starting with empty snapshot");
                ProductSnapshot::default()
            }
            Err(e) => return Err(e.into()),
        };

        {
            // The initial diff is a check; keep it exclusive with any
            // in-flight cycle.
            let _gate = self.check_gate.lock().await;
            self.registry
                .insert_new(Product::new(id.clone(), url, watched_sizes))?;
            self.apply_snapshot(&id, &snapshot)?;
        }
        self.sync_store().await;
        self.start();

        let product = self
            .registry
            .get(&id)
            .ok_or_else(|| Error::NotFound { id: id.clone() })?;
        info!(product_id = %id, title = %product.title, "Product registered");
        Ok(product)
    }

    /// Remove a product from the registry and the store. Stops the scheduler
    /// when the registry becomes empty.
    pub async fn remove(&self, id: &ProductId) -> Result<Product> {
        let product = self.registry.remove(id)?;

        if let Err(e) = self.store.delete(id).await {
            error!(product_id = %id, error = %e, "Failed to delete product from store");
        }

        if self.registry.is_empty() {
            self.stop();
        }

        info!(product_id = %id, "Product removed");
        Ok(product)
    }

    /// Replace the watch set. An empty set means "watch all sizes".
    pub async fn set_watched_sizes(&self, id: &ProductId, sizes: BTreeSet<String>) -> Result<()> {
        self.registry.with_product(id, |product| {
            product.watched_sizes = sizes;
        })?;
        self.sync_store().await;
        Ok(())
    }

    /// Clear the notified flags without touching the stock baseline, so the
    /// next in-stock observation of a watched size alerts again.
    pub async fn reset_notifications(&self, id: &ProductId) -> Result<()> {
        self.registry.with_product(id, |product| {
            product.notified_sizes.clear();
        })?;
        self.sync_store().await;
        Ok(())
    }

    /// Run one ad-hoc check outside the cycle cadence, then persist.
    pub async fn force_check(&self, id: &ProductId) -> Result<CheckResult> {
        if !self.registry.contains(id) {
            return Err(Error::NotFound { id: id.clone() });
        }

        let _gate = self.check_gate.lock().await;
        let result = self.check_product(id).await;
        self.sync_store().await;
        Ok(result)
    }

    /// Current registry contents, in stable order.
    pub fn list(&self) -> Vec<Product> {
        self.registry.all()
    }

    pub fn product_count(&self) -> usize {
        self.registry.len()
    }

    /// One full pass over the registry: every product is attempted, failures
    /// are contained per product, and the store is updated once at the end.
    pub async fn run_cycle(&self) {
        let _gate = self.check_gate.lock().await;

        let ids = self.registry.ids();
        if ids.is_empty() {
            return;
        }

        debug!(products = ids.len(), "Check cycle started");
        let mut failures = 0usize;

        for (index, id) in ids.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.pacing_delay).await;
            }
            if !self.check_product(id).await.success {
                failures += 1;
            }
        }

        self.sync_store().await;
        debug!(products = ids.len(), failures, "Check cycle finished");
    }

    /// Check one product: fetch, diff, update, notify. Transport failures
    /// record the error and leave the stock baseline untouched; parse
    /// failures degrade to an empty snapshot.
    async fn check_product(&self, id: &ProductId) -> CheckResult {
        let Some(product) = self.registry.get(id) else {
            return CheckResult::failed("product no longer registered");
        };

        let snapshot = match self.source.fetch(&product.url).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_parse() => {
                warn!(product_id = %id, error = %e, "Snapshot payload malformed, treating as empty");
                ProductSnapshot::default()
            }
            Err(e) => {
                warn!(product_id = %id, error = %e, "Snapshot fetch failed");
                let message = e.to_string();
                let _ = self.registry.with_product(id, |product| {
                    product.last_error = Some(message.clone());
                });
                return CheckResult::failed(message);
            }
        };

        match self.apply_snapshot(id, &snapshot) {
            Ok(result) => result,
            Err(_) => CheckResult::failed("product no longer registered"),
        }
    }

    /// Diff a fetched snapshot against the live registry entry and apply the
    /// outcome. Reads and writes the same in-memory instance, so watch-list
    /// edits made during the fetch are honored here.
    fn apply_snapshot(&self, id: &ProductId, snapshot: &ProductSnapshot) -> Result<CheckResult> {
        let mut alerts: Vec<RestockAlert> = Vec::new();

        self.registry.with_product(id, |product| {
            product.apply_metadata(snapshot);

            let diff = diff_stock(
                &product.previous_stock,
                &snapshot.sizes,
                &product.watched_sizes,
                &product.notified_sizes,
            );

            for restock in &diff.restocks {
                info!(
                    product_id = %id,
                    size = %restock.size,
                    label = %restock.stock.stock_label,
                    "Size restocked"
                );
                alerts.push(RestockAlert::new(product, restock));
            }
            if !diff.cleared.is_empty() {
                debug!(product_id = %id, sizes = ?diff.cleared, "Sizes back out of stock");
            }

            // The snapshot becomes the new baseline wholesale, even when
            // nothing changed; stock labels refresh this way.
            product.previous_stock = snapshot.sizes.clone();
            product.notified_sizes = diff.notified;
            product.last_checked_at = Some(Utc::now());
            product.last_error = None;
        })?;

        for alert in alerts {
            self.notifiers.notify(alert);
        }

        Ok(CheckResult::ok(snapshot.sizes.clone()))
    }

    /// Mirror the registry to the store. Failures are logged and contained:
    /// the registry stays authoritative in memory.
    async fn sync_store(&self) {
        let products = self.registry.all();
        if let Err(e) = self.store.upsert_all(&products).await {
            error!(error = %e, "Failed to persist registry");
        }
    }
}

/// Scheduler loop: cycle, then wait for the interval or shutdown.
async fn run_scheduler(service: Arc<MonitorService>, shutdown: Arc<Notify>) {
    loop {
        service.run_cycle().await;

        tokio::select! {
            _ = shutdown.notified() => break,
            _ = tokio::time::sleep(service.config.poll_interval) => {}
        }
    }
    debug!("Scheduler task exited");
}
