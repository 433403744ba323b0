//! Snapshot source port.

use async_trait::async_trait;

use crate::domain::ProductSnapshot;
use crate::error::SourceError;

/// Where product snapshots come from.
///
/// Implementations fetch one product page and reduce it to a stock-by-size
/// snapshot plus display metadata. An empty size map is a valid snapshot:
/// the page decoded but carried no variant data.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ProductSnapshot, SourceError>;
}
