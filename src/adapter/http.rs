//! HTTP snapshot source.
//!
//! Fetches the configured product URL as-is and decodes the shop's JSON
//! product payload into a domain snapshot. Non-2xx responses and transport
//! failures surface as fetch errors; an undecodable body surfaces as a parse
//! error, which the monitor treats as an empty snapshot rather than a failed
//! check.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{ProductSnapshot, SizeStock};
use crate::error::{Result, SourceError};
use crate::port::SnapshotSource;

/// Shop product payload, as served by the product page's JSON endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductPayload {
    #[serde(default)]
    name: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    price: String,
    #[serde(default, alias = "listPrice")]
    original_price: String,
    #[serde(default, alias = "image")]
    image_url: String,
    #[serde(default)]
    variants: Vec<VariantPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantPayload {
    #[serde(default)]
    size: String,
    #[serde(default)]
    available: bool,
    #[serde(default, alias = "availabilityText")]
    stock_label: String,
    #[serde(default)]
    sku: String,
}

impl ProductPayload {
    fn into_snapshot(self) -> ProductSnapshot {
        let sizes = self
            .variants
            .into_iter()
            .filter(|v| !v.size.is_empty())
            .map(|v| {
                (
                    v.size,
                    SizeStock {
                        in_stock: v.available,
                        stock_label: v.stock_label,
                        variant_code: v.sku,
                    },
                )
            })
            .collect();

        ProductSnapshot {
            title: self.name,
            brand: self.brand,
            price: self.price,
            original_price: self.original_price,
            image_url: self.image_url,
            sizes,
        }
    }
}

pub struct HttpSnapshotSource {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpSnapshotSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("restockd/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self, url: &str) -> std::result::Result<ProductSnapshot, SourceError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SourceError::Timeout {
                    seconds: self.timeout.as_secs(),
                }
            } else {
                SourceError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let payload: ProductPayload = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let snapshot = payload.into_snapshot();
        debug!(url = %url, sizes = snapshot.sizes.len(), "Snapshot fetched");
        Ok(snapshot)
    }
}
