//! Webhook notification delivery.
//!
//! Alerts are handed to a background worker over a channel; the check cycle
//! never waits on the transport. A rejected or failed delivery is logged and
//! dropped: at most one delivery attempt per restock transition.

use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::port::{Notifier, RestockAlert};

/// Webhook notifier posting a Discord-compatible embed per alert.
pub struct WebhookNotifier {
    sender: mpsc::UnboundedSender<RestockAlert>,
}

impl WebhookNotifier {
    /// Create the notifier and spawn its delivery worker.
    #[must_use]
    pub fn new(url: String) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(webhook_worker(url, receiver));
        Self { sender }
    }
}

impl Notifier for WebhookNotifier {
    fn notify(&self, alert: RestockAlert) {
        if self.sender.send(alert).is_err() {
            warn!("Webhook notifier channel closed");
        }
    }
}

/// Background worker that posts alerts to the webhook endpoint.
async fn webhook_worker(url: String, mut receiver: mpsc::UnboundedReceiver<RestockAlert>) {
    let client = reqwest::Client::new();

    info!("Webhook notifier started");

    while let Some(alert) = receiver.recv().await {
        let payload = embed_payload(&alert);

        match client.post(&url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                error!(
                    status = response.status().as_u16(),
                    product_id = %alert.product_id,
                    size = %alert.size,
                    "Webhook delivery rejected"
                );
            }
            Ok(_) => {
                debug!(
                    product_id = %alert.product_id,
                    size = %alert.size,
                    "Restock alert delivered"
                );
            }
            Err(e) => {
                error!(error = %e, product_id = %alert.product_id, "Failed to deliver restock alert");
            }
        }
    }

    warn!("Webhook worker shutting down");
}

/// Build the webhook body for one alert.
fn embed_payload(alert: &RestockAlert) -> serde_json::Value {
    let title = if alert.title.is_empty() {
        format!("Product {}", alert.product_id)
    } else {
        alert.title.clone()
    };

    let mut embed = json!({
        "title": title,
        "url": alert.url,
        "description": format!("Size **{}** is back in stock", alert.size),
        "fields": [
            { "name": "Brand", "value": field_value(&alert.brand), "inline": true },
            { "name": "Size", "value": alert.size, "inline": true },
            { "name": "Price", "value": field_value(&alert.price), "inline": true },
            { "name": "Stock", "value": field_value(&alert.stock_label), "inline": true },
        ],
    });

    if !alert.image_url.is_empty() {
        embed["thumbnail"] = json!({ "url": alert.image_url });
    }

    json!({
        "username": "restockd",
        "embeds": [embed],
    })
}

fn field_value(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn alert() -> RestockAlert {
        RestockAlert {
            product_id: "18205".into(),
            title: "Runner GT".into(),
            brand: "Acme".into(),
            size: "M".into(),
            price: "99.95".into(),
            stock_label: "3 in stock".into(),
            url: "https://shop.example/products/18205".into(),
            image_url: "https://cdn.example/runner-gt.jpg".into(),
        }
    }

    #[test]
    fn test_embed_payload_shape() {
        let payload = embed_payload(&alert());

        assert_eq!(payload["username"], "restockd");
        let embed = &payload["embeds"][0];
        assert_eq!(embed["title"], "Runner GT");
        assert_eq!(embed["url"], "https://shop.example/products/18205");
        assert_eq!(embed["thumbnail"]["url"], "https://cdn.example/runner-gt.jpg");
        assert_eq!(embed["fields"][0]["value"], "Acme");
        assert_eq!(embed["fields"][1]["value"], "M");
    }

    #[test]
    fn test_embed_payload_fills_missing_metadata() {
        let mut bare = alert();
        bare.title = String::new();
        bare.brand = String::new();
        bare.image_url = String::new();

        let payload = embed_payload(&bare);
        let embed = &payload["embeds"][0];

        assert_eq!(embed["title"], "Product 18205");
        assert_eq!(embed["fields"][0]["value"], "-");
        assert!(embed.get("thumbnail").is_none());
    }

    #[tokio::test]
    async fn test_worker_posts_alert_to_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.uri()));
        notifier.notify(alert());

        // Delivery happens on a background task; poll until it lands.
        let mut delivered = 0;
        for _ in 0..50 {
            delivered = server.received_requests().await.unwrap_or_default().len();
            if delivered == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(delivered, 1);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["embeds"][0]["fields"][1]["value"], "M");
    }
}
