//! Adapters: concrete implementations of the ports.

mod http;
mod json_store;
mod webhook;

pub use http::HttpSnapshotSource;
pub use json_store::JsonFileStore;
pub use webhook::WebhookNotifier;
