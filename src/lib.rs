//! restockd - product restock monitoring and notification.
//!
//! Polls registered product pages on a fixed interval, diffs consecutive
//! stock snapshots, and emits exactly one alert per restock transition: a
//! watched size going from out-of-stock to in-stock. Repeated polls while a
//! size stays available never re-alert; the size going out of stock re-arms
//! its alert gate.
//!
//! # Architecture
//!
//! Ports and adapters around a pure core:
//!
//! - [`domain`] - product state and the stock diff engine (no I/O)
//! - [`port`] - trait seams: [`port::SnapshotSource`], [`port::ProductStore`],
//!   [`port::Notifier`]
//! - [`adapter`] - HTTP snapshot source, JSON file store, webhook notifier
//! - [`monitor`] - product registry, scheduler, and control operations
//! - [`config`] - TOML configuration and logging setup
//! - [`error`] - error types for the crate
//! - [`cli`] - the command-line control surface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use restockd::adapter::HttpSnapshotSource;
//! use restockd::monitor::{MonitorConfig, MonitorService};
//! use restockd::port::{LogNotifier, NotifierRegistry, NullStore};
//!
//! # async fn demo() -> restockd::error::Result<()> {
//! let source = Arc::new(HttpSnapshotSource::new(Duration::from_secs(30))?);
//! let mut notifiers = NotifierRegistry::new();
//! notifiers.register(Box::new(LogNotifier));
//!
//! let service = MonitorService::new(
//!     source,
//!     Arc::new(NullStore),
//!     Arc::new(notifiers),
//!     MonitorConfig::default(),
//! );
//!
//! // Registers the product, runs the first check, and starts the scheduler.
//! service.add("https://shop.example/products/18205", Default::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod monitor;
pub mod port;
