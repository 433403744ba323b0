//! Ports: trait seams for the external collaborators.

mod notifier;
mod source;
mod store;

pub use notifier::{LogNotifier, Notifier, NotifierRegistry, NullNotifier, RestockAlert};
pub use source::SnapshotSource;
pub use store::{NullStore, ProductStore};
