use std::sync::{Arc, Mutex};

use restockd::port::{Notifier, RestockAlert};

/// Thread-safe alert collector for notification assertions in tests.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    alerts: Arc<Mutex<Vec<RestockAlert>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().expect("lock notifier alerts").len()
    }

    /// Alerted sizes, in delivery order.
    pub fn sizes(&self) -> Vec<String> {
        self.alerts
            .lock()
            .expect("lock notifier alerts")
            .iter()
            .map(|a| a.size.clone())
            .collect()
    }

    pub fn alerts(&self) -> Vec<RestockAlert> {
        self.alerts.lock().expect("lock notifier alerts").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, alert: RestockAlert) {
        self.alerts
            .lock()
            .expect("lock notifier alerts")
            .push(alert);
    }
}
