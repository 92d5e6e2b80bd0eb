use std::collections::VecDeque;

use glof_core::Alert;
use tokio::sync::RwLock;

/// Bounded in-memory record of dispatched alerts, newest first.
pub struct AlertLog {
    entries: RwLock<VecDeque<Alert>>,
    capacity: usize,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    pub async fn record(&self, alert: Alert) {
        let mut entries = self.entries.write().await;
        entries.push_front(alert);
        entries.truncate(self.capacity);
    }

    /// Replace the entry for the same alert, or record it if it has already
    /// been evicted. Ids only resolve to the second, so two alerts for one
    /// lake can share an id; `created_at` tells them apart.
    pub async fn update(&self, alert: Alert) {
        let mut entries = self.entries.write().await;
        if let Some(existing) = entries
            .iter_mut()
            .find(|a| a.id == alert.id && a.created_at == alert.created_at)
        {
            *existing = alert;
            return;
        }
        entries.push_front(alert);
        entries.truncate(self.capacity);
    }

    pub async fn recent(&self, limit: usize) -> Vec<Alert> {
        self.entries.read().await.iter().take(limit).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
