use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use glof_core::Alert;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::config::OfflineConfig;
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// True when the outside world is reachable
    async fn reachable(&self) -> bool;
}

/// Treats any HTTP response from `url` as proof of connectivity
pub struct HttpProbe {
    client: Client,
    url: String,
}

impl HttpProbe {
    pub fn new(config: &OfflineConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.probe_timeout_seconds))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build probe HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.probe_url.clone(),
        })
    }
}

#[async_trait]
impl ConnectivityProbe for HttpProbe {
    async fn reachable(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "Connectivity probe failed");
                false
            }
        }
    }
}

/// Holds alerts that could not be delivered while the network was down.
pub struct OfflineManager {
    queue: Mutex<VecDeque<Alert>>,
    online: AtomicBool,
    probe: Arc<dyn ConnectivityProbe>,
}

impl OfflineManager {
    pub fn new(probe: Arc<dyn ConnectivityProbe>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            online: AtomicBool::new(true),
            probe,
        }
    }

    /// Last known connectivity state
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    /// Probe the network and record the result
    pub async fn check_connectivity(&self) -> bool {
        let online = self.probe.reachable().await;
        let was_online = self.online.swap(online, Ordering::Relaxed);
        if was_online != online {
            tracing::warn!(online = %online, "Connectivity changed");
        }
        online
    }

    /// Record a successful delivery as proof that the network is back
    pub fn mark_online(&self) {
        if !self.online.swap(true, Ordering::Relaxed) {
            tracing::warn!(online = true, "Connectivity changed");
        }
    }

    pub async fn enqueue(&self, alert: Alert) {
        tracing::info!(alert_id = %alert.id, "Alert queued offline");
        self.queue.lock().await.push_back(alert);
    }

    /// Take every queued alert, oldest first
    pub async fn drain(&self) -> Vec<Alert> {
        self.queue.lock().await.drain(..).collect()
    }

    pub async fn snapshot(&self) -> Vec<Alert> {
        self.queue.lock().await.iter().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }
}
