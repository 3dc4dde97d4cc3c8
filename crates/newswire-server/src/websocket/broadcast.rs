//! News fan-out to connected WebSocket subscribers.

use std::collections::HashMap;
use std::sync::Arc;

use newswire_core::{NewsItem, ServerMessage};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::subscriber::Subscriber;

/// Lifetime dropped-message threshold after which a subscriber is evicted.
const MAX_TOTAL_DROPS: u64 = 100;

/// Subscriber registry and broadcast engine.
pub struct BroadcastHub {
    /// Connected subscribers indexed by client ID.
    subscribers: RwLock<HashMap<String, Arc<Subscriber>>>,
}

impl BroadcastHub {
    /// Create a new hub.
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Add a subscriber.
    pub async fn add(&self, subscriber: Arc<Subscriber>) {
        let mut subs = self.subscribers.write().await;
        let _ = subs.insert(subscriber.id.clone(), subscriber);
    }

    /// Remove a subscriber by client ID. No-op when absent.
    pub async fn remove(&self, client_id: &str) {
        let mut subs = self.subscribers.write().await;
        let _ = subs.remove(client_id);
    }

    /// Number of connected subscribers.
    pub async fn count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Point-in-time view of all subscribers.
    ///
    /// Delivery iterates the snapshot so the registry lock is never held
    /// while sending.
    pub async fn snapshot(&self) -> Vec<Arc<Subscriber>> {
        self.subscribers.read().await.values().cloned().collect()
    }

    /// Broadcast a news item to every subscriber.
    ///
    /// Serializes the envelope once and hands it to each subscriber's write
    /// task. Subscribers whose channel has closed, or that have dropped too
    /// many messages, are removed. Returns the number of subscribers
    /// registered when the broadcast began; delivery failures are logged,
    /// never raised.
    pub async fn broadcast_news(&self, item: &NewsItem) -> usize {
        let payload = Arc::new(ServerMessage::News { data: item.clone() }.to_json());

        let snapshot = self.snapshot().await;
        if snapshot.is_empty() {
            debug!(news_id = item.id, "no subscribers connected, skipping broadcast");
            return 0;
        }

        let mut delivered = 0;
        let mut stale: Vec<String> = Vec::new();
        for sub in &snapshot {
            if sub.is_closed() {
                stale.push(sub.id.clone());
                continue;
            }
            if sub.send(payload.clone()) {
                delivered += 1;
            } else {
                warn!(client_id = %sub.id, "failed to send news to subscriber");
                if sub.drop_count() >= MAX_TOTAL_DROPS {
                    stale.push(sub.id.clone());
                }
            }
        }

        if !stale.is_empty() {
            let mut subs = self.subscribers.write().await;
            for id in &stale {
                let _ = subs.remove(id);
            }
            warn!(removed = stale.len(), news_id = item.id, "pruned dead subscribers");
        }

        debug!(news_id = item.id, recipients = delivered, "broadcast news");
        snapshot.len()
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new()
    }
}
