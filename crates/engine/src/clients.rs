//! The set of currently controlled execution contexts.
//!
//! Not persisted; rebuilt each session. The engine only ever uses it to
//! broadcast the new-version signal, to claim open contexts on activation,
//! and to focus or open the application root from a notification click.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use crate::channels::BroadcastMessage;

/// One controlled context (a tab or window).
#[derive(Debug, Clone)]
pub struct ClientHandle {
    pub id: String,
    pub url: String,
    pub claimed: bool,
    pub focused: bool,
    pub inbox: Vec<BroadcastMessage>,
}

/// Platform registry of live clients.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Take control of every open context without waiting for a reload.
    async fn claim_all(&self);

    /// Deliver a message to every registered context.
    async fn broadcast(&self, message: &BroadcastMessage);

    /// Focus an existing context showing `url`, or open a new one.
    async fn open_or_focus(&self, url: &Url);
}

/// In-memory client registry.
///
/// Uses a simple HashMap with tokio RwLock for concurrent access.
#[derive(Default)]
pub struct InMemoryClients {
    clients: Arc<RwLock<HashMap<String, ClientHandle>>>,
}

impl InMemoryClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a context for this session.
    pub async fn connect(&self, id: &str, url: &str) {
        let handle = ClientHandle {
            id: id.to_string(),
            url: url.to_string(),
            claimed: false,
            focused: false,
            inbox: Vec::new(),
        };
        self.clients.write().await.insert(id.to_string(), handle);
    }

    /// Snapshot of every registered context.
    pub async fn snapshot(&self) -> Vec<ClientHandle> {
        let mut all: Vec<ClientHandle> = self.clients.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }
}

#[async_trait]
impl ClientRegistry for InMemoryClients {
    async fn claim_all(&self) {
        let mut clients = self.clients.write().await;
        for client in clients.values_mut() {
            client.claimed = true;
        }
        tracing::debug!(count = clients.len(), "claimed all clients");
    }

    async fn broadcast(&self, message: &BroadcastMessage) {
        let mut clients = self.clients.write().await;
        for client in clients.values_mut() {
            client.inbox.push(message.clone());
        }
    }

    async fn open_or_focus(&self, url: &Url) {
        let mut clients = self.clients.write().await;
        if let Some(existing) = clients.values_mut().find(|c| c.url == url.as_str()) {
            existing.focused = true;
            return;
        }
        let id = format!("client-{}", clients.len() + 1);
        clients.insert(
            id.clone(),
            ClientHandle { id, url: url.to_string(), claimed: false, focused: true, inbox: Vec::new() },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_all() {
        let registry = InMemoryClients::new();
        registry.connect("a", "http://localhost:3000/").await;
        registry.connect("b", "http://localhost:3000/settings").await;

        registry.claim_all().await;

        let all = registry.snapshot().await;
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|c| c.claimed));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_client() {
        let registry = InMemoryClients::new();
        registry.connect("a", "http://localhost:3000/").await;
        registry.connect("b", "http://localhost:3000/about").await;

        registry
            .broadcast(&BroadcastMessage::UpdateAvailable { version: "v2".into() })
            .await;

        for client in registry.snapshot().await {
            assert_eq!(client.inbox.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_open_or_focus_prefers_existing() {
        let registry = InMemoryClients::new();
        registry.connect("a", "http://localhost:3000/").await;

        let root = Url::parse("http://localhost:3000/").unwrap();
        registry.open_or_focus(&root).await;

        let all = registry.snapshot().await;
        assert_eq!(all.len(), 1);
        assert!(all[0].focused);
    }

    #[tokio::test]
    async fn test_open_or_focus_opens_new() {
        let registry = InMemoryClients::new();

        let root = Url::parse("http://localhost:3000/").unwrap();
        registry.open_or_focus(&root).await;

        let all = registry.snapshot().await;
        assert_eq!(all.len(), 1);
        assert!(all[0].focused);
        assert_eq!(all[0].url, "http://localhost:3000/");
    }
}
