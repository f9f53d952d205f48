use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use super::traits::{ContextId, ExternalChanges, StorageEvent, StorageProvider};

const EVENT_CAPACITY: usize = 64;

/// In-process key-value store shared by any number of contexts
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    values: RwLock<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                values: RwLock::new(HashMap::new()),
                events,
            }),
        }
    }

    /// Open a new context (a "tab") on this backend
    pub fn context(&self) -> MemoryStorage {
        MemoryStorage {
            backend: self.clone(),
            id: ContextId::next(),
        }
    }
}

/// One context's handle onto a [`MemoryBackend`]
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    backend: MemoryBackend,
    id: ContextId,
}

impl MemoryStorage {
    /// A single context on a fresh backend
    pub fn new() -> Self {
        MemoryBackend::new().context()
    }

    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorage {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.backend.inner.values.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.backend
            .inner
            .values
            .write()
            .await
            .insert(key.to_string(), value.to_string());

        let event = StorageEvent {
            key: key.to_string(),
            new_value: Some(value.to_string()),
            origin: self.id,
        };
        // no subscribers is fine
        let delivered = self.backend.inner.events.send(event).unwrap_or(0);
        debug!("Wrote {} ({} bytes), {} subscribers", key, value.len(), delivered);

        Ok(())
    }

    fn subscribe(&self) -> ExternalChanges {
        ExternalChanges::new(self.backend.inner.events.subscribe(), self.id)
    }

    fn context_id(&self) -> ContextId {
        self.id
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn contexts_share_values() {
        let backend = MemoryBackend::new();
        let tab_a = backend.context();
        let tab_b = backend.context();

        assert_eq!(tab_b.read("k").await.unwrap(), None);
        tab_a.write("k", "v1").await.unwrap();
        assert_eq!(tab_b.read("k").await.unwrap().as_deref(), Some("v1"));
        assert_ne!(tab_a.context_id(), tab_b.context_id());
    }

    #[tokio::test]
    async fn writers_do_not_hear_themselves() {
        let backend = MemoryBackend::new();
        let tab_a = backend.context();
        let tab_b = backend.context();
        let mut a_changes = tab_a.subscribe();
        let mut b_changes = tab_b.subscribe();

        tab_a.write("k", "from-a").await.unwrap();

        assert!(a_changes.try_recv().is_none());
        let event = b_changes.recv().await.unwrap();
        assert_eq!(event.key, "k");
        assert_eq!(event.new_value.as_deref(), Some("from-a"));
        assert_eq!(event.origin, tab_a.context_id());
    }
}
