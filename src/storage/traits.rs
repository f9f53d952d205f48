use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::warn;

/// Identifies one execution context (one tab) writing to a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);

impl ContextId {
    /// Writer that is not known to this process, e.g. another program editing files
    pub const UNKNOWN: ContextId = ContextId(0);

    pub fn next() -> Self {
        ContextId(NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A key changed. `new_value` is `None` when the key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
    pub origin: ContextId,
}

/// Key-value storage shared between contexts
///
/// Implementations must deliver change events for writes made by other
/// contexts, and never echo a context's own writes back to it.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    async fn read(&self, key: &str) -> Result<Option<String>>;

    async fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Subscribe to writes made by other contexts
    fn subscribe(&self) -> ExternalChanges;

    fn context_id(&self) -> ContextId;

    /// Get the name of the storage backend
    fn backend_name(&self) -> &'static str;
}

/// Stream of changes made by everyone but the subscribing context
#[derive(Debug)]
pub struct ExternalChanges {
    rx: broadcast::Receiver<StorageEvent>,
    own: ContextId,
}

impl ExternalChanges {
    pub fn new(rx: broadcast::Receiver<StorageEvent>, own: ContextId) -> Self {
        Self { rx, own }
    }

    /// Wait for the next external change. `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.origin != self.own => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Storage subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next already-delivered external change, without waiting
    pub fn try_recv(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.origin != self.own => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Storage subscriber lagged, skipped {} events", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}
