use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use super::traits::{ContextId, ExternalChanges, StorageEvent, StorageProvider};

const EXTENSION: &str = "json";
const EVENT_CAPACITY: usize = 64;

/// One JSON file per key in a data directory.
///
/// Changes made by other processes are picked up by polling once someone
/// subscribes.
#[derive(Debug, Clone)]
pub struct FileStorage {
    shared: Arc<Shared>,
    id: ContextId,
}

#[derive(Debug)]
struct Shared {
    dir: PathBuf,
    poll_interval: Duration,
    /// Last content this handle wrote or observed, per key
    known: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
    watching: AtomicBool,
}

impl FileStorage {
    pub async fn open(dir: impl Into<PathBuf>, poll_interval: Duration) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;

        info!("Opened file storage in {}", dir.display());

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self {
            shared: Arc::new(Shared {
                dir,
                poll_interval,
                known: Mutex::new(HashMap::new()),
                events,
                watching: AtomicBool::new(false),
            }),
            id: ContextId::next(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.shared.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        key_path(&self.shared.dir, key)
    }

    fn start_watcher(&self) {
        if self.shared.watching.swap(true, Ordering::AcqRel) {
            return;
        }

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, external file changes will not be reported");
            self.shared.watching.store(false, Ordering::Release);
            return;
        };

        let shared = Arc::clone(&self.shared);
        handle.spawn(async move {
            watch(&shared).await;
            shared.watching.store(false, Ordering::Release);
        });
    }
}

fn key_path(dir: &Path, key: &str) -> Result<PathBuf> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        bail!("Invalid storage key {:?}", key);
    }
    Ok(dir.join(format!("{}.{}", key, EXTENSION)))
}

async fn read_file(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

#[async_trait]
impl StorageProvider for FileStorage {
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        let mut known = self.shared.known.lock().await;
        let content = read_file(&path).await?;

        match &content {
            Some(value) => {
                known.insert(key.to_string(), value.clone());
            }
            None => {
                known.remove(key);
            }
        }
        Ok(content)
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("tmp");

        // held across the rename so the watcher never sees a half-recorded write
        let mut known = self.shared.known.lock().await;
        tokio::fs::write(&tmp, value)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to move {} into place", path.display()))?;
        known.insert(key.to_string(), value.to_string());

        debug!("Wrote {} ({} bytes)", path.display(), value.len());
        Ok(())
    }

    fn subscribe(&self) -> ExternalChanges {
        let rx = self.shared.events.subscribe();
        self.start_watcher();
        ExternalChanges::new(rx, self.id)
    }

    fn context_id(&self) -> ContextId {
        self.id
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// Poll the directory until nobody is listening any more
async fn watch(shared: &Shared) {
    let mut ticker = tokio::time::interval(shared.poll_interval);
    let mut first_pass = true;

    loop {
        ticker.tick().await;
        if shared.events.receiver_count() == 0 {
            debug!("No subscribers left, stopping file watcher");
            return;
        }

        if let Err(e) = poll_once(shared, first_pass).await {
            warn!("File watcher poll failed: {:#}", e);
        }
        first_pass = false;
    }
}

async fn poll_once(shared: &Shared, baseline_only: bool) -> Result<()> {
    let mut on_disk = Vec::new();
    let mut entries = tokio::fs::read_dir(&shared.dir)
        .await
        .with_context(|| format!("Failed to list {}", shared.dir.display()))?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
            continue;
        }
        if let Some(key) = path.file_stem().and_then(|s| s.to_str()) {
            on_disk.push(key.to_string());
        }
    }

    let mut known = shared.known.lock().await;

    for key in &on_disk {
        let Some(content) = read_file(&key_path(&shared.dir, key)?).await? else {
            continue;
        };
        let changed = known.get(key) != Some(&content);
        if !changed {
            continue;
        }
        if baseline_only && !known.contains_key(key) {
            known.insert(key.clone(), content);
            continue;
        }

        known.insert(key.clone(), content.clone());
        let delivered = shared
            .events
            .send(StorageEvent {
                key: key.clone(),
                new_value: Some(content),
                origin: ContextId::UNKNOWN,
            })
            .unwrap_or(0);
        debug!("Detected external change to {}, {} subscribers", key, delivered);
    }

    let removed: Vec<String> = known
        .keys()
        .filter(|key| !on_disk.contains(key))
        .cloned()
        .collect();
    for key in removed {
        known.remove(&key);
        if baseline_only {
            continue;
        }
        let delivered = shared
            .events
            .send(StorageEvent {
                key: key.clone(),
                new_value: None,
                origin: ContextId::UNKNOWN,
            })
            .unwrap_or(0);
        debug!("Detected external removal of {}, {} subscribers", key, delivered);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    const POLL: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path(), POLL).await.unwrap();
        assert_eq!(storage.read("smartHomeData").await.unwrap(), None);
    }

    #[tokio::test]
    async fn values_persist_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileStorage::open(dir.path(), POLL).await.unwrap();
        first.write("smartHomeUser", "null").await.unwrap();

        let second = FileStorage::open(dir.path(), POLL).await.unwrap();
        assert_eq!(
            second.read("smartHomeUser").await.unwrap().as_deref(),
            Some("null")
        );
        assert!(dir.path().join("smartHomeUser.json").exists());
        assert!(!dir.path().join("smartHomeUser.tmp").exists());
    }

    #[tokio::test]
    async fn rejects_keys_that_are_not_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path(), POLL).await.unwrap();
        assert!(storage.write("../escape", "x").await.is_err());
        assert!(storage.read("").await.is_err());
    }

    #[tokio::test]
    async fn other_handle_writes_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = FileStorage::open(dir.path(), POLL).await.unwrap();
        let writer = FileStorage::open(dir.path(), POLL).await.unwrap();
        writer.write("shared", "v1").await.unwrap();

        let mut changes = watcher.subscribe();
        // let the baseline pass run
        tokio::time::sleep(POLL * 3).await;
        writer.write("shared", "v2").await.unwrap();

        let event = timeout(Duration::from_secs(2), changes.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.key, "shared");
        assert_eq!(event.new_value.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn own_writes_are_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path(), POLL).await.unwrap();
        let mut changes = storage.subscribe();

        storage.write("shared", "mine").await.unwrap();
        tokio::time::sleep(POLL * 5).await;

        assert!(changes.try_recv().is_none());
    }

    #[tokio::test]
    async fn changes_without_subscribers_are_dropped_quietly() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path(), POLL).await.unwrap();
        poll_once(&storage.shared, true).await.unwrap();

        tokio::fs::write(dir.path().join("shared.json"), "outside").await.unwrap();
        poll_once(&storage.shared, false).await.unwrap();
        tokio::fs::remove_file(dir.path().join("shared.json")).await.unwrap();
        poll_once(&storage.shared, false).await.unwrap();

        assert!(storage.shared.known.lock().await.is_empty());
    }
}
