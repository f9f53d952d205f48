pub mod favorites;
pub mod notifications;
pub mod properties;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};

use crate::models::seed_properties;

pub use favorites::{FavoritesIndex, Toggle};
pub use notifications::NotificationLog;
pub use properties::PropertyStore;

/// The shared blob: everything every context sees, persisted under one key
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SharedState {
    #[serde(default)]
    pub properties: PropertyStore,
    #[serde(default)]
    pub favorites: FavoritesIndex,
    #[serde(default)]
    pub notifications: NotificationLog,
}

impl SharedState {
    /// First-run dataset
    pub fn seeded() -> Self {
        Self {
            properties: PropertyStore::from(seed_properties()),
            ..Self::default()
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Last id handed out anywhere in this process
static LAST_ID: AtomicI64 = AtomicI64::new(0);

/// Time-derived ids, bumped so they never repeat within a process
#[derive(Debug, Default)]
pub struct IdGenerator;

impl IdGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis();
        let mut prev = LAST_ID.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match LAST_ID.compare_exchange(prev, candidate, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => return candidate.to_string(),
                Err(actual) => prev = actual,
            }
        }
    }

    /// Never hand out an id at or below one already present in `state`,
    /// e.g. one minted by another process
    pub fn observe(&self, state: &SharedState) {
        if let Some(max) = state.max_numeric_id() {
            LAST_ID.fetch_max(max, Ordering::Relaxed);
        }
    }
}

impl SharedState {
    fn max_numeric_id(&self) -> Option<i64> {
        let properties = self.properties.list().iter().map(|p| p.id.as_str());
        let notifications = self
            .notifications
            .all()
            .map(|n| n.id.as_str());
        properties
            .chain(notifications)
            .filter_map(|id| id.parse::<i64>().ok())
            .max()
    }
}
