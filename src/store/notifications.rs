use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use super::IdGenerator;
use crate::models::Notification;

/// Notifications per owner email, most recent first
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct NotificationLog {
    by_owner: BTreeMap<String, Vec<Notification>>,
}

impl NotificationLog {
    pub fn enqueue(
        &mut self,
        owner_email: &str,
        message: impl Into<String>,
        date: DateTime<Utc>,
        ids: &IdGenerator,
    ) -> Notification {
        let notification = Notification {
            id: ids.next_id(),
            owner_email: owner_email.to_string(),
            message: message.into(),
            date,
            read: false,
        };

        debug!("Notifying {}: {}", owner_email, notification.message);
        self.by_owner
            .entry(owner_email.to_string())
            .or_default()
            .insert(0, notification.clone());

        notification
    }

    pub fn list_for(&self, owner_email: &str) -> &[Notification] {
        self.by_owner
            .get(owner_email)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every notification, grouped by owner
    pub fn all(&self) -> impl Iterator<Item = &Notification> {
        self.by_owner.values().flatten()
    }

    /// Flag one notification as read. Returns `false` if the owner has no such notification.
    pub fn mark_read(&mut self, owner_email: &str, notification_id: &str) -> bool {
        let found = self
            .by_owner
            .get_mut(owner_email)
            .and_then(|list| list.iter_mut().find(|n| n.id == notification_id));

        match found {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    pub fn unread_count(&self, owner_email: &str) -> usize {
        self.list_for(owner_email).iter().filter(|n| !n.read).count()
    }
}
