// src/store/notifications.rs
use std::sync::RwLock;

use uuid::Uuid;

use crate::domain::{Errors, Notification, UserId};

/// Durable notification rows. Concurrent inserts are safe; the only mutation
/// is the owning user flipping `is_read`.
pub struct NotificationStore {
    rows: RwLock<Vec<Notification>>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        NotificationStore {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn push(&self, notification: Notification) {
        self.rows.write().unwrap().push(notification);
    }

    /// A user's notifications, newest first.
    pub fn for_user(&self, user_id: &UserId) -> Vec<Notification> {
        let rows = self.rows.read().unwrap();
        let mut result: Vec<Notification> = rows
            .iter()
            .filter(|n| &n.recipient == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Flip `is_read`. Rows belonging to another user are reported as
    /// unknown rather than revealing they exist.
    pub fn mark_read(&self, notification_id: Uuid, user_id: &UserId) -> Result<Notification, Errors> {
        let mut rows = self.rows.write().unwrap();
        match rows
            .iter_mut()
            .find(|n| n.notification_id == notification_id && &n.recipient == user_id)
        {
            Some(row) => {
                row.is_read = true;
                Ok(row.clone())
            }
            None => Err(Errors::UnknownNotification(notification_id)),
        }
    }

    pub fn all(&self) -> Vec<Notification> {
        self.rows.read().unwrap().clone()
    }

    pub fn restore(&self, rows: Vec<Notification>) {
        *self.rows.write().unwrap() = rows;
    }
}
