//! Notification read-model service.
//!
//! Rows are written by the check-in and friend services; this service
//! covers the recipient-facing operations.

use std::sync::Arc;

use uuid::Uuid;

use super::Error;
use super::notification::Notification;
use super::ports::NotificationRepository;

/// Maximum notifications a single listing may return.
const LIST_LIMIT_MAX: i64 = 100;

/// Service driving notification listings and read receipts.
pub struct NotificationService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    /// Wire the service to its repository.
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// The user's notifications, newest first.
    pub async fn list(&self, user_id: Uuid, limit: i64) -> Result<Vec<Notification>, Error> {
        let limit = limit.clamp(1, LIST_LIMIT_MAX);
        Ok(self.notifications.list_for_user(user_id, limit).await?)
    }

    /// Mark the listed notifications read, or every one when `ids` is
    /// `None`. Rows belonging to other users are untouched. Returns how
    /// many rows changed.
    pub async fn mark_read(&self, user_id: Uuid, ids: Option<Vec<Uuid>>) -> Result<u64, Error> {
        Ok(self.notifications.mark_read(user_id, ids).await?)
    }

    /// Count of unread notifications.
    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, Error> {
        Ok(self.notifications.unread_count(user_id).await?)
    }
}
