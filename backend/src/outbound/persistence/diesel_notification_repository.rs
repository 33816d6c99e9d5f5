//! PostgreSQL-backed `NotificationRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::Notification;
use crate::domain::ports::{NotificationRepository, RepositoryError};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::DbPool;
use super::schema::notifications;

/// Diesel-backed implementation of the notification repository port.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewNotificationRow {
            id: notification.id,
            user_id: notification.user_id,
            actor_id: notification.actor_id,
            kind: notification.kind.to_string(),
            message: &notification.message,
            is_read: notification.is_read,
            created_at: notification.created_at,
        };

        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<NotificationRow> = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .order(notifications::created_at.desc())
            .limit(limit)
            .select(NotificationRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn mark_read(
        &self,
        user_id: Uuid,
        ids: Option<Vec<Uuid>>,
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let base = notifications::table
            .filter(notifications::user_id.eq(user_id))
            .filter(notifications::is_read.eq(false));

        let changed = match ids {
            Some(ids) => {
                diesel::update(base.filter(notifications::id.eq_any(ids)))
                    .set(notifications::is_read.eq(true))
                    .execute(&mut conn)
                    .await
            }
            None => {
                diesel::update(base)
                    .set(notifications::is_read.eq(true))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(map_diesel_error)?;

        Ok(changed as u64)
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        notifications::table
            .filter(notifications::user_id.eq(user_id))
            .filter(notifications::is_read.eq(false))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
