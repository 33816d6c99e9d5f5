//! PostgreSQL-backed `CheckInRepository` implementation.
//!
//! Deactivation and insertion are deliberately separate statements; the
//! service layer owns the reconciliation between them.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CheckInRepository, RepositoryError};
use crate::domain::{ActiveVisitor, ActivityFeedItem, CheckIn};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{CheckInRow, NewCheckInRow};
use super::pool::DbPool;
use super::schema::{check_ins, hotspots, profiles};

/// Diesel-backed implementation of the check-in repository port.
#[derive(Clone)]
pub struct DieselCheckInRepository {
    pool: DbPool,
}

impl DieselCheckInRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckInRepository for DieselCheckInRepository {
    async fn deactivate_active(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changed = diesel::update(
            check_ins::table
                .filter(check_ins::user_id.eq(user_id))
                .filter(check_ins::is_active.eq(true)),
        )
        .set(check_ins::is_active.eq(false))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(changed as u64)
    }

    async fn insert(&self, check_in: &CheckIn) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewCheckInRow {
            id: check_in.id,
            user_id: check_in.user_id,
            hotspot_id: check_in.hotspot_id,
            checked_in_at: check_in.checked_in_at,
            is_active: check_in.is_active,
            is_public: check_in.is_public,
            note: check_in.note.as_ref().map(|note| note.as_str()),
        };

        diesel::insert_into(check_ins::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_active(&self, user_id: Uuid) -> Result<Option<CheckIn>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = check_ins::table
            .filter(check_ins::user_id.eq(user_id))
            .filter(check_ins::is_active.eq(true))
            .order(check_ins::checked_in_at.desc())
            .select(CheckInRow::as_select())
            .first::<CheckInRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(CheckIn::try_from).transpose()
    }

    async fn activity_feed(&self, limit: i64) -> Result<Vec<ActivityFeedItem>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        type FeedTuple = (
            Uuid,
            Uuid,
            Option<String>,
            Option<String>,
            Uuid,
            String,
            String,
            chrono::DateTime<chrono::Utc>,
            Option<String>,
        );

        let rows: Vec<FeedTuple> = check_ins::table
            .inner_join(profiles::table)
            .inner_join(hotspots::table)
            .filter(check_ins::is_public.eq(true))
            .order(check_ins::checked_in_at.desc())
            .limit(limit)
            .select((
                check_ins::id,
                check_ins::user_id,
                profiles::username,
                profiles::avatar_url,
                check_ins::hotspot_id,
                hotspots::name,
                hotspots::category,
                check_ins::checked_in_at,
                check_ins::note,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(
                |(
                    id,
                    user_id,
                    username,
                    avatar_url,
                    hotspot_id,
                    hotspot_name,
                    hotspot_category,
                    checked_in_at,
                    note,
                )| ActivityFeedItem {
                    id,
                    user_id,
                    username,
                    avatar_url,
                    hotspot_id,
                    hotspot_name,
                    hotspot_category,
                    checked_in_at,
                    note,
                },
            )
            .collect())
    }

    async fn active_visitors(
        &self,
        hotspot_id: Uuid,
    ) -> Result<Vec<ActiveVisitor>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(
            Uuid,
            Uuid,
            Option<String>,
            Option<String>,
            chrono::DateTime<chrono::Utc>,
        )> = check_ins::table
            .inner_join(profiles::table)
            .filter(check_ins::hotspot_id.eq(hotspot_id))
            .filter(check_ins::is_active.eq(true))
            .order(check_ins::checked_in_at.asc())
            .select((
                check_ins::id,
                check_ins::user_id,
                profiles::username,
                profiles::avatar_url,
                check_ins::checked_in_at,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(
                |(check_in_id, user_id, username, avatar_url, checked_in_at)| ActiveVisitor {
                    check_in_id,
                    user_id,
                    username,
                    avatar_url,
                    checked_in_at,
                },
            )
            .collect())
    }

    async fn count_since(
        &self,
        user_id: Uuid,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = check_ins::table
            .filter(check_ins::user_id.eq(user_id))
            .filter(check_ins::checked_in_at.ge(since))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn active_counts(&self) -> Result<HashMap<Uuid, u32>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let counts: Vec<(Uuid, i64)> = check_ins::table
            .filter(check_ins::is_active.eq(true))
            .group_by(check_ins::hotspot_id)
            .select((check_ins::hotspot_id, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(counts
            .into_iter()
            .map(|(id, count)| (id, count.try_into().unwrap_or(u32::MAX)))
            .collect())
    }
}
