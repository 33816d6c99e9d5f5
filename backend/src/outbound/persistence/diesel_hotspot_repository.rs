//! PostgreSQL-backed `HotspotRepository` implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{HotspotRepository, RepositoryError};
use crate::domain::{Hotspot, HotspotDraft, TrendingHotspot};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{HotspotChangeset, HotspotRow, NewHotspotRow};
use super::pool::DbPool;
use super::schema::{check_ins, hotspots};

/// Diesel-backed implementation of the hotspot repository port.
#[derive(Clone)]
pub struct DieselHotspotRepository {
    pool: DbPool,
}

impl DieselHotspotRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HotspotRepository for DieselHotspotRepository {
    async fn list(&self) -> Result<Vec<Hotspot>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<HotspotRow> = hotspots::table
            .order(hotspots::name.asc())
            .select(HotspotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(Hotspot::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hotspot>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = hotspots::table
            .filter(hotspots::id.eq(id))
            .select(HotspotRow::as_select())
            .first::<HotspotRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Hotspot::try_from).transpose()
    }

    async fn insert(&self, hotspot: &Hotspot) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewHotspotRow {
            id: hotspot.id,
            name: &hotspot.name,
            category: hotspot.category.to_string(),
            address: &hotspot.address,
            latitude: hotspot.position.latitude(),
            longitude: hotspot.position.longitude(),
            description: hotspot.description.as_deref(),
            image_url: hotspot.image_url.as_deref(),
            created_at: hotspot.created_at,
        };

        diesel::insert_into(hotspots::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        id: Uuid,
        draft: &HotspotDraft,
    ) -> Result<Option<Hotspot>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = HotspotChangeset {
            name: &draft.name,
            category: draft.category.to_string(),
            address: &draft.address,
            latitude: draft.position.latitude(),
            longitude: draft.position.longitude(),
            description: draft.description.as_deref(),
            image_url: draft.image_url.as_deref(),
        };

        let row = diesel::update(hotspots::table.filter(hotspots::id.eq(id)))
            .set(&changeset)
            .returning(HotspotRow::as_returning())
            .get_result::<HotspotRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Hotspot::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(hotspots::table.filter(hotspots::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn trending(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TrendingHotspot>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let counts: Vec<(Uuid, i64)> = check_ins::table
            .filter(check_ins::checked_in_at.ge(since))
            .group_by(check_ins::hotspot_id)
            .select((check_ins::hotspot_id, diesel::dsl::count_star()))
            .order(diesel::dsl::count_star().desc())
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ids: Vec<Uuid> = counts.iter().map(|(id, _)| *id).collect();
        let rows: Vec<HotspotRow> = hotspots::table
            .filter(hotspots::id.eq_any(&ids))
            .select(HotspotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in rows {
            let hotspot = Hotspot::try_from(row)?;
            by_id.insert(hotspot.id, hotspot);
        }

        // Preserve the count ordering; skip counts whose venue was deleted
        // between the two queries.
        Ok(counts
            .into_iter()
            .filter_map(|(id, recent_check_ins)| {
                by_id.remove(&id).map(|hotspot| TrendingHotspot {
                    hotspot,
                    recent_check_ins,
                })
            })
            .collect())
    }
}
