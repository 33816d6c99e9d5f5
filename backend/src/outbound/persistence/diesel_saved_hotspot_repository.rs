//! PostgreSQL-backed `SavedHotspotRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::Hotspot;
use crate::domain::ports::{RepositoryError, SavedHotspotRepository};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{HotspotRow, NewSavedHotspotRow};
use super::pool::DbPool;
use super::schema::{hotspots, saved_hotspots};

/// Diesel-backed implementation of the saved-hotspot repository port.
#[derive(Clone)]
pub struct DieselSavedHotspotRepository {
    pool: DbPool,
}

impl DieselSavedHotspotRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SavedHotspotRepository for DieselSavedHotspotRepository {
    async fn save(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewSavedHotspotRow {
            user_id,
            hotspot_id,
            created_at: chrono::Utc::now(),
        };

        let inserted = diesel::insert_into(saved_hotspots::table)
            .values(&row)
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(inserted > 0)
    }

    async fn unsave(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(
            saved_hotspots::table
                .filter(saved_hotspots::user_id.eq(user_id))
                .filter(saved_hotspots::hotspot_id.eq(hotspot_id)),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Hotspot>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<HotspotRow> = saved_hotspots::table
            .inner_join(hotspots::table)
            .filter(saved_hotspots::user_id.eq(user_id))
            .order(saved_hotspots::created_at.desc())
            .select(HotspotRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(Hotspot::try_from).collect()
    }

    async fn is_saved(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<Uuid> = saved_hotspots::table
            .filter(saved_hotspots::user_id.eq(user_id))
            .filter(saved_hotspots::hotspot_id.eq(hotspot_id))
            .select(saved_hotspots::hotspot_id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.is_some())
    }
}
