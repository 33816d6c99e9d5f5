//! PostgreSQL-backed `ProfileRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ProfileRepository, RepositoryError};
use crate::domain::{Profile, ProfileUpdate};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{NewProfileRow, ProfileChangeset, ProfileRow};
use super::pool::DbPool;
use super::schema::profiles;

/// Diesel-backed implementation of the profile repository port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = profiles::table
            .filter(profiles::id.eq(id))
            .select(ProfileRow::as_select())
            .first::<ProfileRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Profile::from))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Profile>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = profiles::table
            .filter(profiles::username.eq(username))
            .select(ProfileRow::as_select())
            .first::<ProfileRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Profile::from))
    }

    async fn insert(&self, profile: &Profile) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewProfileRow {
            id: profile.id,
            username: profile.username.as_deref(),
            avatar_url: profile.avatar_url.as_deref(),
            bio: profile.bio.as_deref(),
            city: profile.city.as_deref(),
            instagram_username: profile.instagram_username.as_deref(),
            twitter_username: profile.twitter_username.as_deref(),
            created_at: profile.created_at,
        };

        diesel::insert_into(profiles::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = ProfileChangeset {
            username: update.username.as_deref(),
            avatar_url: update.avatar_url.as_deref(),
            bio: update.bio.as_deref(),
            city: update.city.as_deref(),
            instagram_username: update.instagram_username.as_deref(),
            twitter_username: update.twitter_username.as_deref(),
        };

        if changeset_is_empty(&changeset) {
            return self.find_by_id(id).await;
        }

        let row = diesel::update(profiles::table.filter(profiles::id.eq(id)))
            .set(&changeset)
            .returning(ProfileRow::as_returning())
            .get_result::<ProfileRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Profile::from))
    }
}

/// Diesel rejects an update with no changed columns; detect that case.
fn changeset_is_empty(changeset: &ProfileChangeset<'_>) -> bool {
    changeset.username.is_none()
        && changeset.avatar_url.is_none()
        && changeset.bio.is_none()
        && changeset.city.is_none()
        && changeset.instagram_username.is_none()
        && changeset.twitter_username.is_none()
}
