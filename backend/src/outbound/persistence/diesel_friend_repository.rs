//! PostgreSQL-backed `FriendRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{FriendRepository, RepositoryError};
use crate::domain::{FriendEntry, FriendRequest, Friendship};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{
    FriendRequestChangeset, FriendRequestRow, FriendshipRow, NewFriendRequestRow, ProfileRow,
};
use super::pool::DbPool;
use super::schema::{friend_requests, friendships, profiles};

/// Diesel-backed implementation of the friend repository port.
#[derive(Clone)]
pub struct DieselFriendRepository {
    pool: DbPool,
}

impl DieselFriendRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FriendRepository for DieselFriendRepository {
    async fn find_request(&self, id: Uuid) -> Result<Option<FriendRequest>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = friend_requests::table
            .filter(friend_requests::id.eq(id))
            .select(FriendRequestRow::as_select())
            .first::<FriendRequestRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(FriendRequest::try_from).transpose()
    }

    async fn find_request_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<FriendRequest>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = friend_requests::table
            .filter(
                friend_requests::sender_id
                    .eq(user_a)
                    .and(friend_requests::receiver_id.eq(user_b))
                    .or(friend_requests::sender_id
                        .eq(user_b)
                        .and(friend_requests::receiver_id.eq(user_a))),
            )
            .select(FriendRequestRow::as_select())
            .first::<FriendRequestRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(FriendRequest::try_from).transpose()
    }

    async fn insert_request(&self, request: &FriendRequest) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewFriendRequestRow {
            id: request.id,
            sender_id: request.sender_id,
            receiver_id: request.receiver_id,
            status: request.status.to_string(),
            created_at: request.created_at,
        };

        diesel::insert_into(friend_requests::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update_request(&self, request: &FriendRequest) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changeset = FriendRequestChangeset {
            sender_id: request.sender_id,
            receiver_id: request.receiver_id,
            status: request.status.to_string(),
            created_at: request.created_at,
        };

        let changed = diesel::update(
            friend_requests::table.filter(friend_requests::id.eq(request.id)),
        )
        .set(&changeset)
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;

        Ok(changed > 0)
    }

    async fn delete_request(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(friend_requests::table.filter(friend_requests::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn insert_friendship(&self, friendship: &Friendship) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = FriendshipRow {
            id: friendship.id,
            user_id_1: friendship.user_id_1,
            user_id_2: friendship.user_id_2,
            created_at: friendship.created_at,
        };

        diesel::insert_into(friendships::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_friendship(&self, id: Uuid) -> Result<Option<Friendship>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = friendships::table
            .filter(friendships::id.eq(id))
            .select(FriendshipRow::as_select())
            .first::<FriendshipRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Friendship::from))
    }

    async fn find_friendship_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<Friendship>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = friendships::table
            .filter(
                friendships::user_id_1
                    .eq(user_a)
                    .and(friendships::user_id_2.eq(user_b))
                    .or(friendships::user_id_1
                        .eq(user_b)
                        .and(friendships::user_id_2.eq(user_a))),
            )
            .select(FriendshipRow::as_select())
            .first::<FriendshipRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Friendship::from))
    }

    async fn delete_friendship(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(friendships::table.filter(friendships::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }

    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<FriendshipRow> = friendships::table
            .filter(
                friendships::user_id_1
                    .eq(user_id)
                    .or(friendships::user_id_2.eq(user_id)),
            )
            .order(friendships::created_at.desc())
            .select(FriendshipRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let counterparts: Vec<Uuid> = rows
            .iter()
            .map(|row| {
                if row.user_id_1 == user_id {
                    row.user_id_2
                } else {
                    row.user_id_1
                }
            })
            .collect();

        let friend_profiles: Vec<ProfileRow> = profiles::table
            .filter(profiles::id.eq_any(&counterparts))
            .select(ProfileRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let by_id: std::collections::HashMap<Uuid, ProfileRow> = friend_profiles
            .into_iter()
            .map(|profile| (profile.id, profile))
            .collect();

        Ok(rows
            .into_iter()
            .zip(counterparts)
            .filter_map(|(row, friend_id)| {
                by_id.get(&friend_id).map(|profile| FriendEntry {
                    friendship_id: row.id,
                    friend_id,
                    username: profile.username.clone(),
                    avatar_url: profile.avatar_url.clone(),
                    bio: profile.bio.clone(),
                    city: profile.city.clone(),
                    created_at: row.created_at,
                })
            })
            .collect())
    }
}
