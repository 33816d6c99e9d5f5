//! PostgreSQL-backed `RatingRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{RatingRepository, RepositoryError};
use crate::domain::{NewRating, Rating, RatingSummary, ReviewEntry, Score};

use super::error_map::{map_diesel_error, map_pool_error};
use super::models::{NewRatingRow, RatingRow};
use super::pool::DbPool;
use super::schema::{profiles, ratings};

/// Diesel-backed implementation of the rating repository port.
#[derive(Clone)]
pub struct DieselRatingRepository {
    pool: DbPool,
}

impl DieselRatingRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RatingRepository for DieselRatingRepository {
    async fn upsert(&self, rating: &NewRating) -> Result<Rating, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewRatingRow {
            id: Uuid::new_v4(),
            user_id: rating.user_id,
            hotspot_id: rating.hotspot_id,
            score: rating.score.value(),
            review: rating.review.as_deref(),
            created_at: chrono::Utc::now(),
        };

        let stored = diesel::insert_into(ratings::table)
            .values(&row)
            .on_conflict((ratings::user_id, ratings::hotspot_id))
            .do_update()
            .set((
                ratings::score.eq(row.score),
                ratings::review.eq(row.review),
            ))
            .returning(RatingRow::as_returning())
            .get_result::<RatingRow>(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Rating::try_from(stored)
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        hotspot_id: Uuid,
    ) -> Result<Option<Rating>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = ratings::table
            .filter(ratings::user_id.eq(user_id))
            .filter(ratings::hotspot_id.eq(hotspot_id))
            .select(RatingRow::as_select())
            .first::<RatingRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(Rating::try_from).transpose()
    }

    async fn reviews(&self, hotspot_id: Uuid) -> Result<Vec<ReviewEntry>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(
            Uuid,
            Option<String>,
            Option<String>,
            i16,
            Option<String>,
            chrono::DateTime<chrono::Utc>,
        )> = ratings::table
            .inner_join(profiles::table)
            .filter(ratings::hotspot_id.eq(hotspot_id))
            .order(ratings::created_at.desc())
            .select((
                ratings::user_id,
                profiles::username,
                profiles::avatar_url,
                ratings::score,
                ratings::review,
                ratings::created_at,
            ))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(user_id, username, avatar_url, score, review, created_at)| {
                let score = Score::new(score)
                    .map_err(|error| RepositoryError::query(format!("decode score: {error}")))?;
                Ok(ReviewEntry {
                    user_id,
                    username,
                    avatar_url,
                    score,
                    review,
                    created_at,
                })
            })
            .collect()
    }

    async fn summary(&self, hotspot_id: Uuid) -> Result<RatingSummary, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (total, count): (Option<i64>, i64) = ratings::table
            .filter(ratings::hotspot_id.eq(hotspot_id))
            .select((diesel::dsl::sum(ratings::score), diesel::dsl::count_star()))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let average = match (total, count) {
            (Some(total), count) if count > 0 => Some(total as f64 / count as f64),
            _ => None,
        };
        Ok(RatingSummary { average, count })
    }
}
