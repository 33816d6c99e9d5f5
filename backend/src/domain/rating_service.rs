//! Rating and review domain service.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use super::Error;
use super::ports::{HotspotRepository, RatingRepository};
use super::rate_limit::{RateLimitAction, RateLimitDecision, RateLimiter};
use super::rating::{NewRating, Rating, RatingSummary, ReviewEntry, Score, round_average};

/// Service driving rating upserts and review queries.
pub struct RatingService {
    ratings: Arc<dyn RatingRepository>,
    hotspots: Arc<dyn HotspotRepository>,
    rate_limiter: Arc<RateLimiter>,
}

impl RatingService {
    /// Wire the service to its repositories and limiter.
    pub fn new(
        ratings: Arc<dyn RatingRepository>,
        hotspots: Arc<dyn HotspotRepository>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            ratings,
            hotspots,
            rate_limiter,
        }
    }

    /// Create or replace the user's rating for a hotspot.
    pub async fn rate(
        &self,
        user_id: Uuid,
        hotspot_id: Uuid,
        score: Score,
        review: Option<&str>,
    ) -> Result<Rating, Error> {
        self.hotspots
            .find_by_id(hotspot_id)
            .await?
            .ok_or_else(|| Error::not_found("hotspot not found"))?;

        if let RateLimitDecision::Denied { wait } =
            self.rate_limiter.check(RateLimitAction::Rating, user_id)
        {
            let seconds = wait.as_secs();
            return Err(Error::too_many_requests(format!(
                "Rating too often; try again in {seconds}s"
            ))
            .with_details(json!({ "waitSeconds": seconds })));
        }

        let rating = NewRating::new(user_id, hotspot_id, score, review);
        Ok(self.ratings.upsert(&rating).await?)
    }

    /// The user's own rating for a hotspot.
    pub async fn own_rating(
        &self,
        user_id: Uuid,
        hotspot_id: Uuid,
    ) -> Result<Option<Rating>, Error> {
        Ok(self.ratings.find_by_user(user_id, hotspot_id).await?)
    }

    /// Reviews for a hotspot, newest first.
    pub async fn reviews(&self, hotspot_id: Uuid) -> Result<Vec<ReviewEntry>, Error> {
        Ok(self.ratings.reviews(hotspot_id).await?)
    }

    /// Rating count plus the display average rounded to one decimal.
    pub async fn summary(&self, hotspot_id: Uuid) -> Result<RatingSummary, Error> {
        let summary = self.ratings.summary(hotspot_id).await?;
        Ok(RatingSummary {
            average: summary.average.map(round_average),
            count: summary.count,
        })
    }
}
