//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the database and the itinerary generator). Each trait exposes strongly
//! typed errors so adapters map their failures into predictable variants.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::Error;
use super::check_in::{ActiveVisitor, ActivityFeedItem, CheckIn};
use super::friends::{FriendEntry, FriendRequest, Friendship};
use super::hotspot::{Hotspot, HotspotDraft, TrendingHotspot};
use super::notification::Notification;
use super::profile::{Profile, ProfileUpdate};
use super::rating::{NewRating, Rating, RatingSummary, ReviewEntry};

/// Persistence errors raised by repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// Repository connection could not be established.
    #[error("repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("repository query failed: {message}")]
    Query { message: String },
}

impl RepositoryError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Connection { message } => {
                Self::service_unavailable(format!("repository unavailable: {message}"))
            }
            RepositoryError::Query { message } => {
                Self::internal(format!("repository error: {message}"))
            }
        }
    }
}

/// Errors raised by the itinerary generation adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItineraryGenerationError {
    /// No API keys are configured.
    #[error("itinerary generation is not configured")]
    NotConfigured,
    /// Every configured key was tried and rejected for quota reasons.
    #[error("itinerary generation quota exhausted: {message}")]
    Exhausted { message: String },
    /// The upstream model failed for a non-quota reason.
    #[error("itinerary generation failed: {message}")]
    Upstream { message: String },
}

impl ItineraryGenerationError {
    /// Helper for quota exhaustion across all keys.
    pub fn exhausted(message: impl Into<String>) -> Self {
        Self::Exhausted {
            message: message.into(),
        }
    }

    /// Helper for upstream model failures.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }
}

impl From<ItineraryGenerationError> for Error {
    fn from(error: ItineraryGenerationError) -> Self {
        match error {
            ItineraryGenerationError::NotConfigured => {
                Self::service_unavailable("AI planner is not configured")
            }
            ItineraryGenerationError::Exhausted { .. } => {
                Self::service_unavailable("Service busy. Try again in a few minutes.")
            }
            ItineraryGenerationError::Upstream { message } => {
                Self::internal(format!("itinerary generation failed: {message}"))
            }
        }
    }
}

/// Persistence port for hotspots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HotspotRepository: Send + Sync {
    /// List every hotspot.
    async fn list(&self) -> Result<Vec<Hotspot>, RepositoryError>;

    /// Fetch a hotspot by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hotspot>, RepositoryError>;

    /// Insert a hotspot row.
    async fn insert(&self, hotspot: &Hotspot) -> Result<(), RepositoryError>;

    /// Replace a hotspot's editable fields. Returns the updated row, or
    /// `None` when the id is unknown.
    async fn update(
        &self,
        id: Uuid,
        draft: &HotspotDraft,
    ) -> Result<Option<Hotspot>, RepositoryError>;

    /// Delete a hotspot. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Hotspots ranked by check-ins recorded since `since`, busiest first.
    async fn trending(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TrendingHotspot>, RepositoryError>;
}

/// Persistence port for check-ins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckInRepository: Send + Sync {
    /// Mark all of the user's active check-ins inactive. Returns how many
    /// rows changed.
    async fn deactivate_active(&self, user_id: Uuid) -> Result<u64, RepositoryError>;

    /// Insert a check-in row.
    async fn insert(&self, check_in: &CheckIn) -> Result<(), RepositoryError>;

    /// The user's current active check-in, if any.
    async fn find_active(&self, user_id: Uuid) -> Result<Option<CheckIn>, RepositoryError>;

    /// Check-ins the user recorded at or after `since`, active or not.
    async fn count_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, RepositoryError>;

    /// Recent public check-ins joined with profile and hotspot fields,
    /// newest first.
    async fn activity_feed(&self, limit: i64) -> Result<Vec<ActivityFeedItem>, RepositoryError>;

    /// Users currently checked into a hotspot.
    async fn active_visitors(
        &self,
        hotspot_id: Uuid,
    ) -> Result<Vec<ActiveVisitor>, RepositoryError>;

    /// Active check-in counts per hotspot. Hotspots with none are absent.
    async fn active_counts(&self) -> Result<HashMap<Uuid, u32>, RepositoryError>;
}

/// Persistence port for ratings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Insert or update the user's rating for a hotspot. Returns the
    /// stored row.
    async fn upsert(&self, rating: &NewRating) -> Result<Rating, RepositoryError>;

    /// The user's own rating for a hotspot, if any.
    async fn find_by_user(
        &self,
        user_id: Uuid,
        hotspot_id: Uuid,
    ) -> Result<Option<Rating>, RepositoryError>;

    /// Reviews for a hotspot joined with profile fields, newest first.
    async fn reviews(&self, hotspot_id: Uuid) -> Result<Vec<ReviewEntry>, RepositoryError>;

    /// Rating count and raw average for a hotspot.
    async fn summary(&self, hotspot_id: Uuid) -> Result<RatingSummary, RepositoryError>;
}

/// Persistence port for friend requests and friendships.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FriendRepository: Send + Sync {
    /// Fetch a request by id.
    async fn find_request(&self, id: Uuid) -> Result<Option<FriendRequest>, RepositoryError>;

    /// The request between two users in either orientation, if any.
    async fn find_request_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<FriendRequest>, RepositoryError>;

    /// Insert a request row.
    async fn insert_request(&self, request: &FriendRequest) -> Result<(), RepositoryError>;

    /// Overwrite a request row (status changes and re-send reorientation).
    /// Returns whether the row existed.
    async fn update_request(&self, request: &FriendRequest) -> Result<bool, RepositoryError>;

    /// Delete a request row. Returns whether a row was removed.
    async fn delete_request(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// Insert a friendship row.
    async fn insert_friendship(&self, friendship: &Friendship) -> Result<(), RepositoryError>;

    /// Fetch a friendship by id.
    async fn find_friendship(&self, id: Uuid) -> Result<Option<Friendship>, RepositoryError>;

    /// The friendship between two users, if any.
    async fn find_friendship_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<Friendship>, RepositoryError>;

    /// Delete a friendship row. Returns whether a row was removed.
    async fn delete_friendship(&self, id: Uuid) -> Result<bool, RepositoryError>;

    /// The user's friends joined with profile fields.
    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, RepositoryError>;
}

/// Persistence port for profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch a profile by user id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError>;

    /// Fetch a profile by exact username.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<Profile>, RepositoryError>;

    /// Insert a profile row.
    async fn insert(&self, profile: &Profile) -> Result<(), RepositoryError>;

    /// Apply an update to a profile. Returns the updated row, or `None`
    /// when the id is unknown.
    async fn update(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, RepositoryError>;
}

/// Persistence port for saved-hotspot join rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SavedHotspotRepository: Send + Sync {
    /// Save a hotspot for a user. Returns `false` when already saved.
    async fn save(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, RepositoryError>;

    /// Remove a saved hotspot. Returns whether a row was removed.
    async fn unsave(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, RepositoryError>;

    /// The user's saved hotspots.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Hotspot>, RepositoryError>;

    /// Whether the user has saved the hotspot.
    async fn is_saved(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, RepositoryError>;
}

/// Persistence port for notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Insert a notification row.
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError>;

    /// The user's notifications, newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError>;

    /// Mark notifications read. `ids` of `None` marks everything for the
    /// user; otherwise only the listed rows that belong to them. Returns
    /// how many rows changed.
    async fn mark_read(
        &self,
        user_id: Uuid,
        ids: Option<Vec<Uuid>>,
    ) -> Result<u64, RepositoryError>;

    /// Count of unread notifications for the user.
    async fn unread_count(&self, user_id: Uuid) -> Result<i64, RepositoryError>;
}

/// Outbound port for the AI day-planner model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    /// Generate a plan from a fully rendered prompt.
    async fn generate(&self, prompt: &str) -> Result<String, ItineraryGenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn repository_error_helpers_carry_messages() {
        assert_eq!(
            RepositoryError::connection("pool down"),
            RepositoryError::Connection {
                message: "pool down".to_owned()
            }
        );
        assert_eq!(
            RepositoryError::query("bad row").to_string(),
            "repository query failed: bad row"
        );
    }

    #[rstest]
    fn generation_error_helpers_carry_messages() {
        assert_eq!(
            ItineraryGenerationError::exhausted("429").to_string(),
            "itinerary generation quota exhausted: 429"
        );
        assert_eq!(
            ItineraryGenerationError::upstream("boom"),
            ItineraryGenerationError::Upstream {
                message: "boom".to_owned()
            }
        );
    }
}
