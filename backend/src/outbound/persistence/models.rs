//! Internal Diesel row structs and their domain conversions.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain. Conversions validate through the domain
//! constructors, so a corrupt row surfaces as a query error rather than an
//! invalid domain value.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::RepositoryError;
use crate::domain::{
    CheckIn, CheckInNote, Coordinates, FriendRequest, Friendship, Hotspot, Notification, Profile,
    Rating, Score,
};

use super::schema::{
    check_ins, friend_requests, friendships, hotspots, notifications, profiles, ratings,
    saved_hotspots,
};

fn corrupt(field: &str, error: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::query(format!("decode {field}: {error}"))
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub instagram_username: Option<String>,
    pub twitter_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            avatar_url: row.avatar_url,
            bio: row.bio,
            city: row.city,
            instagram_username: row.instagram_username,
            twitter_username: row.twitter_username,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub id: Uuid,
    pub username: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub city: Option<&'a str>,
    pub instagram_username: Option<&'a str>,
    pub twitter_username: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Changeset for profile updates. `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
pub(crate) struct ProfileChangeset<'a> {
    pub username: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub city: Option<&'a str>,
    pub instagram_username: Option<&'a str>,
    pub twitter_username: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Hotspots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = hotspots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HotspotRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<HotspotRow> for Hotspot {
    type Error = RepositoryError;

    fn try_from(row: HotspotRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse()
            .map_err(|error| corrupt("category", error))?;
        let position = Coordinates::new(row.latitude, row.longitude)
            .map_err(|error| corrupt("position", error))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            category,
            address: row.address,
            position,
            description: row.description,
            image_url: row.image_url,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = hotspots)]
pub(crate) struct NewHotspotRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub category: String,
    pub address: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = hotspots)]
pub(crate) struct HotspotChangeset<'a> {
    pub name: &'a str,
    pub category: String,
    pub address: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Check-ins
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = check_ins)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CheckInRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotspot_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_public: bool,
    pub note: Option<String>,
}

impl TryFrom<CheckInRow> for CheckIn {
    type Error = RepositoryError;

    fn try_from(row: CheckInRow) -> Result<Self, Self::Error> {
        let note = match row.note.as_deref() {
            Some(raw) => CheckInNote::new(raw).map_err(|error| corrupt("note", error))?,
            None => None,
        };
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            hotspot_id: row.hotspot_id,
            checked_in_at: row.checked_in_at,
            is_active: row.is_active,
            is_public: row.is_public,
            note,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = check_ins)]
pub(crate) struct NewCheckInRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotspot_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub is_active: bool,
    pub is_public: bool,
    pub note: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Ratings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RatingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotspot_id: Uuid,
    pub score: i16,
    pub review: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = RepositoryError;

    fn try_from(row: RatingRow) -> Result<Self, Self::Error> {
        let score = Score::new(row.score).map_err(|error| corrupt("score", error))?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            hotspot_id: row.hotspot_id,
            score,
            review: row.review,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ratings)]
pub(crate) struct NewRatingRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hotspot_id: Uuid,
    pub score: i16,
    pub review: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Friend requests and friendships
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = friend_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FriendRequestRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<FriendRequestRow> for FriendRequest {
    type Error = RepositoryError;

    fn try_from(row: FriendRequestRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|error| corrupt("status", error))?;
        Ok(Self {
            id: row.id,
            sender_id: row.sender_id,
            receiver_id: row.receiver_id,
            status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = friend_requests)]
pub(crate) struct NewFriendRequestRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = friend_requests)]
pub(crate) struct FriendRequestChangeset {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = friendships)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FriendshipRow {
    pub id: Uuid,
    pub user_id_1: Uuid,
    pub user_id_2: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<FriendshipRow> for Friendship {
    fn from(row: FriendshipRow) -> Self {
        Self {
            id: row.id,
            user_id_1: row.user_id_1,
            user_id_2: row.user_id_2,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Saved hotspots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = saved_hotspots)]
pub(crate) struct NewSavedHotspotRow {
    pub user_id: Uuid,
    pub hotspot_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub actor_id: Uuid,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RepositoryError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse().map_err(|error| corrupt("kind", error))?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            actor_id: row.actor_id,
            kind,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub(crate) struct NewNotificationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub actor_id: Uuid,
    pub kind: String,
    pub message: &'a str,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hotspot_row_with_unknown_category_is_a_query_error() {
        let row = HotspotRow {
            id: Uuid::new_v4(),
            name: "Neon Cafe".to_owned(),
            category: "nightclub".to_owned(),
            address: "Main St".to_owned(),
            latitude: 19.39,
            longitude: 72.84,
            description: None,
            image_url: None,
            created_at: Utc::now(),
        };

        let error = Hotspot::try_from(row).expect_err("unknown category");
        assert!(error.to_string().contains("decode category"));
    }

    #[rstest]
    fn rating_row_with_out_of_range_score_is_rejected() {
        let row = RatingRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            hotspot_id: Uuid::new_v4(),
            score: 9,
            review: None,
            created_at: Utc::now(),
        };

        let error = Rating::try_from(row).expect_err("score out of range");
        assert!(error.to_string().contains("decode score"));
    }

    #[rstest]
    fn friend_request_row_parses_its_status() {
        let row = FriendRequestRow {
            id: Uuid::new_v4(),
            sender_id: Uuid::new_v4(),
            receiver_id: Uuid::new_v4(),
            status: "pending".to_owned(),
            created_at: Utc::now(),
        };

        let request = FriendRequest::try_from(row).expect("valid row");
        assert_eq!(
            request.status,
            crate::domain::FriendRequestStatus::Pending
        );
    }
}
