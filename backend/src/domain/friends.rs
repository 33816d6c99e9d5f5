//! Friend requests and friendships.
//!
//! A friend request is a directed row with a small state machine:
//! `pending -> accepted` (which also creates the undirected friendship
//! row), `pending -> rejected`, and `pending -> deleted` (cancel by the
//! sender). A rejected request can be re-sent; the existing row is reset
//! to pending with the new sender/receiver orientation.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    /// Awaiting a response from the receiver.
    Pending,
    /// Accepted; a friendship row exists.
    Accepted,
    /// Declined by the receiver.
    Rejected,
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown friend request status: {0}")]
pub struct FriendRequestStatusParseError(pub String);

impl FromStr for FriendRequestStatus {
    type Err = FriendRequestStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(FriendRequestStatusParseError(other.to_owned())),
        }
    }
}

impl fmt::Display for FriendRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// A directed friend request row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendRequest {
    /// Row identifier.
    pub id: Uuid,
    /// The requesting user.
    pub sender_id: Uuid,
    /// The requested user.
    pub receiver_id: Uuid,
    /// Current state.
    pub status: FriendRequestStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An undirected friendship row between two users.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Friendship {
    /// Row identifier.
    pub id: Uuid,
    /// One endpoint.
    pub user_id_1: Uuid,
    /// The other endpoint.
    pub user_id_2: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Friendship {
    /// The counterpart of `user_id` in this friendship, if they belong to it.
    pub fn counterpart_of(&self, user_id: Uuid) -> Option<Uuid> {
        if self.user_id_1 == user_id {
            Some(self.user_id_2)
        } else if self.user_id_2 == user_id {
            Some(self.user_id_1)
        } else {
            None
        }
    }

    /// Whether `user_id` is one of the two endpoints.
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user_id_1 == user_id || self.user_id_2 == user_id
    }
}

/// Relationship between the current user and another, as shown on profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    /// No relation and no open request.
    None,
    /// The current user sent a pending request.
    Sent,
    /// The other user sent a pending request.
    Received,
    /// The two are friends.
    Friends,
}

/// A friend with the profile fields shown in listings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FriendEntry {
    /// The friendship row id, used for removal.
    pub friendship_id: Uuid,
    /// The friend's user id.
    pub friend_id: Uuid,
    /// Their username.
    pub username: Option<String>,
    /// Their avatar URL.
    pub avatar_url: Option<String>,
    /// Their bio.
    pub bio: Option<String>,
    /// Their city.
    pub city: Option<String>,
    /// When the friendship was created.
    pub created_at: DateTime<Utc>,
}
