//! In-app notifications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// The event that produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone sent the recipient a friend request.
    FriendRequest,
    /// Someone accepted the recipient's friend request.
    FriendAccept,
    /// A friend checked in somewhere.
    CheckIn,
}

/// Error returned when parsing an unknown notification kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown notification kind: {0}")]
pub struct NotificationKindParseError(pub String);

impl FromStr for NotificationKind {
    type Err = NotificationKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "friend_request" => Ok(Self::FriendRequest),
            "friend_accept" => Ok(Self::FriendAccept),
            "check_in" => Ok(Self::CheckIn),
            other => Err(NotificationKindParseError(other.to_owned())),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FriendRequest => "friend_request",
            Self::FriendAccept => "friend_accept",
            Self::CheckIn => "check_in",
        };
        f.write_str(name)
    }
}

/// A persisted notification row.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Row identifier.
    pub id: Uuid,
    /// The recipient.
    pub user_id: Uuid,
    /// The user who triggered the event.
    pub actor_id: Uuid,
    /// What happened.
    pub kind: NotificationKind,
    /// Human-readable message.
    pub message: String,
    /// Whether the recipient has seen it.
    pub is_read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    /// The recipient.
    pub user_id: Uuid,
    /// The user who triggered the event.
    pub actor_id: Uuid,
    /// What happened.
    pub kind: NotificationKind,
    /// Human-readable message.
    pub message: String,
}
