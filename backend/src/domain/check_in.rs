//! Check-in entity and its value types.
//!
//! A check-in is a timestamped assertion that a user is physically present
//! at a hotspot. At most one check-in per user is meant to be active at a
//! time; the service layer enforces this with a deactivate-then-insert pair
//! rather than a transaction (see the check-in service for the accepted
//! inconsistency window).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use super::sanitize::sanitize_text;

/// Maximum length of a check-in note, in characters.
pub const NOTE_MAX: usize = 150;

/// Validation errors for check-in notes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckInValidationError {
    /// Note exceeds [`NOTE_MAX`] characters after sanitisation.
    #[error("note must be at most {NOTE_MAX} characters")]
    NoteTooLong,
}

/// Optional free-text note attached to a check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct CheckInNote(String);

impl CheckInNote {
    /// Sanitise and validate a note. Returns `None` for blank input.
    pub fn new(raw: &str) -> Result<Option<Self>, CheckInValidationError> {
        let cleaned = sanitize_text(raw);
        if cleaned.is_empty() {
            return Ok(None);
        }
        if cleaned.chars().count() > NOTE_MAX {
            return Err(CheckInValidationError::NoteTooLong);
        }
        Ok(Some(Self(cleaned)))
    }

    /// Borrow the note text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CheckInNote {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<CheckInNote> for String {
    fn from(value: CheckInNote) -> Self {
        value.0
    }
}

impl TryFrom<String> for CheckInNote {
    type Error = CheckInValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match Self::new(&value)? {
            Some(note) => Ok(note),
            // Blank notes deserialise to an empty note rather than None;
            // serde containers use Option<CheckInNote> for absence.
            None => Ok(Self(String::new())),
        }
    }
}

/// A persisted check-in row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    /// Row identifier.
    pub id: Uuid,
    /// The user who checked in.
    pub user_id: Uuid,
    /// The hotspot checked into.
    pub hotspot_id: Uuid,
    /// When the check-in happened.
    pub checked_in_at: DateTime<Utc>,
    /// Whether this is the user's current check-in.
    pub is_active: bool,
    /// Whether the check-in appears in public feeds.
    pub is_public: bool,
    /// Optional note.
    pub note: Option<CheckInNote>,
}

/// Input for inserting a new check-in row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCheckIn {
    /// The user checking in.
    pub user_id: Uuid,
    /// The target hotspot.
    pub hotspot_id: Uuid,
    /// Feed visibility.
    pub is_public: bool,
    /// Optional sanitised note.
    pub note: Option<CheckInNote>,
}

/// One entry of the public activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityFeedItem {
    /// Check-in row identifier.
    pub id: Uuid,
    /// The user who checked in.
    pub user_id: Uuid,
    /// Their username, if the profile has one.
    pub username: Option<String>,
    /// Their avatar URL, if any.
    pub avatar_url: Option<String>,
    /// The hotspot checked into.
    pub hotspot_id: Uuid,
    /// Hotspot display name.
    pub hotspot_name: String,
    /// Hotspot category name.
    pub hotspot_category: String,
    /// When the check-in happened.
    pub checked_in_at: DateTime<Utc>,
    /// Optional note.
    pub note: Option<String>,
}

/// A user currently checked into a hotspot.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveVisitor {
    /// Check-in row identifier.
    pub check_in_id: Uuid,
    /// The visiting user.
    pub user_id: Uuid,
    /// Their username, if the profile has one.
    pub username: Option<String>,
    /// Their avatar URL, if any.
    pub avatar_url: Option<String>,
    /// When they checked in.
    pub checked_in_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn blank_note_becomes_none() {
        assert!(CheckInNote::new("   ").expect("valid").is_none());
    }

    #[rstest]
    fn note_is_sanitised() {
        let note = CheckInNote::new("coffee <3").expect("valid").expect("present");
        assert_eq!(note.as_str(), "coffee 3");
    }

    #[rstest]
    fn overlong_note_is_rejected() {
        let raw = "n".repeat(NOTE_MAX + 1);
        assert_eq!(
            CheckInNote::new(&raw).expect_err("too long"),
            CheckInValidationError::NoteTooLong
        );
    }

    #[rstest]
    fn note_at_limit_is_accepted() {
        let raw = "n".repeat(NOTE_MAX);
        assert!(CheckInNote::new(&raw).expect("valid").is_some());
    }

    // Session payloads embed check-ins, so the row must read back from
    // wire JSON as well as write to it.
    #[rstest]
    fn check_in_deserialises_from_wire_json() {
        let check_in: CheckIn = serde_json::from_value(serde_json::json!({
            "id": "7f0a9d68-7d2f-4dd8-a1c5-0d7a2e9b5f31",
            "userId": "2a4a54a3-6a6f-4f57-9c11-cf2a4f9f7f02",
            "hotspotId": "d2f9b9a1-4c3e-4b5f-8e0a-6b1c2d3e4f50",
            "checkedInAt": "2026-03-01T10:00:00Z",
            "isActive": true,
            "isPublic": false,
            "note": "chai time",
        }))
        .expect("wire shape deserialises");
        assert!(check_in.is_active);
        assert_eq!(
            check_in.note.as_ref().map(CheckInNote::as_str),
            Some("chai time")
        );
    }
}
