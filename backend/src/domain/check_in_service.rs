//! Check-in domain service.
//!
//! Implements the full check-in flow: geofence verification, rate
//! limiting, deactivation of the prior check-in, and insertion of the new
//! row. Deactivate and insert are two separate repository calls rather
//! than one transaction; when the insert fails after a successful
//! deactivation the user is left checked out, and the live projection is
//! reconciled to that state rather than rolled back wholesale.

use std::sync::{Arc, Mutex, MutexGuard};

use mockable::Clock;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use super::Error;
use super::check_in::{ActiveVisitor, ActivityFeedItem, CheckIn, CheckInNote, NewCheckIn};
use super::geo::{Coordinates, GEOFENCE_RADIUS_M};
use super::live_state::{CurrentCheckIn, LiveState};
use super::notification::{NewNotification, Notification, NotificationKind};
use super::ports::{
    CheckInRepository, FriendRepository, HotspotRepository, NotificationRepository,
    ProfileRepository,
};
use super::rate_limit::{RateLimitAction, RateLimitDecision, RateLimiter};

/// Maximum feed entries a single query may return.
const FEED_LIMIT_MAX: i64 = 50;

/// Device accuracy above which the check-in is accepted with a warning.
const ACCURACY_WARNING_M: f64 = 100.0;

/// Validated input for a check-in attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInRequest {
    /// The venue to check into.
    pub hotspot_id: Uuid,
    /// Where the device reports the user to be.
    pub position: Coordinates,
    /// Reported device accuracy in metres, if known.
    pub accuracy_m: Option<f64>,
    /// Optional sanitised note.
    pub note: Option<CheckInNote>,
    /// Whether the check-in appears in public feeds.
    pub is_public: bool,
}

/// Result of a successful check-in.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckInOutcome {
    /// The inserted row.
    pub check_in: CheckIn,
    /// Measured distance to the venue in metres.
    pub distance_m: f64,
    /// Non-fatal warning when device accuracy is poor.
    pub accuracy_warning: Option<String>,
}

/// Service driving the check-in lifecycle and its read models.
pub struct CheckInService {
    check_ins: Arc<dyn CheckInRepository>,
    hotspots: Arc<dyn HotspotRepository>,
    friends: Arc<dyn FriendRepository>,
    notifications: Arc<dyn NotificationRepository>,
    profiles: Arc<dyn ProfileRepository>,
    rate_limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
    live: Mutex<LiveState>,
}

impl CheckInService {
    /// Wire the service to its repositories, limiter, and clock.
    pub fn new(
        check_ins: Arc<dyn CheckInRepository>,
        hotspots: Arc<dyn HotspotRepository>,
        friends: Arc<dyn FriendRepository>,
        notifications: Arc<dyn NotificationRepository>,
        profiles: Arc<dyn ProfileRepository>,
        rate_limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            check_ins,
            hotspots,
            friends,
            notifications,
            profiles,
            rate_limiter,
            clock,
            live: Mutex::new(LiveState::default()),
        }
    }

    /// Load confirmed visitor counts from storage into the projection.
    pub async fn prime_live_state(&self) -> Result<(), Error> {
        let counts = self.check_ins.active_counts().await?;
        self.lock_live().prime(counts, std::collections::HashMap::new());
        Ok(())
    }

    /// Attempt a check-in at a hotspot.
    ///
    /// Verifies the geofence, applies the rate limit, deactivates any
    /// prior active check-in, and inserts the new row. Device accuracy
    /// above 100 m produces a warning on the outcome, never a rejection.
    pub async fn check_in(
        &self,
        user_id: Uuid,
        request: CheckInRequest,
    ) -> Result<CheckInOutcome, Error> {
        let hotspot = self
            .hotspots
            .find_by_id(request.hotspot_id)
            .await?
            .ok_or_else(|| Error::not_found("hotspot not found"))?;

        let distance_m = request.position.distance_m(&hotspot.position);
        if distance_m > GEOFENCE_RADIUS_M {
            let overage = (distance_m - GEOFENCE_RADIUS_M).ceil();
            return Err(Error::invalid_request(format!(
                "You're {overage:.0} m too far from {name}; move closer to check in",
                name = hotspot.name,
            ))
            .with_details(json!({
                "distanceM": distance_m.round(),
                "radiusM": GEOFENCE_RADIUS_M,
            })));
        }

        if let RateLimitDecision::Denied { wait } = self
            .rate_limiter
            .check(RateLimitAction::CheckIn, user_id)
        {
            let seconds = wait.as_secs();
            return Err(Error::too_many_requests(format!(
                "Checking in too fast; try again in {seconds}s"
            ))
            .with_details(json!({ "waitSeconds": seconds })));
        }

        let accuracy_warning = request.accuracy_m.filter(|m| *m > ACCURACY_WARNING_M).map(
            |metres| {
                format!("Location accuracy is low ({metres:.0} m); position may be unreliable")
            },
        );

        let new_check_in = NewCheckIn {
            user_id,
            hotspot_id: hotspot.id,
            is_public: request.is_public,
            note: request.note,
        };
        let check_in = CheckIn {
            id: Uuid::new_v4(),
            user_id: new_check_in.user_id,
            hotspot_id: new_check_in.hotspot_id,
            checked_in_at: self.clock.utc(),
            is_active: true,
            is_public: new_check_in.is_public,
            note: new_check_in.note,
        };

        // Reconcile the projection's current map with storage before the
        // optimistic apply, so the prior venue's count moves correctly.
        let prior = self.check_ins.find_active(user_id).await?;
        {
            let mut live = self.lock_live();
            if let (None, Some(active)) = (live.current_for(user_id), prior.as_ref()) {
                live.note_current(
                    user_id,
                    CurrentCheckIn {
                        check_in_id: active.id,
                        hotspot_id: active.hotspot_id,
                    },
                );
            }
            live.apply_check_in(user_id, check_in.id, check_in.hotspot_id);
        }

        if let Err(error) = self.check_ins.deactivate_active(user_id).await {
            // Nothing was committed; restore the projection fully.
            let mut live = self.lock_live();
            live.revert_failed_check_in(user_id, check_in.hotspot_id);
            if let Some(active) = prior {
                live.revert_check_out(
                    user_id,
                    CurrentCheckIn {
                        check_in_id: active.id,
                        hotspot_id: active.hotspot_id,
                    },
                );
            }
            return Err(error.into());
        }

        if let Err(error) = self.check_ins.insert(&check_in).await {
            // Deactivation committed but the insert did not: the user is
            // now checked out. Only the target venue's increment is
            // reverted; the prior venue's decrement stands.
            self.lock_live()
                .revert_failed_check_in(user_id, check_in.hotspot_id);
            return Err(error.into());
        }

        if check_in.is_public {
            self.notify_friends(user_id, &hotspot.name).await;
        }

        Ok(CheckInOutcome {
            check_in,
            distance_m,
            accuracy_warning,
        })
    }

    /// Check the user out of their current hotspot, if any.
    pub async fn check_out(&self, user_id: Uuid) -> Result<(), Error> {
        let cleared = self.lock_live().apply_check_out(user_id);
        match self.check_ins.deactivate_active(user_id).await {
            Ok(_) => Ok(()),
            Err(error) => {
                if let Some(current) = cleared {
                    self.lock_live().revert_check_out(user_id, current);
                }
                Err(error.into())
            }
        }
    }

    /// The user's current active check-in.
    pub async fn current(&self, user_id: Uuid) -> Result<Option<CheckIn>, Error> {
        Ok(self.check_ins.find_active(user_id).await?)
    }

    /// How many check-ins the user has recorded since UTC midnight.
    pub async fn today_count(&self, user_id: Uuid) -> Result<u64, Error> {
        let midnight = self
            .clock
            .utc()
            .date_naive()
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        Ok(self.check_ins.count_since(user_id, midnight).await?)
    }

    /// Recent public check-ins, newest first.
    pub async fn activity_feed(&self, limit: i64) -> Result<Vec<ActivityFeedItem>, Error> {
        let limit = limit.clamp(1, FEED_LIMIT_MAX);
        Ok(self.check_ins.activity_feed(limit).await?)
    }

    /// Users currently checked into the hotspot.
    pub async fn active_visitors(&self, hotspot_id: Uuid) -> Result<Vec<ActiveVisitor>, Error> {
        Ok(self.check_ins.active_visitors(hotspot_id).await?)
    }

    /// Snapshot of live visitor counts per hotspot.
    pub fn visitor_counts(&self) -> std::collections::HashMap<Uuid, u32> {
        self.lock_live().visitor_counts()
    }

    /// Live visitor count for one hotspot.
    pub fn visitor_count(&self, hotspot_id: Uuid) -> u32 {
        self.lock_live().visitor_count(hotspot_id)
    }

    async fn notify_friends(&self, user_id: Uuid, hotspot_name: &str) {
        let username = match self.profiles.find_by_id(user_id).await {
            Ok(profile) => profile
                .and_then(|p| p.username)
                .unwrap_or_else(|| "A friend".to_owned()),
            Err(error) => {
                warn!(%user_id, %error, "skipping check-in notifications");
                return;
            }
        };
        let friends = match self.friends.list_friends(user_id).await {
            Ok(friends) => friends,
            Err(error) => {
                warn!(%user_id, %error, "skipping check-in notifications");
                return;
            }
        };
        for friend in friends {
            let notification = build_notification(
                NewNotification {
                    user_id: friend.friend_id,
                    actor_id: user_id,
                    kind: NotificationKind::CheckIn,
                    message: format!("{username} checked in at {hotspot_name}"),
                },
                self.clock.as_ref(),
            );
            if let Err(error) = self.notifications.insert(&notification).await {
                warn!(recipient = %friend.friend_id, %error, "check-in notification failed");
            }
        }
    }

    fn lock_live(&self) -> MutexGuard<'_, LiveState> {
        match self.live.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Materialise a notification row from its input.
pub(crate) fn build_notification(input: NewNotification, clock: &dyn Clock) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        user_id: input.user_id,
        actor_id: input.actor_id,
        kind: input.kind,
        message: input.message,
        is_read: false,
        created_at: clock.utc(),
    }
}

#[cfg(test)]
#[path = "check_in_service_tests.rs"]
mod tests;
