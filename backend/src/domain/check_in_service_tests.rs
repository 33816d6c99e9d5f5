//! Tests for the check-in service.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use uuid::Uuid;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::hotspot::{Category, Hotspot};
use crate::domain::ports::{
    MockCheckInRepository, MockFriendRepository, MockHotspotRepository,
    MockNotificationRepository, MockProfileRepository, RepositoryError,
};
use crate::domain::friends::FriendEntry;
use crate::domain::profile::Profile;

fn hotspot_at(lat: f64, lng: f64) -> Hotspot {
    Hotspot {
        id: Uuid::new_v4(),
        name: "Neon Cafe".to_owned(),
        category: Category::Cafe,
        address: "Main St".to_owned(),
        position: Coordinates::new(lat, lng).expect("valid coordinates"),
        description: None,
        image_url: None,
        created_at: Utc::now(),
    }
}

fn request_at(hotspot_id: Uuid, lat: f64, lng: f64) -> CheckInRequest {
    CheckInRequest {
        hotspot_id,
        position: Coordinates::new(lat, lng).expect("valid coordinates"),
        accuracy_m: None,
        note: None,
        is_public: false,
    }
}

struct ServiceParts {
    check_ins: MockCheckInRepository,
    hotspots: MockHotspotRepository,
    friends: MockFriendRepository,
    notifications: MockNotificationRepository,
    profiles: MockProfileRepository,
}

impl ServiceParts {
    fn new() -> Self {
        Self {
            check_ins: MockCheckInRepository::new(),
            hotspots: MockHotspotRepository::new(),
            friends: MockFriendRepository::new(),
            notifications: MockNotificationRepository::new(),
            profiles: MockProfileRepository::new(),
        }
    }

    fn build(self) -> CheckInService {
        CheckInService::new(
            Arc::new(self.check_ins),
            Arc::new(self.hotspots),
            Arc::new(self.friends),
            Arc::new(self.notifications),
            Arc::new(self.profiles),
            Arc::new(RateLimiter::new(Arc::new(DefaultClock))),
            Arc::new(DefaultClock),
        )
    }
}

#[tokio::test]
async fn check_in_succeeds_inside_the_geofence() {
    let hotspot = hotspot_at(19.3920, 72.8400);
    let hotspot_id = hotspot.id;
    let user = Uuid::new_v4();

    let mut parts = ServiceParts::new();
    parts
        .hotspots
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(hotspot)));
    parts.check_ins.expect_find_active().return_once(|_| Ok(None));
    parts
        .check_ins
        .expect_deactivate_active()
        .times(1)
        .return_once(|_| Ok(0));
    parts.check_ins.expect_insert().times(1).return_once(|_| Ok(()));

    let service = parts.build();
    let outcome = service
        .check_in(user, request_at(hotspot_id, 19.3921, 72.8401))
        .await
        .expect("check-in succeeds");

    assert!(outcome.distance_m < GEOFENCE_RADIUS_M);
    assert!(outcome.accuracy_warning.is_none());
    assert!(outcome.check_in.is_active);
    assert_eq!(outcome.check_in.hotspot_id, hotspot_id);
    assert_eq!(service.visitor_count(hotspot_id), 1);
}

#[tokio::test]
async fn check_in_outside_the_geofence_names_the_overage() {
    let hotspot = hotspot_at(19.3919, 72.8397);
    let hotspot_id = hotspot.id;

    let mut parts = ServiceParts::new();
    parts
        .hotspots
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(hotspot)));

    let service = parts.build();
    let error = service
        .check_in(Uuid::new_v4(), request_at(hotspot_id, 19.4019, 72.8397))
        .await
        .expect_err("too far away");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(error.message().contains("too far"), "{}", error.message());
    let details = error.details().expect("details attached");
    assert!(details["distanceM"].as_f64().expect("distance") > 1000.0);
}

#[tokio::test]
async fn check_in_is_rate_limited_after_the_window_fills() {
    let hotspot = hotspot_at(19.3920, 72.8400);
    let hotspot_id = hotspot.id;
    let user = Uuid::new_v4();

    let limiter = Arc::new(RateLimiter::new(Arc::new(DefaultClock)));
    for _ in 0..RateLimitAction::CheckIn.policy().max {
        assert!(limiter.check(RateLimitAction::CheckIn, user).is_allowed());
    }

    let mut hotspots = MockHotspotRepository::new();
    hotspots
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(hotspot)));
    let service = CheckInService::new(
        Arc::new(MockCheckInRepository::new()),
        Arc::new(hotspots),
        Arc::new(MockFriendRepository::new()),
        Arc::new(MockNotificationRepository::new()),
        Arc::new(MockProfileRepository::new()),
        limiter,
        Arc::new(DefaultClock),
    );

    let error = service
        .check_in(user, request_at(hotspot_id, 19.3921, 72.8401))
        .await
        .expect_err("rate limited");

    assert_eq!(error.code(), ErrorCode::TooManyRequests);
    let details = error.details().expect("details attached");
    assert!(details["waitSeconds"].as_u64().expect("wait") > 0);
}

#[tokio::test]
async fn failed_insert_leaves_the_user_checked_out() {
    let old_venue = Uuid::new_v4();
    let hotspot = hotspot_at(19.3920, 72.8400);
    let hotspot_id = hotspot.id;
    let user = Uuid::new_v4();

    let prior = CheckIn {
        id: Uuid::new_v4(),
        user_id: user,
        hotspot_id: old_venue,
        checked_in_at: Utc::now(),
        is_active: true,
        is_public: true,
        note: None,
    };

    let mut parts = ServiceParts::new();
    parts
        .hotspots
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(hotspot)));
    parts
        .check_ins
        .expect_active_counts()
        .return_once(move || Ok(HashMap::from([(old_venue, 1)])));
    parts
        .check_ins
        .expect_find_active()
        .return_once(move |_| Ok(Some(prior)));
    parts
        .check_ins
        .expect_deactivate_active()
        .return_once(|_| Ok(1));
    parts
        .check_ins
        .expect_insert()
        .return_once(|_| Err(RepositoryError::query("constraint violation")));

    let service = parts.build();
    service.prime_live_state().await.expect("primed");

    let error = service
        .check_in(user, request_at(hotspot_id, 19.3921, 72.8401))
        .await
        .expect_err("insert failed");

    assert_eq!(error.code(), ErrorCode::InternalError);
    // Deactivation committed, insert did not: both venues end at zero.
    assert_eq!(service.visitor_count(old_venue), 0);
    assert_eq!(service.visitor_count(hotspot_id), 0);
}

#[tokio::test]
async fn failed_deactivation_restores_the_projection() {
    let old_venue = Uuid::new_v4();
    let hotspot = hotspot_at(19.3920, 72.8400);
    let hotspot_id = hotspot.id;
    let user = Uuid::new_v4();

    let prior = CheckIn {
        id: Uuid::new_v4(),
        user_id: user,
        hotspot_id: old_venue,
        checked_in_at: Utc::now(),
        is_active: true,
        is_public: true,
        note: None,
    };

    let mut parts = ServiceParts::new();
    parts
        .hotspots
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(hotspot)));
    parts
        .check_ins
        .expect_active_counts()
        .return_once(move || Ok(HashMap::from([(old_venue, 1)])));
    parts
        .check_ins
        .expect_find_active()
        .return_once(move |_| Ok(Some(prior)));
    parts
        .check_ins
        .expect_deactivate_active()
        .return_once(|_| Err(RepositoryError::connection("pool down")));

    let service = parts.build();
    service.prime_live_state().await.expect("primed");

    let error = service
        .check_in(user, request_at(hotspot_id, 19.3921, 72.8401))
        .await
        .expect_err("deactivation failed");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    // Nothing committed: the prior venue keeps its visitor.
    assert_eq!(service.visitor_count(old_venue), 1);
    assert_eq!(service.visitor_count(hotspot_id), 0);
}

#[tokio::test]
async fn today_count_queries_from_utc_midnight() {
    let user = Uuid::new_v4();

    let mut parts = ServiceParts::new();
    parts
        .check_ins
        .expect_count_since()
        .times(1)
        .withf(move |id, since| {
            *id == user && since.time() == chrono::NaiveTime::MIN && *since <= Utc::now()
        })
        .return_once(|_, _| Ok(2));

    let service = parts.build();
    assert_eq!(service.today_count(user).await.expect("count"), 2);
}

#[tokio::test]
async fn poor_accuracy_warns_without_rejecting() {
    let hotspot = hotspot_at(19.3920, 72.8400);
    let hotspot_id = hotspot.id;

    let mut parts = ServiceParts::new();
    parts
        .hotspots
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(hotspot)));
    parts.check_ins.expect_find_active().return_once(|_| Ok(None));
    parts
        .check_ins
        .expect_deactivate_active()
        .return_once(|_| Ok(0));
    parts.check_ins.expect_insert().return_once(|_| Ok(()));

    let service = parts.build();
    let mut request = request_at(hotspot_id, 19.3921, 72.8401);
    request.accuracy_m = Some(250.0);

    let outcome = service
        .check_in(Uuid::new_v4(), request)
        .await
        .expect("check-in succeeds");

    assert!(outcome.accuracy_warning.is_some());
}

#[tokio::test]
async fn public_check_in_notifies_friends() {
    let hotspot = hotspot_at(19.3920, 72.8400);
    let hotspot_id = hotspot.id;
    let user = Uuid::new_v4();
    let friend = Uuid::new_v4();

    let mut parts = ServiceParts::new();
    parts
        .hotspots
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(hotspot)));
    parts.check_ins.expect_find_active().return_once(|_| Ok(None));
    parts
        .check_ins
        .expect_deactivate_active()
        .return_once(|_| Ok(0));
    parts.check_ins.expect_insert().return_once(|_| Ok(()));
    parts.profiles.expect_find_by_id().return_once(move |_| {
        Ok(Some(Profile {
            id: user,
            username: Some("ada".to_owned()),
            avatar_url: None,
            bio: None,
            city: None,
            instagram_username: None,
            twitter_username: None,
            created_at: Utc::now(),
        }))
    });
    parts.friends.expect_list_friends().return_once(move |_| {
        Ok(vec![FriendEntry {
            friendship_id: Uuid::new_v4(),
            friend_id: friend,
            username: None,
            avatar_url: None,
            bio: None,
            city: None,
            created_at: Utc::now(),
        }])
    });
    parts
        .notifications
        .expect_insert()
        .times(1)
        .withf(move |notification| {
            notification.user_id == friend
                && notification.kind == NotificationKind::CheckIn
                && notification.message.contains("ada checked in at Neon Cafe")
        })
        .return_once(|_| Ok(()));

    let service = parts.build();
    let mut request = request_at(hotspot_id, 19.3921, 72.8401);
    request.is_public = true;

    service
        .check_in(user, request)
        .await
        .expect("check-in succeeds");
}
