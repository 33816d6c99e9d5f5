//! In-memory repository adapters.
//!
//! Back the domain ports with plain vectors behind a shared mutex. Used
//! as the storage fallback when no database URL is configured, and by the
//! HTTP handler tests, which need the full stack without PostgreSQL.
//! Single-statement semantics mirror the Diesel adapters so the service
//! layer behaves identically over either backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    CheckInRepository, FriendRepository, HotspotRepository, NotificationRepository,
    ProfileRepository, RatingRepository, RepositoryError, SavedHotspotRepository,
};
use crate::domain::{
    ActiveVisitor, ActivityFeedItem, CheckIn, FriendEntry, FriendRequest, Friendship, Hotspot,
    HotspotDraft, NewRating, Notification, Profile, ProfileUpdate, Rating, RatingSummary,
    ReviewEntry, TrendingHotspot,
};

#[derive(Debug, Default)]
struct Store {
    profiles: Vec<Profile>,
    hotspots: Vec<Hotspot>,
    check_ins: Vec<CheckIn>,
    ratings: Vec<Rating>,
    friend_requests: Vec<FriendRequest>,
    friendships: Vec<Friendship>,
    saved: Vec<SavedRow>,
    notifications: Vec<Notification>,
}

#[derive(Debug, Clone)]
struct SavedRow {
    user_id: Uuid,
    hotspot_id: Uuid,
    created_at: DateTime<Utc>,
}

/// Shared in-memory state behind every memory adapter.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Store>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// In-memory `HotspotRepository`.
#[derive(Clone)]
pub struct MemoryHotspotRepository(pub MemoryStore);

#[async_trait]
impl HotspotRepository for MemoryHotspotRepository {
    async fn list(&self) -> Result<Vec<Hotspot>, RepositoryError> {
        let mut hotspots = self.0.lock().hotspots.clone();
        hotspots.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hotspots)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Hotspot>, RepositoryError> {
        Ok(self.0.lock().hotspots.iter().find(|h| h.id == id).cloned())
    }

    async fn insert(&self, hotspot: &Hotspot) -> Result<(), RepositoryError> {
        self.0.lock().hotspots.push(hotspot.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        draft: &HotspotDraft,
    ) -> Result<Option<Hotspot>, RepositoryError> {
        let mut store = self.0.lock();
        let Some(hotspot) = store.hotspots.iter_mut().find(|h| h.id == id) else {
            return Ok(None);
        };
        hotspot.name = draft.name.clone();
        hotspot.category = draft.category;
        hotspot.address = draft.address.clone();
        hotspot.position = draft.position;
        hotspot.description = draft.description.clone();
        hotspot.image_url = draft.image_url.clone();
        Ok(Some(hotspot.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut store = self.0.lock();
        let before = store.hotspots.len();
        store.hotspots.retain(|h| h.id != id);
        Ok(store.hotspots.len() < before)
    }

    async fn trending(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TrendingHotspot>, RepositoryError> {
        let store = self.0.lock();
        let mut counts: HashMap<Uuid, i64> = HashMap::new();
        for check_in in store.check_ins.iter().filter(|c| c.checked_in_at >= since) {
            *counts.entry(check_in.hotspot_id).or_insert(0) += 1;
        }
        let mut ranked: Vec<(Uuid, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(ranked
            .into_iter()
            .take(limit.max(0) as usize)
            .filter_map(|(id, recent_check_ins)| {
                store
                    .hotspots
                    .iter()
                    .find(|h| h.id == id)
                    .map(|hotspot| TrendingHotspot {
                        hotspot: hotspot.clone(),
                        recent_check_ins,
                    })
            })
            .collect())
    }
}

/// In-memory `CheckInRepository`.
#[derive(Clone)]
pub struct MemoryCheckInRepository(pub MemoryStore);

#[async_trait]
impl CheckInRepository for MemoryCheckInRepository {
    async fn deactivate_active(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        let mut store = self.0.lock();
        let mut changed = 0;
        for check_in in store
            .check_ins
            .iter_mut()
            .filter(|c| c.user_id == user_id && c.is_active)
        {
            check_in.is_active = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn insert(&self, check_in: &CheckIn) -> Result<(), RepositoryError> {
        self.0.lock().check_ins.push(check_in.clone());
        Ok(())
    }

    async fn find_active(&self, user_id: Uuid) -> Result<Option<CheckIn>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .check_ins
            .iter()
            .filter(|c| c.user_id == user_id && c.is_active)
            .max_by_key(|c| c.checked_in_at)
            .cloned())
    }

    async fn activity_feed(&self, limit: i64) -> Result<Vec<ActivityFeedItem>, RepositoryError> {
        let store = self.0.lock();
        let mut public: Vec<&CheckIn> = store.check_ins.iter().filter(|c| c.is_public).collect();
        public.sort_by(|a, b| b.checked_in_at.cmp(&a.checked_in_at));
        Ok(public
            .into_iter()
            .take(limit.max(0) as usize)
            .filter_map(|check_in| {
                let profile = store.profiles.iter().find(|p| p.id == check_in.user_id)?;
                let hotspot = store
                    .hotspots
                    .iter()
                    .find(|h| h.id == check_in.hotspot_id)?;
                Some(ActivityFeedItem {
                    id: check_in.id,
                    user_id: check_in.user_id,
                    username: profile.username.clone(),
                    avatar_url: profile.avatar_url.clone(),
                    hotspot_id: hotspot.id,
                    hotspot_name: hotspot.name.clone(),
                    hotspot_category: hotspot.category.to_string(),
                    checked_in_at: check_in.checked_in_at,
                    note: check_in.note.as_ref().map(|n| n.as_str().to_owned()),
                })
            })
            .collect())
    }

    async fn active_visitors(
        &self,
        hotspot_id: Uuid,
    ) -> Result<Vec<ActiveVisitor>, RepositoryError> {
        let store = self.0.lock();
        let mut visitors: Vec<ActiveVisitor> = store
            .check_ins
            .iter()
            .filter(|c| c.hotspot_id == hotspot_id && c.is_active)
            .filter_map(|check_in| {
                let profile = store.profiles.iter().find(|p| p.id == check_in.user_id)?;
                Some(ActiveVisitor {
                    check_in_id: check_in.id,
                    user_id: check_in.user_id,
                    username: profile.username.clone(),
                    avatar_url: profile.avatar_url.clone(),
                    checked_in_at: check_in.checked_in_at,
                })
            })
            .collect();
        visitors.sort_by_key(|v| v.checked_in_at);
        Ok(visitors)
    }

    async fn active_counts(&self) -> Result<HashMap<Uuid, u32>, RepositoryError> {
        let store = self.0.lock();
        let mut counts: HashMap<Uuid, u32> = HashMap::new();
        for check_in in store.check_ins.iter().filter(|c| c.is_active) {
            *counts.entry(check_in.hotspot_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        Ok(self
            .0
            .lock()
            .check_ins
            .iter()
            .filter(|c| c.user_id == user_id && c.checked_in_at >= since)
            .count() as u64)
    }
}

/// In-memory `RatingRepository`.
#[derive(Clone)]
pub struct MemoryRatingRepository(pub MemoryStore);

#[async_trait]
impl RatingRepository for MemoryRatingRepository {
    async fn upsert(&self, rating: &NewRating) -> Result<Rating, RepositoryError> {
        let mut store = self.0.lock();
        if let Some(existing) = store
            .ratings
            .iter_mut()
            .find(|r| r.user_id == rating.user_id && r.hotspot_id == rating.hotspot_id)
        {
            existing.score = rating.score;
            existing.review = rating.review.clone();
            return Ok(existing.clone());
        }
        let stored = Rating {
            id: Uuid::new_v4(),
            user_id: rating.user_id,
            hotspot_id: rating.hotspot_id,
            score: rating.score,
            review: rating.review.clone(),
            created_at: Utc::now(),
        };
        store.ratings.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        hotspot_id: Uuid,
    ) -> Result<Option<Rating>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .ratings
            .iter()
            .find(|r| r.user_id == user_id && r.hotspot_id == hotspot_id)
            .cloned())
    }

    async fn reviews(&self, hotspot_id: Uuid) -> Result<Vec<ReviewEntry>, RepositoryError> {
        let store = self.0.lock();
        let mut entries: Vec<ReviewEntry> = store
            .ratings
            .iter()
            .filter(|r| r.hotspot_id == hotspot_id)
            .map(|rating| {
                let profile = store.profiles.iter().find(|p| p.id == rating.user_id);
                ReviewEntry {
                    user_id: rating.user_id,
                    username: profile.and_then(|p| p.username.clone()),
                    avatar_url: profile.and_then(|p| p.avatar_url.clone()),
                    score: rating.score,
                    review: rating.review.clone(),
                    created_at: rating.created_at,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn summary(&self, hotspot_id: Uuid) -> Result<RatingSummary, RepositoryError> {
        let store = self.0.lock();
        let scores: Vec<i64> = store
            .ratings
            .iter()
            .filter(|r| r.hotspot_id == hotspot_id)
            .map(|r| i64::from(r.score.value()))
            .collect();
        if scores.is_empty() {
            return Ok(RatingSummary::empty());
        }
        let count = scores.len() as i64;
        let average = scores.iter().sum::<i64>() as f64 / count as f64;
        Ok(RatingSummary {
            average: Some(average),
            count,
        })
    }
}

/// In-memory `FriendRepository`.
#[derive(Clone)]
pub struct MemoryFriendRepository(pub MemoryStore);

#[async_trait]
impl FriendRepository for MemoryFriendRepository {
    async fn find_request(&self, id: Uuid) -> Result<Option<FriendRequest>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .friend_requests
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn find_request_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<FriendRequest>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .friend_requests
            .iter()
            .find(|r| {
                (r.sender_id == user_a && r.receiver_id == user_b)
                    || (r.sender_id == user_b && r.receiver_id == user_a)
            })
            .cloned())
    }

    async fn insert_request(&self, request: &FriendRequest) -> Result<(), RepositoryError> {
        self.0.lock().friend_requests.push(request.clone());
        Ok(())
    }

    async fn update_request(&self, request: &FriendRequest) -> Result<bool, RepositoryError> {
        let mut store = self.0.lock();
        match store.friend_requests.iter_mut().find(|r| r.id == request.id) {
            Some(existing) => {
                *existing = request.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_request(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut store = self.0.lock();
        let before = store.friend_requests.len();
        store.friend_requests.retain(|r| r.id != id);
        Ok(store.friend_requests.len() < before)
    }

    async fn insert_friendship(&self, friendship: &Friendship) -> Result<(), RepositoryError> {
        self.0.lock().friendships.push(friendship.clone());
        Ok(())
    }

    async fn find_friendship(&self, id: Uuid) -> Result<Option<Friendship>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .friendships
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn find_friendship_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<Option<Friendship>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .friendships
            .iter()
            .find(|f| {
                (f.user_id_1 == user_a && f.user_id_2 == user_b)
                    || (f.user_id_1 == user_b && f.user_id_2 == user_a)
            })
            .cloned())
    }

    async fn delete_friendship(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut store = self.0.lock();
        let before = store.friendships.len();
        store.friendships.retain(|f| f.id != id);
        Ok(store.friendships.len() < before)
    }

    async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, RepositoryError> {
        let store = self.0.lock();
        let mut entries: Vec<FriendEntry> = store
            .friendships
            .iter()
            .filter_map(|friendship| {
                let friend_id = friendship.counterpart_of(user_id)?;
                let profile = store.profiles.iter().find(|p| p.id == friend_id);
                Some(FriendEntry {
                    friendship_id: friendship.id,
                    friend_id,
                    username: profile.and_then(|p| p.username.clone()),
                    avatar_url: profile.and_then(|p| p.avatar_url.clone()),
                    bio: profile.and_then(|p| p.bio.clone()),
                    city: profile.and_then(|p| p.city.clone()),
                    created_at: friendship.created_at,
                })
            })
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }
}

/// In-memory `ProfileRepository`.
#[derive(Clone)]
pub struct MemoryProfileRepository(pub MemoryStore);

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.0.lock().profiles.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Profile>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .profiles
            .iter()
            .find(|p| p.username.as_deref() == Some(username))
            .cloned())
    }

    async fn insert(&self, profile: &Profile) -> Result<(), RepositoryError> {
        self.0.lock().profiles.push(profile.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<Option<Profile>, RepositoryError> {
        let mut store = self.0.lock();
        let Some(profile) = store.profiles.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(username) = &update.username {
            profile.username = Some(username.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            profile.avatar_url = Some(avatar_url.clone());
        }
        if let Some(bio) = &update.bio {
            profile.bio = Some(bio.clone());
        }
        if let Some(city) = &update.city {
            profile.city = Some(city.clone());
        }
        if let Some(instagram) = &update.instagram_username {
            profile.instagram_username = Some(instagram.clone());
        }
        if let Some(twitter) = &update.twitter_username {
            profile.twitter_username = Some(twitter.clone());
        }
        Ok(Some(profile.clone()))
    }
}

/// In-memory `SavedHotspotRepository`.
#[derive(Clone)]
pub struct MemorySavedHotspotRepository(pub MemoryStore);

#[async_trait]
impl SavedHotspotRepository for MemorySavedHotspotRepository {
    async fn save(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, RepositoryError> {
        let mut store = self.0.lock();
        if store
            .saved
            .iter()
            .any(|row| row.user_id == user_id && row.hotspot_id == hotspot_id)
        {
            return Ok(false);
        }
        store.saved.push(SavedRow {
            user_id,
            hotspot_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn unsave(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, RepositoryError> {
        let mut store = self.0.lock();
        let before = store.saved.len();
        store
            .saved
            .retain(|row| !(row.user_id == user_id && row.hotspot_id == hotspot_id));
        Ok(store.saved.len() < before)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Hotspot>, RepositoryError> {
        let store = self.0.lock();
        let mut rows: Vec<&SavedRow> = store
            .saved
            .iter()
            .filter(|row| row.user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                store
                    .hotspots
                    .iter()
                    .find(|h| h.id == row.hotspot_id)
                    .cloned()
            })
            .collect())
    }

    async fn is_saved(&self, user_id: Uuid, hotspot_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self
            .0
            .lock()
            .saved
            .iter()
            .any(|row| row.user_id == user_id && row.hotspot_id == hotspot_id))
    }
}

/// In-memory `NotificationRepository`.
#[derive(Clone)]
pub struct MemoryNotificationRepository(pub MemoryStore);

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError> {
        self.0.lock().notifications.push(notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let store = self.0.lock();
        let mut rows: Vec<Notification> = store
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn mark_read(
        &self,
        user_id: Uuid,
        ids: Option<Vec<Uuid>>,
    ) -> Result<u64, RepositoryError> {
        let mut store = self.0.lock();
        let mut changed = 0;
        for notification in store
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            if ids
                .as_ref()
                .is_none_or(|ids| ids.contains(&notification.id))
            {
                notification.is_read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64, RepositoryError> {
        Ok(self
            .0
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Category, Coordinates, Score};

    fn hotspot(name: &str) -> Hotspot {
        Hotspot {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            category: Category::Cafe,
            address: "Main St".to_owned(),
            position: Coordinates::new(19.3919, 72.8397).expect("valid coordinates"),
            description: None,
            image_url: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn rating_upsert_replaces_the_existing_row() {
        let store = MemoryStore::new();
        let repo = MemoryRatingRepository(store);
        let user = Uuid::new_v4();
        let venue = Uuid::new_v4();

        let first = NewRating::new(user, venue, Score::new(3).expect("valid"), None);
        let inserted = repo.upsert(&first).await.expect("insert");

        let second = NewRating::new(user, venue, Score::new(5).expect("valid"), Some("great"));
        let updated = repo.upsert(&second).await.expect("update");

        assert_eq!(updated.id, inserted.id);
        assert_eq!(updated.score.value(), 5);
        let summary = repo.summary(venue).await.expect("summary");
        assert_eq!(summary.count, 1);
        assert_eq!(summary.average, Some(5.0));
    }

    #[tokio::test]
    async fn deactivate_touches_only_the_users_rows() {
        let store = MemoryStore::new();
        let repo = MemoryCheckInRepository(store);
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let venue = Uuid::new_v4();
        for user in [user_a, user_b] {
            repo.insert(&CheckIn {
                id: Uuid::new_v4(),
                user_id: user,
                hotspot_id: venue,
                checked_in_at: Utc::now(),
                is_active: true,
                is_public: true,
                note: None,
            })
            .await
            .expect("insert");
        }

        let changed = repo.deactivate_active(user_a).await.expect("deactivate");

        assert_eq!(changed, 1);
        assert!(repo.find_active(user_a).await.expect("query").is_none());
        assert!(repo.find_active(user_b).await.expect("query").is_some());
    }

    #[tokio::test]
    async fn friendship_lookup_requires_both_distinct_endpoints() {
        let store = MemoryStore::new();
        let repo = MemoryFriendRepository(store);
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        repo.insert_friendship(&Friendship {
            id: Uuid::new_v4(),
            user_id_1: user_a,
            user_id_2: user_b,
            created_at: Utc::now(),
        })
        .await
        .expect("insert");

        assert!(
            repo.find_friendship_between(user_a, user_b)
                .await
                .expect("query")
                .is_some()
        );
        // A user is never their own friend, even with friendships present.
        assert!(
            repo.find_friendship_between(user_a, user_a)
                .await
                .expect("query")
                .is_none()
        );
    }

    #[tokio::test]
    async fn count_since_ignores_older_rows() {
        let store = MemoryStore::new();
        let repo = MemoryCheckInRepository(store);
        let user = Uuid::new_v4();
        let venue = Uuid::new_v4();
        let now = Utc::now();
        for hours_ago in [30, 2] {
            repo.insert(&CheckIn {
                id: Uuid::new_v4(),
                user_id: user,
                hotspot_id: venue,
                checked_in_at: now - chrono::TimeDelta::hours(hours_ago),
                is_active: false,
                is_public: true,
                note: None,
            })
            .await
            .expect("insert");
        }

        let count = repo
            .count_since(user, now - chrono::TimeDelta::hours(24))
            .await
            .expect("count");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn saving_twice_reports_no_change() {
        let store = MemoryStore::new();
        MemoryHotspotRepository(store.clone())
            .insert(&hotspot("Neon Cafe"))
            .await
            .expect("insert");
        let venue = store.lock().hotspots[0].id;
        let repo = MemorySavedHotspotRepository(store);
        let user = Uuid::new_v4();

        assert!(repo.save(user, venue).await.expect("first save"));
        assert!(!repo.save(user, venue).await.expect("second save"));
        assert!(repo.is_saved(user, venue).await.expect("query"));
    }
}
