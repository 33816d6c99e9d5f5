//! Friend request lifecycle domain service.
//!
//! Send, accept, reject, and cancel requests; maintain friendship rows;
//! and answer the relationship status shown on profiles. Accepting a
//! request writes the status change and the friendship row as separate
//! statements; a failed friendship insert is logged and does not undo the
//! accepted status.

use std::sync::Arc;

use mockable::Clock;
use tracing::warn;
use uuid::Uuid;

use super::Error;
use super::check_in_service::build_notification;
use super::friends::{FriendEntry, FriendRequest, FriendRequestStatus, FriendStatus, Friendship};
use super::notification::{NewNotification, NotificationKind};
use super::ports::{FriendRepository, NotificationRepository, ProfileRepository};

/// Service driving friend requests and friendships.
pub struct FriendService {
    friends: Arc<dyn FriendRepository>,
    profiles: Arc<dyn ProfileRepository>,
    notifications: Arc<dyn NotificationRepository>,
    clock: Arc<dyn Clock>,
}

impl FriendService {
    /// Wire the service to its repositories and clock.
    pub fn new(
        friends: Arc<dyn FriendRepository>,
        profiles: Arc<dyn ProfileRepository>,
        notifications: Arc<dyn NotificationRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            friends,
            profiles,
            notifications,
            clock,
        }
    }

    /// Send a friend request from `sender_id` to `receiver_id`.
    ///
    /// A rejected request between the pair is reset to pending with the
    /// current orientation, so either side can reopen contact.
    pub async fn send_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<FriendRequest, Error> {
        if sender_id == receiver_id {
            return Err(Error::invalid_request("cannot befriend yourself"));
        }
        self.profiles
            .find_by_id(receiver_id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))?;
        if self
            .friends
            .find_friendship_between(sender_id, receiver_id)
            .await?
            .is_some()
        {
            return Err(Error::invalid_request("Already friends"));
        }

        let request = match self
            .friends
            .find_request_between(sender_id, receiver_id)
            .await?
        {
            Some(existing) => match existing.status {
                FriendRequestStatus::Accepted => {
                    return Err(Error::invalid_request("Already friends"));
                }
                FriendRequestStatus::Pending => {
                    return Err(Error::invalid_request("Request already pending"));
                }
                FriendRequestStatus::Rejected => {
                    let reset = FriendRequest {
                        id: existing.id,
                        sender_id,
                        receiver_id,
                        status: FriendRequestStatus::Pending,
                        created_at: self.clock.utc(),
                    };
                    if !self.friends.update_request(&reset).await? {
                        return Err(Error::not_found("friend request not found"));
                    }
                    reset
                }
            },
            None => {
                let request = FriendRequest {
                    id: Uuid::new_v4(),
                    sender_id,
                    receiver_id,
                    status: FriendRequestStatus::Pending,
                    created_at: self.clock.utc(),
                };
                self.friends.insert_request(&request).await?;
                request
            }
        };

        self.notify(
            receiver_id,
            sender_id,
            NotificationKind::FriendRequest,
            format!(
                "{} sent you a friend request",
                self.display_name(sender_id).await
            ),
        )
        .await;
        Ok(request)
    }

    /// Accept a pending request addressed to `user_id`.
    pub async fn accept_request(&self, request_id: Uuid, user_id: Uuid) -> Result<(), Error> {
        let request = self.pending_request(request_id).await?;
        if request.receiver_id != user_id {
            return Err(Error::forbidden("only the receiver can accept a request"));
        }

        let accepted = FriendRequest {
            status: FriendRequestStatus::Accepted,
            ..request.clone()
        };
        if !self.friends.update_request(&accepted).await? {
            return Err(Error::not_found("friend request not found"));
        }

        let friendship = Friendship {
            id: Uuid::new_v4(),
            user_id_1: request.sender_id,
            user_id_2: request.receiver_id,
            created_at: self.clock.utc(),
        };
        if let Err(error) = self.friends.insert_friendship(&friendship).await {
            warn!(request_id = %request.id, %error, "friendship insert failed after accept");
            return Err(error.into());
        }

        self.notify(
            request.sender_id,
            user_id,
            NotificationKind::FriendAccept,
            format!(
                "{} accepted your friend request",
                self.display_name(user_id).await
            ),
        )
        .await;
        Ok(())
    }

    /// Reject a pending request addressed to `user_id`.
    pub async fn reject_request(&self, request_id: Uuid, user_id: Uuid) -> Result<(), Error> {
        let request = self.pending_request(request_id).await?;
        if request.receiver_id != user_id {
            return Err(Error::forbidden("only the receiver can reject a request"));
        }
        let rejected = FriendRequest {
            status: FriendRequestStatus::Rejected,
            ..request
        };
        if !self.friends.update_request(&rejected).await? {
            return Err(Error::not_found("friend request not found"));
        }
        Ok(())
    }

    /// Cancel a pending request sent by `user_id`.
    pub async fn cancel_request(&self, request_id: Uuid, user_id: Uuid) -> Result<(), Error> {
        let request = self.pending_request(request_id).await?;
        if request.sender_id != user_id {
            return Err(Error::forbidden("only the sender can cancel a request"));
        }
        if !self.friends.delete_request(request_id).await? {
            return Err(Error::not_found("friend request not found"));
        }
        Ok(())
    }

    /// Dissolve a friendship `user_id` belongs to, and clear the request
    /// row between the pair so either side can start over.
    pub async fn remove_friend(&self, friendship_id: Uuid, user_id: Uuid) -> Result<(), Error> {
        let friendship = self
            .friends
            .find_friendship(friendship_id)
            .await?
            .ok_or_else(|| Error::not_found("friendship not found"))?;
        let Some(counterpart) = friendship.counterpart_of(user_id) else {
            return Err(Error::forbidden("not a member of this friendship"));
        };
        if !self.friends.delete_friendship(friendship_id).await? {
            return Err(Error::not_found("friendship not found"));
        }
        if let Some(request) = self
            .friends
            .find_request_between(user_id, counterpart)
            .await?
        {
            if let Err(error) = self.friends.delete_request(request.id).await {
                warn!(request_id = %request.id, %error, "stale friend request left behind");
            }
        }
        Ok(())
    }

    /// The user's friends with their profile fields.
    pub async fn list_friends(&self, user_id: Uuid) -> Result<Vec<FriendEntry>, Error> {
        Ok(self.friends.list_friends(user_id).await?)
    }

    /// Relationship between `user_id` and `other_id`.
    pub async fn friend_status(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<FriendStatus, Error> {
        if self
            .friends
            .find_friendship_between(user_id, other_id)
            .await?
            .is_some()
        {
            return Ok(FriendStatus::Friends);
        }
        let status = match self
            .friends
            .find_request_between(user_id, other_id)
            .await?
        {
            Some(request) => match request.status {
                FriendRequestStatus::Accepted => FriendStatus::Friends,
                FriendRequestStatus::Pending if request.sender_id == user_id => {
                    FriendStatus::Sent
                }
                FriendRequestStatus::Pending => FriendStatus::Received,
                FriendRequestStatus::Rejected => FriendStatus::None,
            },
            None => FriendStatus::None,
        };
        Ok(status)
    }

    async fn pending_request(&self, request_id: Uuid) -> Result<FriendRequest, Error> {
        let request = self
            .friends
            .find_request(request_id)
            .await?
            .ok_or_else(|| Error::not_found("friend request not found"))?;
        if request.status != FriendRequestStatus::Pending {
            return Err(Error::invalid_request("friend request is not pending"));
        }
        Ok(request)
    }

    async fn display_name(&self, user_id: Uuid) -> String {
        match self.profiles.find_by_id(user_id).await {
            Ok(profile) => profile
                .and_then(|p| p.username)
                .unwrap_or_else(|| "Someone".to_owned()),
            Err(_) => "Someone".to_owned(),
        }
    }

    async fn notify(
        &self,
        recipient: Uuid,
        actor: Uuid,
        kind: NotificationKind,
        message: String,
    ) {
        let notification = build_notification(
            NewNotification {
                user_id: recipient,
                actor_id: actor,
                kind,
                message,
            },
            self.clock.as_ref(),
        );
        if let Err(error) = self.notifications.insert(&notification).await {
            warn!(%recipient, %error, "notification insert failed");
        }
    }
}

#[cfg(test)]
#[path = "friend_service_tests.rs"]
mod tests;
