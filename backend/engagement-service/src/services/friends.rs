use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{FriendRequestOutcome, FriendshipState, UserId};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::FriendshipStore;
use crate::services::require_id;

/// Friendship state machine over unordered user pairs.
#[derive(Clone)]
pub struct FriendService {
    store: Arc<dyn FriendshipStore>,
}

impl FriendService {
    pub fn new(store: Arc<dyn FriendshipStore>) -> Self {
        Self { store }
    }

    /// First request opens a pending edge; the second request on the pair
    /// confirms it, whichever side sends it. Already-mutual pairs no-op.
    pub async fn request_friend(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<FriendRequestOutcome> {
        require_id(user_id, "user_id")?;
        require_id(other_id, "other_id")?;
        if user_id == other_id {
            return Err(ServiceError::InvalidArgument(format!(
                "user {} cannot befriend themselves",
                user_id
            )));
        }

        let outcome = self.store.request_friend(user_id, other_id).await?;
        match outcome {
            FriendRequestOutcome::AlreadyFriends => {
                debug!(user_id, other_id, "friend request ignored, already mutual");
            }
            _ => {
                info!(user_id, other_id, outcome = ?outcome, "friend request applied");
            }
        }
        Ok(outcome)
    }

    /// Returns whether an edge was actually deleted.
    pub async fn remove_friend(&self, user_id: UserId, other_id: UserId) -> ServiceResult<bool> {
        require_id(user_id, "user_id")?;
        require_id(other_id, "other_id")?;

        let deleted = self.store.remove_friend(user_id, other_id).await?;
        if deleted {
            info!(user_id, other_id, "friendship removed");
        } else {
            debug!(user_id, other_id, "no friendship to remove");
        }
        Ok(deleted)
    }

    /// Ascending user ids.
    pub async fn friends_of(&self, user_id: UserId) -> ServiceResult<Vec<UserId>> {
        require_id(user_id, "user_id")?;
        self.store.friends_of(user_id).await
    }

    /// Ascending user ids in both lists.
    pub async fn common_friends(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<Vec<UserId>> {
        require_id(user_id, "user_id")?;
        require_id(other_id, "other_id")?;
        self.store.common_friends(user_id, other_id).await
    }

    pub async fn friendship_between(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<FriendshipState> {
        require_id(user_id, "user_id")?;
        require_id(other_id, "other_id")?;
        self.store.friendship_between(user_id, other_id).await
    }
}
