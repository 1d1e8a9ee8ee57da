use tracing::debug;

use super::{append_feed, ensure_user, PgStore};
use crate::domain::{FeedEventType, FeedOperation, FriendRequestOutcome, FriendshipState, UserId};
use crate::error::ServiceResult;
use crate::repository::traits::FriendshipStore;

#[async_trait::async_trait]
impl FriendshipStore for PgStore {
    async fn request_friend(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<FriendRequestOutcome> {
        let mut tx = self.pool.begin().await?;
        ensure_user(&mut *tx, user_id).await?;
        ensure_user(&mut *tx, other_id).await?;

        // Single statement closes the exists-then-create race: the unordered
        // pair is unique, an existing edge is confirmed whichever way it
        // points, and an already-confirmed edge matches nothing.
        let accepted: Option<bool> = sqlx::query_scalar(
            r#"
            INSERT INTO friendship (from_user_id, to_user_id, accepted)
            VALUES ($1, $2, FALSE)
            ON CONFLICT ((LEAST(from_user_id, to_user_id)), (GREATEST(from_user_id, to_user_id)))
            DO UPDATE SET accepted = TRUE
            WHERE NOT friendship.accepted
            RETURNING accepted
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match accepted {
            Some(false) => FriendRequestOutcome::Requested,
            Some(true) => FriendRequestOutcome::Confirmed,
            None => FriendRequestOutcome::AlreadyFriends,
        };

        if outcome.changed_state() {
            append_feed(
                &mut tx,
                user_id,
                FeedEventType::Friend,
                FeedOperation::Add,
                other_id,
            )
            .await?;
        }

        tx.commit().await?;
        debug!(user_id, other_id, ?outcome, "friend request");
        Ok(outcome)
    }

    async fn remove_friend(&self, user_id: UserId, other_id: UserId) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;
        ensure_user(&mut *tx, user_id).await?;
        ensure_user(&mut *tx, other_id).await?;

        let was_mutual: Option<bool> = sqlx::query_scalar(
            r#"
            DELETE FROM friendship
            WHERE (from_user_id = $1 AND to_user_id = $2)
               OR (from_user_id = $2 AND to_user_id = $1)
            RETURNING accepted
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(was_mutual) = was_mutual else {
            tx.commit().await?;
            return Ok(false);
        };

        if was_mutual {
            // Tearing down a confirmed friendship leaves the other party
            // with an open request toward the remover.
            sqlx::query(
                r#"
                INSERT INTO friendship (from_user_id, to_user_id, accepted)
                VALUES ($1, $2, FALSE)
                "#,
            )
            .bind(other_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        append_feed(
            &mut tx,
            user_id,
            FeedEventType::Friend,
            FeedOperation::Remove,
            other_id,
        )
        .await?;

        tx.commit().await?;
        debug!(user_id, other_id, was_mutual, "friend removed");
        Ok(true)
    }

    async fn friends_of(&self, user_id: UserId) -> ServiceResult<Vec<UserId>> {
        ensure_user(&self.pool, user_id).await?;

        let friends: Vec<UserId> = sqlx::query_scalar(
            r#"
            SELECT to_user_id AS friend_id FROM friendship WHERE from_user_id = $1
            UNION
            SELECT from_user_id FROM friendship WHERE to_user_id = $1 AND accepted
            ORDER BY friend_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn common_friends(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<Vec<UserId>> {
        ensure_user(&self.pool, user_id).await?;
        ensure_user(&self.pool, other_id).await?;

        // Both friend sets in one statement, so the intersection is taken
        // over a single snapshot.
        let friends: Vec<UserId> = sqlx::query_scalar(
            r#"
            SELECT friend_id FROM (
                SELECT to_user_id AS friend_id FROM friendship WHERE from_user_id = $1
                UNION
                SELECT from_user_id FROM friendship WHERE to_user_id = $1 AND accepted
            ) AS mine
            INTERSECT
            SELECT friend_id FROM (
                SELECT to_user_id AS friend_id FROM friendship WHERE from_user_id = $2
                UNION
                SELECT from_user_id FROM friendship WHERE to_user_id = $2 AND accepted
            ) AS theirs
            ORDER BY friend_id
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn friendship_between(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<FriendshipState> {
        ensure_user(&self.pool, user_id).await?;
        ensure_user(&self.pool, other_id).await?;

        let edge: Option<(UserId, UserId, bool)> = sqlx::query_as(
            r#"
            SELECT from_user_id, to_user_id, accepted FROM friendship
            WHERE (from_user_id = $1 AND to_user_id = $2)
               OR (from_user_id = $2 AND to_user_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match edge {
            None => FriendshipState::None,
            Some((_, _, true)) => FriendshipState::Mutual,
            Some((from, to, false)) => FriendshipState::Pending { from, to },
        })
    }
}
