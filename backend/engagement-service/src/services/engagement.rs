use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{FilmId, ReviewId, UserId};
use crate::error::ServiceResult;
use crate::repository::{LikeStore, ReviewStore};
use crate::services::require_id;

/// Like membership plus denormalized counters, and the helpfulness votes
/// that drive review scores. Counter repair entry points live here too.
#[derive(Clone)]
pub struct EngagementService {
    likes: Arc<dyn LikeStore>,
    reviews: Arc<dyn ReviewStore>,
}

impl EngagementService {
    pub fn new(likes: Arc<dyn LikeStore>, reviews: Arc<dyn ReviewStore>) -> Self {
        Self { likes, reviews }
    }

    /// Idempotent; returns true when a like was actually created.
    pub async fn add_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool> {
        require_id(film_id, "film_id")?;
        require_id(user_id, "user_id")?;

        let inserted = self.likes.add_like(film_id, user_id).await?;
        if inserted {
            info!(film_id, user_id, "like added");
        } else {
            debug!(film_id, user_id, "duplicate like ignored");
        }
        Ok(inserted)
    }

    /// Idempotent; returns true when a like was actually deleted.
    pub async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool> {
        require_id(film_id, "film_id")?;
        require_id(user_id, "user_id")?;

        let deleted = self.likes.remove_like(film_id, user_id).await?;
        if deleted {
            info!(film_id, user_id, "like removed");
        } else {
            debug!(film_id, user_id, "no like to remove");
        }
        Ok(deleted)
    }

    pub async fn has_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool> {
        require_id(film_id, "film_id")?;
        require_id(user_id, "user_id")?;
        self.likes.has_like(film_id, user_id).await
    }

    /// The stored counter, not a membership count.
    pub async fn like_count(&self, film_id: FilmId) -> ServiceResult<i64> {
        require_id(film_id, "film_id")?;
        self.likes.like_count(film_id).await
    }

    /// Upsert the voter's vote on a review; the score moves by the polarity
    /// transition's delta. Returns the new score.
    pub async fn vote_helpful(
        &self,
        review_id: ReviewId,
        voter_id: UserId,
        helpful: bool,
    ) -> ServiceResult<i64> {
        require_id(review_id, "review_id")?;
        require_id(voter_id, "voter_id")?;

        let useful = self.reviews.cast_vote(review_id, voter_id, helpful).await?;
        debug!(review_id, voter_id, helpful, useful, "review vote recorded");
        Ok(useful)
    }

    /// Delete the voter's vote only if its polarity matches; returns whether
    /// a vote was deleted.
    pub async fn remove_vote(
        &self,
        review_id: ReviewId,
        voter_id: UserId,
        helpful: bool,
    ) -> ServiceResult<bool> {
        require_id(review_id, "review_id")?;
        require_id(voter_id, "voter_id")?;

        let deleted = self
            .reviews
            .remove_vote(review_id, voter_id, helpful)
            .await?;
        debug!(review_id, voter_id, helpful, deleted, "review vote removal");
        Ok(deleted)
    }

    /// Rewrite one film's counter from like membership.
    pub async fn recount_film_likes(&self, film_id: FilmId) -> ServiceResult<i64> {
        require_id(film_id, "film_id")?;
        let count = self.likes.recount_film_likes(film_id).await?;
        info!(film_id, count, "film like counter rebuilt");
        Ok(count)
    }

    /// Repair every drifted film counter; returns how many changed.
    pub async fn recount_all_likes(&self) -> ServiceResult<u64> {
        let repaired = self.likes.recount_all_likes().await?;
        info!(repaired, "film like counters reconciled");
        Ok(repaired)
    }

    /// Rebuild one review's score from vote membership.
    pub async fn recount_useful(&self, review_id: ReviewId) -> ServiceResult<i64> {
        require_id(review_id, "review_id")?;
        let useful = self.reviews.recount_useful(review_id).await?;
        info!(review_id, useful, "review score rebuilt");
        Ok(useful)
    }

    /// Repair every drifted review score; returns how many changed.
    pub async fn recount_all_useful(&self) -> ServiceResult<u64> {
        let repaired = self.reviews.recount_all_useful().await?;
        info!(repaired, "review scores reconciled");
        Ok(repaired)
    }
}
