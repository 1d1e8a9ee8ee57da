use tracing::{debug, info};

use super::{append_feed, ensure_film, ensure_user, PgStore};
use crate::domain::{
    removal_delta, vote_delta, FeedEventType, FeedOperation, FilmId, NewReview, Review, ReviewId,
    UserId,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::traits::ReviewStore;

#[async_trait::async_trait]
impl ReviewStore for PgStore {
    async fn create_review(&self, draft: &NewReview) -> ServiceResult<Review> {
        let mut tx = self.pool.begin().await?;
        ensure_user(&mut *tx, draft.user_id).await?;
        ensure_film(&mut *tx, draft.film_id).await?;

        let review: Review = sqlx::query_as(
            r#"
            INSERT INTO reviews (content, is_positive, user_id, film_id, useful)
            VALUES ($1, $2, $3, $4, 0)
            RETURNING review_id, content, is_positive, user_id, film_id, useful
            "#,
        )
        .bind(&draft.content)
        .bind(draft.is_positive)
        .bind(draft.user_id)
        .bind(draft.film_id)
        .fetch_one(&mut *tx)
        .await?;

        append_feed(
            &mut tx,
            review.user_id,
            FeedEventType::Review,
            FeedOperation::Add,
            review.review_id,
        )
        .await?;

        tx.commit().await?;
        info!(
            review_id = review.review_id,
            film_id = review.film_id,
            "review created"
        );
        Ok(review)
    }

    async fn update_review(
        &self,
        review_id: ReviewId,
        content: &str,
        is_positive: bool,
    ) -> ServiceResult<Review> {
        let mut tx = self.pool.begin().await?;

        // Only content and the verdict are mutable; author, film and the
        // usefulness score stay as they are.
        let review: Option<Review> = sqlx::query_as(
            r#"
            UPDATE reviews SET content = $2, is_positive = $3
            WHERE review_id = $1
            RETURNING review_id, content, is_positive, user_id, film_id, useful
            "#,
        )
        .bind(review_id)
        .bind(content)
        .bind(is_positive)
        .fetch_optional(&mut *tx)
        .await?;

        let review = review
            .ok_or_else(|| ServiceError::NotFound(format!("review {} not found", review_id)))?;

        // Attributed to the review's author, not the caller.
        append_feed(
            &mut tx,
            review.user_id,
            FeedEventType::Review,
            FeedOperation::Update,
            review.review_id,
        )
        .await?;

        tx.commit().await?;
        debug!(review_id, "review updated");
        Ok(review)
    }

    async fn delete_review(&self, review_id: ReviewId) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;

        let author: Option<UserId> =
            sqlx::query_scalar(r#"SELECT user_id FROM reviews WHERE review_id = $1"#)
                .bind(review_id)
                .fetch_optional(&mut *tx)
                .await?;

        let author = author
            .ok_or_else(|| ServiceError::NotFound(format!("review {} not found", review_id)))?;

        append_feed(
            &mut tx,
            author,
            FeedEventType::Review,
            FeedOperation::Remove,
            review_id,
        )
        .await?;

        // Votes go with the review via the FK cascade.
        sqlx::query(r#"DELETE FROM reviews WHERE review_id = $1"#)
            .bind(review_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(review_id, "review deleted");
        Ok(())
    }

    async fn review_by_id(&self, review_id: ReviewId) -> ServiceResult<Review> {
        let review: Option<Review> = sqlx::query_as(
            r#"
            SELECT review_id, content, is_positive, user_id, film_id, useful
            FROM reviews
            WHERE review_id = $1
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        review.ok_or_else(|| ServiceError::NotFound(format!("review {} not found", review_id)))
    }

    async fn list_reviews(
        &self,
        film_id: Option<FilmId>,
        limit: i64,
    ) -> ServiceResult<Vec<Review>> {
        let reviews = match film_id {
            Some(film_id) => {
                ensure_film(&self.pool, film_id).await?;
                sqlx::query_as(
                    r#"
                    SELECT review_id, content, is_positive, user_id, film_id, useful
                    FROM reviews
                    WHERE film_id = $1
                    ORDER BY useful DESC, review_id ASC
                    LIMIT $2
                    "#,
                )
                .bind(film_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT review_id, content, is_positive, user_id, film_id, useful
                    FROM reviews
                    ORDER BY useful DESC, review_id ASC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(reviews)
    }

    async fn cast_vote(
        &self,
        review_id: ReviewId,
        voter_id: UserId,
        helpful: bool,
    ) -> ServiceResult<i64> {
        let mut tx = self.pool.begin().await?;
        ensure_user(&mut *tx, voter_id).await?;

        // Lock the review row; concurrent votes for one review serialize
        // here, so the delta below is computed against a stable vote state.
        let current: Option<i64> =
            sqlx::query_scalar(r#"SELECT useful FROM reviews WHERE review_id = $1 FOR UPDATE"#)
                .bind(review_id)
                .fetch_optional(&mut *tx)
                .await?;
        let current = current
            .ok_or_else(|| ServiceError::NotFound(format!("review {} not found", review_id)))?;

        let previous: Option<bool> = sqlx::query_scalar(
            r#"SELECT is_helpful FROM review_votes WHERE review_id = $1 AND user_id = $2"#,
        )
        .bind(review_id)
        .bind(voter_id)
        .fetch_optional(&mut *tx)
        .await?;

        if previous == Some(helpful) {
            tx.commit().await?;
            return Ok(current);
        }

        sqlx::query(
            r#"
            INSERT INTO review_votes (review_id, user_id, is_helpful)
            VALUES ($1, $2, $3)
            ON CONFLICT (review_id, user_id) DO UPDATE SET is_helpful = EXCLUDED.is_helpful
            "#,
        )
        .bind(review_id)
        .bind(voter_id)
        .bind(helpful)
        .execute(&mut *tx)
        .await?;

        let delta = vote_delta(previous, helpful);
        let useful: i64 = sqlx::query_scalar(
            r#"UPDATE reviews SET useful = useful + $2 WHERE review_id = $1 RETURNING useful"#,
        )
        .bind(review_id)
        .bind(delta)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(review_id, voter_id, helpful, delta, useful, "vote cast");
        Ok(useful)
    }

    async fn remove_vote(
        &self,
        review_id: ReviewId,
        voter_id: UserId,
        helpful: bool,
    ) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;
        ensure_user(&mut *tx, voter_id).await?;

        let exists: Option<i64> =
            sqlx::query_scalar(r#"SELECT useful FROM reviews WHERE review_id = $1 FOR UPDATE"#)
                .bind(review_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(ServiceError::NotFound(format!(
                "review {} not found",
                review_id
            )));
        }

        // The polarity filter is part of the delete; a mismatched vote
        // stays untouched.
        let deleted = sqlx::query(
            r#"
            DELETE FROM review_votes
            WHERE review_id = $1 AND user_id = $2 AND is_helpful = $3
            "#,
        )
        .bind(review_id)
        .bind(voter_id)
        .bind(helpful)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if deleted {
            sqlx::query(r#"UPDATE reviews SET useful = useful + $2 WHERE review_id = $1"#)
                .bind(review_id)
                .bind(removal_delta(helpful))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(review_id, voter_id, helpful, deleted, "vote removed");
        Ok(deleted)
    }

    async fn recount_useful(&self, review_id: ReviewId) -> ServiceResult<i64> {
        let useful: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE reviews
            SET useful = COALESCE((
                SELECT SUM(CASE WHEN is_helpful THEN 1 ELSE -1 END)
                FROM review_votes
                WHERE review_votes.review_id = reviews.review_id
            ), 0)
            WHERE review_id = $1
            RETURNING useful
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;

        let useful = useful
            .ok_or_else(|| ServiceError::NotFound(format!("review {} not found", review_id)))?;
        info!(review_id, useful, "review usefulness recounted");
        Ok(useful)
    }

    async fn recount_all_useful(&self) -> ServiceResult<u64> {
        let repaired = sqlx::query(
            r#"
            UPDATE reviews
            SET useful = sub.score
            FROM (
                SELECT r.review_id,
                       COALESCE(SUM(CASE WHEN v.is_helpful THEN 1 ELSE -1 END), 0) AS score
                FROM reviews r
                LEFT JOIN review_votes v ON v.review_id = r.review_id
                GROUP BY r.review_id
            ) sub
            WHERE reviews.review_id = sub.review_id AND reviews.useful <> sub.score
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        info!(repaired, "review usefulness scores recounted");
        Ok(repaired)
    }
}
