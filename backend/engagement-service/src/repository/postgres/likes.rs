use tracing::{debug, info};

use super::{append_feed, ensure_film, ensure_user, PgStore};
use crate::domain::{FeedEventType, FeedOperation, FilmId, UserId};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::traits::LikeStore;

#[async_trait::async_trait]
impl LikeStore for PgStore {
    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;
        ensure_film(&mut *tx, film_id).await?;
        ensure_user(&mut *tx, user_id).await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO film_likes (film_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(film_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if inserted {
            // Counter moves as an atomic delta in the same transaction as
            // the membership insert; a duplicate like never reaches here.
            sqlx::query(r#"UPDATE films SET likes_count = likes_count + 1 WHERE film_id = $1"#)
                .bind(film_id)
                .execute(&mut *tx)
                .await?;

            append_feed(
                &mut tx,
                user_id,
                FeedEventType::Like,
                FeedOperation::Add,
                film_id,
            )
            .await?;
        }

        tx.commit().await?;
        debug!(film_id, user_id, inserted, "add like");
        Ok(inserted)
    }

    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool> {
        let mut tx = self.pool.begin().await?;
        ensure_film(&mut *tx, film_id).await?;
        ensure_user(&mut *tx, user_id).await?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM film_likes
            WHERE film_id = $1 AND user_id = $2
            "#,
        )
        .bind(film_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if deleted {
            // Guarded so a drifted counter can never go negative.
            sqlx::query(
                r#"
                UPDATE films SET likes_count = likes_count - 1
                WHERE film_id = $1 AND likes_count > 0
                "#,
            )
            .bind(film_id)
            .execute(&mut *tx)
            .await?;

            append_feed(
                &mut tx,
                user_id,
                FeedEventType::Like,
                FeedOperation::Remove,
                film_id,
            )
            .await?;
        }

        tx.commit().await?;
        debug!(film_id, user_id, deleted, "remove like");
        Ok(deleted)
    }

    async fn has_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM film_likes
                WHERE film_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(film_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn like_count(&self, film_id: FilmId) -> ServiceResult<i64> {
        let count: Option<i64> =
            sqlx::query_scalar(r#"SELECT likes_count FROM films WHERE film_id = $1"#)
                .bind(film_id)
                .fetch_optional(&self.pool)
                .await?;

        count.ok_or_else(|| ServiceError::NotFound(format!("film {} not found", film_id)))
    }

    async fn recount_film_likes(&self, film_id: FilmId) -> ServiceResult<i64> {
        let likes: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE films
            SET likes_count = (
                SELECT COUNT(*) FROM film_likes
                WHERE film_likes.film_id = films.film_id
            )
            WHERE film_id = $1
            RETURNING likes_count
            "#,
        )
        .bind(film_id)
        .fetch_optional(&self.pool)
        .await?;

        let likes =
            likes.ok_or_else(|| ServiceError::NotFound(format!("film {} not found", film_id)))?;
        info!(film_id, likes, "film like counter recounted");
        Ok(likes)
    }

    async fn recount_all_likes(&self) -> ServiceResult<u64> {
        // Only rows whose counter drifted are touched.
        let repaired = sqlx::query(
            r#"
            UPDATE films
            SET likes_count = sub.cnt
            FROM (
                SELECT f.film_id, COUNT(l.user_id) AS cnt
                FROM films f
                LEFT JOIN film_likes l ON l.film_id = f.film_id
                GROUP BY f.film_id
            ) sub
            WHERE films.film_id = sub.film_id AND films.likes_count <> sub.cnt
            "#,
        )
        .execute(&self.pool)
        .await?
        .rows_affected();

        info!(repaired, "film like counters recounted");
        Ok(repaired)
    }
}
