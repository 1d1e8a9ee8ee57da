//! PostgreSQL-backed store.
//!
//! One `PgStore` implements every store contract; the per-concern modules
//! hold the trait impls. Mutations run inside a single transaction that also
//! carries the paired feed append, so either everything lands or nothing
//! does.

mod feed;
mod friendships;
mod likes;
mod ranking;
mod reviews;

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{DirectorId, FeedEvent, FeedEventType, FeedOperation, FilmId, UserId};
use crate::error::{ServiceError, ServiceResult};

/// PostgreSQL store for friendships, likes, reviews, feed and ranking.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// Existence probes, generic over the executor so they run inside the
// caller's transaction when one is open.

async fn user_exists<'e, E>(executor: E, user_id: UserId) -> ServiceResult<bool>
where
    E: sqlx::PgExecutor<'e>,
{
    let exists: bool =
        sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)"#)
            .bind(user_id)
            .fetch_one(executor)
            .await?;
    Ok(exists)
}

pub(crate) async fn ensure_user<'e, E>(executor: E, user_id: UserId) -> ServiceResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    if user_exists(executor, user_id).await? {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!(
            "user {} not found",
            user_id
        )))
    }
}

pub(crate) async fn ensure_film<'e, E>(executor: E, film_id: FilmId) -> ServiceResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    let exists: bool =
        sqlx::query_scalar(r#"SELECT EXISTS(SELECT 1 FROM films WHERE film_id = $1)"#)
            .bind(film_id)
            .fetch_one(executor)
            .await?;
    if exists {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!(
            "film {} not found",
            film_id
        )))
    }
}

pub(crate) async fn ensure_director<'e, E>(
    executor: E,
    director_id: DirectorId,
) -> ServiceResult<()>
where
    E: sqlx::PgExecutor<'e>,
{
    let exists: bool = sqlx::query_scalar(
        r#"SELECT EXISTS(SELECT 1 FROM directors WHERE director_id = $1)"#,
    )
    .bind(director_id)
    .fetch_one(executor)
    .await?;
    if exists {
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!(
            "director {} not found",
            director_id
        )))
    }
}

/// Append one feed row inside the caller's transaction. The caller decides
/// whether the mutation was feed-worthy; this only writes the row.
pub(crate) async fn append_feed(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
    event_type: FeedEventType,
    operation: FeedOperation,
    entity_id: i64,
) -> ServiceResult<FeedEvent> {
    let event_ts = Utc::now().timestamp_millis();
    let event_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO feeds (event_ts, user_id, event_type, operation, entity_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING event_id
        "#,
    )
    .bind(event_ts)
    .bind(user_id)
    .bind(event_type.code())
    .bind(operation.code())
    .bind(entity_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(FeedEvent {
        event_id,
        event_ts,
        user_id,
        event_type,
        operation,
        entity_id,
    })
}
