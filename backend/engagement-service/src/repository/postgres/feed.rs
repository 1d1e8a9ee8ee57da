use super::{append_feed, ensure_user, PgStore};
use crate::domain::{FeedEvent, FeedEventType, FeedOperation, UserId};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::traits::FeedStore;

#[async_trait::async_trait]
impl FeedStore for PgStore {
    async fn record(
        &self,
        user_id: UserId,
        event_type: FeedEventType,
        operation: FeedOperation,
        entity_id: i64,
    ) -> ServiceResult<FeedEvent> {
        let mut tx = self.pool.begin().await?;
        ensure_user(&mut *tx, user_id).await?;
        let event = append_feed(&mut tx, user_id, event_type, operation, entity_id).await?;
        tx.commit().await?;
        Ok(event)
    }

    async fn feed_for_user(&self, user_id: UserId) -> ServiceResult<Vec<FeedEvent>> {
        ensure_user(&self.pool, user_id).await?;

        let rows: Vec<(i64, i64, i64, i16, i16, i64)> = sqlx::query_as(
            r#"
            SELECT event_id, event_ts, user_id, event_type, operation, entity_id
            FROM feeds
            WHERE user_id = $1
            ORDER BY event_ts ASC, event_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(decode_feed_row).collect()
    }
}

fn decode_feed_row(
    (event_id, event_ts, user_id, type_code, op_code, entity_id): (i64, i64, i64, i16, i16, i64),
) -> ServiceResult<FeedEvent> {
    let event_type = FeedEventType::from_code(type_code).ok_or_else(|| {
        ServiceError::Internal(format!("unknown feed event type code {}", type_code))
    })?;
    let operation = FeedOperation::from_code(op_code)
        .ok_or_else(|| ServiceError::Internal(format!("unknown feed operation code {}", op_code)))?;

    Ok(FeedEvent {
        event_id,
        event_ts,
        user_id,
        event_type,
        operation,
        entity_id,
    })
}
