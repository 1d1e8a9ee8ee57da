use std::sync::Arc;

use tracing::debug;

use crate::domain::{FeedEvent, FeedEventType, FeedOperation, UserId};
use crate::error::ServiceResult;
use crate::repository::FeedStore;
use crate::services::require_id;

/// Append-only activity log. Mutating services write their feed entries
/// inside their own store transactions; this is the standalone surface for
/// the same append plus the per-user readout.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn FeedStore>,
}

impl FeedService {
    pub fn new(store: Arc<dyn FeedStore>) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        user_id: UserId,
        event_type: FeedEventType,
        operation: FeedOperation,
        entity_id: i64,
    ) -> ServiceResult<FeedEvent> {
        require_id(user_id, "user_id")?;
        require_id(entity_id, "entity_id")?;

        let event = self
            .store
            .record(user_id, event_type, operation, entity_id)
            .await?;
        debug!(
            event_id = event.event_id,
            user_id,
            event_type = %event_type,
            operation = %operation,
            entity_id,
            "feed event recorded"
        );
        Ok(event)
    }

    /// Oldest first, ties by event id.
    pub async fn feed_for_user(&self, user_id: UserId) -> ServiceResult<Vec<FeedEvent>> {
        require_id(user_id, "user_id")?;
        self.store.feed_for_user(user_id).await
    }
}
