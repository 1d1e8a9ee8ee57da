pub mod engagement;
pub mod feed;
pub mod friends;
pub mod ranking;
pub mod reviews;

pub use engagement::EngagementService;
pub use feed::FeedService;
pub use friends::FriendService;
pub use ranking::RankingService;
pub use reviews::{ReviewService, DEFAULT_REVIEW_PAGE};

use crate::error::{ServiceError, ServiceResult};

/// Identifiers are positive; anything else fails before the store is touched.
pub(crate) fn require_id(value: i64, field: &str) -> ServiceResult<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(ServiceError::InvalidArgument(format!(
            "{} must be positive, got {}",
            field, value
        )))
    }
}
