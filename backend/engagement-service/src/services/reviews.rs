use std::sync::Arc;

use tracing::info;

use crate::domain::{FilmId, NewReview, Review, ReviewId};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::ReviewStore;
use crate::services::require_id;

/// Page size used when a listing asks for zero reviews.
pub const DEFAULT_REVIEW_PAGE: i64 = 10;

/// Review lifecycle. Votes and score repair live on `EngagementService`.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn ReviewStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn ReviewStore>) -> Self {
        Self { store }
    }

    /// New reviews start with a zero usefulness score.
    pub async fn create_review(&self, draft: NewReview) -> ServiceResult<Review> {
        require_id(draft.user_id, "user_id")?;
        require_id(draft.film_id, "film_id")?;
        require_content(&draft.content)?;

        let review = self.store.create_review(&draft).await?;
        info!(
            review_id = review.review_id,
            user_id = review.user_id,
            film_id = review.film_id,
            "review created"
        );
        Ok(review)
    }

    /// Only content and the verdict change; author, film and score are
    /// immutable through update.
    pub async fn update_review(
        &self,
        review_id: ReviewId,
        content: &str,
        is_positive: bool,
    ) -> ServiceResult<Review> {
        require_id(review_id, "review_id")?;
        require_content(content)?;

        let review = self.store.update_review(review_id, content, is_positive).await?;
        info!(review_id, "review updated");
        Ok(review)
    }

    /// Votes on the review are deleted with it.
    pub async fn delete_review(&self, review_id: ReviewId) -> ServiceResult<()> {
        require_id(review_id, "review_id")?;
        self.store.delete_review(review_id).await?;
        info!(review_id, "review deleted");
        Ok(())
    }

    pub async fn review_by_id(&self, review_id: ReviewId) -> ServiceResult<Review> {
        require_id(review_id, "review_id")?;
        self.store.review_by_id(review_id).await
    }

    /// Reviews for one film, or across all films when `film_id` is `None`,
    /// most useful first. A zero count asks for the default page.
    pub async fn list_reviews(
        &self,
        film_id: Option<FilmId>,
        count: i64,
    ) -> ServiceResult<Vec<Review>> {
        if let Some(film_id) = film_id {
            require_id(film_id, "film_id")?;
        }
        if count < 0 {
            return Err(ServiceError::InvalidArgument(format!(
                "count must not be negative, got {}",
                count
            )));
        }
        let limit = if count == 0 { DEFAULT_REVIEW_PAGE } else { count };
        self.store.list_reviews(film_id, limit).await
    }
}

fn require_content(content: &str) -> ServiceResult<()> {
    if content.trim().is_empty() {
        Err(ServiceError::InvalidArgument(
            "review content must not be blank".to_string(),
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;

    #[tokio::test]
    async fn test_blank_content_is_rejected() {
        let svc = ReviewService::new(Arc::new(InMemoryStore::new()));
        let draft = NewReview {
            content: "   ".to_string(),
            is_positive: true,
            user_id: 1,
            film_id: 1,
        };
        assert!(matches!(
            svc.create_review(draft).await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_negative_count_is_rejected() {
        let svc = ReviewService::new(Arc::new(InMemoryStore::new()));
        assert!(matches!(
            svc.list_reviews(None, -1).await,
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_count_means_default_page() {
        let store = Arc::new(InMemoryStore::new());
        store.seed_user(1).await;
        store
            .seed_film(1, "Solaris", chrono::NaiveDate::from_ymd_opt(1972, 3, 20).unwrap())
            .await;
        let svc = ReviewService::new(store);

        for i in 0..12 {
            svc.create_review(NewReview {
                content: format!("take {}", i),
                is_positive: true,
                user_id: 1,
                film_id: 1,
            })
            .await
            .unwrap();
        }

        let page = svc.list_reviews(Some(1), 0).await.unwrap();
        assert_eq!(page.len() as i64, DEFAULT_REVIEW_PAGE);
    }
}
