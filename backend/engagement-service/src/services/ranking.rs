use std::sync::Arc;

use crate::domain::{DirectorFilmOrder, DirectorId, Film, GenreId};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::RankingStore;
use crate::services::require_id;

/// Read-only ranking and search over films. Top-N orders by like count
/// descending; fragment searches order ascending, which reproduces the
/// behavior users and tests already depend on.
#[derive(Clone)]
pub struct RankingService {
    store: Arc<dyn RankingStore>,
}

impl RankingService {
    pub fn new(store: Arc<dyn RankingStore>) -> Self {
        Self { store }
    }

    /// Top `limit` films, optionally filtered by genre membership and/or
    /// release year. A filter that matches nothing yields an empty list.
    pub async fn top_by_likes(
        &self,
        limit: i64,
        genre_id: Option<GenreId>,
        year: Option<i32>,
    ) -> ServiceResult<Vec<Film>> {
        if limit < 1 {
            return Err(ServiceError::InvalidArgument(format!(
                "limit must be at least 1, got {}",
                limit
            )));
        }
        if let Some(genre_id) = genre_id {
            require_id(genre_id, "genre_id")?;
        }
        self.store.top_by_likes(limit, genre_id, year).await
    }

    pub async fn search_by_title(&self, fragment: &str) -> ServiceResult<Vec<Film>> {
        require_fragment(fragment)?;
        self.store.search_by_title(fragment).await
    }

    pub async fn search_by_director(&self, fragment: &str) -> ServiceResult<Vec<Film>> {
        require_fragment(fragment)?;
        self.store.search_by_director(fragment).await
    }

    pub async fn search_by_title_or_director(&self, fragment: &str) -> ServiceResult<Vec<Film>> {
        require_fragment(fragment)?;
        self.store.search_by_title_or_director(fragment).await
    }

    /// A director's films by likes (descending) or by release year
    /// (ascending). An empty filmography is a valid empty result.
    pub async fn films_by_director(
        &self,
        director_id: DirectorId,
        order: DirectorFilmOrder,
    ) -> ServiceResult<Vec<Film>> {
        require_id(director_id, "director_id")?;
        self.store.films_by_director(director_id, order).await
    }

    /// Every film by like count ascending.
    pub async fn all_by_likes(&self) -> ServiceResult<Vec<Film>> {
        self.store.all_by_likes().await
    }
}

fn require_fragment(fragment: &str) -> ServiceResult<()> {
    if fragment.trim().is_empty() {
        Err(ServiceError::InvalidArgument(
            "search fragment must not be blank".to_string(),
        ))
    } else {
        Ok(())
    }
}
