use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type FilmId = i64;
pub type ReviewId = i64;
pub type GenreId = i64;
pub type DirectorId = i64;

/// Film record as the ranking queries return it. Genre and director sets are
/// junction tables owned by the catalog layer; ranking only filters on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Film {
    pub film_id: FilmId,
    pub name: String,
    pub description: Option<String>,
    pub release_date: NaiveDate,
    pub duration: Option<i32>,
    /// Denormalized cache over like membership; see the recount operations.
    pub likes_count: i64,
}

impl Film {
    pub fn release_year(&self) -> i32 {
        self.release_date.year()
    }
}

/// A film review. `useful` is the signed sum of helpful/unhelpful votes and
/// may be negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub review_id: ReviewId,
    pub content: String,
    /// The review's own verdict on the film
    pub is_positive: bool,
    pub user_id: UserId,
    pub film_id: FilmId,
    pub useful: i64,
}

/// Payload for creating a review; arrives structurally validated from the
/// request layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub content: String,
    pub is_positive: bool,
    pub user_id: UserId,
    pub film_id: FilmId,
}

/// Sort order for a director's filmography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectorFilmOrder {
    /// Like count descending, ties by film id ascending
    Likes,
    /// Release date ascending
    Year,
}

impl DirectorFilmOrder {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Likes => "likes",
            Self::Year => "year",
        }
    }
}

impl std::fmt::Display for DirectorFilmOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
