use super::{ensure_director, PgStore};
use crate::domain::{DirectorFilmOrder, DirectorId, Film, GenreId};
use crate::error::ServiceResult;
use crate::repository::traits::RankingStore;

/// Wrap a fragment for ILIKE so it matches as literal text: wildcard and
/// escape characters in the user's input are escaped first.
fn like_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[async_trait::async_trait]
impl RankingStore for PgStore {
    async fn top_by_likes(
        &self,
        limit: i64,
        genre_id: Option<GenreId>,
        year: Option<i32>,
    ) -> ServiceResult<Vec<Film>> {
        let films = match (genre_id, year) {
            (None, None) => {
                sqlx::query_as(
                    r#"
                    SELECT film_id, name, description, release_date, duration, likes_count
                    FROM films
                    ORDER BY likes_count DESC, film_id ASC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            (Some(genre_id), None) => {
                sqlx::query_as(
                    r#"
                    SELECT film_id, name, description, release_date, duration, likes_count
                    FROM films
                    WHERE EXISTS (
                        SELECT 1 FROM film_genres
                        WHERE film_genres.film_id = films.film_id AND film_genres.genre_id = $2
                    )
                    ORDER BY likes_count DESC, film_id ASC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .bind(genre_id)
                .fetch_all(&self.pool)
                .await?
            }
            (None, Some(year)) => {
                sqlx::query_as(
                    r#"
                    SELECT film_id, name, description, release_date, duration, likes_count
                    FROM films
                    WHERE EXTRACT(YEAR FROM release_date)::INT = $2
                    ORDER BY likes_count DESC, film_id ASC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
            (Some(genre_id), Some(year)) => {
                sqlx::query_as(
                    r#"
                    SELECT film_id, name, description, release_date, duration, likes_count
                    FROM films
                    WHERE EXISTS (
                        SELECT 1 FROM film_genres
                        WHERE film_genres.film_id = films.film_id AND film_genres.genre_id = $2
                    )
                    AND EXTRACT(YEAR FROM release_date)::INT = $3
                    ORDER BY likes_count DESC, film_id ASC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .bind(genre_id)
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(films)
    }

    // Fragment searches keep the service's historical ascending-popularity
    // order; a regression test locks the direction in.

    async fn search_by_title(&self, fragment: &str) -> ServiceResult<Vec<Film>> {
        let films = sqlx::query_as(
            r#"
            SELECT film_id, name, description, release_date, duration, likes_count
            FROM films
            WHERE name ILIKE $1
            ORDER BY likes_count ASC, film_id ASC
            "#,
        )
        .bind(like_pattern(fragment))
        .fetch_all(&self.pool)
        .await?;

        Ok(films)
    }

    async fn search_by_director(&self, fragment: &str) -> ServiceResult<Vec<Film>> {
        let films = sqlx::query_as(
            r#"
            SELECT film_id, name, description, release_date, duration, likes_count
            FROM films
            WHERE EXISTS (
                SELECT 1 FROM film_directors
                JOIN directors ON directors.director_id = film_directors.director_id
                WHERE film_directors.film_id = films.film_id AND directors.name ILIKE $1
            )
            ORDER BY likes_count ASC, film_id ASC
            "#,
        )
        .bind(like_pattern(fragment))
        .fetch_all(&self.pool)
        .await?;

        Ok(films)
    }

    async fn search_by_title_or_director(&self, fragment: &str) -> ServiceResult<Vec<Film>> {
        let films = sqlx::query_as(
            r#"
            SELECT film_id, name, description, release_date, duration, likes_count
            FROM films
            WHERE name ILIKE $1
               OR EXISTS (
                    SELECT 1 FROM film_directors
                    JOIN directors ON directors.director_id = film_directors.director_id
                    WHERE film_directors.film_id = films.film_id AND directors.name ILIKE $1
               )
            ORDER BY likes_count ASC, film_id ASC
            "#,
        )
        .bind(like_pattern(fragment))
        .fetch_all(&self.pool)
        .await?;

        Ok(films)
    }

    async fn films_by_director(
        &self,
        director_id: DirectorId,
        order: DirectorFilmOrder,
    ) -> ServiceResult<Vec<Film>> {
        ensure_director(&self.pool, director_id).await?;

        let films = match order {
            DirectorFilmOrder::Likes => {
                sqlx::query_as(
                    r#"
                    SELECT films.film_id, name, description, release_date, duration, likes_count
                    FROM films
                    JOIN film_directors ON film_directors.film_id = films.film_id
                    WHERE film_directors.director_id = $1
                    ORDER BY likes_count DESC, films.film_id ASC
                    "#,
                )
                .bind(director_id)
                .fetch_all(&self.pool)
                .await?
            }
            DirectorFilmOrder::Year => {
                sqlx::query_as(
                    r#"
                    SELECT films.film_id, name, description, release_date, duration, likes_count
                    FROM films
                    JOIN film_directors ON film_directors.film_id = films.film_id
                    WHERE film_directors.director_id = $1
                    ORDER BY release_date ASC, films.film_id ASC
                    "#,
                )
                .bind(director_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(films)
    }

    async fn all_by_likes(&self) -> ServiceResult<Vec<Film>> {
        let films = sqlx::query_as(
            r#"
            SELECT film_id, name, description, release_date, duration, likes_count
            FROM films
            ORDER BY likes_count ASC, film_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(films)
    }
}
