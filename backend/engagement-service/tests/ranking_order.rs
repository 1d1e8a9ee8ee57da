//! Ranking and search ordering tests over the in-memory store.
//!
//! These tests verify:
//! 1. Top-N descending with ascending-id tie break, plus genre/year filters
//! 2. Fragment search ordering ascending by popularity (locked direction)
//! 3. Case-insensitive, literal-text matching
//! 4. Director filmography orders

use std::sync::Arc;

use chrono::NaiveDate;

use engagement_service::domain::DirectorFilmOrder;
use engagement_service::repository::InMemoryStore;
use engagement_service::services::{EngagementService, RankingService};
use engagement_service::ServiceError;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// Films 1..=4 with 2, 0, 1 and 2 likes respectively; film 1 and 2 are
/// dramas from 1972, film 3 a 1979 drama, film 4 a 1986 documentary.
async fn fixture() -> (Arc<InMemoryStore>, RankingService) {
    let store = Arc::new(InMemoryStore::new());
    for user_id in 1..=3 {
        store.seed_user(user_id).await;
    }
    store.seed_film(1, "Solaris", date(1972, 3, 20)).await;
    store.seed_film(2, "Silent Running", date(1972, 3, 10)).await;
    store.seed_film(3, "Stalker", date(1979, 5, 25)).await;
    store.seed_film(4, "Chronicle of a Summer", date(1986, 1, 1)).await;

    store.seed_genre(1, "Drama").await;
    store.seed_genre(2, "Documentary").await;
    for film_id in [1, 2, 3] {
        store.tag_genre(film_id, 1).await;
    }
    store.tag_genre(4, 2).await;

    store.seed_director(1, "Andrei Tarkovsky").await;
    store.seed_director(2, "Douglas Trumbull").await;
    store.credit_director(1, 1).await;
    store.credit_director(3, 1).await;
    store.credit_director(2, 2).await;

    let engagement = EngagementService::new(store.clone(), store.clone());
    for user_id in [1, 2] {
        engagement.add_like(1, user_id).await.expect("like film 1");
        engagement.add_like(4, user_id).await.expect("like film 4");
    }
    engagement.add_like(3, 1).await.expect("like film 3");

    let ranking = RankingService::new(store.clone());
    (store, ranking)
}

fn ids(films: &[engagement_service::Film]) -> Vec<i64> {
    films.iter().map(|film| film.film_id).collect()
}

#[tokio::test]
async fn test_top_orders_descending_with_id_tie_break() {
    let (_store, ranking) = fixture().await;

    // Films 1 and 4 tie at two likes; the lower id wins the tie.
    let top = ranking.top_by_likes(10, None, None).await.expect("top");
    assert_eq!(ids(&top), vec![1, 4, 3, 2]);

    let top = ranking.top_by_likes(2, None, None).await.expect("top");
    assert_eq!(ids(&top), vec![1, 4]);
}

#[tokio::test]
async fn test_top_genre_filter() {
    let (_store, ranking) = fixture().await;

    let dramas = ranking.top_by_likes(10, Some(1), None).await.expect("top");
    assert_eq!(ids(&dramas), vec![1, 3, 2]);

    let documentaries = ranking.top_by_likes(10, Some(2), None).await.expect("top");
    assert_eq!(ids(&documentaries), vec![4]);
}

#[tokio::test]
async fn test_top_year_filter() {
    let (_store, ranking) = fixture().await;

    let from_1972 = ranking
        .top_by_likes(10, None, Some(1972))
        .await
        .expect("top");
    assert_eq!(ids(&from_1972), vec![1, 2]);
}

#[tokio::test]
async fn test_top_combined_filters_and_empty_matches() {
    let (_store, ranking) = fixture().await;

    let dramas_1972 = ranking
        .top_by_likes(10, Some(1), Some(1972))
        .await
        .expect("top");
    assert_eq!(ids(&dramas_1972), vec![1, 2]);

    // A filter that matches nothing is an empty list, not an error.
    let none = ranking
        .top_by_likes(10, Some(2), Some(1972))
        .await
        .expect("top");
    assert!(none.is_empty());
    let no_year = ranking
        .top_by_likes(10, None, Some(1844))
        .await
        .expect("top");
    assert!(no_year.is_empty());
}

#[tokio::test]
async fn test_search_keeps_ascending_popularity_order() {
    let (_store, ranking) = fixture().await;

    // "S" hits Solaris (2), Silent Running (0), Stalker (1), Chronicle of a
    // Summer (2). Search results rank least-liked first; changing this
    // direction is a behavior change and must rewrite this test.
    let found = ranking.search_by_title("s").await.expect("search");
    assert_eq!(ids(&found), vec![2, 3, 1, 4]);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let (_store, ranking) = fixture().await;

    let lower = ranking.search_by_title("stalker").await.expect("search");
    let upper = ranking.search_by_title("STALKER").await.expect("search");
    assert_eq!(ids(&lower), vec![3]);
    assert_eq!(ids(&lower), ids(&upper));
}

#[tokio::test]
async fn test_search_by_director_name() {
    let (_store, ranking) = fixture().await;

    let found = ranking
        .search_by_director("tarkovsky")
        .await
        .expect("search");
    // Tarkovsky directed films 3 (1 like) and 1 (2 likes), ascending.
    assert_eq!(ids(&found), vec![3, 1]);
}

#[tokio::test]
async fn test_search_title_or_director_is_a_union() {
    let (_store, ranking) = fixture().await;

    // "run" matches Silent Running by title; "trumbull" by director only.
    let by_title = ranking
        .search_by_title_or_director("run")
        .await
        .expect("search");
    assert_eq!(ids(&by_title), vec![2]);

    let by_director = ranking
        .search_by_title_or_director("trumbull")
        .await
        .expect("search");
    assert_eq!(ids(&by_director), vec![2]);

    // "s" matches every film by one predicate or the other, still ascending.
    let union = ranking
        .search_by_title_or_director("s")
        .await
        .expect("search");
    assert_eq!(ids(&union), vec![2, 3, 1, 4]);
}

#[tokio::test]
async fn test_search_fragment_is_literal_text() {
    let (store, ranking) = fixture().await;
    store.seed_film(5, "100% Wolf", date(2020, 5, 14)).await;

    // Wildcard characters in the fragment match only themselves.
    let found = ranking.search_by_title("0% w").await.expect("search");
    assert_eq!(ids(&found), vec![5]);
    let none = ranking.search_by_title("%_%").await.expect("search");
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_films_by_director_orders() {
    let (store, ranking) = fixture().await;

    // A filmography whose popularity order inverts its release order.
    store.seed_director(4, "Robert Zemeckis").await;
    store.seed_film(10, "Used Cars", date(1980, 7, 11)).await;
    store.seed_film(11, "Back to the Future", date(1985, 7, 3)).await;
    store.credit_director(10, 4).await;
    store.credit_director(11, 4).await;

    let engagement = EngagementService::new(store.clone(), store.clone());
    engagement.add_like(10, 1).await.expect("like");
    engagement.add_like(11, 1).await.expect("like");
    engagement.add_like(11, 2).await.expect("like");

    let by_likes = ranking
        .films_by_director(4, DirectorFilmOrder::Likes)
        .await
        .expect("by likes");
    assert_eq!(ids(&by_likes), vec![11, 10]);

    let by_year = ranking
        .films_by_director(4, DirectorFilmOrder::Year)
        .await
        .expect("by year");
    assert_eq!(ids(&by_year), vec![10, 11]);
}

#[tokio::test]
async fn test_unknown_director_is_not_found() {
    let (store, ranking) = fixture().await;

    assert!(matches!(
        ranking.films_by_director(99, DirectorFilmOrder::Likes).await,
        Err(ServiceError::NotFound(_))
    ));

    // A known director with no credits is a valid empty filmography.
    store.seed_director(3, "Chantal Akerman").await;
    let empty = ranking
        .films_by_director(3, DirectorFilmOrder::Likes)
        .await
        .expect("empty filmography");
    assert!(empty.is_empty());
}

#[tokio::test]
async fn test_all_by_likes_is_the_degenerate_search() {
    let (_store, ranking) = fixture().await;

    let all = ranking.all_by_likes().await.expect("all");
    assert_eq!(ids(&all), vec![2, 3, 1, 4]);
}
