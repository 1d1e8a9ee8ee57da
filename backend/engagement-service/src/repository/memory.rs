//! In-memory store.
//!
//! Implements every store contract over process-local state behind a single
//! `RwLock`: each operation validates and applies all of its effects inside
//! one critical section, giving the same all-or-nothing behavior as the
//! Postgres transactions. Doubles as the dependency-free test harness; the
//! seeding helpers stand in for the excluded catalog layer.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::domain::{
    normalize_pair, removal_delta, vote_delta, DirectorFilmOrder, DirectorId, FeedEvent,
    FeedEventType, FeedOperation, Film, FilmId, FriendRequestOutcome, FriendshipState, GenreId,
    NewReview, Review, ReviewId, UserId,
};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::traits::{
    FeedStore, FriendshipStore, LikeStore, RankingStore, ReviewStore,
};

#[derive(Debug, Clone, Copy)]
struct MemEdge {
    from: UserId,
    to: UserId,
    accepted: bool,
}

#[derive(Debug, Clone)]
struct MemFilm {
    name: String,
    description: Option<String>,
    release_date: NaiveDate,
    duration: Option<i32>,
    likes_count: i64,
}

impl MemFilm {
    fn to_film(&self, film_id: FilmId) -> Film {
        Film {
            film_id,
            name: self.name.clone(),
            description: self.description.clone(),
            release_date: self.release_date,
            duration: self.duration,
            likes_count: self.likes_count,
        }
    }
}

#[derive(Debug, Default)]
struct MemState {
    users: BTreeSet<UserId>,
    films: BTreeMap<FilmId, MemFilm>,
    genres: BTreeMap<GenreId, String>,
    film_genres: BTreeSet<(FilmId, GenreId)>,
    directors: BTreeMap<DirectorId, String>,
    film_directors: BTreeSet<(FilmId, DirectorId)>,
    // Keyed by the normalized pair, so pair uniqueness holds by construction;
    // the value keeps the edge's actual direction.
    friendship: BTreeMap<(UserId, UserId), MemEdge>,
    film_likes: BTreeSet<(FilmId, UserId)>,
    reviews: BTreeMap<ReviewId, Review>,
    next_review_id: ReviewId,
    review_votes: BTreeMap<(ReviewId, UserId), bool>,
    feed: Vec<FeedEvent>,
    next_event_id: i64,
}

impl MemState {
    fn ensure_user(&self, user_id: UserId) -> ServiceResult<()> {
        if self.users.contains(&user_id) {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "user {} not found",
                user_id
            )))
        }
    }

    fn ensure_film(&self, film_id: FilmId) -> ServiceResult<()> {
        if self.films.contains_key(&film_id) {
            Ok(())
        } else {
            Err(ServiceError::NotFound(format!(
                "film {} not found",
                film_id
            )))
        }
    }

    fn film_mut(&mut self, film_id: FilmId) -> ServiceResult<&mut MemFilm> {
        self.films
            .get_mut(&film_id)
            .ok_or_else(|| ServiceError::NotFound(format!("film {} not found", film_id)))
    }

    fn review_mut(&mut self, review_id: ReviewId) -> ServiceResult<&mut Review> {
        self.reviews
            .get_mut(&review_id)
            .ok_or_else(|| ServiceError::NotFound(format!("review {} not found", review_id)))
    }

    fn push_feed(
        &mut self,
        user_id: UserId,
        event_type: FeedEventType,
        operation: FeedOperation,
        entity_id: i64,
    ) -> FeedEvent {
        self.next_event_id += 1;
        let event = FeedEvent {
            event_id: self.next_event_id,
            event_ts: Utc::now().timestamp_millis(),
            user_id,
            event_type,
            operation,
            entity_id,
        };
        self.feed.push(event.clone());
        event
    }

    /// Sent-to in any state, plus accepted received; ascending by id.
    fn friend_set(&self, user_id: UserId) -> BTreeSet<UserId> {
        self.friendship
            .values()
            .filter_map(|edge| {
                if edge.from == user_id {
                    Some(edge.to)
                } else if edge.to == user_id && edge.accepted {
                    Some(edge.from)
                } else {
                    None
                }
            })
            .collect()
    }

    fn membership_like_count(&self, film_id: FilmId) -> i64 {
        self.film_likes
            .range((film_id, i64::MIN)..=(film_id, i64::MAX))
            .count() as i64
    }

    fn membership_useful(&self, review_id: ReviewId) -> i64 {
        self.review_votes
            .range((review_id, i64::MIN)..=(review_id, i64::MAX))
            .map(|(_, &helpful)| if helpful { 1 } else { -1 })
            .sum()
    }
}

/// Process-local store used in place of Postgres in tests and tooling.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Fixture helpers; in production these records belong to the catalog
    // layer, which is outside this crate.

    pub async fn seed_user(&self, user_id: UserId) {
        self.state.write().await.users.insert(user_id);
    }

    pub async fn seed_film(&self, film_id: FilmId, name: &str, release_date: NaiveDate) {
        self.state.write().await.films.insert(
            film_id,
            MemFilm {
                name: name.to_string(),
                description: None,
                release_date,
                duration: None,
                likes_count: 0,
            },
        );
    }

    pub async fn seed_genre(&self, genre_id: GenreId, name: &str) {
        self.state
            .write()
            .await
            .genres
            .insert(genre_id, name.to_string());
    }

    pub async fn tag_genre(&self, film_id: FilmId, genre_id: GenreId) {
        self.state
            .write()
            .await
            .film_genres
            .insert((film_id, genre_id));
    }

    pub async fn seed_director(&self, director_id: DirectorId, name: &str) {
        self.state
            .write()
            .await
            .directors
            .insert(director_id, name.to_string());
    }

    pub async fn credit_director(&self, film_id: FilmId, director_id: DirectorId) {
        self.state
            .write()
            .await
            .film_directors
            .insert((film_id, director_id));
    }
}

#[async_trait::async_trait]
impl FriendshipStore for InMemoryStore {
    async fn request_friend(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<FriendRequestOutcome> {
        let mut state = self.state.write().await;
        state.ensure_user(user_id)?;
        state.ensure_user(other_id)?;

        let key = normalize_pair(user_id, other_id);
        let outcome = match state.friendship.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(MemEdge {
                    from: user_id,
                    to: other_id,
                    accepted: false,
                });
                FriendRequestOutcome::Requested
            }
            Entry::Occupied(mut entry) => {
                let edge = entry.get_mut();
                if edge.accepted {
                    FriendRequestOutcome::AlreadyFriends
                } else {
                    // The second request confirms, whichever side the edge
                    // points from.
                    edge.accepted = true;
                    FriendRequestOutcome::Confirmed
                }
            }
        };

        if outcome.changed_state() {
            state.push_feed(user_id, FeedEventType::Friend, FeedOperation::Add, other_id);
        }
        Ok(outcome)
    }

    async fn remove_friend(&self, user_id: UserId, other_id: UserId) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        state.ensure_user(user_id)?;
        state.ensure_user(other_id)?;

        let key = normalize_pair(user_id, other_id);
        let Some(edge) = state.friendship.remove(&key) else {
            return Ok(false);
        };

        if edge.accepted {
            // Teardown of a mutual edge leaves a reversed pending request.
            state.friendship.insert(
                key,
                MemEdge {
                    from: other_id,
                    to: user_id,
                    accepted: false,
                },
            );
        }

        state.push_feed(
            user_id,
            FeedEventType::Friend,
            FeedOperation::Remove,
            other_id,
        );
        Ok(true)
    }

    async fn friends_of(&self, user_id: UserId) -> ServiceResult<Vec<UserId>> {
        let state = self.state.read().await;
        state.ensure_user(user_id)?;
        Ok(state.friend_set(user_id).into_iter().collect())
    }

    async fn common_friends(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<Vec<UserId>> {
        let state = self.state.read().await;
        state.ensure_user(user_id)?;
        state.ensure_user(other_id)?;
        let mine = state.friend_set(user_id);
        let theirs = state.friend_set(other_id);
        Ok(mine.intersection(&theirs).copied().collect())
    }

    async fn friendship_between(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<FriendshipState> {
        let state = self.state.read().await;
        state.ensure_user(user_id)?;
        state.ensure_user(other_id)?;

        Ok(match state.friendship.get(&normalize_pair(user_id, other_id)) {
            None => FriendshipState::None,
            Some(edge) if edge.accepted => FriendshipState::Mutual,
            Some(edge) => FriendshipState::Pending {
                from: edge.from,
                to: edge.to,
            },
        })
    }
}

#[async_trait::async_trait]
impl LikeStore for InMemoryStore {
    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        state.ensure_film(film_id)?;
        state.ensure_user(user_id)?;

        let inserted = state.film_likes.insert((film_id, user_id));
        if inserted {
            state.film_mut(film_id)?.likes_count += 1;
            state.push_feed(user_id, FeedEventType::Like, FeedOperation::Add, film_id);
        }
        Ok(inserted)
    }

    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        state.ensure_film(film_id)?;
        state.ensure_user(user_id)?;

        let deleted = state.film_likes.remove(&(film_id, user_id));
        if deleted {
            let film = state.film_mut(film_id)?;
            if film.likes_count > 0 {
                film.likes_count -= 1;
            }
            state.push_feed(user_id, FeedEventType::Like, FeedOperation::Remove, film_id);
        }
        Ok(deleted)
    }

    async fn has_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool> {
        let state = self.state.read().await;
        Ok(state.film_likes.contains(&(film_id, user_id)))
    }

    async fn like_count(&self, film_id: FilmId) -> ServiceResult<i64> {
        let state = self.state.read().await;
        state
            .films
            .get(&film_id)
            .map(|film| film.likes_count)
            .ok_or_else(|| ServiceError::NotFound(format!("film {} not found", film_id)))
    }

    async fn recount_film_likes(&self, film_id: FilmId) -> ServiceResult<i64> {
        let mut state = self.state.write().await;
        let actual = state.membership_like_count(film_id);
        state.film_mut(film_id)?.likes_count = actual;
        Ok(actual)
    }

    async fn recount_all_likes(&self) -> ServiceResult<u64> {
        let mut state = self.state.write().await;
        let film_ids: Vec<FilmId> = state.films.keys().copied().collect();

        let mut repaired = 0;
        for film_id in film_ids {
            let actual = state.membership_like_count(film_id);
            let film = state.film_mut(film_id)?;
            if film.likes_count != actual {
                film.likes_count = actual;
                repaired += 1;
            }
        }
        Ok(repaired)
    }
}

#[async_trait::async_trait]
impl ReviewStore for InMemoryStore {
    async fn create_review(&self, draft: &NewReview) -> ServiceResult<Review> {
        let mut state = self.state.write().await;
        state.ensure_user(draft.user_id)?;
        state.ensure_film(draft.film_id)?;

        state.next_review_id += 1;
        let review = Review {
            review_id: state.next_review_id,
            content: draft.content.clone(),
            is_positive: draft.is_positive,
            user_id: draft.user_id,
            film_id: draft.film_id,
            useful: 0,
        };
        state.reviews.insert(review.review_id, review.clone());
        state.push_feed(
            review.user_id,
            FeedEventType::Review,
            FeedOperation::Add,
            review.review_id,
        );
        Ok(review)
    }

    async fn update_review(
        &self,
        review_id: ReviewId,
        content: &str,
        is_positive: bool,
    ) -> ServiceResult<Review> {
        let mut state = self.state.write().await;

        let review = state.review_mut(review_id)?;
        review.content = content.to_string();
        review.is_positive = is_positive;
        let updated = review.clone();

        state.push_feed(
            updated.user_id,
            FeedEventType::Review,
            FeedOperation::Update,
            review_id,
        );
        Ok(updated)
    }

    async fn delete_review(&self, review_id: ReviewId) -> ServiceResult<()> {
        let mut state = self.state.write().await;

        let review = state
            .reviews
            .remove(&review_id)
            .ok_or_else(|| ServiceError::NotFound(format!("review {} not found", review_id)))?;
        state
            .review_votes
            .retain(|&(vote_review, _), _| vote_review != review_id);
        state.push_feed(
            review.user_id,
            FeedEventType::Review,
            FeedOperation::Remove,
            review_id,
        );
        Ok(())
    }

    async fn review_by_id(&self, review_id: ReviewId) -> ServiceResult<Review> {
        let state = self.state.read().await;
        state
            .reviews
            .get(&review_id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("review {} not found", review_id)))
    }

    async fn list_reviews(
        &self,
        film_id: Option<FilmId>,
        limit: i64,
    ) -> ServiceResult<Vec<Review>> {
        let state = self.state.read().await;
        if let Some(film_id) = film_id {
            state.ensure_film(film_id)?;
        }

        let mut reviews: Vec<Review> = state
            .reviews
            .values()
            .filter(|review| film_id.map_or(true, |id| review.film_id == id))
            .cloned()
            .collect();
        reviews.sort_by(|a, b| {
            b.useful
                .cmp(&a.useful)
                .then(a.review_id.cmp(&b.review_id))
        });
        reviews.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(reviews)
    }

    async fn cast_vote(
        &self,
        review_id: ReviewId,
        voter_id: UserId,
        helpful: bool,
    ) -> ServiceResult<i64> {
        let mut state = self.state.write().await;
        state.ensure_user(voter_id)?;
        let current = state.review_mut(review_id)?.useful;

        let previous = state.review_votes.get(&(review_id, voter_id)).copied();
        if previous == Some(helpful) {
            return Ok(current);
        }

        state.review_votes.insert((review_id, voter_id), helpful);
        let review = state.review_mut(review_id)?;
        review.useful += vote_delta(previous, helpful);
        Ok(review.useful)
    }

    async fn remove_vote(
        &self,
        review_id: ReviewId,
        voter_id: UserId,
        helpful: bool,
    ) -> ServiceResult<bool> {
        let mut state = self.state.write().await;
        state.ensure_user(voter_id)?;
        state.review_mut(review_id)?;

        let previous = state.review_votes.get(&(review_id, voter_id)).copied();
        let deleted = previous == Some(helpful);
        if deleted {
            state.review_votes.remove(&(review_id, voter_id));
            state.review_mut(review_id)?.useful += removal_delta(helpful);
        }
        Ok(deleted)
    }

    async fn recount_useful(&self, review_id: ReviewId) -> ServiceResult<i64> {
        let mut state = self.state.write().await;
        let actual = state.membership_useful(review_id);
        let review = state.review_mut(review_id)?;
        review.useful = actual;
        Ok(actual)
    }

    async fn recount_all_useful(&self) -> ServiceResult<u64> {
        let mut state = self.state.write().await;
        let review_ids: Vec<ReviewId> = state.reviews.keys().copied().collect();

        let mut repaired = 0;
        for review_id in review_ids {
            let actual = state.membership_useful(review_id);
            let review = state.review_mut(review_id)?;
            if review.useful != actual {
                review.useful = actual;
                repaired += 1;
            }
        }
        Ok(repaired)
    }
}

#[async_trait::async_trait]
impl FeedStore for InMemoryStore {
    async fn record(
        &self,
        user_id: UserId,
        event_type: FeedEventType,
        operation: FeedOperation,
        entity_id: i64,
    ) -> ServiceResult<FeedEvent> {
        let mut state = self.state.write().await;
        state.ensure_user(user_id)?;
        Ok(state.push_feed(user_id, event_type, operation, entity_id))
    }

    async fn feed_for_user(&self, user_id: UserId) -> ServiceResult<Vec<FeedEvent>> {
        let state = self.state.read().await;
        state.ensure_user(user_id)?;
        // The vec is insertion-ordered and timestamps never go backwards, so
        // this is (event_ts, event_id) ascending.
        Ok(state
            .feed
            .iter()
            .filter(|event| event.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl RankingStore for InMemoryStore {
    async fn top_by_likes(
        &self,
        limit: i64,
        genre_id: Option<GenreId>,
        year: Option<i32>,
    ) -> ServiceResult<Vec<Film>> {
        let state = self.state.read().await;

        let mut films: Vec<Film> = state
            .films
            .iter()
            .filter(|(film_id, _)| {
                genre_id.map_or(true, |genre| state.film_genres.contains(&(**film_id, genre)))
            })
            .filter(|(_, film)| year.map_or(true, |y| film.release_date.year() == y))
            .map(|(film_id, film)| film.to_film(*film_id))
            .collect();
        films.sort_by(|a, b| {
            b.likes_count
                .cmp(&a.likes_count)
                .then(a.film_id.cmp(&b.film_id))
        });
        films.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(films)
    }

    async fn search_by_title(&self, fragment: &str) -> ServiceResult<Vec<Film>> {
        let state = self.state.read().await;
        let needle = fragment.to_lowercase();

        let mut films: Vec<Film> = state
            .films
            .iter()
            .filter(|(_, film)| film.name.to_lowercase().contains(&needle))
            .map(|(film_id, film)| film.to_film(*film_id))
            .collect();
        sort_by_likes_ascending(&mut films);
        Ok(films)
    }

    async fn search_by_director(&self, fragment: &str) -> ServiceResult<Vec<Film>> {
        let state = self.state.read().await;
        let needle = fragment.to_lowercase();

        let mut films: Vec<Film> = state
            .films
            .iter()
            .filter(|(&film_id, _)| director_matches(&state, film_id, &needle))
            .map(|(film_id, film)| film.to_film(*film_id))
            .collect();
        sort_by_likes_ascending(&mut films);
        Ok(films)
    }

    async fn search_by_title_or_director(&self, fragment: &str) -> ServiceResult<Vec<Film>> {
        let state = self.state.read().await;
        let needle = fragment.to_lowercase();

        let mut films: Vec<Film> = state
            .films
            .iter()
            .filter(|(&film_id, film)| {
                film.name.to_lowercase().contains(&needle)
                    || director_matches(&state, film_id, &needle)
            })
            .map(|(film_id, film)| film.to_film(*film_id))
            .collect();
        sort_by_likes_ascending(&mut films);
        Ok(films)
    }

    async fn films_by_director(
        &self,
        director_id: DirectorId,
        order: DirectorFilmOrder,
    ) -> ServiceResult<Vec<Film>> {
        let state = self.state.read().await;
        if !state.directors.contains_key(&director_id) {
            return Err(ServiceError::NotFound(format!(
                "director {} not found",
                director_id
            )));
        }

        let mut films: Vec<Film> = state
            .films
            .iter()
            .filter(|(&film_id, _)| state.film_directors.contains(&(film_id, director_id)))
            .map(|(film_id, film)| film.to_film(*film_id))
            .collect();
        match order {
            DirectorFilmOrder::Likes => films.sort_by(|a, b| {
                b.likes_count
                    .cmp(&a.likes_count)
                    .then(a.film_id.cmp(&b.film_id))
            }),
            DirectorFilmOrder::Year => films.sort_by(|a, b| {
                a.release_date
                    .cmp(&b.release_date)
                    .then(a.film_id.cmp(&b.film_id))
            }),
        }
        Ok(films)
    }

    async fn all_by_likes(&self) -> ServiceResult<Vec<Film>> {
        let state = self.state.read().await;
        let mut films: Vec<Film> = state
            .films
            .iter()
            .map(|(film_id, film)| film.to_film(*film_id))
            .collect();
        sort_by_likes_ascending(&mut films);
        Ok(films)
    }
}

fn sort_by_likes_ascending(films: &mut [Film]) {
    films.sort_by(|a, b| {
        a.likes_count
            .cmp(&b.likes_count)
            .then(a.film_id.cmp(&b.film_id))
    });
}

fn director_matches(state: &MemState, film_id: FilmId, needle: &str) -> bool {
    state
        .film_directors
        .range((film_id, i64::MIN)..=(film_id, i64::MAX))
        .any(|&(_, director_id)| {
            state
                .directors
                .get(&director_id)
                .map_or(false, |name| name.to_lowercase().contains(needle))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pair_key_prevents_twin_edges() {
        let store = InMemoryStore::new();
        store.seed_user(1).await;
        store.seed_user(2).await;

        store.request_friend(1, 2).await.unwrap();
        store.request_friend(2, 1).await.unwrap();

        let state = store.state.read().await;
        assert_eq!(state.friendship.len(), 1);
        assert!(state.friendship.contains_key(&(1, 2)));
    }

    #[tokio::test]
    async fn test_feed_ids_are_insertion_ordered() {
        let store = InMemoryStore::new();
        store.seed_user(1).await;

        for entity in 1..=3 {
            store
                .record(1, FeedEventType::Like, FeedOperation::Add, entity)
                .await
                .unwrap();
        }

        let feed = store.feed_for_user(1).await.unwrap();
        let ids: Vec<i64> = feed.iter().map(|event| event.event_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
