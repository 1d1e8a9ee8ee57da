use crate::domain::{
    DirectorFilmOrder, DirectorId, FeedEvent, FeedEventType, FeedOperation, Film, FilmId,
    FriendRequestOutcome, FriendshipState, GenreId, NewReview, Review, ReviewId, UserId,
};
use crate::error::ServiceResult;

/// Friendship state machine over unordered user pairs.
/// Mutations write their paired feed entry in the same atomic unit.
#[async_trait::async_trait]
pub trait FriendshipStore: Send + Sync {
    /// Create a pending edge, or confirm the existing one whichever way it
    /// points. A repeat request on a mutual pair is a no-op.
    async fn request_friend(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<FriendRequestOutcome>;

    /// Delete the pair's edge; a torn-down mutual edge is recreated reversed
    /// as pending toward the remover. Returns whether an edge was deleted.
    async fn remove_friend(&self, user_id: UserId, other_id: UserId) -> ServiceResult<bool>;

    /// Everyone the user sent a request to (any state) plus everyone whose
    /// request the user accepted, ascending by id.
    async fn friends_of(&self, user_id: UserId) -> ServiceResult<Vec<UserId>>;

    /// Intersection of both users' friend lists, ascending by id.
    async fn common_friends(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<Vec<UserId>>;

    /// Current state of the pair's edge.
    async fn friendship_between(
        &self,
        user_id: UserId,
        other_id: UserId,
    ) -> ServiceResult<FriendshipState>;
}

/// Film like membership plus the denormalized per-film counter.
#[async_trait::async_trait]
pub trait LikeStore: Send + Sync {
    /// Insert the membership fact and bump the counter in one atomic unit.
    /// Returns false (and leaves the counter alone) if the like existed.
    async fn add_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool>;

    /// Delete the membership fact and drop the counter in one atomic unit.
    /// Returns false if there was nothing to delete.
    async fn remove_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool>;

    /// Membership probe.
    async fn has_like(&self, film_id: FilmId, user_id: UserId) -> ServiceResult<bool>;

    /// Stored counter value for the film.
    async fn like_count(&self, film_id: FilmId) -> ServiceResult<i64>;

    /// Rewrite one film's counter from membership; returns the repaired value.
    async fn recount_film_likes(&self, film_id: FilmId) -> ServiceResult<i64>;

    /// Repair every drifted film counter; returns how many rows changed.
    async fn recount_all_likes(&self) -> ServiceResult<u64>;
}

/// Review lifecycle and helpfulness votes.
#[async_trait::async_trait]
pub trait ReviewStore: Send + Sync {
    /// Insert a review with a zero score; feed-coupled.
    async fn create_review(&self, draft: &NewReview) -> ServiceResult<Review>;

    /// Update content and verdict only; author, film and score are immutable
    /// here. Feed-coupled, attributed to the review's author.
    async fn update_review(
        &self,
        review_id: ReviewId,
        content: &str,
        is_positive: bool,
    ) -> ServiceResult<Review>;

    /// Delete the review and its votes; feed-coupled.
    async fn delete_review(&self, review_id: ReviewId) -> ServiceResult<()>;

    /// Fetch one review.
    async fn review_by_id(&self, review_id: ReviewId) -> ServiceResult<Review>;

    /// Reviews for one film, or across all films, by descending usefulness.
    async fn list_reviews(
        &self,
        film_id: Option<FilmId>,
        limit: i64,
    ) -> ServiceResult<Vec<Review>>;

    /// Upsert the voter's vote and shift the score by the polarity
    /// transition's delta. Returns the review's new usefulness score.
    async fn cast_vote(
        &self,
        review_id: ReviewId,
        voter_id: UserId,
        helpful: bool,
    ) -> ServiceResult<i64>;

    /// Delete the voter's vote if it matches the polarity filter, restoring
    /// the inverse delta. Returns whether a vote was deleted.
    async fn remove_vote(
        &self,
        review_id: ReviewId,
        voter_id: UserId,
        helpful: bool,
    ) -> ServiceResult<bool>;

    /// Rebuild one review's score from vote membership; returns the value.
    async fn recount_useful(&self, review_id: ReviewId) -> ServiceResult<i64>;

    /// Repair every drifted review score; returns how many rows changed.
    async fn recount_all_useful(&self) -> ServiceResult<u64>;
}

/// Append-only activity log.
#[async_trait::async_trait]
pub trait FeedStore: Send + Sync {
    /// Append one entry stamped with the current wall clock.
    async fn record(
        &self,
        user_id: UserId,
        event_type: FeedEventType,
        operation: FeedOperation,
        entity_id: i64,
    ) -> ServiceResult<FeedEvent>;

    /// All entries for the user, oldest first (ties by event id).
    async fn feed_for_user(&self, user_id: UserId) -> ServiceResult<Vec<FeedEvent>>;
}

/// Read-only ranking and search queries. Each call observes one consistent
/// snapshot of counters plus film facts.
#[async_trait::async_trait]
pub trait RankingStore: Send + Sync {
    /// Top films by like count descending, ties by film id ascending,
    /// optionally pre-filtered by genre membership and/or release year.
    async fn top_by_likes(
        &self,
        limit: i64,
        genre_id: Option<GenreId>,
        year: Option<i32>,
    ) -> ServiceResult<Vec<Film>>;

    /// Case-insensitive title substring match, like count ascending.
    async fn search_by_title(&self, fragment: &str) -> ServiceResult<Vec<Film>>;

    /// Case-insensitive director-name substring match, like count ascending.
    async fn search_by_director(&self, fragment: &str) -> ServiceResult<Vec<Film>>;

    /// Films matching either predicate, like count ascending.
    async fn search_by_title_or_director(&self, fragment: &str) -> ServiceResult<Vec<Film>>;

    /// One director's films in the requested order.
    async fn films_by_director(
        &self,
        director_id: DirectorId,
        order: DirectorFilmOrder,
    ) -> ServiceResult<Vec<Film>>;

    /// Every film by like count ascending; the no-fragment search.
    async fn all_by_likes(&self) -> ServiceResult<Vec<Film>>;
}
